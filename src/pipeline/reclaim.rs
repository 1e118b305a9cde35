//! Temp reclaimer: drop every staged file of a finished block.

use log::{debug, warn};
use std::io::ErrorKind;
use std::path::PathBuf;

use crate::error::FileError;

/// Remove each staged path regardless of how its conversion went.
/// Already-missing files count as reclaimed. Returns the files that could not be removed.
pub fn reclaim_staged(staged: &[PathBuf]) -> Vec<FileError> {
    let mut failures = Vec::new();
    for path in staged {
        match std::fs::remove_file(path) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(source) => {
                let err = FileError::Reclaim {
                    path: path.clone(),
                    source,
                };
                warn!("{}", err);
                failures.push(err);
            }
        }
    }
    debug!(
        "Reclaimed {}/{} staged files",
        staged.len() - failures.len(),
        staged.len()
    );
    failures
}
