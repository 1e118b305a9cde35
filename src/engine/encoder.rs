//! External encoder: argument building, preflight and one-shot invocation.

use log::debug;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::EncoderSettings;
use crate::engine::tools::partial_output_path;
use crate::error::{FileError, FileOutcome, MigrateError};

/// Fixed argument set: overwrite, quiet, input, codec, bitrate, output.
pub fn build_args(settings: &EncoderSettings, input: &Path, output: &Path) -> Vec<OsString> {
    vec![
        "-y".into(),
        "-loglevel".into(),
        settings.log_level.clone().into(),
        "-i".into(),
        input.as_os_str().to_os_string(),
        "-acodec".into(),
        settings.codec.clone().into(),
        "-ab".into(),
        settings.bitrate.clone().into(),
        output.as_os_str().to_os_string(),
    ]
}

/// Resolve the encoder binary. Bare names go through PATH; anything with a separator must exist.
pub fn resolve_encoder(bin: &Path) -> Result<PathBuf, MigrateError> {
    let not_found = || MigrateError::EncoderNotFound {
        path: bin.to_path_buf(),
    };
    if bin.components().count() > 1 || bin.is_absolute() {
        return if bin.is_file() {
            Ok(bin.to_path_buf())
        } else {
            Err(not_found())
        };
    }
    which::which(bin).map_err(|_| not_found())
}

/// Encode `input` into `output`. Runs the encoder as its own process and waits for it.
///
/// The encoder writes to a partial path that is renamed over `output` only on exit code 0,
/// so a failed conversion never leaves a file at `output`.
pub fn encode(encoder: &Path, settings: &EncoderSettings, input: &Path, output: &Path) -> FileOutcome {
    let partial = partial_output_path(input, output);
    let args = build_args(settings, input, &partial);
    debug!("{} {:?}", encoder.display(), args);

    let result = Command::new(encoder)
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output();

    let out = match result {
        Ok(out) => out,
        Err(source) => {
            let _ = std::fs::remove_file(&partial);
            return Err(FileError::Encoder {
                path: input.to_path_buf(),
                source,
            });
        }
    };

    if !out.status.success() {
        let _ = std::fs::remove_file(&partial);
        return Err(FileError::Convert {
            path: input.to_path_buf(),
            status: out.status.to_string(),
            stderr: String::from_utf8_lossy(&out.stderr).trim().to_string(),
        });
    }

    std::fs::rename(&partial, output).map_err(|source| {
        let _ = std::fs::remove_file(&partial);
        FileError::Encoder {
            path: input.to_path_buf(),
            source,
        }
    })?;
    Ok(output.to_path_buf())
}
