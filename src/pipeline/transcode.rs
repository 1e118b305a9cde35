//! Transcode stage: one encoder process per staged file on the CPU pool.

use log::{debug, warn};
use std::path::{Path, PathBuf};

use crate::EncoderSettings;
use crate::engine::encoder::encode;
use crate::engine::pool::WorkerPool;
use crate::engine::tools::{ensure_dir, output_path_for};
use crate::error::{FileError, FileOutcome, MigrateError};

#[derive(Debug, Default)]
pub struct TranscodeReport {
    /// Output files written to the destination directory.
    pub converted: Vec<PathBuf>,
    pub failures: Vec<FileError>,
}

/// Encoder binary (already resolved), settings and output naming for one run.
#[derive(Clone, Debug)]
pub struct Transcoder {
    pub encoder: PathBuf,
    pub settings: EncoderSettings,
    pub target_extension: String,
}

impl Transcoder {
    /// Convert one staged file into `dest_dir`.
    pub fn convert(&self, staged: &Path, dest_dir: &Path) -> FileOutcome {
        let output = output_path_for(staged, dest_dir, &self.target_extension);
        encode(&self.encoder, &self.settings, staged, &output)
    }

    /// Convert every staged file on `pool`. A failed file never cancels the others.
    /// `on_done` runs once per submitted file, success or failure.
    pub fn convert_all<P, C>(
        &self,
        pool: &P,
        staged: &[PathBuf],
        dest_dir: &Path,
        mut on_done: C,
    ) -> Result<TranscodeReport, MigrateError>
    where
        P: WorkerPool,
        C: FnMut(&FileOutcome),
    {
        ensure_dir(dest_dir)?;
        let jobs: Vec<&Path> = staged.iter().map(PathBuf::as_path).collect();
        let results = pool.execute(
            jobs,
            |path| self.convert(path, dest_dir),
            |outcome| {
                if let Err(e) = outcome {
                    warn!("{}", e);
                }
                on_done(outcome)
            },
        );

        let mut report = TranscodeReport::default();
        for r in results {
            match r {
                Ok(out) => report.converted.push(out),
                Err(e) => report.failures.push(e),
            }
        }
        debug!(
            "Converted {}/{} into {}",
            report.converted.len(),
            staged.len(),
            dest_dir.display()
        );
        Ok(report)
    }
}
