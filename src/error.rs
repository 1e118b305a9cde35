//! Error types: fatal run errors and per-file failures.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort the whole run.
#[derive(Debug, Error)]
pub enum MigrateError {
    /// Remote batch directory does not exist. Raised before any file work or directory creation.
    #[error("remote source directory does not exist: {}", path.display())]
    MissingSource { path: PathBuf },

    /// Encoder binary could not be resolved while there are files to convert.
    #[error("encoder not found: {}", path.display())]
    EncoderNotFound { path: PathBuf },

    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    /// Directory-level I/O (listing the source, creating destination or temp dirs).
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to build worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

impl MigrateError {
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}

/// Failure of a single file. Absorbed at the worker boundary; never aborts siblings.
#[derive(Debug, Error)]
pub enum FileError {
    #[error("copy failed for {}: {source}", path.display())]
    Copy {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Encoder ran and exited non-zero. `stderr` is the captured diagnostic stream.
    #[error("conversion failed for {} ({status}): {stderr}", path.display())]
    Convert {
        path: PathBuf,
        status: String,
        stderr: String,
    },

    /// Encoder process could not be started or its output could not be moved into place.
    #[error("encoder error for {}: {source}", path.display())]
    Encoder {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Another convertible file of the run already claimed the same output path.
    #[error("{} not converted: {} is already produced by {}", path.display(), output.display(), claimed_by.display())]
    OutputCollision {
        path: PathBuf,
        output: PathBuf,
        claimed_by: PathBuf,
    },

    #[error("could not remove staged file {}: {source}", path.display())]
    Reclaim {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl FileError {
    /// Path of the file the failure belongs to.
    pub fn path(&self) -> &PathBuf {
        match self {
            Self::Copy { path, .. }
            | Self::Convert { path, .. }
            | Self::Encoder { path, .. }
            | Self::OutputCollision { path, .. }
            | Self::Reclaim { path, .. } => path,
        }
    }

    pub fn stage(&self) -> Stage {
        match self {
            Self::Copy { .. } => Stage::Copy,
            Self::Convert { .. } | Self::Encoder { .. } | Self::OutputCollision { .. } => {
                Stage::Convert
            }
            Self::Reclaim { .. } => Stage::Reclaim,
        }
    }
}

/// Pipeline stage a failure was raised in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Copy,
    Convert,
    Reclaim,
}

/// Per-file result: the produced path, or why there is none.
pub type FileOutcome = Result<PathBuf, FileError>;
