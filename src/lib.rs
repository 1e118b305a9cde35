//! Transmirror: batch mirror of a remote media tree with bounded-resource transcoding.

pub mod disk_detect;
pub mod engine;
pub mod error;
pub mod pipeline;
pub mod types;
pub mod utils;

/// Re-export types for API
pub use error::{FileError, FileOutcome, MigrateError, Stage};
pub use pipeline::{migrate_batch, migrate_dir};
pub use types::*;

/// Result alias used by the public transmirror API
pub type Result<T> = std::result::Result<T, MigrateError>;
