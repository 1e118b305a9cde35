//! Public types for the transmirror API and pipeline.

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::disk_detect::SourceLocation;
use crate::error::{FileError, Stage};
use crate::utils::config::{EncoderDefaults, FormatDefaults, PipelineDefaults};

/// How the classifier routes a file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum FormatTag {
    /// Already in the target container: copied verbatim.
    PassThrough,
    /// Needs the encoder.
    Convertible,
    /// Anything else. Never leaves the classifier.
    Ignored,
}

/// One eligible remote file. Immutable once discovered.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub size: u64,
    pub tag: FormatTag,
}

impl SourceFile {
    /// Base name, used as the staging key.
    pub fn file_name(&self) -> &std::ffi::OsStr {
        self.path.file_name().unwrap_or(self.path.as_os_str())
    }
}

/// Classifier output. Both sets are sorted by path.
#[derive(Clone, Debug, Default)]
pub struct Classified {
    pub pass_through: Vec<SourceFile>,
    pub convertible: Vec<SourceFile>,
    /// Regular non-empty files dropped for an unknown extension.
    pub ignored: usize,
    /// Zero-byte files dropped.
    pub empty: usize,
}

impl Classified {
    pub fn total(&self) -> usize {
        self.pass_through.len() + self.convertible.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Fixed encoder invocation settings.
#[derive(Clone, Debug)]
pub struct EncoderSettings {
    /// Encoder binary: bare name (resolved on PATH) or a path.
    pub bin: PathBuf,
    pub codec: String,
    pub bitrate: String,
    pub log_level: String,
}

impl Default for EncoderSettings {
    fn default() -> Self {
        Self {
            bin: PathBuf::from(EncoderDefaults::BIN),
            codec: EncoderDefaults::CODEC.to_string(),
            bitrate: EncoderDefaults::BITRATE.to_string(),
            log_level: EncoderDefaults::LOG_LEVEL.to_string(),
        }
    }
}

/// Everything a run needs. Passed explicitly into [`migrate_batch`](crate::migrate_batch); there are no globals.
#[derive(Clone, Debug)]
pub struct MigrateOpts {
    /// Remote tree; a batch label resolves to `source_root/<label>`.
    pub source_root: PathBuf,
    /// Local tree; outputs land in `dest_root/<label>`.
    pub dest_root: PathBuf,
    /// Staging directory. When None, `dest_root/temp`.
    pub temp_dir: Option<PathBuf>,
    pub encoder: EncoderSettings,
    /// Extension (no dot) of every output file.
    pub target_extension: String,
    pub pass_through_extensions: Vec<String>,
    pub convertible_extensions: Vec<String>,
    /// Concurrent remote copies (capped by the FD limit).
    pub io_workers: usize,
    /// Concurrent encoder processes. When None, physical core count.
    pub cpu_workers: Option<usize>,
    pub block_size: usize,
    pub progress_interval: usize,
    pub copy_buffer_size: usize,
    /// Draw a terminal progress bar instead of periodic progress lines.
    pub progress_bar: bool,
    /// Classify and plan only; touch nothing on disk.
    pub dry_run: bool,
}

impl MigrateOpts {
    pub fn new(source_root: impl Into<PathBuf>, dest_root: impl Into<PathBuf>) -> Self {
        Self {
            source_root: source_root.into(),
            dest_root: dest_root.into(),
            temp_dir: None,
            encoder: EncoderSettings::default(),
            target_extension: FormatDefaults::TARGET_EXTENSION.to_string(),
            pass_through_extensions: to_strings(FormatDefaults::PASS_THROUGH),
            convertible_extensions: to_strings(FormatDefaults::CONVERTIBLE),
            io_workers: PipelineDefaults::IO_WORKERS,
            cpu_workers: None,
            block_size: PipelineDefaults::BLOCK_SIZE,
            progress_interval: PipelineDefaults::PROGRESS_INTERVAL,
            copy_buffer_size: PipelineDefaults::COPY_BUFFER_SIZE,
            progress_bar: false,
            dry_run: false,
        }
    }

    /// Staging directory, defaulting to `dest_root/temp`.
    pub fn temp_dir(&self) -> PathBuf {
        self.temp_dir
            .clone()
            .unwrap_or_else(|| self.dest_root.join(PipelineDefaults::TEMP_DIR_NAME))
    }

    pub fn source_dir(&self, label: &str) -> PathBuf {
        self.source_root.join(label)
    }

    pub fn dest_dir(&self, label: &str) -> PathBuf {
        self.dest_root.join(label)
    }
}

fn to_strings(exts: &[&str]) -> Vec<String> {
    exts.iter().map(|e| e.to_string()).collect()
}

/// Serializable record of one per-file failure.
#[derive(Clone, Debug, Serialize)]
pub struct FailureRecord {
    pub path: PathBuf,
    pub stage: Stage,
    pub message: String,
}

impl From<&FileError> for FailureRecord {
    fn from(e: &FileError) -> Self {
        Self {
            path: e.path().clone(),
            stage: e.stage(),
            message: e.to_string(),
        }
    }
}

/// Outcome of one block.
#[derive(Clone, Debug, Default, Serialize)]
pub struct BlockSummary {
    /// 1-based block number within its phase.
    pub index: usize,
    pub tag: Option<FormatTag>,
    /// Files submitted to the block.
    pub files: usize,
    /// Files that made it into the staging directory (convertible blocks only).
    pub staged: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub reclaim_failures: usize,
}

/// Final tally of a run.
#[derive(Clone, Debug, Serialize)]
pub struct RunSummary {
    pub label: String,
    pub source_dir: PathBuf,
    pub dest_dir: PathBuf,
    pub source_location: SourceLocation,
    /// Files discovered (pass-through + convertible).
    pub total: usize,
    /// Files resolved, success or failure. Equals `total` at the end of a completed run.
    pub completed: usize,
    pub copied: usize,
    pub converted: usize,
    pub ignored: usize,
    pub empty: usize,
    pub failures: Vec<FailureRecord>,
    pub blocks: Vec<BlockSummary>,
    pub dry_run: bool,
    pub elapsed_ms: u128,
}

impl RunSummary {
    pub fn new(label: &str, source_dir: &Path, dest_dir: &Path) -> Self {
        Self {
            label: label.to_string(),
            source_dir: source_dir.to_path_buf(),
            dest_dir: dest_dir.to_path_buf(),
            source_location: SourceLocation::Unknown,
            total: 0,
            completed: 0,
            copied: 0,
            converted: 0,
            ignored: 0,
            empty: 0,
            failures: Vec::new(),
            blocks: Vec::new(),
            dry_run: false,
            elapsed_ms: 0,
        }
    }

    pub fn succeeded(&self) -> usize {
        self.copied + self.converted
    }

    /// Copy and convert failures. Reclaim failures leave no file unresolved and are not counted here.
    pub fn failed(&self) -> usize {
        self.failures
            .iter()
            .filter(|f| f.stage != Stage::Reclaim)
            .count()
    }

    pub fn reclaim_failures(&self) -> usize {
        self.failures
            .iter()
            .filter(|f| f.stage == Stage::Reclaim)
            .count()
    }
}
