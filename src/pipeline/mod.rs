//! Pipeline components: classifier, copy and transcode stages, reclaimer, block scheduler.

pub mod classify;
pub mod context;
pub mod copy;
pub mod orchestrator;
pub mod reclaim;
pub mod scheduler;
pub mod transcode;

pub use classify::{classify_source, format_tag};
pub use context::{PipelineContext, PipelineTuning, validate_opts};
pub use copy::{CopyReport, copy_file, copy_remote_files};
pub use orchestrator::{migrate_batch, migrate_dir};
pub use reclaim::reclaim_staged;
pub use scheduler::{block_count, blocks};
pub use transcode::{TranscodeReport, Transcoder};
