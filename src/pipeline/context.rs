//! Pipeline context and tuning: resolved directories, pools and progress shared by both phases.

use log::{debug, info};
use std::path::PathBuf;

use crate::MigrateOpts;
use crate::engine::encoder::resolve_encoder;
use crate::engine::pool::{CpuPool, IoPool, WorkerPool};
use crate::engine::progress::{ProgressCounter, ProgressReporter};
use crate::engine::tools::physical_cpu_workers;
use crate::error::MigrateError;
use crate::pipeline::transcode::Transcoder;
use crate::utils::fd_limit::cap_io_workers;

/// Worker counts after defaults and the FD cap are applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PipelineTuning {
    pub io_workers: usize,
    pub cpu_workers: usize,
}

impl PipelineTuning {
    pub fn from_opts(opts: &MigrateOpts) -> Self {
        Self {
            io_workers: cap_io_workers(opts.io_workers),
            cpu_workers: opts.cpu_workers.unwrap_or_else(physical_cpu_workers),
        }
    }
}

/// Reject settings the pipeline cannot run with.
pub fn validate_opts(opts: &MigrateOpts) -> Result<(), MigrateError> {
    if opts.block_size == 0 {
        return Err(MigrateError::invalid_config("block_size must be at least 1"));
    }
    if opts.io_workers == 0 {
        return Err(MigrateError::invalid_config("io_workers must be at least 1"));
    }
    if opts.cpu_workers == Some(0) {
        return Err(MigrateError::invalid_config("cpu_workers must be at least 1"));
    }
    if opts.target_extension.trim_start_matches('.').is_empty() {
        return Err(MigrateError::invalid_config("target_extension is empty"));
    }
    Ok(())
}

/// Everything the block scheduler needs for one run. The CPU pool and transcoder exist only
/// when there is something to convert.
pub struct PipelineContext<'a> {
    pub opts: &'a MigrateOpts,
    pub dest_dir: PathBuf,
    pub temp_dir: PathBuf,
    pub io_pool: IoPool,
    pub cpu_pool: Option<CpuPool>,
    pub transcoder: Option<Transcoder>,
    pub reporter: ProgressReporter,
}

impl<'a> PipelineContext<'a> {
    /// Resolve the encoder (when needed) and build pools. Runs before any file is touched, so a
    /// missing encoder aborts the run without side effects.
    pub fn new(
        opts: &'a MigrateOpts,
        dest_dir: PathBuf,
        total: usize,
        needs_encoder: bool,
    ) -> Result<Self, MigrateError> {
        let tuning = PipelineTuning::from_opts(opts);
        let (cpu_pool, transcoder) = if needs_encoder {
            let encoder = resolve_encoder(&opts.encoder.bin)?;
            debug!("Encoder: {}", encoder.display());
            let transcoder = Transcoder {
                encoder,
                settings: opts.encoder.clone(),
                target_extension: opts.target_extension.clone(),
            };
            (Some(CpuPool::new(tuning.cpu_workers)?), Some(transcoder))
        } else {
            (None, None)
        };

        let io_pool = IoPool::new(tuning.io_workers);
        info!(
            "Workers: {} copy, {} encode",
            io_pool.workers(),
            cpu_pool.as_ref().map_or(0, |p| p.workers())
        );

        let counter = ProgressCounter::new(total);
        Ok(Self {
            opts,
            dest_dir,
            temp_dir: opts.temp_dir(),
            io_pool,
            cpu_pool,
            transcoder,
            reporter: ProgressReporter::new(counter, opts.progress_interval, opts.progress_bar),
        })
    }
}
