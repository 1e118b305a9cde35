use log::{debug, info, warn};
use std::path::Path;
use std::time::Instant;

use crate::disk_detect::detect_source_location;
use crate::engine::tools::{ensure_dir, validate_label};
use crate::error::MigrateError;
use crate::pipeline::classify::classify_source;
use crate::pipeline::context::{PipelineContext, validate_opts};
use crate::pipeline::scheduler::block_count;
use crate::{MigrateOpts, RunSummary};

/// Resolve `label` to `source_root/label` and `dest_root/label` and migrate it.
pub fn migrate_batch(label: &str, opts: &MigrateOpts) -> Result<RunSummary, MigrateError> {
    validate_label(label)?;
    let label = label.trim();
    migrate_dir(
        label,
        &opts.source_dir(label),
        &opts.dest_dir(label),
        opts,
    )
}

/// Main orchestrator: classify `source_dir`, copy pass-through files into `dest_dir`, then stage,
/// convert and reclaim convertible files block by block.
///
/// Fatal errors (missing source, bad config, missing encoder, unusable directories) return `Err`.
/// Per-file failures are logged and collected in the returned summary.
pub fn migrate_dir(
    label: &str,
    source_dir: &Path,
    dest_dir: &Path,
    opts: &MigrateOpts,
) -> Result<RunSummary, MigrateError> {
    let start = Instant::now();
    validate_opts(opts)?;

    info!("Checking remote directory: {}", source_dir.display());
    let classified = classify_source(source_dir, opts)?;

    let mut summary = RunSummary::new(label, source_dir, dest_dir);
    summary.source_location = detect_source_location(source_dir);
    summary.total = classified.total();
    summary.ignored = classified.ignored;
    summary.empty = classified.empty;
    summary.dry_run = opts.dry_run;
    if summary.source_location.is_network() {
        info!("Source location: {}", summary.source_location);
    } else {
        debug!("Source location: {}", summary.source_location);
    }

    if classified.is_empty() {
        warn!("No valid files in {}", source_dir.display());
        summary.elapsed_ms = start.elapsed().as_millis();
        return Ok(summary);
    }

    info!(
        "Found: {} pass-through + {} to convert = {}",
        classified.pass_through.len(),
        classified.convertible.len(),
        summary.total
    );

    if opts.dry_run {
        info!(
            "Plan: copy {} files to {}; convert {} files in {} blocks of up to {} via {}",
            classified.pass_through.len(),
            dest_dir.display(),
            classified.convertible.len(),
            block_count(classified.convertible.len(), opts.block_size),
            opts.block_size,
            opts.temp_dir().display()
        );
        summary.elapsed_ms = start.elapsed().as_millis();
        return Ok(summary);
    }

    let ctx = PipelineContext::new(
        opts,
        dest_dir.to_path_buf(),
        summary.total,
        !classified.convertible.is_empty(),
    )?;
    ensure_dir(dest_dir)?;

    let result = ctx
        .run_pass_through(&classified.pass_through, &mut summary)
        .and_then(|()| ctx.run_convertible(&classified.convertible, &mut summary));
    ctx.reporter.finish();
    result?;

    summary.completed = ctx.reporter.counter().snapshot().0;
    summary.elapsed_ms = start.elapsed().as_millis();
    info!(
        "Finished. Total: {}/{} ({} succeeded, {} failed)",
        summary.completed,
        summary.total,
        summary.succeeded(),
        summary.failed()
    );
    Ok(summary)
}
