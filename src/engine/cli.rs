//! CLI command handler: resolve options (defaults < config file < flags), run, print the summary.

use anyhow::{Context, Result};
use colored::Colorize;
use log::{debug, info, warn};
use std::io::{BufRead, Write};
use std::path::Path;

use crate::engine::arg_parser::Cli;
use crate::utils::{
    Colors, ConfigFile, PackagePaths, apply_file_to_opts, load_config_file, setup_logging,
};
use crate::{MigrateOpts, RunSummary, migrate_batch};

/// Build opts from the config file and CLI flags. Roots must come from one of the two.
pub fn build_opts(cli: &Cli, file: Option<&ConfigFile>) -> Result<MigrateOpts> {
    let settings = file.map(|f| &f.settings);
    let source_root = cli
        .source_root
        .clone()
        .or_else(|| settings.and_then(|s| s.source_root.clone()))
        .context("no source root: pass --source-root or set settings.source_root")?;
    let dest_root = cli
        .dest_root
        .clone()
        .or_else(|| settings.and_then(|s| s.dest_root.clone()))
        .context("no destination root: pass --dest-root or set settings.dest_root")?;

    let mut opts = MigrateOpts::new(source_root, dest_root);
    if let Some(file) = file {
        apply_file_to_opts(file, &mut opts);
    }

    if let Some(ref p) = cli.temp_dir {
        opts.temp_dir = Some(p.clone());
    }
    if let Some(ref p) = cli.encoder {
        opts.encoder.bin = p.clone();
    }
    if let Some(ref c) = cli.codec {
        opts.encoder.codec = c.clone();
    }
    if let Some(ref b) = cli.bitrate {
        opts.encoder.bitrate = b.clone();
    }
    if let Some(n) = cli.io_workers {
        opts.io_workers = n;
    }
    if cli.cpu_workers.is_some() {
        opts.cpu_workers = cli.cpu_workers;
    }
    if let Some(n) = cli.block_size {
        opts.block_size = n;
    }
    if let Some(n) = cli.progress_interval {
        opts.progress_interval = n;
    }
    if let Some(b) = cli.progress_bar {
        opts.progress_bar = b;
    }
    opts.dry_run = cli.dry_run;
    Ok(opts)
}

/// Ask for the batch label on stdin.
fn prompt_label() -> Result<String> {
    let label = format!("[{}]", PackagePaths::get().pkg_name()).cyan().bold();
    eprint!("{} Batch to process (e.g. 01, 02, 03...): ", label);
    std::io::stderr().flush().ok();
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("read batch label")?;
    Ok(line.trim().to_string())
}

/// Run a batch end to end. Per-file failures are reported in the summary, not as an error.
pub fn handle_run(cli: &Cli) -> Result<()> {
    setup_logging(cli.verbose);
    let cwd = std::env::current_dir().context("current directory")?;
    let file = load_config_file(cli.config.as_deref(), &cwd);
    let opts = build_opts(cli, file.as_ref())?;
    debug!(
        "{} CONFIG:{:#?}",
        PackagePaths::get().pkg_name().to_uppercase(),
        opts
    );

    let label = match cli.label.clone() {
        Some(l) => l,
        None => prompt_label()?,
    };

    if opts.dry_run {
        warn!("RUNNING IN DRY-RUN MODE. NOTHING WILL BE COPIED OR CONVERTED.");
    }
    info!("=== START {} ===", label);
    let summary = migrate_batch(&label, &opts)
        .with_context(|| format!("batch {label} aborted"))?;
    print_summary(&summary, &opts.temp_dir());

    if cli.json {
        let json = serde_json::to_string_pretty(&summary).context("serialize summary")?;
        println!("{json}");
    }
    Ok(())
}

/// Final operator-facing summary.
fn print_summary(summary: &RunSummary, temp_dir: &Path) {
    let failed = summary.failed();
    let failed_str = format!("Failed: {}", failed);
    info!(
        "Done: {}/{} processed | {} | {} | {}",
        summary.completed,
        summary.total,
        Colors::colorize(Colors::OK, &format!("Succeeded: {}", summary.succeeded())),
        if failed > 0 {
            Colors::colorize(Colors::FAILED, &failed_str)
        } else {
            failed_str
        },
        Colors::colorize(
            Colors::SKIPPED,
            &format!("Skipped: {}", summary.ignored + summary.empty)
        ),
    );
    for f in summary.failures.iter() {
        warn!("  {:?} {}: {}", f.stage, f.path.display(), f.message);
    }
    if summary.reclaim_failures() > 0 {
        warn!(
            "{} staged files could not be removed; clean up {}",
            summary.reclaim_failures(),
            temp_dir.display()
        );
    }
    debug!("Elapsed: {} ms", summary.elapsed_ms);
}
