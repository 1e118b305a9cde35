use clap::Parser;
use std::path::PathBuf;

/// Mirror one remote batch directory locally, transcoding legacy formats to a single target format.
#[derive(Clone, Debug, Parser)]
#[command(name = "transmirror")]
#[command(about = "Copy a remote batch directory locally; convert legacy audio with ffmpeg.")]
pub struct Cli {
    /// Batch label (e.g. a day such as `07`). Resolves to SOURCE_ROOT/LABEL and DEST_ROOT/LABEL.
    /// Prompted for when omitted.
    #[arg(value_name = "LABEL")]
    pub label: Option<String>,

    /// Config file. Default: `transmirror.toml` in the working directory, if present.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Remote tree holding one directory per batch.
    #[arg(long, short = 's')]
    pub source_root: Option<PathBuf>,

    /// Local tree receiving one directory per batch.
    #[arg(long, short = 'd')]
    pub dest_root: Option<PathBuf>,

    /// Staging directory for files awaiting conversion. Default: DEST_ROOT/temp.
    #[arg(long)]
    pub temp_dir: Option<PathBuf>,

    /// Encoder binary (name on PATH or a path).
    #[arg(long)]
    pub encoder: Option<PathBuf>,

    /// Target audio codec passed to the encoder.
    #[arg(long)]
    pub codec: Option<String>,

    /// Target bitrate passed to the encoder (e.g. `64k`).
    #[arg(long)]
    pub bitrate: Option<String>,

    /// Concurrent remote copies.
    #[arg(long, value_parser = clap::value_parser!(usize))]
    pub io_workers: Option<usize>,

    /// Concurrent encoder processes. Default: physical core count.
    #[arg(long, value_parser = clap::value_parser!(usize))]
    pub cpu_workers: Option<usize>,

    /// Files per block; bounds how many staged files exist at once.
    #[arg(long, short = 'b', value_parser = clap::value_parser!(usize))]
    pub block_size: Option<usize>,

    /// Log progress every N files.
    #[arg(long, value_parser = clap::value_parser!(usize))]
    pub progress_interval: Option<usize>,

    /// Show a progress bar instead of progress lines.
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub progress_bar: Option<bool>,

    /// Classify and print the plan; copy and convert nothing.
    #[arg(long)]
    pub dry_run: bool,

    /// Print the run summary as JSON on stdout.
    #[arg(long)]
    pub json: bool,

    /// Verbose output.
    #[arg(long, short = 'v')]
    pub verbose: bool,
}
