//! Engine: CLI surface, worker pools, encoder invocation, progress and path helpers.

pub mod arg_parser;
pub mod cli;
pub mod encoder;
pub mod pool;
pub mod progress;
pub mod tools;

// Re-export commonly used items
pub use arg_parser::Cli;
pub use cli::{build_opts, handle_run};
pub use encoder::{build_args, encode, resolve_encoder};
pub use pool::{CpuPool, IoPool, WorkerPool};
pub use progress::{ProgressCounter, ProgressReporter, percent, should_report};
pub use tools::{
    extension_in, extension_lower, is_os_hidden_file, output_path_for, partial_copy_path,
    partial_output_path, physical_cpu_workers, validate_label,
};
