pub mod config;
pub mod config_file;
pub mod fd_limit;
pub mod logger;

pub use config::*;
pub use config_file::{ConfigFile, apply_file_to_opts, load_config_file, parse_config};
pub use fd_limit::{cap_io_workers, max_copies_by_fd_limit, max_open_fds};
pub use logger::{Colors, setup_logging};
