use colored::{Color, Colorize};
use env_logger::Builder;
use log::Level;
use std::io::Write;

use crate::utils::config::PackagePaths;

/// Colours for the run summary.
pub struct Colors;

impl Colors {
    pub const OK: Color = Color::Green;
    pub const FAILED: Color = Color::Red;
    pub const SKIPPED: Color = Color::Yellow;

    pub fn colorize(color: Color, text: &str) -> String {
        text.color(color).to_string()
    }
}

pub fn setup_logging(verbose: bool) {
    use log::LevelFilter;

    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    // try_init: integration tests and library callers may have installed a logger already.
    let _ = Builder::from_default_env()
        .filter_level(LevelFilter::Warn) // Default: only warnings from dependencies
        .filter_module(env!("CARGO_PKG_NAME"), level) // Our crate: use requested level
        .format(|buf, record| {
            let name = PackagePaths::get().pkg_name();
            let line = match record.level() {
                Level::Error | Level::Warn => {
                    let level_str = match record.level() {
                        Level::Warn => "WARN".yellow(),
                        Level::Error => "ERROR".red(),
                        _ => unreachable!(),
                    };
                    let path = record.target().to_string().white();
                    format!("[{} {} {}] {}", name.cyan(), level_str, path, record.args())
                }
                Level::Debug | Level::Trace => {
                    format!("[{} {}] {}", name.cyan(), "DEBUG".dimmed(), record.args())
                }
                _ => format!("[{}] {}", name.cyan(), record.args()),
            };
            writeln!(buf, "{}", line)
        })
        .try_init();
}
