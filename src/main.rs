//! Transmirror CLI: mirror one remote batch directory, converting legacy audio on the way.

use anyhow::Result;
use clap::Parser;
use std::time::Instant;
use transmirror::engine::{Cli, handle_run};

fn main() -> Result<()> {
    let start_time = Instant::now();
    let cli = Cli::parse();
    handle_run(&cli)?;
    log::debug!("Total time: {:?}", start_time.elapsed());
    Ok(())
}
