//! Metasift CLI: keep the products that carry a given metafield.

use anyhow::Result;
use clap::Parser;
use metasift::engine::{Cli, handle_run};
use std::time::Instant;

fn main() -> Result<()> {
    let start_time = Instant::now();
    let cli = Cli::parse();
    handle_run(&cli)?;
    log::debug!("Total time: {:?}", start_time.elapsed());
    Ok(())
}
