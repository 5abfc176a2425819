#![forbid(unsafe_code)]

use std::io;

use anyhow::Result;
use clap::Parser;
use mps7_ledger::{output_report, process_log_file, Config};

fn main() -> Result<()> {
    env_logger::init();
    let config = Config::parse();
    log::info!("mps7-ledger v{}", env!("CARGO_PKG_VERSION"));
    let report = process_log_file(&config.input, config.target_user_id)?;
    let mut output_file = io::stdout();
    output_report(&mut output_file, &report, config.format)?;
    Ok(())
}
