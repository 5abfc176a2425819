use crate::{output::OutputFormat, DEFAULT_TARGET_USER_ID};
use clap::Parser;
use std::path::PathBuf;

/// Totals and a per-user balance from an MPS7 transaction log
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "mps7-ledger")]
#[command(version)]
pub struct Config {
    /// Path to the MPS7 log file
    #[arg(value_name = "FILE")]
    pub input: PathBuf,

    /// User whose credit minus debit balance is reported
    #[arg(long = "user", value_name = "ID", default_value_t = DEFAULT_TARGET_USER_ID)]
    pub target_user_id: u64,

    /// Report layout
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}
