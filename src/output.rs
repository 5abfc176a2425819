use crate::Report;
use anyhow::Result;
use clap::ValueEnum;
use serde::Serialize;
use std::io::Write;

#[derive(ValueEnum, Debug, Copy, Clone, PartialEq, Eq)]
pub enum OutputFormat {
    /// One `name=value` line per figure
    Text,
    /// A header row and a data row
    Csv,
}

impl Default for OutputFormat {
    fn default() -> Self {
        OutputFormat::Text
    }
}

/// Data row of the CSV report. The header is written separately because the
/// balance column is named after the target user.
#[derive(Serialize)]
pub struct ReportRecord {
    pub total_credit_amount: String,
    pub total_debit_amount: String,
    pub autopays_started: u64,
    pub autopays_ended: u64,
    pub balance: String,
}

impl From<&Report> for ReportRecord {
    fn from(report: &Report) -> Self {
        Self {
            total_credit_amount: report.total_credit_amount.to_string(),
            total_debit_amount: report.total_debit_amount.to_string(),
            autopays_started: report.autopays_started,
            autopays_ended: report.autopays_ended,
            balance: report.target_user_balance.unrounded(),
        }
    }
}

pub fn write_text(output: &mut impl Write, report: &Report) -> Result<()> {
    writeln!(output, "total credit amount={}", report.total_credit_amount)?;
    writeln!(output, "total debit amount={}", report.total_debit_amount)?;
    writeln!(output, "autopays started={}", report.autopays_started)?;
    writeln!(output, "autopays ended={}", report.autopays_ended)?;
    writeln!(
        output,
        "balance for user {}={}",
        report.target_user_id,
        report.target_user_balance.unrounded()
    )?;
    Ok(())
}

pub fn write_csv(output: &mut impl Write, report: &Report) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(output);
    let balance_column = format!("balance_for_user_{}", report.target_user_id);
    writer.write_record(&[
        "total_credit_amount",
        "total_debit_amount",
        "autopays_started",
        "autopays_ended",
        balance_column.as_str(),
    ])?;
    writer.serialize(ReportRecord::from(report))?;
    writer.flush()?;
    Ok(())
}
