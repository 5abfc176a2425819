#![forbid(unsafe_code)]

mod aggregate;
mod amount;
pub mod config;
mod decoder;
pub mod output;
pub mod record;

pub use aggregate::{Aggregate, Report, DEFAULT_TARGET_USER_ID};
pub use amount::Amount;
use anyhow::{Context, Result};
pub use config::Config;
pub use decoder::{DecodeError, LogDecoder, Records};
pub use output::OutputFormat;
pub use record::{Header, Record, RecordKind};
use std::{
    fs::File,
    io::{BufReader, Read, Write},
    path::Path,
};

pub fn output_report(
    output: &mut impl Write,
    report: &Report,
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Text => output::write_text(output, report),
        OutputFormat::Csv => output::write_csv(output, report),
    }
}

/// Decodes a whole log and folds every record into a report for `target_user_id`.
///
/// A log with the wrong magic yields an all-zero report. Any other decoding
/// failure is returned without a partial result.
pub fn process_log(input: &mut impl Read, target_user_id: u64) -> Result<Report> {
    let mut decoder = LogDecoder::new(input);
    let mut aggregate = Aggregate::new(target_user_id);
    let header = match decoder.decode_header() {
        Ok(header) => header,
        Err(error @ DecodeError::UnsupportedFormat { .. }) => {
            log::warn!("{}. Nothing to report.", error);
            return Ok(aggregate.report());
        }
        Err(error) => return Err(error.into()),
    };
    for record in decoder.decode_records(&header) {
        aggregate.fold(&record?);
    }
    Ok(aggregate.report())
}

pub fn process_log_file(path: impl AsRef<Path>, target_user_id: u64) -> Result<Report> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut reader = BufReader::new(file);
    process_log(&mut reader, target_user_id)
        .with_context(|| format!("processing {}", path.display()))
}
