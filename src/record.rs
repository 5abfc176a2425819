use crate::Amount;
use chrono::{DateTime, Utc};
use std::fmt;

pub const MAGIC: &[u8; 4] = b"MPS7";

pub const DEBIT_TAG: u8 = 0x00;
pub const CREDIT_TAG: u8 = 0x01;
pub const AUTOPAY_STARTED_TAG: u8 = 0x02;
pub const AUTOPAY_ENDED_TAG: u8 = 0x03;

#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    pub magic: [u8; 4],
    pub version: u8,
    pub record_count: u32,
}

impl Header {
    pub const SIZE: usize = 9;

    pub fn has_valid_magic(&self) -> bool {
        &self.magic == MAGIC
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Debit(AmountRecord),
    Credit(AmountRecord),
    AutopayStarted(RecordData),
    AutopayEnded(RecordData),
    /// Any tag outside the known set; only the common prefix was consumed.
    Unrecognized { tag: u8, data: RecordData },
}

/// Fields shared by every record: the 13-byte prefix minus the tag.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordData {
    pub timestamp: u32,
    pub user_id: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AmountRecord {
    pub data: RecordData,
    pub amount: Amount,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RecordKind {
    Debit,
    Credit,
    AutopayStarted,
    AutopayEnded,
    Unrecognized(u8),
}

impl RecordKind {
    pub fn from_tag(tag: u8) -> Self {
        match tag {
            DEBIT_TAG => RecordKind::Debit,
            CREDIT_TAG => RecordKind::Credit,
            AUTOPAY_STARTED_TAG => RecordKind::AutopayStarted,
            AUTOPAY_ENDED_TAG => RecordKind::AutopayEnded,
            other => RecordKind::Unrecognized(other),
        }
    }

    /// Debit and credit records carry a trailing 8-byte amount.
    pub fn has_amount(self) -> bool {
        matches!(self, RecordKind::Debit | RecordKind::Credit)
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Debit => f.write_str("debit"),
            RecordKind::Credit => f.write_str("credit"),
            RecordKind::AutopayStarted => f.write_str("autopay started"),
            RecordKind::AutopayEnded => f.write_str("autopay ended"),
            RecordKind::Unrecognized(tag) => write!(f, "unrecognized tag 0x{:02x}", tag),
        }
    }
}

impl RecordData {
    pub fn time(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(i64::from(self.timestamp), 0)
    }
}

impl Record {
    pub fn kind(&self) -> RecordKind {
        match self {
            Record::Debit(_) => RecordKind::Debit,
            Record::Credit(_) => RecordKind::Credit,
            Record::AutopayStarted(_) => RecordKind::AutopayStarted,
            Record::AutopayEnded(_) => RecordKind::AutopayEnded,
            Record::Unrecognized { tag, .. } => RecordKind::Unrecognized(*tag),
        }
    }

    pub fn data(&self) -> &RecordData {
        match self {
            Record::Debit(record) | Record::Credit(record) => &record.data,
            Record::AutopayStarted(data) | Record::AutopayEnded(data) => data,
            Record::Unrecognized { data, .. } => data,
        }
    }

    pub fn amount(&self) -> Option<Amount> {
        match self {
            Record::Debit(record) | Record::Credit(record) => Some(record.amount),
            _ => None,
        }
    }
}
