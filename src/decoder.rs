//! Sequential decoder for MPS7 transaction logs.
//!
//! The log is a 9-byte header followed by `record_count` records. Every
//! record starts with a 13-byte prefix (tag, timestamp, user id); debit and
//! credit records append an 8-byte amount. All values are big-endian.
//!
//! Records with an unknown tag are yielded as [`Record::Unrecognized`] after
//! consuming only the prefix. If such a record was written with an amount the
//! cursor falls out of step with the data; nothing in the format allows this
//! to be detected.

use crate::{
    record::{AmountRecord, Header, Record, RecordData, RecordKind},
    Amount,
};
use byteorder::{BigEndian, ReadBytesExt};
use std::io::{self, Read};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("unsupported format: expected magic \"MPS7\", found {}", String::from_utf8_lossy(.magic))]
    UnsupportedFormat { magic: [u8; 4] },

    #[error("malformed header: input ended before {} bytes", Header::SIZE)]
    MalformedHeader(#[source] io::Error),

    #[error("truncated record {index}: input ended while reading {field}")]
    TruncatedRecord {
        index: u32,
        field: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("error reading log")]
    Io(#[from] io::Error),
}

pub struct LogDecoder<R> {
    reader: R,
    bytes_read: u64,
}

impl<R: Read> LogDecoder<R> {
    pub fn new(reader: R) -> Self {
        LogDecoder {
            reader,
            bytes_read: 0,
        }
    }

    /// Bytes consumed from the underlying reader so far.
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    /// Reads the 9-byte header and checks its magic.
    ///
    /// The whole header is consumed before the magic is checked, so a short
    /// input is reported as [`DecodeError::MalformedHeader`] even when the
    /// magic is also wrong.
    pub fn decode_header(&mut self) -> Result<Header, DecodeError> {
        let header = self
            .read_header()
            .map_err(|error| eof_or_io(error, DecodeError::MalformedHeader))?;
        if !header.has_valid_magic() {
            return Err(DecodeError::UnsupportedFormat {
                magic: header.magic,
            });
        }
        log::info!(
            "MPS7 log version {} with {} records",
            header.version,
            header.record_count
        );
        Ok(header)
    }

    /// Lazily decodes exactly `header.record_count` records.
    ///
    /// The iterator stops after the first error.
    pub fn decode_records(&mut self, header: &Header) -> Records<'_, R> {
        Records {
            decoder: self,
            index: 0,
            record_count: header.record_count,
            failed: false,
        }
    }

    fn read_header(&mut self) -> io::Result<Header> {
        let mut magic = [0u8; 4];
        self.reader.read_exact(&mut magic)?;
        self.bytes_read += magic.len() as u64;
        let version = self.read_u8()?;
        let record_count = self.read_u32()?;
        Ok(Header {
            magic,
            version,
            record_count,
        })
    }

    fn read_record(&mut self, index: u32) -> Result<Record, DecodeError> {
        let truncated = |field| {
            move |error| {
                eof_or_io(error, |source| DecodeError::TruncatedRecord {
                    index,
                    field,
                    source,
                })
            }
        };
        let offset = self.bytes_read;
        let tag = self.read_u8().map_err(truncated("tag"))?;
        let timestamp = self.read_u32().map_err(truncated("timestamp"))?;
        let user_id = self.read_u64().map_err(truncated("user_id"))?;
        let data = RecordData { timestamp, user_id };

        let kind = RecordKind::from_tag(tag);
        let record = if kind.has_amount() {
            let amount = Amount::new(self.read_f64().map_err(truncated("amount"))?);
            let record = AmountRecord { data, amount };
            match kind {
                RecordKind::Debit => Record::Debit(record),
                _ => Record::Credit(record),
            }
        } else {
            match kind {
                RecordKind::AutopayStarted => Record::AutopayStarted(data),
                RecordKind::AutopayEnded => Record::AutopayEnded(data),
                _ => {
                    log::debug!(
                        "skipping record {} at offset {}: {}",
                        index,
                        offset,
                        kind
                    );
                    Record::Unrecognized { tag, data }
                }
            }
        };
        log::trace!(
            "record {}: {} for user {} at {}",
            index,
            kind,
            record.data().user_id,
            record
                .data()
                .time()
                .map(|time| time.to_rfc3339())
                .unwrap_or_else(|| record.data().timestamp.to_string())
        );
        Ok(record)
    }

    fn read_u8(&mut self) -> io::Result<u8> {
        let value = self.reader.read_u8()?;
        self.bytes_read += 1;
        Ok(value)
    }

    fn read_u32(&mut self) -> io::Result<u32> {
        let value = self.reader.read_u32::<BigEndian>()?;
        self.bytes_read += 4;
        Ok(value)
    }

    fn read_u64(&mut self) -> io::Result<u64> {
        let value = self.reader.read_u64::<BigEndian>()?;
        self.bytes_read += 8;
        Ok(value)
    }

    fn read_f64(&mut self) -> io::Result<f64> {
        let value = self.reader.read_f64::<BigEndian>()?;
        self.bytes_read += 8;
        Ok(value)
    }
}

fn eof_or_io<F>(error: io::Error, on_eof: F) -> DecodeError
where
    F: FnOnce(io::Error) -> DecodeError,
{
    if error.kind() == io::ErrorKind::UnexpectedEof {
        on_eof(error)
    } else {
        DecodeError::Io(error)
    }
}

/// Iterator returned by [`LogDecoder::decode_records`].
pub struct Records<'a, R> {
    decoder: &'a mut LogDecoder<R>,
    index: u32,
    record_count: u32,
    failed: bool,
}

impl<'a, R: Read> Iterator for Records<'a, R> {
    type Item = Result<Record, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.index >= self.record_count {
            return None;
        }
        let result = self.decoder.read_record(self.index);
        self.index += 1;
        if result.is_err() {
            self.failed = true;
        }
        Some(result)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.failed {
            (0, Some(0))
        } else {
            (0, Some((self.record_count - self.index) as usize))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{AUTOPAY_ENDED_TAG, AUTOPAY_STARTED_TAG, CREDIT_TAG, DEBIT_TAG};
    use byteorder::WriteBytesExt;

    fn header(magic: &[u8; 4], record_count: u32) -> Vec<u8> {
        let mut bytes = magic.to_vec();
        bytes.push(1);
        bytes.write_u32::<BigEndian>(record_count).unwrap();
        bytes
    }

    fn push_record(bytes: &mut Vec<u8>, tag: u8, user_id: u64, amount: Option<f64>) {
        bytes.push(tag);
        bytes.write_u32::<BigEndian>(1_393_108_945).unwrap();
        bytes.write_u64::<BigEndian>(user_id).unwrap();
        if let Some(amount) = amount {
            bytes.write_f64::<BigEndian>(amount).unwrap();
        }
    }

    #[test]
    fn decodes_header() {
        let bytes = header(b"MPS7", 71);
        let mut decoder = LogDecoder::new(bytes.as_slice());
        let header = decoder.decode_header().expect("valid header");
        assert_eq!(1, header.version);
        assert_eq!(71, header.record_count);
        assert_eq!(Header::SIZE as u64, decoder.bytes_read());
    }

    #[test]
    fn rejects_bad_magic() {
        let bytes = header(b"MPS6", 3);
        let mut decoder = LogDecoder::new(bytes.as_slice());
        let error = decoder.decode_header().unwrap_err();
        assert!(
            matches!(error, DecodeError::UnsupportedFormat { magic } if &magic == b"MPS6"),
            "unexpected error {:?}",
            error
        );
    }

    #[test]
    fn short_header_is_malformed() {
        let bytes = b"MPS7\x01\x00".to_vec();
        let mut decoder = LogDecoder::new(bytes.as_slice());
        let error = decoder.decode_header().unwrap_err();
        assert!(matches!(error, DecodeError::MalformedHeader(_)), "{:?}", error);
    }

    #[test]
    fn short_header_with_bad_magic_is_malformed() {
        let bytes = b"XY".to_vec();
        let mut decoder = LogDecoder::new(bytes.as_slice());
        let error = decoder.decode_header().unwrap_err();
        assert!(matches!(error, DecodeError::MalformedHeader(_)), "{:?}", error);
    }

    #[test]
    fn decodes_every_variant() {
        let mut bytes = header(b"MPS7", 4);
        push_record(&mut bytes, DEBIT_TAG, 1, Some(10.5));
        push_record(&mut bytes, CREDIT_TAG, 2, Some(3.25));
        push_record(&mut bytes, AUTOPAY_STARTED_TAG, 3, None);
        push_record(&mut bytes, AUTOPAY_ENDED_TAG, 4, None);
        let mut decoder = LogDecoder::new(bytes.as_slice());
        let header = decoder.decode_header().unwrap();
        let records = decoder
            .decode_records(&header)
            .collect::<Result<Vec<_>, _>>()
            .expect("decoding records");
        let kinds = records.iter().map(Record::kind).collect::<Vec<_>>();
        assert_eq!(
            vec![
                RecordKind::Debit,
                RecordKind::Credit,
                RecordKind::AutopayStarted,
                RecordKind::AutopayEnded
            ],
            kinds
        );
        assert_eq!(Some(Amount::new(10.5)), records[0].amount());
        assert_eq!(Some(Amount::new(3.25)), records[1].amount());
        assert_eq!(4, records[3].data().user_id);
        assert_eq!(1_393_108_945, records[2].data().timestamp);
        assert_eq!(bytes.len() as u64, decoder.bytes_read());
    }

    #[test]
    fn unrecognized_tag_consumes_prefix_only() {
        let mut bytes = header(b"MPS7", 2);
        push_record(&mut bytes, 0x05, 9, None);
        push_record(&mut bytes, CREDIT_TAG, 9, Some(1.0));
        let mut decoder = LogDecoder::new(bytes.as_slice());
        let header = decoder.decode_header().unwrap();
        let mut records = decoder.decode_records(&header);
        let first = records.next().unwrap().unwrap();
        assert_eq!(RecordKind::Unrecognized(5), first.kind());
        assert_eq!(None, first.amount());
        drop(records);
        assert_eq!(Header::SIZE as u64 + 13, decoder.bytes_read());
        let mut records = decoder.decode_records(&header);
        let second = records.next().unwrap().unwrap();
        assert_eq!(Some(Amount::new(1.0)), second.amount());
    }

    #[test]
    fn stops_at_record_count() {
        let mut bytes = header(b"MPS7", 1);
        push_record(&mut bytes, AUTOPAY_STARTED_TAG, 1, None);
        push_record(&mut bytes, AUTOPAY_STARTED_TAG, 1, None);
        let mut decoder = LogDecoder::new(bytes.as_slice());
        let header = decoder.decode_header().unwrap();
        assert_eq!(1, decoder.decode_records(&header).count());
        assert_eq!(Header::SIZE as u64 + 13, decoder.bytes_read());
    }

    #[test]
    fn truncated_amount() {
        let mut bytes = header(b"MPS7", 2);
        push_record(&mut bytes, AUTOPAY_STARTED_TAG, 1, None);
        push_record(&mut bytes, DEBIT_TAG, 1, None);
        bytes.extend_from_slice(&[0x40, 0x59]);
        let mut decoder = LogDecoder::new(bytes.as_slice());
        let header = decoder.decode_header().unwrap();
        let results = decoder.decode_records(&header).collect::<Vec<_>>();
        assert_eq!(2, results.len());
        assert!(results[0].is_ok());
        assert!(
            matches!(
                results[1],
                Err(DecodeError::TruncatedRecord {
                    index: 1,
                    field: "amount",
                    ..
                })
            ),
            "{:?}",
            results[1]
        );
    }

    #[test]
    fn missing_records_are_truncated() {
        let bytes = header(b"MPS7", 3);
        let mut decoder = LogDecoder::new(bytes.as_slice());
        let header = decoder.decode_header().unwrap();
        let results = decoder.decode_records(&header).collect::<Vec<_>>();
        assert_eq!(1, results.len(), "iteration stops after the first error");
        assert!(matches!(
            results[0],
            Err(DecodeError::TruncatedRecord {
                index: 0,
                field: "tag",
                ..
            })
        ));
    }
}
