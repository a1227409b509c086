//! Flow record emission.
//!
//! The sink is a seam: the aggregator only sees [`FlowSink`], production
//! runs write CSV via [`CsvSink`], tests record rows in memory.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Local};
use thiserror::Error;

use flowtrace_core::flow::{FlowKey, FlowRecord};

/// Column layout of the emitted CSV, one row per flow update.
pub const HEADER: [&str; 9] = [
    "Source IP",
    "Destination IP",
    "Packet Count",
    "Protocol",
    "Bytes In",
    "Bytes Out",
    "Entropy (bits/byte)",
    "Total Entropy",
    "Start Time",
];

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("CSV output error: {0}")]
    Csv(#[from] csv::Error),

    #[error("output I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Cumulative state of one flow at the moment a packet was processed.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowRow {
    pub source: String,
    pub destination: String,
    pub packet_count: u64,
    pub protocol: String,
    pub bytes_in: u64,
    pub bytes_out: u64,
    pub last_entropy: f64,
    pub total_entropy: f64,
    pub start_time: DateTime<Local>,
}

impl FlowRow {
    /// Snapshots a flow's current state for emission.
    pub fn snapshot(key: &FlowKey, protocol: &str, record: &FlowRecord) -> Self {
        Self {
            source: key.source.clone(),
            destination: key.destination.clone(),
            packet_count: record.packet_count,
            protocol: protocol.to_string(),
            bytes_in: record.bytes_in,
            bytes_out: record.bytes_out,
            last_entropy: record.last_entropy,
            total_entropy: record.total_entropy,
            start_time: record.start_time,
        }
    }
}

/// Append-only structured record writer.
pub trait FlowSink {
    fn write(&mut self, row: &FlowRow) -> Result<(), SinkError>;
    fn flush(&mut self) -> Result<(), SinkError>;
}

/// CSV sink. Writes the header once at construction; entropy fields are
/// formatted to two decimals and the start time as `YYYY-MM-DD HH:MM:SS`.
pub struct CsvSink<W: Write> {
    writer: csv::Writer<W>,
}

impl CsvSink<File> {
    /// Creates (or truncates) the output file and writes the header.
    /// Failure here is fatal at startup.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self, SinkError> {
        Self::from_writer(File::create(path)?)
    }
}

impl<W: Write> CsvSink<W> {
    pub fn from_writer(writer: W) -> Result<Self, SinkError> {
        let mut writer = csv::Writer::from_writer(writer);
        writer.write_record(HEADER)?;
        Ok(Self { writer })
    }

    /// Consumes the sink, returning the underlying writer after a flush.
    pub fn into_inner(self) -> Result<W, SinkError> {
        self.writer.into_inner().map_err(|e| {
            SinkError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                e.error().to_string(),
            ))
        })
    }
}

impl<W: Write> FlowSink for CsvSink<W> {
    fn write(&mut self, row: &FlowRow) -> Result<(), SinkError> {
        self.writer.write_record([
            row.source.clone(),
            row.destination.clone(),
            row.packet_count.to_string(),
            row.protocol.clone(),
            row.bytes_in.to_string(),
            row.bytes_out.to_string(),
            format!("{:.2}", row.last_entropy),
            format!("{:.2}", row.total_entropy),
            row.start_time.format(TIMESTAMP_FORMAT).to_string(),
        ])?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_row() -> FlowRow {
        FlowRow {
            source: "10.0.0.1".into(),
            destination: "10.0.0.2".into(),
            packet_count: 2,
            protocol: "UDP".into(),
            bytes_in: 0,
            bytes_out: 284,
            last_entropy: 3.5,
            total_entropy: 0.0,
            start_time: Local.with_ymd_and_hms(2024, 3, 1, 12, 30, 45).unwrap(),
        }
    }

    #[test]
    fn test_header_written_once() {
        let mut sink = CsvSink::from_writer(Vec::new()).unwrap();
        sink.write(&sample_row()).unwrap();
        sink.write(&sample_row()).unwrap();
        sink.flush().unwrap();

        let output = String::from_utf8(sink.into_inner().unwrap()).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "Source IP,Destination IP,Packet Count,Protocol,Bytes In,Bytes Out,\
             Entropy (bits/byte),Total Entropy,Start Time"
        );
    }

    #[test]
    fn test_row_formatting() {
        let mut sink = CsvSink::from_writer(Vec::new()).unwrap();
        sink.write(&sample_row()).unwrap();
        sink.flush().unwrap();

        let output = String::from_utf8(sink.into_inner().unwrap()).unwrap();
        let row = output.lines().nth(1).unwrap();
        assert_eq!(
            row,
            "10.0.0.1,10.0.0.2,2,UDP,0,284,3.50,0.00,2024-03-01 12:30:45"
        );
    }
}
