//! Snapshot log: a header record followed by one record per tick.
//!
//! Two encodings are supported. JSON Lines writes one JSON object per line.
//! The bincode encoding writes each record as a little-endian `u32` byte
//! length followed by that many bytes of bincode.

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use eco_core::{Result, SimulationConfig};
use eco_world::{SnapshotSink, WorldSnapshot};
use serde::{Deserialize, Serialize};
use std::io::Write;

pub const LOG_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    #[default]
    Json,
    Bincode,
}

/// First record of every snapshot log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogHeader {
    pub version: u32,
    pub started_at: DateTime<Utc>,
    pub seed: u64,
    pub width: i32,
    pub height: i32,
}

impl LogHeader {
    pub fn new(config: &SimulationConfig) -> Self {
        Self {
            version: LOG_FORMAT_VERSION,
            started_at: Utc::now(),
            seed: config.seed,
            width: config.world.width,
            height: config.world.height,
        }
    }
}

pub struct SnapshotLog<W: Write> {
    writer: W,
    format: LogFormat,
    records: u64,
}

impl<W: Write> SnapshotLog<W> {
    /// Start a log on `writer`, writing the header immediately
    pub fn create(writer: W, format: LogFormat, header: &LogHeader) -> Result<Self> {
        let mut log = Self {
            writer,
            format,
            records: 0,
        };
        log.write_record(header)?;
        Ok(log)
    }

    /// Snapshots written so far, not counting the header
    pub fn records(&self) -> u64 {
        self.records
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_record<T: Serialize>(&mut self, record: &T) -> Result<()> {
        match self.format {
            LogFormat::Json => {
                serde_json::to_writer(&mut self.writer, record)?;
                self.writer.write_all(b"\n")?;
            }
            LogFormat::Bincode => {
                let bytes = bincode::serialize(record)?;
                let len = u32::try_from(bytes.len()).map_err(|_| {
                    eco_core::Error::Serialization(format!(
                        "record of {} bytes exceeds frame limit",
                        bytes.len()
                    ))
                })?;
                self.writer.write_all(&len.to_le_bytes())?;
                self.writer.write_all(&bytes)?;
            }
        }
        Ok(())
    }
}

impl<W: Write> SnapshotSink for SnapshotLog<W> {
    fn record(&mut self, snapshot: &WorldSnapshot) -> Result<()> {
        self.write_record(snapshot)?;
        self.records += 1;
        Ok(())
    }
}
