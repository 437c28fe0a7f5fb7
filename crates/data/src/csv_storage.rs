//! CSV persistence for flattened readings.
//!
//! Format: `timestamp,vessel_id,level` with RFC 3339 timestamps, rows
//! sorted chronologically. A written snapshot round-trips through
//! `read_readings` unchanged.

use anyhow::{Context, Result};
use chrono::DateTime;
use csv::Writer;
use std::fs::File;
use tank_recon_core::Reading;

pub struct CsvStorage;

impl CsvStorage {
    /// Writes readings to a CSV file, sorted by timestamp then vessel id.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or writing fails.
    pub fn write_readings(path: &str, readings: &[Reading]) -> Result<()> {
        let file =
            File::create(path).with_context(|| format!("Failed to create CSV file: {path}"))?;
        let mut writer = Writer::from_writer(file);

        writer.write_record(["timestamp", "vessel_id", "level"])?;

        let mut sorted = readings.to_vec();
        sorted.sort_by(|a, b| {
            a.timestamp
                .cmp(&b.timestamp)
                .then_with(|| a.vessel_id.cmp(&b.vessel_id))
        });

        for reading in sorted {
            writer.write_record(&[
                reading.timestamp.to_rfc3339(),
                reading.vessel_id.clone(),
                reading.level.to_string(),
            ])?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Reads a snapshot written by [`CsvStorage::write_readings`].
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or a row fails to
    /// parse.
    pub fn read_readings(path: &str) -> Result<Vec<Reading>> {
        let mut reader =
            csv::Reader::from_path(path).with_context(|| format!("Failed to open {path}"))?;
        let mut readings = Vec::new();

        for result in reader.records() {
            let record = result?;
            let timestamp = DateTime::parse_from_rfc3339(&record[0])
                .with_context(|| format!("bad timestamp: {}", &record[0]))?
                .to_utc();
            let vessel_id = record[1].to_string();
            let level: f64 = record[2]
                .parse()
                .with_context(|| format!("bad level: {}", &record[2]))?;

            readings.push(Reading {
                timestamp,
                vessel_id,
                level,
            });
        }

        Ok(readings)
    }
}
