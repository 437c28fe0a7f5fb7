//! Domain and wire types shared across the workspace.
//!
//! The wire shapes mirror the upstream service exactly: level snapshots keyed
//! by vessel id, a vessel catalog, and a transport-ticket ledger. Snapshots
//! are flattened into per-vessel `Reading` triples before analysis.

use crate::error::ReconError;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// Accepts both RFC 3339 timestamps and naive `YYYY-MM-DDTHH:MM:SS` strings
/// (the upstream service omits the offset); naive values are taken as UTC.
pub(crate) fn deserialize_timestamp<'de, D>(d: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(d)?;
    if let Ok(dt) = DateTime::parse_from_rfc3339(&s) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(&s, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(&s, "%Y-%m-%d %H:%M:%S"))
        .map(|naive| naive.and_utc())
        .map_err(serde::de::Error::custom)
}

/// One upstream sample: every vessel's level at a single instant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelSnapshot {
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub timestamp: DateTime<Utc>,
    pub vessel_levels: HashMap<String, f64>,
}

/// A single level observation for one vessel. Source of truth; immutable
/// once fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub timestamp: DateTime<Utc>,
    pub vessel_id: String,
    pub level: f64,
}

/// Catalog entry for a vessel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vessel {
    pub id: String,
    pub max_volume: f64,
}

/// A validated transport ticket: ground truth for collected volume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub ticket_id: String,
    pub vessel_id: String,
    pub date: NaiveDate,
    pub amount_collected: f64,
}

/// Ledger envelope as served upstream.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TicketLedger {
    pub transport_tickets: Vec<RawTicket>,
}

/// An unvalidated ticket as it arrives on the wire. Every field is optional
/// so one malformed entry cannot fail the whole ledger fetch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawTicket {
    #[serde(default)]
    pub ticket_id: Option<String>,
    #[serde(default)]
    pub vessel_id: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub amount_collected: Option<f64>,
}

impl RawTicket {
    /// Validates the raw entry into a `Ticket`.
    ///
    /// # Errors
    ///
    /// Returns `ReconError::MalformedTicket` if any required field is
    /// missing, the date is not `YYYY-MM-DD`, or the amount is not finite.
    pub fn validate(self) -> Result<Ticket, ReconError> {
        let id_for_error = self
            .ticket_id
            .clone()
            .unwrap_or_else(|| "<unknown>".to_string());
        let malformed = |reason: &str| ReconError::MalformedTicket {
            ticket_id: id_for_error.clone(),
            reason: reason.to_string(),
        };

        let ticket_id = self
            .ticket_id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| malformed("missing ticket_id"))?;
        let vessel_id = self
            .vessel_id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| malformed("missing vessel_id"))?;
        let date = self
            .date
            .as_deref()
            .ok_or_else(|| malformed("missing date"))
            .and_then(|s| {
                NaiveDate::parse_from_str(s, "%Y-%m-%d")
                    .map_err(|_| malformed("unparseable date"))
            })?;
        let amount_collected = self
            .amount_collected
            .filter(|v| v.is_finite())
            .ok_or_else(|| malformed("missing or non-finite amount_collected"))?;

        Ok(Ticket {
            ticket_id,
            vessel_id,
            date,
            amount_collected,
        })
    }
}

/// Flattens upstream snapshots into `(timestamp, vessel_id, level)` triples,
/// ordered by timestamp then vessel id so downstream grouping is
/// deterministic.
#[must_use]
pub fn flatten_snapshots(snapshots: &[LevelSnapshot]) -> Vec<Reading> {
    let mut readings: Vec<Reading> = snapshots
        .iter()
        .flat_map(|snapshot| {
            snapshot
                .vessel_levels
                .iter()
                .map(move |(vessel_id, level)| Reading {
                    timestamp: snapshot.timestamp,
                    vessel_id: vessel_id.clone(),
                    level: *level,
                })
        })
        .collect();

    readings.sort_by(|a, b| {
        a.timestamp
            .cmp(&b.timestamp)
            .then_with(|| a.vessel_id.cmp(&b.vessel_id))
    });
    readings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_accepts_naive_timestamps() {
        let json = r#"{"timestamp": "2025-11-01T04:30:00", "vessel_levels": {"vessel_001": 412.5}}"#;
        let snapshot: LevelSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.timestamp.to_rfc3339(), "2025-11-01T04:30:00+00:00");
        assert_eq!(snapshot.vessel_levels["vessel_001"], 412.5);
    }

    #[test]
    fn snapshot_accepts_rfc3339_timestamps() {
        let json = r#"{"timestamp": "2025-11-01T04:30:00Z", "vessel_levels": {}}"#;
        let snapshot: LevelSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.timestamp.to_rfc3339(), "2025-11-01T04:30:00+00:00");
    }

    #[test]
    fn flatten_orders_by_timestamp_then_vessel() {
        let later = LevelSnapshot {
            timestamp: "2025-11-01T01:00:00Z".parse().unwrap(),
            vessel_levels: HashMap::from([("b".to_string(), 2.0), ("a".to_string(), 1.0)]),
        };
        let earlier = LevelSnapshot {
            timestamp: "2025-11-01T00:00:00Z".parse().unwrap(),
            vessel_levels: HashMap::from([("a".to_string(), 0.5)]),
        };

        let readings = flatten_snapshots(&[later, earlier]);
        assert_eq!(readings.len(), 3);
        assert_eq!(readings[0].level, 0.5);
        assert_eq!(readings[1].vessel_id, "a");
        assert_eq!(readings[2].vessel_id, "b");
    }

    #[test]
    fn raw_ticket_validation_accepts_complete_entries() {
        let raw = RawTicket {
            ticket_id: Some("T-100".to_string()),
            vessel_id: Some("vessel_003".to_string()),
            date: Some("2025-11-01".to_string()),
            amount_collected: Some(52.25),
        };
        let ticket = raw.validate().unwrap();
        assert_eq!(ticket.ticket_id, "T-100");
        assert_eq!(ticket.date, NaiveDate::from_ymd_opt(2025, 11, 1).unwrap());
    }

    #[test]
    fn raw_ticket_validation_rejects_missing_fields() {
        let raw = RawTicket {
            ticket_id: Some("T-101".to_string()),
            vessel_id: None,
            date: Some("2025-11-01".to_string()),
            amount_collected: Some(10.0),
        };
        let err = raw.validate().unwrap_err();
        assert!(matches!(err, ReconError::MalformedTicket { .. }));
    }

    #[test]
    fn raw_ticket_validation_rejects_bad_dates() {
        let raw = RawTicket {
            ticket_id: Some("T-102".to_string()),
            vessel_id: Some("vessel_001".to_string()),
            date: Some("01/11/2025".to_string()),
            amount_collected: Some(10.0),
        };
        assert!(raw.validate().is_err());
    }
}
