//! Reconciliation outcome records and the aggregated run report.
//!
//! The report is the run's only output: two-level maps keyed by date string
//! then vessel id. `BTreeMap` keeps serialization deterministic so no
//! consumer can come to depend on insertion order.

use crate::extract::DrainEvent;
use crate::reconcile::ReconcileOutcome;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Timestamps on the wire are `YYYY-MM-DD HH:MM:SS`, matching the ledger's
/// date convention rather than RFC 3339.
pub(crate) mod wire_time {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{self, Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn serialize<S: Serializer>(dt: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&dt.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let s = String::deserialize(d)?;
        NaiveDateTime::parse_from_str(&s, FORMAT)
            .map(|naive| naive.and_utc())
            .map_err(serde::de::Error::custom)
    }
}

/// How a drain event was explained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchKind {
    /// One drain event against a single ticket.
    #[serde(rename = "1-to-1")]
    OneToOne,
    /// One drain event against the summed volume of several tickets.
    #[serde(rename = "Many-to-One")]
    ManyToOne,
}

impl MatchKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OneToOne => "1-to-1",
            Self::ManyToOne => "Many-to-One",
        }
    }
}

/// A reconciled drain event and the ticket(s) that explain it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchRecord {
    #[serde(rename = "type")]
    pub kind: MatchKind,
    pub drain_volume: f64,
    #[serde(with = "wire_time")]
    pub drain_end_time: DateTime<Utc>,
    pub ticket_ids: Vec<String>,
    pub ticket_sum: f64,
    pub vessel_id: String,
    pub date: NaiveDate,
}

/// A drain event or ticket that could not be reconciled.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Anomaly {
    /// Liquid left the vessel with no ticket accounting for it.
    #[serde(rename = "DRAIN_ANOMALY")]
    Drain {
        volume: f64,
        #[serde(with = "wire_time")]
        time: DateTime<Utc>,
    },
    /// A ticket claims a collection the sensor never saw.
    #[serde(rename = "TICKET_ANOMALY")]
    Ticket { volume: f64, ticket_id: String },
}

impl Anomaly {
    fn from_event(event: &DrainEvent) -> Self {
        Self::Drain {
            volume: event.drain_volume,
            time: event.end,
        }
    }
}

/// Run parameters echoed into the report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMetadata {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub volume_tolerance: f64,
}

/// Aggregated output of a reconciliation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconciliationReport {
    pub anomalies: BTreeMap<String, BTreeMap<String, Vec<Anomaly>>>,
    pub matches: BTreeMap<String, BTreeMap<String, Vec<MatchRecord>>>,
    pub metadata: RunMetadata,
}

impl ReconciliationReport {
    #[must_use]
    pub fn new(start_date: NaiveDate, end_date: NaiveDate, volume_tolerance: f64) -> Self {
        Self {
            anomalies: BTreeMap::new(),
            matches: BTreeMap::new(),
            metadata: RunMetadata {
                start_date,
                end_date,
                volume_tolerance,
            },
        }
    }

    /// Folds one (date, vessel) outcome into the report. Leftover events and
    /// tickets become anomalies; empty lists are not recorded at all.
    pub fn record_pair(&mut self, date: NaiveDate, vessel_id: &str, outcome: ReconcileOutcome) {
        let date_key = date.format("%Y-%m-%d").to_string();

        let mut anomalies: Vec<Anomaly> = outcome
            .unmatched_events
            .iter()
            .map(Anomaly::from_event)
            .collect();
        anomalies.extend(outcome.unmatched_tickets.into_iter().map(|t| Anomaly::Ticket {
            volume: t.amount_collected,
            ticket_id: t.ticket_id,
        }));

        if !anomalies.is_empty() {
            self.anomalies
                .entry(date_key.clone())
                .or_default()
                .entry(vessel_id.to_string())
                .or_default()
                .extend(anomalies);
        }

        if !outcome.matches.is_empty() {
            self.matches
                .entry(date_key)
                .or_default()
                .entry(vessel_id.to_string())
                .or_default()
                .extend(outcome.matches);
        }
    }

    /// Total matches across all dates and vessels.
    #[must_use]
    pub fn match_count(&self) -> usize {
        self.matches
            .values()
            .flat_map(|vessels| vessels.values())
            .map(Vec::len)
            .sum()
    }

    /// Total anomalies across all dates and vessels.
    #[must_use]
    pub fn anomaly_count(&self) -> usize {
        self.anomalies
            .values()
            .flat_map(|vessels| vessels.values())
            .map(Vec::len)
            .sum()
    }

    /// Serializes the report for the output file.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn match_kind_wire_names() {
        assert_eq!(
            serde_json::to_string(&MatchKind::OneToOne).unwrap(),
            "\"1-to-1\""
        );
        assert_eq!(
            serde_json::to_string(&MatchKind::ManyToOne).unwrap(),
            "\"Many-to-One\""
        );
    }

    #[test]
    fn anomaly_wire_shape() {
        let drain = Anomaly::Drain {
            volume: 30.0,
            time: Utc.with_ymd_and_hms(2025, 11, 1, 14, 5, 0).unwrap(),
        };
        let json = serde_json::to_value(&drain).unwrap();
        assert_eq!(json["type"], "DRAIN_ANOMALY");
        assert_eq!(json["volume"], 30.0);
        assert_eq!(json["time"], "2025-11-01 14:05:00");

        let ticket = Anomaly::Ticket {
            volume: 20.0,
            ticket_id: "T-9".to_string(),
        };
        let json = serde_json::to_value(&ticket).unwrap();
        assert_eq!(json["type"], "TICKET_ANOMALY");
        assert_eq!(json["ticket_id"], "T-9");
    }

    #[test]
    fn match_record_wire_shape() {
        let record = MatchRecord {
            kind: MatchKind::OneToOne,
            drain_volume: 50.0,
            drain_end_time: Utc.with_ymd_and_hms(2025, 11, 1, 9, 30, 0).unwrap(),
            ticket_ids: vec!["T-1".to_string()],
            ticket_sum: 50.3,
            vessel_id: "vessel_002".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 11, 1).unwrap(),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["type"], "1-to-1");
        assert_eq!(json["drain_end_time"], "2025-11-01 09:30:00");
        assert_eq!(json["date"], "2025-11-01");
    }

    #[test]
    fn empty_outcomes_leave_no_entries() {
        let mut report = ReconciliationReport::new(
            NaiveDate::from_ymd_opt(2025, 11, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 11, 2).unwrap(),
            1.5,
        );
        report.record_pair(
            NaiveDate::from_ymd_opt(2025, 11, 1).unwrap(),
            "vessel_001",
            ReconcileOutcome::default(),
        );
        assert!(report.anomalies.is_empty());
        assert!(report.matches.is_empty());
        assert_eq!(report.match_count(), 0);
        assert_eq!(report.anomaly_count(), 0);
    }
}
