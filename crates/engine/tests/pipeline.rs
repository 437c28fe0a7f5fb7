//! End-to-end pipeline scenarios: synthetic level series and ledgers run
//! through the full engine, checked against the report wire shape.

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use tank_recon_engine::report::Anomaly;
use tank_recon_engine::{AnalysisEngine, AnalysisInput, MatchKind, TicketIndex};
use tank_recon_core::{AnalysisConfig, Reading, Ticket, TrendConfig, Vessel};

const VESSEL: &str = "vessel_001";

fn engine() -> AnalysisEngine {
    let analysis = AnalysisConfig {
        epsilon: 2.0,
        ..AnalysisConfig::default()
    };
    let trend = TrendConfig {
        smooth_window: 5,
        slope_window: 3,
        min_persist_minutes: 8,
        slope_threshold: 1e-3,
    };
    AnalysisEngine::new(analysis, trend)
}

fn readings_from_levels(levels: &[f64]) -> Vec<Reading> {
    let base = Utc.with_ymd_and_hms(2025, 11, 1, 6, 0, 0).unwrap();
    levels
        .iter()
        .enumerate()
        .map(|(i, &level)| Reading {
            timestamp: base + Duration::minutes(i as i64),
            vessel_id: VESSEL.to_string(),
            level,
        })
        .collect()
}

fn ticket(id: &str, amount: f64) -> Ticket {
    Ticket {
        ticket_id: id.to_string(),
        vessel_id: VESSEL.to_string(),
        date: NaiveDate::from_ymd_opt(2025, 11, 1).unwrap(),
        amount_collected: amount,
    }
}

fn input(levels: &[f64], tickets: Vec<Ticket>) -> AnalysisInput {
    AnalysisInput {
        readings: readings_from_levels(levels),
        vessels: vec![Vessel {
            id: VESSEL.to_string(),
            max_volume: 1000.0,
        }],
        tickets: TicketIndex::from_tickets(tickets),
    }
}

/// Flat shelf, a linear drop of `drop` L over 10 minutes, flat shelf.
/// No positive slope anywhere, so the compensated volume equals the drop.
fn levels_with_drop(start_level: f64, drop: f64) -> Vec<f64> {
    let mut levels = vec![start_level; 10];
    for i in 1..=10 {
        levels.push(start_level - drop / 10.0 * f64::from(i));
    }
    levels.extend(vec![start_level - drop; 10]);
    levels
}

#[test]
fn scenario_a_strictly_increasing_series_is_quiet() {
    let levels: Vec<f64> = (0..40).map(f64::from).collect();
    let report = engine().run(
        &input(&levels, vec![]),
        NaiveDate::from_ymd_opt(2025, 11, 1).unwrap(),
        NaiveDate::from_ymd_opt(2025, 11, 1).unwrap(),
    );

    assert_eq!(report.match_count(), 0);
    assert_eq!(report.anomaly_count(), 0);
    assert!(report.matches.is_empty());
    assert!(report.anomalies.is_empty());
}

#[test]
fn scenario_b_one_drain_one_ticket_within_tolerance() {
    let levels = levels_with_drop(200.0, 50.0);
    let report = engine().run(
        &input(&levels, vec![ticket("T-1", 50.3)]),
        NaiveDate::from_ymd_opt(2025, 11, 1).unwrap(),
        NaiveDate::from_ymd_opt(2025, 11, 1).unwrap(),
    );

    assert_eq!(report.match_count(), 1);
    assert_eq!(report.anomaly_count(), 0);

    let matches = &report.matches["2025-11-01"][VESSEL];
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].kind, MatchKind::OneToOne);
    assert!((matches[0].drain_volume - 50.0).abs() < 1e-9);
    assert!((matches[0].ticket_sum - 50.3).abs() < 1e-9);
    assert_eq!(matches[0].ticket_ids, vec!["T-1".to_string()]);
    assert_eq!(matches[0].vessel_id, VESSEL);
}

#[test]
fn scenario_c_two_tickets_sum_to_one_drain() {
    let levels = levels_with_drop(300.0, 100.0);
    let report = engine().run(
        &input(&levels, vec![ticket("T-1", 40.0), ticket("T-2", 60.2)]),
        NaiveDate::from_ymd_opt(2025, 11, 1).unwrap(),
        NaiveDate::from_ymd_opt(2025, 11, 1).unwrap(),
    );

    assert_eq!(report.match_count(), 1);
    assert_eq!(report.anomaly_count(), 0);

    let matches = &report.matches["2025-11-01"][VESSEL];
    assert_eq!(matches[0].kind, MatchKind::ManyToOne);
    assert_eq!(
        matches[0].ticket_ids,
        vec!["T-1".to_string(), "T-2".to_string()]
    );
    assert!((matches[0].ticket_sum - 100.2).abs() < 1e-9);
}

#[test]
fn scenario_d_unexplained_drain_is_an_anomaly() {
    let levels = levels_with_drop(100.0, 30.0);
    let report = engine().run(
        &input(&levels, vec![]),
        NaiveDate::from_ymd_opt(2025, 11, 1).unwrap(),
        NaiveDate::from_ymd_opt(2025, 11, 1).unwrap(),
    );

    assert_eq!(report.match_count(), 0);
    assert_eq!(report.anomaly_count(), 1);

    let anomalies = &report.anomalies["2025-11-01"][VESSEL];
    match &anomalies[0] {
        Anomaly::Drain { volume, .. } => assert!((volume - 30.0).abs() < 1e-9),
        other => panic!("expected drain anomaly, got {other:?}"),
    }
}

#[test]
fn scenario_e_unexplained_ticket_is_an_anomaly() {
    // Gently rising all day: no drain events.
    let levels: Vec<f64> = (0..40).map(|i| 10.0 + f64::from(i) * 0.5).collect();
    let report = engine().run(
        &input(&levels, vec![ticket("T-7", 20.0)]),
        NaiveDate::from_ymd_opt(2025, 11, 1).unwrap(),
        NaiveDate::from_ymd_opt(2025, 11, 1).unwrap(),
    );

    assert_eq!(report.match_count(), 0);
    assert_eq!(report.anomaly_count(), 1);

    let anomalies = &report.anomalies["2025-11-01"][VESSEL];
    match &anomalies[0] {
        Anomaly::Ticket { volume, ticket_id } => {
            assert!((volume - 20.0).abs() < 1e-9);
            assert_eq!(ticket_id, "T-7");
        }
        other => panic!("expected ticket anomaly, got {other:?}"),
    }
}

#[test]
fn conservation_and_tolerance_hold_in_a_mixed_day() {
    // One 50 L drain and one 100 L drain; tickets explain the first
    // exactly, the second by a pair, and one ticket is left over.
    let mut levels = vec![400.0; 10];
    for i in 1..=10 {
        levels.push(400.0 - 5.0 * f64::from(i)); // -50
    }
    levels.extend(vec![350.0; 120]);
    for i in 1..=10 {
        levels.push(350.0 - 10.0 * f64::from(i)); // -100
    }
    levels.extend(vec![250.0; 10]);

    let tickets = vec![
        ticket("T-1", 50.0),
        ticket("T-2", 40.0),
        ticket("T-3", 60.2),
        ticket("T-4", 7.7),
    ];
    let total_tickets = tickets.len();

    let report = engine().run(
        &input(&levels, tickets),
        NaiveDate::from_ymd_opt(2025, 11, 1).unwrap(),
        NaiveDate::from_ymd_opt(2025, 11, 1).unwrap(),
    );

    let matches = &report.matches["2025-11-01"][VESSEL];
    let anomalies = &report.anomalies["2025-11-01"][VESSEL];

    let matched_ticket_count: usize = matches.iter().map(|m| m.ticket_ids.len()).sum();
    let anomaly_ticket_count = anomalies
        .iter()
        .filter(|a| matches!(a, Anomaly::Ticket { .. }))
        .count();
    assert_eq!(matched_ticket_count + anomaly_ticket_count, total_tickets);

    let anomaly_drain_count = anomalies
        .iter()
        .filter(|a| matches!(a, Anomaly::Drain { .. }))
        .count();
    assert_eq!(matches.len() + anomaly_drain_count, 2);

    let tolerance = AnalysisConfig::default().volume_tolerance;
    for m in matches {
        assert!((m.drain_volume - m.ticket_sum).abs() <= tolerance);
    }
}

#[test]
fn report_serializes_to_expected_wire_shape() {
    let levels = levels_with_drop(200.0, 50.0);
    let report = engine().run(
        &input(&levels, vec![ticket("T-1", 50.3)]),
        NaiveDate::from_ymd_opt(2025, 11, 1).unwrap(),
        NaiveDate::from_ymd_opt(2025, 11, 2).unwrap(),
    );

    let json: serde_json::Value = serde_json::from_str(&report.to_json_pretty().unwrap()).unwrap();
    assert_eq!(json["metadata"]["start_date"], "2025-11-01");
    assert_eq!(json["metadata"]["end_date"], "2025-11-02");
    assert_eq!(json["metadata"]["volume_tolerance"], 1.5);

    let m = &json["matches"]["2025-11-01"][VESSEL][0];
    assert_eq!(m["type"], "1-to-1");
    assert_eq!(m["ticket_ids"][0], "T-1");
    assert_eq!(m["vessel_id"], VESSEL);
    assert_eq!(m["date"], "2025-11-01");
}
