//! Drain-event extraction with inflow compensation.
//!
//! The sensor reports net change only: while liquid is being withdrawn,
//! background inflow keeps running and partially masks the true amount
//! removed. The compensation term adds the vessel's characteristic fill rate
//! back over the drain duration to estimate the gross volume removed.

use crate::segment::SegmentProfile;
use chrono::{DateTime, Duration, NaiveDate, Utc};

/// A detected interval of net liquid removal ending on the analysis date.
#[derive(Debug, Clone, PartialEq)]
pub struct DrainEvent {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub end_level: f64,
    pub duration: Duration,
    /// Net level drop as observed by the sensor.
    pub raw_drop: f64,
    /// Inflow-compensated estimate of the gross volume removed.
    /// Always >= `raw_drop`.
    pub drain_volume: f64,
}

/// Scans the profile's segments for negative slopes whose end timestamp
/// falls on `target_date` and emits a compensated `DrainEvent` for each,
/// in chronological order. `fill_rate` is the vessel's average positive
/// slope (level per minute, non-negative).
#[must_use]
pub fn extract_drain_events(
    profile: &SegmentProfile,
    target_date: NaiveDate,
    fill_rate: f64,
) -> Vec<DrainEvent> {
    let points = profile.inflection_points();
    let mut events = Vec::new();
    if points.len() < 2 {
        return events;
    }

    for pair in points.windows(2) {
        let (start, end) = (pair[0], pair[1]);
        let is_negative_slope = end.level < start.level;
        let ends_on_target = end.timestamp.date_naive() == target_date;
        if !(is_negative_slope && ends_on_target) {
            continue;
        }

        let duration = end.timestamp - start.timestamp;
        let raw_drop = start.level - end.level;
        let duration_minutes = duration.num_seconds() as f64 / 60.0;
        let drain_volume = raw_drop + duration_minutes * fill_rate;

        events.push(DrainEvent {
            start: start.timestamp,
            end: end.timestamp,
            end_level: end.level,
            duration,
            raw_drop,
            drain_volume,
        });
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn minute_timestamps(n: usize) -> Vec<DateTime<Utc>> {
        let base = Utc.with_ymd_and_hms(2025, 11, 1, 6, 0, 0).unwrap();
        (0..n)
            .map(|i| base + Duration::minutes(i as i64))
            .collect()
    }

    fn profile_for(levels: &[f64]) -> SegmentProfile {
        SegmentProfile::from_series(&minute_timestamps(levels.len()), levels, 0.1)
    }

    #[test]
    fn strictly_increasing_series_yields_no_events() {
        let levels: Vec<f64> = (0..40).map(f64::from).collect();
        let profile = profile_for(&levels);
        let date = NaiveDate::from_ymd_opt(2025, 11, 1).unwrap();

        let events = extract_drain_events(&profile, date, profile.average_positive_slope());
        assert!(events.is_empty());
    }

    #[test]
    fn uncompensated_drop_equals_raw_drop() {
        // Flat, then a 50 L drop over 10 minutes, then flat: no positive
        // slope anywhere, so compensation adds nothing.
        let mut levels = vec![100.0; 10];
        for i in 1..=10 {
            levels.push(100.0 - 5.0 * f64::from(i));
        }
        levels.extend(vec![50.0; 10]);
        let profile = profile_for(&levels);
        let date = NaiveDate::from_ymd_opt(2025, 11, 1).unwrap();

        let events = extract_drain_events(&profile, date, profile.average_positive_slope());
        assert_eq!(events.len(), 1);
        assert!((events[0].raw_drop - 50.0).abs() < 1e-9);
        assert!((events[0].drain_volume - 50.0).abs() < 1e-9);
        assert_eq!(events[0].duration, Duration::minutes(10));
    }

    #[test]
    fn compensation_restores_masked_inflow() {
        // Fill at 1 L/min for 60 minutes, then a 30-minute drain losing
        // 60 L net. Gross removal estimate: 60 + 30 * 1.0 = 90 L.
        let mut levels: Vec<f64> = (0..=60).map(f64::from).collect();
        for i in 1..=30 {
            levels.push(60.0 - 2.0 * f64::from(i));
        }
        let profile = profile_for(&levels);
        let fill_rate = profile.average_positive_slope();
        assert!((fill_rate - 1.0).abs() < 1e-9);

        let date = NaiveDate::from_ymd_opt(2025, 11, 1).unwrap();
        let events = extract_drain_events(&profile, date, fill_rate);
        assert_eq!(events.len(), 1);
        assert!((events[0].raw_drop - 60.0).abs() < 1e-9);
        assert!((events[0].drain_volume - 90.0).abs() < 1e-9);
        assert!(events[0].drain_volume >= events[0].raw_drop);
    }

    #[test]
    fn events_on_other_dates_are_ignored() {
        let mut levels = vec![80.0; 10];
        levels.extend((1..=10).map(|i| 80.0 - 3.0 * f64::from(i)));
        let profile = profile_for(&levels);

        let other_date = NaiveDate::from_ymd_opt(2025, 11, 2).unwrap();
        let events = extract_drain_events(&profile, other_date, 0.0);
        assert!(events.is_empty());
    }

    #[test]
    fn multiple_drains_emitted_chronologically() {
        let mut levels = vec![100.0; 5];
        levels.extend((1..=5).map(|i| 100.0 - 4.0 * f64::from(i))); // -20
        levels.extend((1..=5).map(|i| 80.0 + 6.0 * f64::from(i))); // +30
        levels.extend((1..=5).map(|i| 110.0 - 2.0 * f64::from(i))); // -10
        let profile = profile_for(&levels);

        let date = NaiveDate::from_ymd_opt(2025, 11, 1).unwrap();
        let events = extract_drain_events(&profile, date, 0.0);
        assert_eq!(events.len(), 2);
        assert!(events[0].end < events[1].end);
        assert!((events[0].raw_drop - 20.0).abs() < 1e-9);
        assert!((events[1].raw_drop - 10.0).abs() < 1e-9);
    }
}
