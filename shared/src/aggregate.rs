//! Summing daily predictions into output buckets

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};

use crate::models::{Bucket, DailyRecord};
use crate::types::{week_start, AggregationMode, DateRange};

/// One bucket per Monday-aligned week, in ascending week order
pub fn weekly(records: &[DailyRecord]) -> Vec<Bucket> {
    let mut weeks: BTreeMap<NaiveDate, (u32, f64)> = BTreeMap::new();
    for record in records {
        let entry = weeks.entry(week_start(record.date)).or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += record.prediction;
    }

    weeks
        .into_iter()
        .map(|(start, (days, prediction))| Bucket {
            label: start.to_string(),
            start,
            end: start + Duration::days(6),
            days,
            prediction,
        })
        .collect()
}

/// A single bucket spanning the requested horizon, whatever days the payload covered.
/// Days without a prediction contribute nothing to the sum.
pub fn range(records: &[DailyRecord], horizon: DateRange) -> Vec<Bucket> {
    let covered: Vec<&DailyRecord> = records
        .iter()
        .filter(|r| horizon.contains(r.date))
        .collect();

    vec![Bucket {
        label: horizon.label(),
        start: horizon.start,
        end: horizon.end,
        days: covered.len() as u32,
        prediction: covered.iter().map(|r| r.prediction).sum(),
    }]
}

pub fn aggregate(
    records: &[DailyRecord],
    mode: AggregationMode,
    horizon: DateRange,
) -> Vec<Bucket> {
    match mode {
        AggregationMode::Weekly => weekly(records),
        AggregationMode::Range => range(records, horizon),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(date: NaiveDate, prediction: f64) -> DailyRecord {
        DailyRecord {
            date,
            tmin: None,
            tmax: None,
            is_summer: true,
            holiday_flag: false,
            rain_flag: false,
            snow_flag: false,
            hot_excess: 0.0,
            cold_excess: 0.0,
            lag1: 0.0,
            lag7: 0.0,
            ma7: 0.0,
            prediction,
        }
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_weekly_splits_on_monday() {
        // 2024-06-08 is a Saturday, 2024-06-10 a Monday
        let records = vec![
            record(d(2024, 6, 8), 1.0),
            record(d(2024, 6, 9), 2.0),
            record(d(2024, 6, 10), 4.0),
            record(d(2024, 6, 11), 8.0),
        ];
        let buckets = weekly(&records);
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].label, "2024-06-03");
        assert_eq!(buckets[0].prediction, 3.0);
        assert_eq!(buckets[0].days, 2);
        assert_eq!(buckets[1].label, "2024-06-10");
        assert_eq!(buckets[1].end, d(2024, 6, 16));
        assert_eq!(buckets[1].prediction, 12.0);
    }

    #[test]
    fn test_range_label() {
        let records = vec![record(d(2024, 6, 8), 1.5), record(d(2024, 6, 9), 2.5)];
        let horizon = DateRange::from_horizon(d(2024, 6, 8), 2);
        let buckets = aggregate(&records, AggregationMode::Range, horizon);
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].label, "2024-06-08~2024-06-09");
        assert_eq!(buckets[0].prediction, 4.0);
        assert_eq!(buckets[0].days, 2);
    }

    #[test]
    fn test_range_uses_requested_horizon() {
        // Payload only covered the first two of five requested days
        let records = vec![record(d(2024, 6, 8), 1.5), record(d(2024, 6, 9), 2.5)];
        let horizon = DateRange::from_horizon(d(2024, 6, 8), 5);
        let buckets = range(&records, horizon);
        assert_eq!(buckets[0].label, "2024-06-08~2024-06-12");
        assert_eq!(buckets[0].start, d(2024, 6, 8));
        assert_eq!(buckets[0].end, d(2024, 6, 12));
        assert_eq!(buckets[0].days, 2);
        assert_eq!(buckets[0].prediction, 4.0);
    }

    #[test]
    fn test_empty_input() {
        let horizon = DateRange::from_horizon(d(2024, 6, 8), 3);
        assert!(weekly(&[]).is_empty());

        let buckets = range(&[], horizon);
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].label, "2024-06-08~2024-06-10");
        assert_eq!(buckets[0].days, 0);
        assert_eq!(buckets[0].prediction, 0.0);
    }
}
