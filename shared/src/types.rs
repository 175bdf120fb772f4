//! Common types used across the platform

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Model season. Each season has its own fitted coefficients.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Summer,
    Winter,
}

impl Season {
    pub fn is_summer(&self) -> bool {
        matches!(self, Season::Summer)
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Season::Summer => write!(f, "summer"),
            Season::Winter => write!(f, "winter"),
        }
    }
}

/// How daily predictions are summed for the output table
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AggregationMode {
    /// One bucket per Monday-aligned calendar week
    #[default]
    Weekly,
    /// A single bucket spanning the whole horizon
    Range,
}

impl FromStr for AggregationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "weekly" | "week" => Ok(AggregationMode::Weekly),
            "range" => Ok(AggregationMode::Range),
            other => Err(format!("unknown aggregation mode: {}", other)),
        }
    }
}

impl fmt::Display for AggregationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggregationMode::Weekly => write!(f, "weekly"),
            AggregationMode::Range => write!(f, "range"),
        }
    }
}

/// Inclusive date range
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateRange {
    pub start: chrono::NaiveDate,
    pub end: chrono::NaiveDate,
}

impl DateRange {
    /// Range of `days` consecutive days starting at `start`. `days` is at least 1.
    /// The end saturates at the last representable date.
    pub fn from_horizon(start: NaiveDate, days: u32) -> Self {
        let days = days.max(1);
        let end = start
            .checked_add_signed(Duration::days(i64::from(days) - 1))
            .unwrap_or(NaiveDate::MAX);
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    pub fn num_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Literal label used for range buckets, e.g. `2024-05-01~2024-05-07`
    pub fn label(&self) -> String {
        format!("{}~{}", self.start, self.end)
    }
}

/// Monday of the ISO week containing `date`
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// Round to one decimal place, as the dashboard displays predictions
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_from_horizon() {
        let range = DateRange::from_horizon(d(2024, 7, 1), 14);
        assert_eq!(range.end, d(2024, 7, 14));
        assert_eq!(range.num_days(), 14);
        assert_eq!(range.label(), "2024-07-01~2024-07-14");

        assert_eq!(DateRange::from_horizon(d(2024, 7, 1), 0).end, d(2024, 7, 1));
    }

    #[test]
    fn test_huge_horizon_saturates() {
        let range = DateRange::from_horizon(d(2024, 7, 1), u32::MAX);
        assert_eq!(range.end, NaiveDate::MAX);
        assert!(range.contains(d(2024, 7, 1)));
    }

    #[test]
    fn test_week_start() {
        // 2024-07-07 is a Sunday
        assert_eq!(week_start(d(2024, 7, 7)), d(2024, 7, 1));
        assert_eq!(week_start(d(2024, 7, 8)), d(2024, 7, 8));
    }
}
