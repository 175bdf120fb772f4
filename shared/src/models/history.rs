//! Ground-truth daily volumes

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One observed day of the metric
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct HistoryPoint {
    pub date: NaiveDate,
    pub calls: f64,
}

impl HistoryPoint {
    pub fn new(date: NaiveDate, calls: f64) -> Self {
        Self { date, calls }
    }
}

/// Sort observations ascending by date, keeping the last value for duplicate dates
pub fn normalize_history(mut points: Vec<HistoryPoint>) -> Vec<HistoryPoint> {
    points.sort_by_key(|p| p.date);
    let mut out: Vec<HistoryPoint> = Vec::with_capacity(points.len());
    for point in points {
        match out.last_mut() {
            Some(last) if last.date == point.date => *last = point,
            _ => out.push(point),
        }
    }
    out
}
