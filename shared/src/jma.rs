//! Extraction of daily weather from a JMA forecast payload
//!
//! The JMA forecast document is an array of forecast blocks (short-term and
//! weekly), each holding a `timeSeries` list. Every series pairs a
//! `timeDefines` array of RFC 3339 timestamps with per-area value arrays
//! aligned to it. Values arrive as strings, with `""` meaning "not forecast".

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate};
use serde_json::Value;

use crate::error::{ForecastError, ForecastResult};
use crate::models::DailyWeather;

fn parse_date(raw: &str) -> Option<NaiveDate> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.date_naive())
        .ok()
        .or_else(|| raw.get(..10).and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()))
}

/// Numeric cell: a number, a numeric string, or missing (`""`, `null`, absent)
fn parse_number(cell: Option<&Value>) -> Option<f64> {
    let value = match cell? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    value.filter(|v| v.is_finite())
}

fn parse_code(cell: Option<&Value>) -> Option<String> {
    match cell? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn blocks(payload: &Value) -> Vec<&Value> {
    match payload {
        Value::Array(items) => items.iter().collect(),
        Value::Object(_) => vec![payload],
        _ => Vec::new(),
    }
}

/// All time series in block order
fn time_series(payload: &Value) -> impl Iterator<Item = &Value> {
    blocks(payload).into_iter().flat_map(|block| {
        block
            .get("timeSeries")
            .and_then(Value::as_array)
            .map(|series| series.iter())
            .into_iter()
            .flatten()
    })
}

/// Dates and first area of a series, if it has both
fn series_parts(series: &Value) -> Option<(&Vec<Value>, &Value)> {
    let dates = series.get("timeDefines")?.as_array()?;
    let area = series.get("areas")?.as_array()?.first()?;
    Some((dates, area))
}

fn values<'a>(area: &'a Value, key: &str) -> Option<&'a Vec<Value>> {
    area.get(key).and_then(Value::as_array)
}

/// Daily min/max temperatures from the first series that carries them
fn extract_temperatures(payload: &Value) -> ForecastResult<Vec<DailyWeather>> {
    for series in time_series(payload) {
        let Some((dates, area)) = series_parts(series) else {
            continue;
        };
        let tmin = values(area, "tempsMin");
        let tmax = values(area, "tempsMax");
        if tmin.is_none() && tmax.is_none() {
            continue;
        }

        let mut days = Vec::with_capacity(dates.len());
        for (i, raw) in dates.iter().enumerate() {
            let date = raw.as_str().and_then(parse_date).ok_or_else(|| {
                ForecastError::PayloadShape(format!("unparseable timeDefine: {}", raw))
            })?;
            days.push(DailyWeather::new(
                date,
                parse_number(tmin.and_then(|v| v.get(i))),
                parse_number(tmax.and_then(|v| v.get(i))),
            ));
        }
        return Ok(days);
    }

    Err(ForecastError::PayloadShape(
        "no daily temperatures in forecast payload".to_string(),
    ))
}

/// Weather codes and precipitation probabilities keyed by calendar date.
///
/// The first code reported for a date wins (short-term blocks come first).
/// Probabilities reported in several slots of a day keep the highest one.
fn extract_precipitation(
    payload: &Value,
) -> (BTreeMap<NaiveDate, String>, BTreeMap<NaiveDate, f64>) {
    let mut codes = BTreeMap::new();
    let mut pops: BTreeMap<NaiveDate, f64> = BTreeMap::new();

    for series in time_series(payload) {
        let Some((dates, area)) = series_parts(series) else {
            continue;
        };
        let series_codes = values(area, "weatherCodes");
        let series_pops = values(area, "pops");
        if series_codes.is_none() && series_pops.is_none() {
            continue;
        }

        for (i, raw) in dates.iter().enumerate() {
            let Some(date) = raw.as_str().and_then(parse_date) else {
                continue;
            };
            if let Some(code) = parse_code(series_codes.and_then(|v| v.get(i))) {
                codes.entry(date).or_insert(code);
            }
            if let Some(pop) = parse_number(series_pops.and_then(|v| v.get(i))) {
                let slot = pops.entry(date).or_insert(pop);
                *slot = slot.max(pop);
            }
        }
    }

    (codes, pops)
}

/// Daily weather in ascending date order.
///
/// Fails with [`ForecastError::PayloadShape`] when no temperature series is
/// present. Missing weather codes or probabilities for a day are left empty.
pub fn extract_daily_weather(payload: &Value) -> ForecastResult<Vec<DailyWeather>> {
    let mut days = extract_temperatures(payload)?;
    let (codes, pops) = extract_precipitation(payload);

    for day in &mut days {
        day.weather_code = codes.get(&day.date).cloned();
        day.pop = pops.get(&day.date).copied();
    }

    days.sort_by_key(|day| day.date);
    days.dedup_by_key(|day| day.date);
    Ok(days)
}
