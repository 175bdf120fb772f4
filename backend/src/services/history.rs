//! Loading of observed daily call volumes
//!
//! History files are either a JSON array of `{"date": "YYYY-MM-DD", "calls": n}`
//! objects or a CSV file with a `date,calls` header. Rows are sorted by date on
//! load; the file order does not matter.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Deserialize;
use shared::{normalize_history, HistoryPoint};

use crate::error::{AppError, AppResult};

/// History record as stored on disk. `calls` may be a number or a numeric string.
#[derive(Debug, Deserialize)]
struct HistoryRow {
    date: NaiveDate,
    #[serde(deserialize_with = "calls_from_any")]
    calls: f64,
}

fn calls_from_any<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Calls {
        Number(f64),
        Text(String),
    }

    match Calls::deserialize(deserializer)? {
        Calls::Number(n) => Ok(n),
        Calls::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

impl TryFrom<HistoryRow> for HistoryPoint {
    type Error = AppError;

    /// Volumes feed the lag features directly and must be finite and non-negative
    fn try_from(row: HistoryRow) -> AppResult<Self> {
        if !row.calls.is_finite() || row.calls < 0.0 {
            return Err(AppError::History(format!(
                "calls on {} must be a non-negative number, got {}",
                row.date, row.calls
            )));
        }
        Ok(HistoryPoint::new(row.date, row.calls))
    }
}

/// Parse a JSON history document
pub fn parse_json(content: &str) -> AppResult<Vec<HistoryPoint>> {
    let rows: Vec<HistoryRow> = serde_json::from_str(content)
        .map_err(|e| AppError::History(format!("invalid JSON history: {}", e)))?;
    let points = rows
        .into_iter()
        .map(HistoryPoint::try_from)
        .collect::<AppResult<Vec<_>>>()?;
    Ok(normalize_history(points))
}

/// Parse a CSV history document with a `date,calls` header
pub fn parse_csv(content: &str) -> AppResult<Vec<HistoryPoint>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let mut points = Vec::new();
    for row in reader.deserialize::<HistoryRow>() {
        let row = row.map_err(|e| AppError::History(format!("invalid CSV history: {}", e)))?;
        points.push(HistoryPoint::try_from(row)?);
    }
    Ok(normalize_history(points))
}

/// Reads the configured history file
#[derive(Debug, Clone)]
pub struct HistoryService {
    path: Option<PathBuf>,
}

impl HistoryService {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    /// Whether a history file is configured
    pub fn is_configured(&self) -> bool {
        self.path.is_some()
    }

    /// Observed history, or `None` when no file is configured
    pub async fn load(&self) -> AppResult<Option<Vec<HistoryPoint>>> {
        let Some(path) = &self.path else {
            return Ok(None);
        };
        let points = load_file(path).await?;
        tracing::info!("Loaded {} history points from {}", points.len(), path.display());
        Ok(Some(points))
    }
}

async fn load_file(path: &Path) -> AppResult<Vec<HistoryPoint>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| AppError::History(format!("{} not readable: {}", path.display(), e)))?;

    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(false);

    if is_csv {
        parse_csv(&content)
    } else {
        parse_json(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_parse_json_sorts_by_date() {
        let content = r#"[
            {"date": "2024-06-02", "calls": 12},
            {"date": "2024-06-01", "calls": "15"}
        ]"#;
        let points = parse_json(content).unwrap();
        assert_eq!(points[0], HistoryPoint::new(d(2024, 6, 1), 15.0));
        assert_eq!(points[1], HistoryPoint::new(d(2024, 6, 2), 12.0));
    }

    #[test]
    fn test_parse_csv() {
        let content = "date,calls\n2024-06-01, 15\n2024-06-02,12\n";
        let points = parse_csv(content).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[1].calls, 12.0);
    }

    #[test]
    fn test_invalid_history() {
        assert!(matches!(parse_json("{}"), Err(AppError::History(_))));
        assert!(matches!(
            parse_csv("date,calls\nnot-a-date,3\n"),
            Err(AppError::History(_))
        ));
    }

    #[test]
    fn test_rejects_non_finite_and_negative_calls() {
        for calls in [r#""NaN""#, r#""inf""#, "-50"] {
            let content = format!(r#"[{{"date": "2024-06-01", "calls": {}}}]"#, calls);
            assert!(
                matches!(parse_json(&content), Err(AppError::History(_))),
                "accepted {}",
                calls
            );
        }
        for calls in ["NaN", "-inf", "-1"] {
            let content = format!("date,calls\n2024-06-01,{}\n", calls);
            assert!(
                matches!(parse_csv(&content), Err(AppError::History(_))),
                "accepted {}",
                calls
            );
        }
        assert!(parse_csv("date,calls\n2024-06-01,0\n").is_ok());
    }

    proptest::proptest! {
        #[test]
        fn prop_csv_rows_load_sorted(offsets in proptest::collection::vec(0i64..60, 1..30)) {
            let mut content = String::from("date,calls\n");
            for (i, offset) in offsets.iter().enumerate() {
                let date = d(2024, 6, 1) + chrono::Duration::days(*offset);
                content.push_str(&format!("{},{}\n", date, i));
            }

            let points = parse_csv(&content).unwrap();
            proptest::prop_assert!(points.windows(2).all(|w| w[0].date < w[1].date));
        }
    }

    #[tokio::test]
    async fn test_unconfigured_history_is_none() {
        let service = HistoryService::new(None);
        assert!(!service.is_configured());
        assert!(service.load().await.unwrap().is_none());
    }
}
