//! Browser tests for the WASM bindings
//!
//! Run with `wasm-pack test --headless --firefox wasm`.

#![cfg(target_arch = "wasm32")]

use call_forecast_wasm::{forecast_from_payload, ForecastOutput};
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

const PAYLOAD: &str = r#"[{
    "timeSeries": [
        {
            "timeDefines": [
                "2024-07-01T00:00:00+09:00",
                "2024-07-02T00:00:00+09:00",
                "2024-07-03T00:00:00+09:00"
            ],
            "areas": [{ "weatherCodes": ["300", "100", "400"] }]
        },
        {
            "timeDefines": [
                "2024-07-01T00:00:00+09:00",
                "2024-07-02T00:00:00+09:00",
                "2024-07-03T00:00:00+09:00"
            ],
            "areas": [{ "tempsMin": ["24", "25", "23"], "tempsMax": ["31", "33", "29"] }]
        }
    ]
}]"#;

#[wasm_bindgen_test]
fn forecast_over_payload_in_range_mode() {
    let json = forecast_from_payload("", PAYLOAD, "2024-07-01", 5, "range").unwrap();
    let output: ForecastOutput = serde_json::from_str(&json).unwrap();

    assert_eq!(output.daily.len(), 3);
    assert!(output.daily[0].rain_flag);
    assert!(output.daily[2].snow_flag);
    assert!(!output.history_available);
    assert_eq!(output.buckets.len(), 1);
    assert_eq!(output.buckets[0].label, "2024-07-01~2024-07-05");
    assert!(output.generated_at.timestamp() > 0);
}

#[wasm_bindgen_test]
fn forecast_rejects_unknown_aggregation() {
    assert!(forecast_from_payload("", PAYLOAD, "2024-07-01", 3, "monthly").is_err());
}

#[wasm_bindgen_test]
fn forecast_reports_missing_temperatures() {
    let payload = r#"[{ "timeSeries": [] }]"#;
    assert!(forecast_from_payload("", payload, "2024-07-01", 3, "weekly").is_err());
}
