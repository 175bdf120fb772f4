//! Validation of configuration and request inputs

use crate::models::{Baseline, ModelConfig, SeasonRule};

/// Longest horizon the weekly forecast supports
pub const MAX_HORIZON_DAYS: u32 = 14;

/// Validate month numbers and ordering of the season rule
pub fn validate_season_rule(rule: &SeasonRule) -> Result<(), &'static str> {
    let months = 1..=12;
    if !months.contains(&rule.summer_start_month) || !months.contains(&rule.summer_end_month) {
        return Err("Season months must be between 1 and 12");
    }
    if rule.summer_start_month > rule.summer_end_month {
        return Err("Summer must start no later than it ends");
    }
    Ok(())
}

/// Baselines seed the rolling window and must be positive volumes
pub fn validate_baseline(baseline: &Baseline) -> Result<(), &'static str> {
    let valid = |v: f64| v.is_finite() && v > 0.0;
    if !valid(baseline.summer_daily) || !valid(baseline.winter_daily) {
        return Err("Baseline daily volumes must be positive numbers");
    }
    Ok(())
}

/// Validate a complete model configuration
pub fn validate_model_config(config: &ModelConfig) -> Result<(), &'static str> {
    if !config.hot_threshold.is_finite() || !config.cold_threshold.is_finite() {
        return Err("Temperature thresholds must be finite");
    }
    validate_baseline(&config.baseline)?;
    validate_season_rule(&config.season)?;
    if !config.summer.is_finite() || !config.winter.is_finite() {
        return Err("Model coefficients must be finite");
    }
    Ok(())
}

/// JMA office codes are six digits, class-10 area codes may be longer
pub fn validate_area_code(code: &str) -> Result<(), &'static str> {
    if code.is_empty() || code.len() > 16 {
        return Err("Area code must be 1 to 16 characters");
    }
    if !code.chars().all(|c| c.is_ascii_digit()) {
        return Err("Area code must be numeric");
    }
    Ok(())
}

/// Clamp a requested horizon into `1..=max`
pub fn clamp_horizon(requested: i64, max: u32) -> u32 {
    requested.clamp(1, i64::from(max.max(1))) as u32
}
