//! Utility functions for the forecast_engine crate

use crate::error::{ForecastError, Result};
use statrs::distribution::{ContinuousCDF, Normal};

/// Degrees of freedom above which the normal quantile is used unchanged
pub const LARGE_SAMPLE_DF: usize = 30;

/// Two-sided standard normal critical value for a confidence level in (0, 1)
pub fn z_score(confidence_level: f64) -> Result<f64> {
    validate_confidence_level(confidence_level)?;

    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| ForecastError::ForecastingError(format!("Normal distribution: {}", e)))?;

    Ok(normal.inverse_cdf(0.5 + confidence_level / 2.0))
}

/// Approximate two-sided Student-t critical value.
///
/// Uses the normal quantile when `df > 30`. Smaller samples get the
/// first-order Cornish-Fisher inflation `z + (z^3 + z) / (4 df)`, which is
/// close to the t table for moderate df and errs narrow for df < 3.
pub fn critical_value(confidence_level: f64, df: usize) -> Result<f64> {
    let z = z_score(confidence_level)?;
    if df > LARGE_SAMPLE_DF || df == 0 {
        return Ok(z);
    }
    Ok(z + (z.powi(3) + z) / (4.0 * df as f64))
}

pub fn validate_confidence_level(confidence_level: f64) -> Result<()> {
    if !(confidence_level > 0.0 && confidence_level < 1.0) {
        return Err(ForecastError::ValidationError(format!(
            "Confidence level must be between 0 and 1, got {}",
            confidence_level
        )));
    }
    Ok(())
}

pub fn validate_periods(periods: usize) -> Result<()> {
    if periods == 0 {
        return Err(ForecastError::ValidationError(
            "Number of forecast periods must be positive".to_string(),
        ));
    }
    Ok(())
}

/// Number of trailing points to hold out: `round(len * ratio)`, at least 1
/// and at most `max` when given.
pub fn holdout_size(len: usize, ratio: f64, max: Option<usize>) -> usize {
    let size = ((len as f64 * ratio).round() as usize).max(1);
    match max {
        Some(max) => size.min(max.max(1)),
        None => size,
    }
}

/// Split a series into training and trailing test parts
pub fn train_test_split(data: &[f64], test_size: usize) -> (&[f64], &[f64]) {
    let test_size = test_size.min(data.len());
    data.split_at(data.len() - test_size)
}
