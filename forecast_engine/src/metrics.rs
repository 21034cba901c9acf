//! Metrics for evaluating forecast performance

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};

/// Error metrics for forecast evaluation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ErrorMetrics {
    /// Mean Squared Error
    pub mse: f64,
    /// Mean Absolute Error
    pub mae: f64,
    /// Root Mean Squared Error
    pub rmse: f64,
    /// Mean Absolute Percentage Error, over non-zero actuals
    pub mape: f64,
}

impl ErrorMetrics {
    /// Metrics for a perfect (or empty) set of errors
    pub fn zero() -> Self {
        Self {
            mse: 0.0,
            mae: 0.0,
            rmse: 0.0,
            mape: 0.0,
        }
    }

    /// Compute metrics from paired actual and predicted values.
    ///
    /// Both slices must have the same length. An empty pair yields zeros.
    pub fn from_pairs(actual: &[f64], predicted: &[f64]) -> Result<Self> {
        if actual.len() != predicted.len() {
            return Err(ForecastError::ValidationError(format!(
                "Forecast length ({}) doesn't match actual length ({})",
                predicted.len(),
                actual.len()
            )));
        }
        if actual.is_empty() {
            return Ok(Self::zero());
        }

        let n = actual.len() as f64;
        let (abs_sum, sq_sum) = actual
            .iter()
            .zip(predicted.iter())
            .fold((0.0, 0.0), |(abs_sum, sq_sum), (a, f)| {
                let e = a - f;
                (abs_sum + e.abs(), sq_sum + e * e)
            });

        let (pct_sum, pct_count) = actual
            .iter()
            .zip(predicted.iter())
            .filter(|(a, _)| a.abs() > f64::EPSILON)
            .fold((0.0, 0usize), |(sum, count), (a, f)| {
                (sum + ((a - f) / a).abs() * 100.0, count + 1)
            });

        let mse = sq_sum / n;
        Ok(Self {
            mse,
            mae: abs_sum / n,
            rmse: mse.sqrt(),
            mape: if pct_count > 0 {
                pct_sum / pct_count as f64
            } else {
                0.0
            },
        })
    }
}

impl std::fmt::Display for ErrorMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Forecast Accuracy Metrics:")?;
        writeln!(f, "  MSE:   {:.4}", self.mse)?;
        writeln!(f, "  MAE:   {:.4}", self.mae)?;
        writeln!(f, "  RMSE:  {:.4}", self.rmse)?;
        writeln!(f, "  MAPE:  {:.4}%", self.mape)?;
        Ok(())
    }
}

/// Mean absolute error between actual and forecast values
pub fn mean_absolute_error(actual: &[f64], forecast: &[f64]) -> Result<f64> {
    if actual.is_empty() {
        return Err(ForecastError::ValidationError(
            "Cannot compute error of an empty forecast".to_string(),
        ));
    }
    Ok(ErrorMetrics::from_pairs(actual, forecast)?.mae)
}

/// Mean squared error between actual and forecast values
pub fn mean_squared_error(actual: &[f64], forecast: &[f64]) -> Result<f64> {
    if actual.is_empty() {
        return Err(ForecastError::ValidationError(
            "Cannot compute error of an empty forecast".to_string(),
        ));
    }
    Ok(ErrorMetrics::from_pairs(actual, forecast)?.mse)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_regression_metrics() {
        let actual = vec![10.0, 20.0, 30.0, 40.0, 50.0];
        let predicted = vec![12.0, 18.0, 33.0, 37.0, 52.0];

        let metrics = ErrorMetrics::from_pairs(&actual, &predicted).unwrap();
        assert_abs_diff_eq!(metrics.mae, 2.4, epsilon = 1e-12);
        assert_abs_diff_eq!(metrics.mse, 6.0, epsilon = 1e-12);
        assert_abs_diff_eq!(metrics.rmse, 6.0_f64.sqrt(), epsilon = 1e-12);
        assert!(metrics.mape > 0.0 && metrics.mape < 15.0);
    }

    #[test]
    fn test_mape_skips_zero_actuals() {
        let metrics = ErrorMetrics::from_pairs(&[0.0, 10.0], &[1.0, 11.0]).unwrap();
        assert_abs_diff_eq!(metrics.mape, 10.0, epsilon = 1e-12);
    }

    #[test]
    fn test_length_mismatch() {
        assert!(mean_absolute_error(&[1.0, 2.0], &[1.0]).is_err());
        assert!(mean_squared_error(&[], &[]).is_err());
    }

    #[test]
    fn test_display() {
        let text = ErrorMetrics::zero().to_string();
        assert!(text.contains("MSE"));
        assert!(text.contains("MAPE"));
    }
}
