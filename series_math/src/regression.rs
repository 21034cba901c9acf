//! Ordinary least squares on (x, y) samples

use crate::{DataPoint, MathError, Result};
use serde::{Deserialize, Serialize};

/// Closed-form fit of `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionResult {
    pub slope: f64,
    pub intercept: f64,
    /// Coefficient of determination, clamped to [0, 1]
    pub r2: f64,
}

impl RegressionResult {
    /// Evaluate the fitted line at `x`
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Fit a least squares line through `points`.
///
/// Points do not need to be sorted. When every `x` is identical the slope is
/// taken as 0 and the intercept as the mean of `y`. A series with no variation
/// in `y` reports `r2 = 0`.
pub fn fit_linear(points: &[DataPoint]) -> Result<RegressionResult> {
    if points.len() < 2 {
        return Err(MathError::InsufficientData(format!(
            "Need at least 2 points for linear regression, got {}",
            points.len()
        )));
    }

    let n = points.len() as f64;
    let (sum_x, sum_y, sum_xy, sum_xx) = points.iter().fold(
        (0.0, 0.0, 0.0, 0.0),
        |(sx, sy, sxy, sxx), p| (sx + p.x, sy + p.y, sxy + p.x * p.y, sxx + p.x * p.x),
    );

    let denominator = n * sum_xx - sum_x * sum_x;
    let slope = if denominator.abs() < 1e-10 {
        0.0
    } else {
        (n * sum_xy - sum_x * sum_y) / denominator
    };
    let intercept = (sum_y - slope * sum_x) / n;

    let y_mean = sum_y / n;
    let (explained, total) = points.iter().fold((0.0, 0.0), |(explained, total), p| {
        let fitted = slope * p.x + intercept;
        (
            explained + (fitted - y_mean).powi(2),
            total + (p.y - y_mean).powi(2),
        )
    });

    let r2 = if total < 1e-12 {
        0.0
    } else {
        (explained / total).clamp(0.0, 1.0)
    };

    Ok(RegressionResult {
        slope,
        intercept,
        r2,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_perfect_line() {
        let points: Vec<DataPoint> = (0..10)
            .map(|x| DataPoint::new(x as f64, 2.0 * x as f64 + 3.0))
            .collect();

        let fit = fit_linear(&points).unwrap();
        assert_abs_diff_eq!(fit.slope, 2.0, epsilon = 1e-10);
        assert_abs_diff_eq!(fit.intercept, 3.0, epsilon = 1e-10);
        assert_abs_diff_eq!(fit.r2, 1.0, epsilon = 1e-10);
        assert_abs_diff_eq!(fit.predict(12.0), 27.0, epsilon = 1e-10);
    }

    #[test]
    fn test_unsorted_input() {
        let points = vec![
            DataPoint::new(2.0, 30.0),
            DataPoint::new(0.0, 10.0),
            DataPoint::new(1.0, 20.0),
        ];

        let fit = fit_linear(&points).unwrap();
        assert_abs_diff_eq!(fit.slope, 10.0, epsilon = 1e-10);
        assert_abs_diff_eq!(fit.intercept, 10.0, epsilon = 1e-10);
    }

    #[test]
    fn test_flat_series() {
        let points: Vec<DataPoint> = (0..5).map(|x| DataPoint::new(x as f64, 4.0)).collect();
        let fit = fit_linear(&points).unwrap();
        assert_abs_diff_eq!(fit.slope, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(fit.intercept, 4.0, epsilon = 1e-12);
        assert_eq!(fit.r2, 0.0);
    }

    #[test]
    fn test_identical_x_values() {
        let points = vec![DataPoint::new(1.0, 2.0), DataPoint::new(1.0, 4.0)];
        let fit = fit_linear(&points).unwrap();
        assert_eq!(fit.slope, 0.0);
        assert_abs_diff_eq!(fit.intercept, 3.0);
    }

    #[test]
    fn test_requires_two_points() {
        let result = fit_linear(&[DataPoint::new(0.0, 1.0)]);
        assert!(matches!(result, Err(MathError::InsufficientData(_))));
    }
}
