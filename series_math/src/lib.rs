//! # Series Math
//!
//! Numerical building blocks for univariate time-series forecasting.
//! This crate provides the dense linear solver, autocorrelation estimators,
//! ordinary least squares and the trend/seasonality/stationarity heuristics
//! that the forecasting models are built on.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod diagnostics;
pub mod linalg;
pub mod regression;
pub mod statistics;

pub use crate::diagnostics::DetectionThresholds;
pub use crate::linalg::FitOutcome;
pub use crate::regression::RegressionResult;

/// Errors that can occur in series calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for series math operations
pub type Result<T> = std::result::Result<T, MathError>;

/// A unit-less regression sample.
///
/// `x` is usually the zero-based day offset of an observation from the first
/// observation of its series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub x: f64,
    pub y: f64,
}

impl DataPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Sort points ascending by `x`, returning a new vector.
pub fn sorted_by_x(points: &[DataPoint]) -> Vec<DataPoint> {
    let mut sorted = points.to_vec();
    sorted.sort_by(|a, b| a.x.total_cmp(&b.x));
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sorted_by_x() {
        let points = vec![
            DataPoint::new(2.0, 20.0),
            DataPoint::new(0.0, 0.0),
            DataPoint::new(1.0, 10.0),
        ];

        let sorted = sorted_by_x(&points);
        let xs: Vec<f64> = sorted.iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![0.0, 1.0, 2.0]);
        // Input is left untouched
        assert_eq!(points[0].x, 2.0);
    }
}
