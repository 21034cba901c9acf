//! Forecasting models for time series data
//!
//! Every model works on [`DataPoint`] samples whose `x` is a day offset and
//! produces forecasts one day apart past the last observed `x`.

use crate::error::{ForecastError, Result};
use crate::metrics::ErrorMetrics;
use serde::{Deserialize, Serialize};
use series_math::{DataPoint, RegressionResult};
use std::collections::BTreeMap;
use std::fmt::Debug;

pub use self::arima::ArimaParams;
pub use self::exponential_smoothing::SmoothingParams;

/// Upper and lower forecast bounds, parallel-indexed to the forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval<P> {
    pub upper: Vec<P>,
    pub lower: Vec<P>,
    /// Confidence level in (0, 1)
    pub confidence: f64,
}

impl<P> ConfidenceInterval<P> {
    pub fn len(&self) -> usize {
        self.upper.len()
    }

    pub fn is_empty(&self) -> bool {
        self.upper.is_empty()
    }

    /// Convert both bounds into another point representation
    pub fn map_points<Q, F>(&self, mut f: F) -> ConfidenceInterval<Q>
    where
        F: FnMut(&[P]) -> Vec<Q>,
    {
        ConfidenceInterval {
            upper: f(&self.upper),
            lower: f(&self.lower),
            confidence: self.confidence,
        }
    }
}

impl ConfidenceInterval<DataPoint> {
    /// Symmetric bounds around `points` with the given half-widths
    pub fn symmetric(points: &[DataPoint], half_widths: &[f64], confidence: f64) -> Result<Self> {
        if points.len() != half_widths.len() {
            return Err(ForecastError::ValidationError(format!(
                "Values length ({}) doesn't match intervals length ({})",
                points.len(),
                half_widths.len()
            )));
        }

        let (upper, lower) = points
            .iter()
            .zip(half_widths.iter())
            .map(|(p, w)| (DataPoint::new(p.x, p.y + w), DataPoint::new(p.x, p.y - w)))
            .unzip();

        Ok(Self {
            upper,
            lower,
            confidence,
        })
    }

    /// Distance from each forecast point to its upper bound
    pub fn half_widths(&self) -> Vec<f64> {
        self.upper
            .iter()
            .zip(self.lower.iter())
            .map(|(u, l)| (u.y - l.y) / 2.0)
            .collect()
    }
}

/// Fitted parameters of whichever model produced a forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum ModelParameters {
    Regression(RegressionResult),
    Smoothing {
        params: SmoothingParams,
        metrics: ErrorMetrics,
    },
    Arima(ArimaParams),
}

impl ModelParameters {
    /// Flatten into a name to value mapping for export
    pub fn to_map(&self) -> BTreeMap<String, f64> {
        let mut map = BTreeMap::new();
        match self {
            ModelParameters::Regression(fit) => {
                map.insert("slope".to_string(), fit.slope);
                map.insert("intercept".to_string(), fit.intercept);
                map.insert("r2".to_string(), fit.r2);
            }
            ModelParameters::Smoothing { params, metrics } => {
                map.insert("alpha".to_string(), params.alpha);
                if let Some(beta) = params.beta {
                    map.insert("beta".to_string(), beta);
                }
                if let Some(gamma) = params.gamma {
                    map.insert("gamma".to_string(), gamma);
                }
                if let Some(period) = params.seasonal_period {
                    map.insert("seasonalPeriod".to_string(), period as f64);
                }
                map.insert("mse".to_string(), metrics.mse);
                map.insert("mae".to_string(), metrics.mae);
            }
            ModelParameters::Arima(params) => {
                map.insert("p".to_string(), params.p as f64);
                map.insert("d".to_string(), params.d as f64);
                map.insert("q".to_string(), params.q as f64);
                map.insert("aic".to_string(), params.aic);
                map.insert("bic".to_string(), params.bic);
                for (i, phi) in params.ar_coefficients.iter().enumerate() {
                    map.insert(format!("ar{}", i + 1), *phi);
                }
                for (i, theta) in params.ma_coefficients.iter().enumerate() {
                    map.insert(format!("ma{}", i + 1), *theta);
                }
            }
        }
        map
    }
}

/// Forecast produced by a trained model, still on the regression index
#[derive(Debug, Clone, PartialEq)]
pub struct ModelForecast {
    pub points: Vec<DataPoint>,
    pub interval: ConfidenceInterval<DataPoint>,
    /// Model-specific goodness of fit in [0, 1]
    pub accuracy: f64,
    pub parameters: ModelParameters,
}

impl ModelForecast {
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.y).collect()
    }
}

/// Trained forecast model
pub trait TrainedForecastModel: Debug {
    /// Generate `periods` future values with bounds at `confidence_level`
    fn forecast(&self, periods: usize, confidence_level: f64) -> Result<ModelForecast>;

    /// Model-specific goodness of fit in [0, 1]
    fn accuracy(&self) -> f64;

    /// Fitted parameters
    fn parameters(&self) -> ModelParameters;

    /// Name of the model
    fn name(&self) -> &str;
}

/// Forecast model that can be trained on a series
pub trait ForecastModel: Debug + Clone {
    /// The type of trained model produced
    type Trained: TrainedForecastModel;

    /// Train the model on regression samples; implementations sort by `x`
    fn train(&self, points: &[DataPoint]) -> Result<Self::Trained>;

    /// Get the name of the model
    fn name(&self) -> &str;
}

/// Check the common minimum input size of every model
pub(crate) fn require_points(points: &[DataPoint], model: &str) -> Result<()> {
    if points.len() < 2 {
        return Err(ForecastError::DataError(format!(
            "{} requires at least 2 data points, got {}",
            model,
            points.len()
        )));
    }
    Ok(())
}

/// Forecast sample positions: one day apart after `last_x`
pub(crate) fn horizon_points(last_x: f64, values: &[f64]) -> Vec<DataPoint> {
    values
        .iter()
        .enumerate()
        .map(|(i, &y)| DataPoint::new(last_x + (i + 1) as f64, y))
        .collect()
}

pub mod arima;
pub mod exponential_smoothing;
pub mod linear_regression;
