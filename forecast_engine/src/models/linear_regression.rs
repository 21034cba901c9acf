//! Linear trend forecasting by ordinary least squares

use crate::error::Result;
use crate::models::{
    horizon_points, require_points, ConfidenceInterval, ForecastModel, ModelForecast,
    ModelParameters, TrainedForecastModel,
};
use crate::utils::{critical_value, validate_periods};
use series_math::regression::fit_linear;
use series_math::{sorted_by_x, DataPoint, RegressionResult};

/// Least squares trend line
#[derive(Debug, Clone)]
pub struct LinearRegressionModel {
    /// Name of the model
    name: String,
}

/// Trained linear regression model
#[derive(Debug, Clone)]
pub struct TrainedLinearRegression {
    /// Name of the model
    name: String,
    /// Fitted line
    fit: RegressionResult,
    /// Number of observations
    n: usize,
    /// Last observed x
    last_x: f64,
    /// Mean of the observed x
    x_mean: f64,
    /// Sum of squared deviations of x from its mean
    sxx: f64,
    /// Residual standard error, sqrt(SSE / (n - 2))
    standard_error: f64,
}

impl LinearRegressionModel {
    /// Create a new linear regression model
    pub fn new() -> Self {
        Self {
            name: "Linear Regression".to_string(),
        }
    }
}

impl Default for LinearRegressionModel {
    fn default() -> Self {
        Self::new()
    }
}

impl ForecastModel for LinearRegressionModel {
    type Trained = TrainedLinearRegression;

    fn train(&self, points: &[DataPoint]) -> Result<TrainedLinearRegression> {
        require_points(points, &self.name)?;
        let points = sorted_by_x(points);
        let fit = fit_linear(&points)?;

        let n = points.len();
        let x_mean = points.iter().map(|p| p.x).sum::<f64>() / n as f64;
        let sxx: f64 = points.iter().map(|p| (p.x - x_mean).powi(2)).sum();
        let sse: f64 = points.iter().map(|p| (p.y - fit.predict(p.x)).powi(2)).sum();
        let standard_error = if n > 2 {
            (sse / (n - 2) as f64).sqrt()
        } else {
            0.0
        };

        Ok(TrainedLinearRegression {
            name: self.name.clone(),
            fit,
            n,
            last_x: points[n - 1].x,
            x_mean,
            sxx,
            standard_error,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TrainedLinearRegression {
    pub fn regression(&self) -> RegressionResult {
        self.fit
    }

    /// Prediction interval half-width at `x` before scaling by the critical value
    fn prediction_error(&self, x: f64) -> f64 {
        let leverage = if self.sxx > 0.0 {
            (x - self.x_mean).powi(2) / self.sxx
        } else {
            0.0
        };
        self.standard_error * (1.0 + 1.0 / self.n as f64 + leverage).sqrt()
    }
}

impl TrainedForecastModel for TrainedLinearRegression {
    fn forecast(&self, periods: usize, confidence_level: f64) -> Result<ModelForecast> {
        validate_periods(periods)?;
        let critical = critical_value(confidence_level, self.n.saturating_sub(2))?;

        let values: Vec<f64> = (1..=periods)
            .map(|h| self.fit.predict(self.last_x + h as f64))
            .collect();
        let points = horizon_points(self.last_x, &values);
        let half_widths: Vec<f64> = points
            .iter()
            .map(|p| critical * self.prediction_error(p.x))
            .collect();

        Ok(ModelForecast {
            interval: ConfidenceInterval::symmetric(&points, &half_widths, confidence_level)?,
            points,
            accuracy: self.accuracy(),
            parameters: self.parameters(),
        })
    }

    fn accuracy(&self) -> f64 {
        self.fit.r2
    }

    fn parameters(&self) -> ModelParameters {
        ModelParameters::Regression(self.fit)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Fit a trend line and forecast `periods` days ahead
pub fn linear_regression_forecast(
    points: &[DataPoint],
    periods: usize,
    confidence_level: f64,
) -> Result<ModelForecast> {
    LinearRegressionModel::new()
        .train(points)?
        .forecast(periods, confidence_level)
}
