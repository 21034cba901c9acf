//! Exponential smoothing models for time series forecasting
//!
//! Three recursions share one driver:
//!
//! - **Simple (SES)**: level only, flat forecast
//! - **Double (Holt)**: level and additive trend
//! - **Triple (Holt-Winters)**: level, trend and an additive or multiplicative
//!   seasonal index per position in the cycle
//!
//! The smoothing state is an explicit value folded over the observations, so
//! a fit is a pure function of its inputs.

use crate::error::{ForecastError, Result};
use crate::metrics::ErrorMetrics;
use crate::models::{
    horizon_points, require_points, ConfidenceInterval, ForecastModel, ModelForecast,
    ModelParameters, TrainedForecastModel,
};
use crate::utils::{holdout_size, train_test_split, validate_periods, z_score};
use serde::{Deserialize, Serialize};
use series_math::statistics::variance;
use series_math::{sorted_by_x, DataPoint};
use tracing::{debug, warn};

/// Share of the series held out when optimizing parameters
pub const OPTIMIZER_HOLDOUT_RATIO: f64 = 0.2;

/// Candidate values for single and double smoothing: 0.1 to 0.9
pub static FINE_GRID: [f64; 9] = [0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9];

/// Candidate values for each of alpha, beta and gamma in triple smoothing
pub static COARSE_GRID: [f64; 3] = [0.2, 0.5, 0.8];

/// Parameters used when the series is too short to optimize
pub const DEFAULT_ALPHA: f64 = 0.3;
pub const DEFAULT_BETA: f64 = 0.1;
pub const DEFAULT_GAMMA: f64 = 0.1;

/// Seasonal indices and levels closer to zero than this are not divided by
const DIVISION_EPSILON: f64 = 1e-10;

/// Which recursion to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SmoothingKind {
    Simple,
    Double,
    Triple,
}

/// How the seasonal index combines with level and trend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeasonalMode {
    #[default]
    Additive,
    Multiplicative,
}

/// Smoothing coefficients of a fit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmoothingParams {
    pub alpha: f64,
    pub beta: Option<f64>,
    pub gamma: Option<f64>,
    pub seasonal_period: Option<usize>,
}

impl SmoothingParams {
    pub fn simple(alpha: f64) -> Self {
        Self {
            alpha,
            beta: None,
            gamma: None,
            seasonal_period: None,
        }
    }

    pub fn double(alpha: f64, beta: f64) -> Self {
        Self {
            beta: Some(beta),
            ..Self::simple(alpha)
        }
    }

    pub fn triple(alpha: f64, beta: f64, gamma: f64, seasonal_period: usize) -> Self {
        Self {
            alpha,
            beta: Some(beta),
            gamma: Some(gamma),
            seasonal_period: Some(seasonal_period),
        }
    }

    /// Fallback parameters for the given recursion
    pub fn defaults(kind: SmoothingKind, seasonal_period: Option<usize>) -> Self {
        match (kind, seasonal_period) {
            (SmoothingKind::Triple, Some(period)) => {
                Self::triple(DEFAULT_ALPHA, DEFAULT_BETA, DEFAULT_GAMMA, period)
            }
            (SmoothingKind::Simple, _) => Self::simple(DEFAULT_ALPHA),
            _ => Self::double(DEFAULT_ALPHA, DEFAULT_BETA),
        }
    }

    /// The recursion these parameters describe
    pub fn kind(&self) -> SmoothingKind {
        match (self.beta, self.gamma, self.seasonal_period) {
            (Some(_), Some(_), Some(_)) => SmoothingKind::Triple,
            (Some(_), _, _) => SmoothingKind::Double,
            _ => SmoothingKind::Simple,
        }
    }

    /// Check every coefficient lies strictly between 0 and 1
    pub fn validate(&self) -> Result<()> {
        check_coefficient("alpha", self.alpha)?;
        if let Some(beta) = self.beta {
            check_coefficient("beta", beta)?;
        }
        if let Some(gamma) = self.gamma {
            check_coefficient("gamma", gamma)?;
        }
        if let Some(period) = self.seasonal_period {
            if period < 2 {
                return Err(ForecastError::InvalidParameter(format!(
                    "Seasonal period must be at least 2, got {}",
                    period
                )));
            }
        }
        Ok(())
    }
}

fn check_coefficient(name: &str, value: f64) -> Result<()> {
    if !(value > 0.0 && value < 1.0) {
        return Err(ForecastError::InvalidParameter(format!(
            "{} must be between 0 and 1 (exclusive), got {}",
            name, value
        )));
    }
    Ok(())
}

/// Level, trend and seasonal indices after some number of observations
#[derive(Debug, Clone, PartialEq)]
pub struct SmoothingState {
    pub level: f64,
    pub trend: f64,
    pub seasonal: Vec<f64>,
}

/// One of the three recursions with its coefficients
#[derive(Debug, Clone, Copy)]
enum Recursion {
    Simple {
        alpha: f64,
    },
    Double {
        alpha: f64,
        beta: f64,
    },
    Triple {
        alpha: f64,
        beta: f64,
        gamma: f64,
        period: usize,
        mode: SeasonalMode,
    },
}

impl Recursion {
    fn from_params(params: &SmoothingParams, mode: SeasonalMode) -> Self {
        match (params.beta, params.gamma, params.seasonal_period) {
            (Some(beta), Some(gamma), Some(period)) => Recursion::Triple {
                alpha: params.alpha,
                beta,
                gamma,
                period,
                mode,
            },
            (Some(beta), _, _) => Recursion::Double {
                alpha: params.alpha,
                beta,
            },
            _ => Recursion::Simple {
                alpha: params.alpha,
            },
        }
    }

    fn min_points(&self) -> usize {
        match self {
            Recursion::Triple { period, .. } => 2 * period,
            _ => 2,
        }
    }

    /// Initial state and the index of the first observation it predicts
    fn initialize(&self, values: &[f64]) -> (SmoothingState, usize) {
        match *self {
            Recursion::Simple { .. } => (
                SmoothingState {
                    level: values[0],
                    trend: 0.0,
                    seasonal: Vec::new(),
                },
                1,
            ),
            Recursion::Double { .. } => (
                SmoothingState {
                    level: values[0],
                    trend: values[1] - values[0],
                    seasonal: Vec::new(),
                },
                1,
            ),
            Recursion::Triple { period, mode, .. } => {
                (initial_seasonal_state(values, period, mode), period)
            }
        }
    }

    /// Forecast `h` steps ahead, where `next` is the index of the first
    /// observation not yet absorbed by `state`
    fn predict(&self, state: &SmoothingState, next: usize, h: usize) -> f64 {
        match *self {
            Recursion::Simple { .. } => state.level,
            Recursion::Double { .. } => state.level + h as f64 * state.trend,
            Recursion::Triple { period, mode, .. } => {
                let base = state.level + h as f64 * state.trend;
                let index = state.seasonal[(next + h - 1) % period];
                match mode {
                    SeasonalMode::Additive => base + index,
                    SeasonalMode::Multiplicative => base * index,
                }
            }
        }
    }

    /// Absorb observation `t` with value `y`
    fn update(&self, state: SmoothingState, t: usize, y: f64) -> SmoothingState {
        match *self {
            Recursion::Simple { alpha } => SmoothingState {
                level: alpha * y + (1.0 - alpha) * state.level,
                ..state
            },
            Recursion::Double { alpha, beta } => {
                let level = alpha * y + (1.0 - alpha) * (state.level + state.trend);
                let trend = beta * (level - state.level) + (1.0 - beta) * state.trend;
                SmoothingState {
                    level,
                    trend,
                    seasonal: state.seasonal,
                }
            }
            Recursion::Triple {
                alpha,
                beta,
                gamma,
                period,
                mode,
            } => {
                let idx = t % period;
                let index = state.seasonal[idx];
                let (deseasonalized, level) = match mode {
                    SeasonalMode::Additive => {
                        let level =
                            alpha * (y - index) + (1.0 - alpha) * (state.level + state.trend);
                        (y - level, level)
                    }
                    SeasonalMode::Multiplicative => {
                        let level = alpha * safe_ratio(y, index)
                            + (1.0 - alpha) * (state.level + state.trend);
                        (safe_ratio(y, level), level)
                    }
                };
                let trend = beta * (level - state.level) + (1.0 - beta) * state.trend;

                let mut seasonal = state.seasonal;
                seasonal[idx] = gamma * deseasonalized + (1.0 - gamma) * index;

                SmoothingState {
                    level,
                    trend,
                    seasonal,
                }
            }
        }
    }
}

fn safe_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator.abs() < DIVISION_EPSILON {
        numerator
    } else {
        numerator / denominator
    }
}

/// Level, trend and indices estimated from the first two full cycles.
///
/// The trend is the change between cycle means per step; each index averages
/// the detrended deviation (or ratio) at its position over both cycles. The
/// level is placed at the end of the first cycle.
fn initial_seasonal_state(values: &[f64], period: usize, mode: SeasonalMode) -> SmoothingState {
    let m = period as f64;
    let first_mean = values[..period].iter().sum::<f64>() / m;
    let second_mean = values[period..2 * period].iter().sum::<f64>() / m;
    let trend = (second_mean - first_mean) / m;
    let center = (m - 1.0) / 2.0;

    let seasonal = (0..period)
        .map(|i| {
            let offset = trend * (i as f64 - center);
            let first_base = first_mean + offset;
            let second_base = second_mean + offset;
            match mode {
                SeasonalMode::Additive => {
                    ((values[i] - first_base) + (values[i + period] - second_base)) / 2.0
                }
                SeasonalMode::Multiplicative => {
                    let ratio = |y: f64, base: f64| {
                        if base.abs() < DIVISION_EPSILON {
                            1.0
                        } else {
                            y / base
                        }
                    };
                    (ratio(values[i], first_base) + ratio(values[i + period], second_base)) / 2.0
                }
            }
        })
        .collect();

    SmoothingState {
        level: first_mean + trend * center,
        trend,
        seasonal,
    }
}

/// Result of running a smoothing recursion over a series
#[derive(Debug, Clone)]
pub struct SmoothingFit {
    params: SmoothingParams,
    recursion: Recursion,
    state: SmoothingState,
    /// Number of observations absorbed
    n: usize,
    /// One-step-ahead in-sample predictions, starting at `start`
    fitted: Vec<f64>,
    /// Index of the first observation with a prediction
    start: usize,
    metrics: ErrorMetrics,
}

impl SmoothingFit {
    pub fn params(&self) -> SmoothingParams {
        self.params
    }

    pub fn state(&self) -> &SmoothingState {
        &self.state
    }

    pub fn level(&self) -> f64 {
        self.state.level
    }

    pub fn trend(&self) -> f64 {
        self.state.trend
    }

    pub fn seasonal(&self) -> &[f64] {
        &self.state.seasonal
    }

    /// In-sample one-step-ahead predictions and the index they start at
    pub fn fitted(&self) -> (usize, &[f64]) {
        (self.start, &self.fitted)
    }

    /// In-sample error metrics of the one-step-ahead predictions
    pub fn metrics(&self) -> ErrorMetrics {
        self.metrics
    }

    /// Point forecasts for the next `periods` steps
    pub fn forecast_values(&self, periods: usize) -> Vec<f64> {
        (1..=periods)
            .map(|h| self.recursion.predict(&self.state, self.n, h))
            .collect()
    }
}

/// Run the recursion described by `params` over `values`
pub fn fit_smoothing(
    values: &[f64],
    params: &SmoothingParams,
    mode: SeasonalMode,
) -> Result<SmoothingFit> {
    params.validate()?;
    let recursion = Recursion::from_params(params, mode);

    let required = recursion.min_points();
    if values.len() < required {
        return Err(ForecastError::DataError(format!(
            "Need at least {} data points for {:?} exponential smoothing, got {}",
            required,
            params.kind(),
            values.len()
        )));
    }

    let (initial, start) = recursion.initialize(values);
    let (state, fitted) = values.iter().enumerate().skip(start).fold(
        (initial, Vec::with_capacity(values.len() - start)),
        |(state, mut fitted), (t, &y)| {
            fitted.push(recursion.predict(&state, t, 1));
            (recursion.update(state, t, y), fitted)
        },
    );

    let metrics = ErrorMetrics::from_pairs(&values[start..], &fitted)?;

    Ok(SmoothingFit {
        params: *params,
        recursion,
        state,
        n: values.len(),
        fitted,
        start,
        metrics,
    })
}

/// Simple exponential smoothing; requires `0 < alpha < 1` and 2 points
pub fn simple_exponential_smoothing(values: &[f64], alpha: f64) -> Result<SmoothingFit> {
    fit_smoothing(values, &SmoothingParams::simple(alpha), SeasonalMode::Additive)
}

/// Holt's linear trend method
pub fn double_exponential_smoothing(values: &[f64], alpha: f64, beta: f64) -> Result<SmoothingFit> {
    fit_smoothing(values, &SmoothingParams::double(alpha, beta), SeasonalMode::Additive)
}

/// Holt-Winters; requires at least two full seasonal cycles
pub fn triple_exponential_smoothing(
    values: &[f64],
    alpha: f64,
    beta: f64,
    gamma: f64,
    seasonal_period: usize,
    mode: SeasonalMode,
) -> Result<SmoothingFit> {
    fit_smoothing(
        values,
        &SmoothingParams::triple(alpha, beta, gamma, seasonal_period),
        mode,
    )
}

fn candidate_grid(
    kind: SmoothingKind,
    seasonal_period: Option<usize>,
) -> Result<Vec<SmoothingParams>> {
    let grid = match kind {
        SmoothingKind::Simple => FINE_GRID.iter().map(|&a| SmoothingParams::simple(a)).collect(),
        SmoothingKind::Double => FINE_GRID
            .iter()
            .flat_map(|&a| FINE_GRID.iter().map(move |&b| SmoothingParams::double(a, b)))
            .collect(),
        SmoothingKind::Triple => {
            let period = seasonal_period.ok_or_else(|| {
                ForecastError::InvalidParameter(
                    "Triple exponential smoothing needs a seasonal period".to_string(),
                )
            })?;
            COARSE_GRID
                .iter()
                .flat_map(|&a| {
                    COARSE_GRID.iter().flat_map(move |&b| {
                        COARSE_GRID
                            .iter()
                            .map(move |&g| SmoothingParams::triple(a, b, g, period))
                    })
                })
                .collect()
        }
    };
    Ok(grid)
}

/// Grid-search smoothing coefficients by holdout error.
///
/// The last 20% of the series (at least one point) is held out; every
/// candidate is fitted on the rest and scored by the MSE of its forecast over
/// the holdout. The first candidate with the lowest error wins.
pub fn optimize_params(
    values: &[f64],
    kind: SmoothingKind,
    seasonal_period: Option<usize>,
    mode: SeasonalMode,
) -> Result<SmoothingParams> {
    let holdout = holdout_size(values.len(), OPTIMIZER_HOLDOUT_RATIO, None);
    let (train, test) = train_test_split(values, holdout);
    if train.len() < 2 {
        return Err(ForecastError::DataError(format!(
            "Need at least 3 data points to optimize smoothing parameters, got {}",
            values.len()
        )));
    }

    candidate_grid(kind, seasonal_period)?
        .into_iter()
        .filter_map(|params| {
            let fit = fit_smoothing(train, &params, mode).ok()?;
            let forecast = fit.forecast_values(test.len());
            let mse = ErrorMetrics::from_pairs(test, &forecast).ok()?.mse;
            debug!(?params, mse, "smoothing candidate");
            mse.is_finite().then_some((params, mse))
        })
        .fold(None, |best: Option<(SmoothingParams, f64)>, (params, mse)| match best {
            Some((_, best_mse)) if best_mse <= mse => best,
            _ => Some((params, mse)),
        })
        .map(|(params, _)| params)
        .ok_or_else(|| {
            ForecastError::ForecastingError(format!(
                "No {:?} smoothing candidate could be fitted on {} training points",
                kind,
                train.len()
            ))
        })
}

/// Horizon scaling of the smoothing band: sqrt(h)
pub fn horizon_multiplier(h: usize) -> f64 {
    (h as f64).sqrt()
}

/// Exponential smoothing forecaster, with fixed or optimized coefficients
#[derive(Debug, Clone)]
pub struct ExponentialSmoothingModel {
    /// Name of the model
    name: String,
    kind: SmoothingKind,
    /// Fixed coefficients; optimized on the training series when absent
    params: Option<SmoothingParams>,
    seasonal_period: Option<usize>,
    mode: SeasonalMode,
}

/// Trained exponential smoothing model
#[derive(Debug, Clone)]
pub struct TrainedExponentialSmoothing {
    /// Name of the model
    name: String,
    fit: SmoothingFit,
    /// Last observed x
    last_x: f64,
    /// Variance of the training series
    series_variance: f64,
}

impl ExponentialSmoothingModel {
    /// Simple exponential smoothing with a fixed alpha
    pub fn simple(alpha: f64) -> Result<Self> {
        Self::with_params(SmoothingParams::simple(alpha), SeasonalMode::Additive)
    }

    /// Holt's method with fixed coefficients
    pub fn holt(alpha: f64, beta: f64) -> Result<Self> {
        Self::with_params(SmoothingParams::double(alpha, beta), SeasonalMode::Additive)
    }

    /// Holt-Winters with fixed coefficients
    pub fn holt_winters(
        alpha: f64,
        beta: f64,
        gamma: f64,
        seasonal_period: usize,
        mode: SeasonalMode,
    ) -> Result<Self> {
        Self::with_params(
            SmoothingParams::triple(alpha, beta, gamma, seasonal_period),
            mode,
        )
    }

    /// Fixed coefficients of any kind
    pub fn with_params(params: SmoothingParams, mode: SeasonalMode) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            name: model_name(params.kind()),
            kind: params.kind(),
            params: Some(params),
            seasonal_period: params.seasonal_period,
            mode,
        })
    }

    /// Coefficients chosen by [`optimize_params`] at training time
    pub fn optimized(
        kind: SmoothingKind,
        seasonal_period: Option<usize>,
        mode: SeasonalMode,
    ) -> Result<Self> {
        if kind == SmoothingKind::Triple {
            match seasonal_period {
                Some(period) if period >= 2 => {}
                _ => {
                    return Err(ForecastError::InvalidParameter(
                        "Triple exponential smoothing needs a seasonal period of at least 2"
                            .to_string(),
                    ))
                }
            }
        }
        Ok(Self {
            name: model_name(kind),
            kind,
            params: None,
            seasonal_period,
            mode,
        })
    }

    pub fn kind(&self) -> SmoothingKind {
        self.kind
    }
}

fn model_name(kind: SmoothingKind) -> String {
    match kind {
        SmoothingKind::Simple => "Simple Exponential Smoothing",
        SmoothingKind::Double => "Holt Linear Trend",
        SmoothingKind::Triple => "Holt-Winters",
    }
    .to_string()
}

impl ForecastModel for ExponentialSmoothingModel {
    type Trained = TrainedExponentialSmoothing;

    fn train(&self, points: &[DataPoint]) -> Result<Self::Trained> {
        require_points(points, &self.name)?;
        let points = sorted_by_x(points);
        let values: Vec<f64> = points.iter().map(|p| p.y).collect();

        if let Some(period) = self.seasonal_period.filter(|_| self.kind == SmoothingKind::Triple) {
            if values.len() < 2 * period {
                return Err(ForecastError::DataError(format!(
                    "Seasonal period {} needs at least {} data points, got {}",
                    period,
                    2 * period,
                    values.len()
                )));
            }
        }

        let params = match self.params {
            Some(params) => params,
            None => match optimize_params(&values, self.kind, self.seasonal_period, self.mode) {
                Ok(params) => params,
                Err(err) => {
                    let params = SmoothingParams::defaults(self.kind, self.seasonal_period);
                    warn!(
                        %err,
                        ?params,
                        "smoothing optimization failed, using default coefficients"
                    );
                    params
                }
            },
        };

        let fit = fit_smoothing(&values, &params, self.mode)?;
        debug!(?params, mse = fit.metrics().mse, "{} fitted", self.name);

        Ok(TrainedExponentialSmoothing {
            name: self.name.clone(),
            fit,
            last_x: points[points.len() - 1].x,
            series_variance: variance(&values),
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TrainedExponentialSmoothing {
    pub fn fit(&self) -> &SmoothingFit {
        &self.fit
    }
}

impl TrainedForecastModel for TrainedExponentialSmoothing {
    fn forecast(&self, periods: usize, confidence_level: f64) -> Result<ModelForecast> {
        validate_periods(periods)?;
        let z = z_score(confidence_level)?;
        let spread = self.fit.metrics().mse.sqrt();

        let points = horizon_points(self.last_x, &self.fit.forecast_values(periods));
        let half_widths: Vec<f64> = (1..=periods)
            .map(|h| z * spread * horizon_multiplier(h))
            .collect();

        Ok(ModelForecast {
            interval: ConfidenceInterval::symmetric(&points, &half_widths, confidence_level)?,
            points,
            accuracy: self.accuracy(),
            parameters: self.parameters(),
        })
    }

    /// `1 - MSE / variance` of the training series, clamped to [0, 1]
    fn accuracy(&self) -> f64 {
        let mse = self.fit.metrics().mse;
        if self.series_variance < 1e-10 {
            return if mse < 1e-10 { 1.0 } else { 0.0 };
        }
        (1.0 - mse / self.series_variance).clamp(0.0, 1.0)
    }

    fn parameters(&self) -> ModelParameters {
        ModelParameters::Smoothing {
            params: self.fit.params(),
            metrics: self.fit.metrics(),
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}
