//! Request options and engine configuration

use crate::error::{ForecastError, Result};
use crate::models::arima::ArimaSearch;
use crate::models::exponential_smoothing::SeasonalMode;
use crate::utils::{validate_confidence_level, validate_periods};
use serde::{Deserialize, Serialize};
use series_math::DetectionThresholds;
use std::fmt;
use std::str::FromStr;

/// Forecasting method requested by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForecastMethod {
    Linear,
    ExpSmoothing,
    Arima,
    /// Pick a method from the series characteristics
    #[default]
    Auto,
}

impl ForecastMethod {
    /// The concrete methods, in the order they are tried
    pub const CONCRETE: [ForecastMethod; 3] = [
        ForecastMethod::Linear,
        ForecastMethod::ExpSmoothing,
        ForecastMethod::Arima,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ForecastMethod::Linear => "linear",
            ForecastMethod::ExpSmoothing => "exp_smoothing",
            ForecastMethod::Arima => "arima",
            ForecastMethod::Auto => "auto",
        }
    }
}

impl fmt::Display for ForecastMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ForecastMethod {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "linear" => Ok(ForecastMethod::Linear),
            "exp_smoothing" => Ok(ForecastMethod::ExpSmoothing),
            "arima" => Ok(ForecastMethod::Arima),
            "auto" => Ok(ForecastMethod::Auto),
            other => Err(ForecastError::ValidationError(format!(
                "Unknown forecast method '{}', expected one of linear, exp_smoothing, arima, auto",
                other
            ))),
        }
    }
}

/// Per-call forecast options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ForecastOptions {
    pub method: ForecastMethod,
    /// Number of days to forecast
    pub periods: usize,
    /// Attach upper and lower bounds to the result
    pub confidence_interval: bool,
    pub confidence_level: f64,
    /// Overrides seasonality detection when set
    pub seasonality: Option<bool>,
    /// Overrides seasonal period detection when set
    pub seasonal_period: Option<usize>,
}

impl Default for ForecastOptions {
    fn default() -> Self {
        Self {
            method: ForecastMethod::Auto,
            periods: 7,
            confidence_interval: true,
            confidence_level: 0.95,
            seasonality: None,
            seasonal_period: None,
        }
    }
}

impl ForecastOptions {
    pub fn new(method: ForecastMethod, periods: usize) -> Self {
        Self {
            method,
            periods,
            ..Self::default()
        }
    }

    pub fn with_confidence_level(mut self, confidence_level: f64) -> Self {
        self.confidence_level = confidence_level;
        self
    }

    pub fn without_interval(mut self) -> Self {
        self.confidence_interval = false;
        self
    }

    pub fn with_seasonality(mut self, seasonal_period: usize) -> Self {
        self.seasonality = Some(true);
        self.seasonal_period = Some(seasonal_period);
        self
    }

    /// Check periods and confidence level
    pub fn validate(&self) -> Result<()> {
        validate_periods(self.periods)?;
        validate_confidence_level(self.confidence_level)?;
        if let Some(period) = self.seasonal_period {
            if period < 2 {
                return Err(ForecastError::ValidationError(format!(
                    "Seasonal period must be at least 2, got {}",
                    period
                )));
            }
        }
        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Settings shared by every forecast a [`crate::Forecaster`] makes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub thresholds: DetectionThresholds,
    pub arima: ArimaSearch,
    /// Share of the series held out when comparing methods
    pub holdout_ratio: f64,
    /// Upper bound on the held-out points when comparing methods
    pub max_holdout: usize,
    pub seasonal_mode: SeasonalMode,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            thresholds: DetectionThresholds::default(),
            arima: ArimaSearch::default(),
            holdout_ratio: 0.2,
            max_holdout: 5,
            seasonal_mode: SeasonalMode::Additive,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.holdout_ratio > 0.0 && self.holdout_ratio < 1.0) {
            return Err(ForecastError::ConfigError(format!(
                "Holdout ratio must be between 0 and 1, got {}",
                self.holdout_ratio
            )));
        }
        if self.max_holdout == 0 {
            return Err(ForecastError::ConfigError(
                "Maximum holdout must be positive".to_string(),
            ));
        }
        let t = &self.thresholds;
        let thresholds = [
            t.trend_slope,
            t.seasonality_acf,
            t.stationarity_mean,
            t.stationarity_variance,
        ];
        if thresholds.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(ForecastError::ConfigError(format!(
                "Detection thresholds must be finite and non-negative: {:?}",
                t
            )));
        }
        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
