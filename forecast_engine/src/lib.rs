//! # Forecast Engine
//!
//! A Rust library for univariate time series forecasting on daily data.
//!
//! ## Features
//!
//! - Date-indexed series with conversion to and from a day index
//! - Forecasting models (Linear Regression, Exponential Smoothing, ARIMA)
//! - Trend, seasonality and stationarity detection for automatic method choice
//! - Holdout comparison of all methods by mean absolute error
//! - Confidence bands at any level in (0, 1)
//!
//! ## Methods
//!
//! The caller picks a method through [`ForecastMethod`]:
//!
//! ```rust
//! pub enum ForecastMethod {
//!     Linear,
//!     ExpSmoothing,
//!     Arima,
//!     Auto,
//! }
//! ```
//!
//! `Auto` sends non-stationary or seasonal series to ARIMA, trending ones to
//! exponential smoothing and everything else to a least squares trend line.
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::NaiveDate;
//! use forecast_engine::data::daily_series;
//! use forecast_engine::{forecast, ForecastMethod, ForecastOptions};
//!
//! let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let series = daily_series(start, &[15.0, 18.0, 12.0, 20.0, 22.0, 16.0, 10.0]);
//!
//! let options = ForecastOptions::new(ForecastMethod::Linear, 3);
//! let result = forecast(&series, &options)?;
//!
//! assert_eq!(result.forecast_data.len(), 3);
//! assert!(result.confidence_interval.is_some());
//! # Ok::<(), forecast_engine::ForecastError>(())
//! ```

pub mod config;
pub mod data;
pub mod error;
pub mod metrics;
pub mod models;
pub mod orchestrator;
pub mod utils;

// Re-export commonly used types
pub use crate::config::{EngineConfig, ForecastMethod, ForecastOptions};
pub use crate::data::TimeSeriesPoint;
pub use crate::error::{ForecastError, Result};
pub use crate::models::{ForecastModel, ModelParameters, TrainedForecastModel};
pub use crate::orchestrator::{
    analyze, forecast, forecast_with_best_method, select_best_method, ForecastResult, Forecaster,
    SeriesCharacteristics,
};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
