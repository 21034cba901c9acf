//! # Timecast
//!
//! Workspace facade over the two forecasting crates:
//!
//! - [`series_math`]: linear solver, autocorrelation, least squares and the
//!   detection heuristics
//! - [`forecast_engine`]: the models, method selection and dated forecasts
//!
//! ## Example
//!
//! ```
//! use chrono::NaiveDate;
//! use timecast_workspace::{forecast, daily_series, ForecastMethod, ForecastOptions};
//!
//! let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
//! let series = daily_series(start, &[4.0, 5.0, 6.5, 7.0, 8.5]);
//!
//! let result = forecast(&series, &ForecastOptions::new(ForecastMethod::Linear, 2)).unwrap();
//! assert_eq!(result.method, ForecastMethod::Linear);
//! assert_eq!(result.forecast_data[0].date, NaiveDate::from_ymd_opt(2024, 3, 6).unwrap());
//! ```

pub use forecast_engine;
pub use series_math;

pub use forecast_engine::data::daily_series;
pub use forecast_engine::{
    forecast, forecast_with_best_method, EngineConfig, ForecastError, ForecastMethod,
    ForecastOptions, ForecastResult, Forecaster, TimeSeriesPoint,
};

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_facade_forecast() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let series = daily_series(start, &[1.0, 2.0, 3.0, 4.0]);
        let result = forecast(&series, &ForecastOptions::new(ForecastMethod::Linear, 1)).unwrap();
        assert!((result.values()[0] - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_math_reexport() {
        let fit = series_math::regression::fit_linear(&[
            series_math::DataPoint::new(0.0, 1.0),
            series_math::DataPoint::new(1.0, 3.0),
        ])
        .unwrap();
        assert!((fit.slope - 2.0).abs() < 1e-12);
    }
}
