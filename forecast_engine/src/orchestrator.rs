//! Method selection and the dated forecast entry points
//!
//! A [`Forecaster`] converts a dated series onto a day index, inspects it for
//! trend, seasonality and stationarity, runs one of the three models and maps
//! the result back onto calendar dates.

use crate::config::{EngineConfig, ForecastMethod, ForecastOptions};
use crate::data::{convert_back_to_dates, convert_to_regression_index, TimeSeriesPoint};
use crate::error::{ForecastError, Result};
use crate::metrics::mean_absolute_error;
use crate::models::arima::ArimaModel;
use crate::models::exponential_smoothing::{
    ExponentialSmoothingModel, SmoothingKind, OPTIMIZER_HOLDOUT_RATIO,
};
use crate::models::linear_regression::LinearRegressionModel;
use crate::models::{
    ConfidenceInterval, ForecastModel, ModelForecast, ModelParameters, TrainedForecastModel,
};
use crate::utils::holdout_size;
use serde::{Deserialize, Serialize};
use series_math::diagnostics::{
    check_stationarity_with, detect_seasonal_period_with, detect_seasonality_with,
    detect_trend_with,
};
use series_math::DataPoint;
use tracing::{debug, info, warn};

/// What the detection heuristics found in a series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesCharacteristics {
    pub has_trend: bool,
    pub has_seasonality: bool,
    pub is_stationary: bool,
    /// Present only when the series is seasonal
    pub seasonal_period: Option<usize>,
}

impl SeriesCharacteristics {
    /// Apply the caller's seasonality overrides
    pub fn with_overrides(mut self, options: &ForecastOptions) -> Self {
        if let Some(seasonal) = options.seasonality {
            self.has_seasonality = seasonal;
        }
        self.seasonal_period = match (self.has_seasonality, options.seasonal_period) {
            (false, _) => None,
            (true, Some(period)) => Some(period),
            (true, None) => self.seasonal_period,
        };
        self
    }
}

/// A dated forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastResult {
    /// The input series, sorted by date
    pub original_data: Vec<TimeSeriesPoint>,
    /// One point per forecast day after the last input date
    pub forecast_data: Vec<TimeSeriesPoint>,
    /// The method that produced the forecast, never `Auto`
    pub method: ForecastMethod,
    /// Model-specific goodness of fit in [0, 1]
    pub accuracy: f64,
    pub confidence_interval: Option<ConfidenceInterval<TimeSeriesPoint>>,
    pub parameters: Option<ModelParameters>,
}

impl ForecastResult {
    pub fn values(&self) -> Vec<f64> {
        self.forecast_data.iter().map(|p| p.value).collect()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Forecasting engine with shared configuration
#[derive(Debug, Clone, Default)]
pub struct Forecaster {
    config: EngineConfig,
}

impl Forecaster {
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run the detection heuristics on regression samples
    pub fn analyze(&self, points: &[DataPoint]) -> SeriesCharacteristics {
        let thresholds = &self.config.thresholds;
        let values: Vec<f64> = points.iter().map(|p| p.y).collect();
        let has_seasonality = detect_seasonality_with(points, thresholds);

        SeriesCharacteristics {
            has_trend: detect_trend_with(points, thresholds),
            has_seasonality,
            is_stationary: check_stationarity_with(&values, thresholds),
            seasonal_period: has_seasonality
                .then(|| detect_seasonal_period_with(points, thresholds)),
        }
    }

    /// Detection with the caller's overrides applied. Seasonality forced on
    /// without a period takes the detected or default period.
    pub fn characterize(
        &self,
        points: &[DataPoint],
        options: &ForecastOptions,
    ) -> SeriesCharacteristics {
        let mut characteristics = self.analyze(points).with_overrides(options);
        if characteristics.has_seasonality && characteristics.seasonal_period.is_none() {
            characteristics.seasonal_period =
                Some(detect_seasonal_period_with(points, &self.config.thresholds));
        }
        characteristics
    }

    /// Forecast with the requested method, or a selected one for `Auto`
    pub fn forecast(
        &self,
        series: &[TimeSeriesPoint],
        options: &ForecastOptions,
    ) -> Result<ForecastResult> {
        validate_request(series, options)?;
        let (points, origin) = convert_to_regression_index(series)?;
        let characteristics = self.characterize(&points, options);

        let method = match options.method {
            ForecastMethod::Auto => select_best_method(&characteristics),
            method => method,
        };
        debug!(?characteristics, %method, "forecasting {} points", points.len());

        let forecast = self.run_method(
            method,
            &points,
            &characteristics,
            options.periods,
            options.confidence_level,
        )?;
        info!(%method, accuracy = forecast.accuracy, "forecast complete");

        Ok(ForecastResult {
            original_data: convert_back_to_dates(&points, origin),
            forecast_data: convert_back_to_dates(&forecast.points, origin),
            method,
            accuracy: forecast.accuracy,
            confidence_interval: options
                .confidence_interval
                .then(|| forecast.interval.map_points(|p| convert_back_to_dates(p, origin))),
            parameters: Some(forecast.parameters),
        })
    }

    /// Try every method on a holdout and forecast with the lowest MAE.
    ///
    /// The last `holdout_ratio` of the series (at least one point, at most
    /// `max_holdout`) is held out. Each method forecasts it from the rest; a
    /// method that fails scores infinity. The winner is re-run on the full
    /// series.
    pub fn forecast_with_best_method(
        &self,
        series: &[TimeSeriesPoint],
        options: &ForecastOptions,
    ) -> Result<ForecastResult> {
        validate_request(series, options)?;
        let (points, _) = convert_to_regression_index(series)?;

        let test_size = holdout_size(
            points.len(),
            self.config.holdout_ratio,
            Some(self.config.max_holdout),
        );
        if points.len() < test_size + 2 {
            warn!(
                points = points.len(),
                "series too short to compare methods, selecting from characteristics"
            );
            let auto = ForecastOptions {
                method: ForecastMethod::Auto,
                ..options.clone()
            };
            return self.forecast(series, &auto);
        }

        let (train, test) = points.split_at(points.len() - test_size);
        let actual: Vec<f64> = test.iter().map(|p| p.y).collect();
        let characteristics = self.characterize(train, options);

        let (best, score) = ForecastMethod::CONCRETE
            .iter()
            .map(|&method| {
                let score = self
                    .run_method(
                        method,
                        train,
                        &characteristics,
                        test_size,
                        options.confidence_level,
                    )
                    .and_then(|forecast| mean_absolute_error(&actual, &forecast.values()));
                let score = match score {
                    Ok(mae) if mae.is_finite() => mae,
                    Ok(_) => f64::INFINITY,
                    Err(err) => {
                        debug!(%method, %err, "method failed on holdout");
                        f64::INFINITY
                    }
                };
                debug!(%method, mae = score, "holdout score");
                (method, score)
            })
            .fold(
                (ForecastMethod::Auto, f64::INFINITY),
                |best, candidate| if candidate.1 < best.1 { candidate } else { best },
            );

        if !score.is_finite() {
            return Err(ForecastError::ForecastingError(
                "All forecasting methods failed on the holdout".to_string(),
            ));
        }
        info!(method = %best, mae = score, "best method on holdout");

        let chosen = ForecastOptions {
            method: best,
            ..options.clone()
        };
        self.forecast(series, &chosen)
    }

    fn run_method(
        &self,
        method: ForecastMethod,
        points: &[DataPoint],
        characteristics: &SeriesCharacteristics,
        periods: usize,
        confidence_level: f64,
    ) -> Result<ModelForecast> {
        match method {
            ForecastMethod::Linear => LinearRegressionModel::new()
                .train(points)?
                .forecast(periods, confidence_level),
            ForecastMethod::ExpSmoothing => {
                let (kind, period) = smoothing_variant(characteristics, points.len());
                ExponentialSmoothingModel::optimized(kind, period, self.config.seasonal_mode)?
                    .train(points)?
                    .forecast(periods, confidence_level)
            }
            ForecastMethod::Arima => ArimaModel::auto(self.config.arima)
                .train(points)?
                .forecast(periods, confidence_level),
            ForecastMethod::Auto => {
                self.run_method(
                    select_best_method(characteristics),
                    points,
                    characteristics,
                    periods,
                    confidence_level,
                )
            }
        }
    }
}

/// Non-stationary or seasonal series go to ARIMA, trending ones to
/// exponential smoothing, the rest to a trend line
pub fn select_best_method(characteristics: &SeriesCharacteristics) -> ForecastMethod {
    if !characteristics.is_stationary || characteristics.has_seasonality {
        ForecastMethod::Arima
    } else if characteristics.has_trend {
        ForecastMethod::ExpSmoothing
    } else {
        ForecastMethod::Linear
    }
}

/// Holt-Winters needs two full cycles in the part the optimizer trains on
fn smoothing_variant(
    characteristics: &SeriesCharacteristics,
    len: usize,
) -> (SmoothingKind, Option<usize>) {
    let optimizer_train = len - holdout_size(len, OPTIMIZER_HOLDOUT_RATIO, None).min(len);
    match characteristics.seasonal_period {
        Some(period) if characteristics.has_seasonality && optimizer_train >= 2 * period => {
            (SmoothingKind::Triple, Some(period))
        }
        _ if characteristics.has_trend => (SmoothingKind::Double, None),
        _ => (SmoothingKind::Simple, None),
    }
}

fn validate_request(series: &[TimeSeriesPoint], options: &ForecastOptions) -> Result<()> {
    if series.len() < 2 {
        return Err(ForecastError::ValidationError(format!(
            "At least 2 data points are required, got {}",
            series.len()
        )));
    }
    options.validate()
}

/// Forecast with the default engine configuration
pub fn forecast(series: &[TimeSeriesPoint], options: &ForecastOptions) -> Result<ForecastResult> {
    Forecaster::default().forecast(series, options)
}

/// Holdout comparison with the default engine configuration
pub fn forecast_with_best_method(
    series: &[TimeSeriesPoint],
    options: &ForecastOptions,
) -> Result<ForecastResult> {
    Forecaster::default().forecast_with_best_method(series, options)
}

/// Detection with the default thresholds
pub fn analyze(points: &[DataPoint]) -> SeriesCharacteristics {
    Forecaster::default().analyze(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::daily_series;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    fn characteristics(
        has_trend: bool,
        has_seasonality: bool,
        is_stationary: bool,
    ) -> SeriesCharacteristics {
        SeriesCharacteristics {
            has_trend,
            has_seasonality,
            is_stationary,
            seasonal_period: has_seasonality.then_some(7),
        }
    }

    #[rstest]
    #[case(false, false, true, ForecastMethod::Linear)]
    #[case(true, false, true, ForecastMethod::ExpSmoothing)]
    #[case(true, false, false, ForecastMethod::Arima)]
    #[case(false, true, true, ForecastMethod::Arima)]
    fn test_select_best_method(
        #[case] trend: bool,
        #[case] seasonal: bool,
        #[case] stationary: bool,
        #[case] expected: ForecastMethod,
    ) {
        assert_eq!(
            select_best_method(&characteristics(trend, seasonal, stationary)),
            expected
        );
    }

    #[test]
    fn test_overrides() {
        let detected = characteristics(false, false, true);
        let options = ForecastOptions::default().with_seasonality(5);
        let overridden = detected.with_overrides(&options);
        assert!(overridden.has_seasonality);
        assert_eq!(overridden.seasonal_period, Some(5));

        let off = ForecastOptions {
            seasonality: Some(false),
            ..ForecastOptions::default()
        };
        let cleared = characteristics(false, true, true).with_overrides(&off);
        assert_eq!(cleared.seasonal_period, None);
    }

    #[test]
    fn test_forced_seasonality_gets_a_period() {
        let points: Vec<DataPoint> = (0..30)
            .map(|x| DataPoint::new(x as f64, 10.0 + 2.0 * x as f64))
            .collect();
        let options = ForecastOptions {
            seasonality: Some(true),
            ..ForecastOptions::default()
        };
        let forecaster = Forecaster::default();

        assert_eq!(forecaster.analyze(&points).seasonal_period, None);
        let found = forecaster.characterize(&points, &options);
        assert!(found.has_seasonality);
        assert_eq!(found.seasonal_period, Some(12));
    }

    #[test]
    fn test_smoothing_variant() {
        let seasonal = characteristics(true, true, true);
        assert_eq!(smoothing_variant(&seasonal, 20), (SmoothingKind::Triple, Some(7)));
        // 15 points keep 12 for training, less than two weekly cycles
        assert_eq!(smoothing_variant(&seasonal, 15), (SmoothingKind::Double, None));
        assert_eq!(
            smoothing_variant(&characteristics(false, false, true), 20),
            (SmoothingKind::Simple, None)
        );
    }

    #[test]
    fn test_analyze_linear_trend() {
        let points: Vec<DataPoint> = (0..30)
            .map(|x| DataPoint::new(x as f64, 10.0 + 2.0 * x as f64))
            .collect();
        let found = analyze(&points);
        assert!(found.has_trend);
        assert!(!found.is_stationary);
    }

    #[test]
    fn test_forecast_requires_two_points() {
        let series = daily_series(start(), &[1.0]);
        let result = forecast(&series, &ForecastOptions::new(ForecastMethod::Linear, 3));
        assert!(matches!(result, Err(ForecastError::ValidationError(_))));
    }

    #[test]
    fn test_interval_omitted_on_request() {
        let series = daily_series(start(), &[1.0, 2.0, 4.0, 3.0, 5.0]);
        let options = ForecastOptions::new(ForecastMethod::Linear, 2).without_interval();
        let result = forecast(&series, &options).unwrap();
        assert!(result.confidence_interval.is_none());
        assert_eq!(result.forecast_data.len(), 2);
    }

    #[test]
    fn test_auto_never_reported() {
        let series = daily_series(start(), &[3.0, 4.0, 3.5, 4.2, 3.9, 4.1, 3.8, 4.0]);
        let result = forecast(&series, &ForecastOptions::default()).unwrap();
        assert_ne!(result.method, ForecastMethod::Auto);
    }

    #[test]
    fn test_invalid_engine_config() {
        let config = EngineConfig {
            max_holdout: 0,
            ..EngineConfig::default()
        };
        assert!(matches!(
            Forecaster::new(config),
            Err(ForecastError::ConfigError(_))
        ));
    }
}
