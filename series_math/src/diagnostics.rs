//! Trend, seasonality and stationarity heuristics
//!
//! These are cheap triage checks used to route a series to a model family,
//! not statistical tests. The trend threshold in particular is an absolute
//! slope in units of value per day, so its meaning depends on the scale of
//! the series.

use crate::regression::fit_linear;
use crate::statistics::{autocorrelation, mean, variance};
use crate::{sorted_by_x, DataPoint};
use serde::{Deserialize, Serialize};

/// Minimum absolute OLS slope for a series to count as trending.
pub const TREND_SLOPE_THRESHOLD: f64 = 0.1;

/// Minimum ACF value of a local peak for a series to count as seasonal.
pub const SEASONALITY_ACF_THRESHOLD: f64 = 0.3;

/// Maximum relative change of the mean between halves of a stationary series.
pub const STATIONARITY_MEAN_THRESHOLD: f64 = 0.2;

/// Maximum relative change of the variance between halves of a stationary series.
pub const STATIONARITY_VARIANCE_THRESHOLD: f64 = 0.4;

/// Seasonality detection needs at least this many points.
pub const MIN_SEASONALITY_POINTS: usize = 12;

/// Upper bound on the lags searched for a seasonal peak.
pub const MAX_SEASONAL_LAG: usize = 36;

/// Series shorter than this are assumed stationary.
pub const MIN_STATIONARITY_POINTS: usize = 8;

/// Period reported when no seasonal peak is found.
pub const DEFAULT_SEASONAL_PERIOD: usize = 12;

/// Fallback period for series too short to hold two default cycles.
pub const SHORT_SERIES_SEASONAL_PERIOD: usize = 4;

/// Tunable thresholds for the detection heuristics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionThresholds {
    pub trend_slope: f64,
    pub seasonality_acf: f64,
    pub stationarity_mean: f64,
    pub stationarity_variance: f64,
}

impl Default for DetectionThresholds {
    fn default() -> Self {
        Self {
            trend_slope: TREND_SLOPE_THRESHOLD,
            seasonality_acf: SEASONALITY_ACF_THRESHOLD,
            stationarity_mean: STATIONARITY_MEAN_THRESHOLD,
            stationarity_variance: STATIONARITY_VARIANCE_THRESHOLD,
        }
    }
}

/// Whether the OLS slope of the series exceeds the default trend threshold.
pub fn detect_trend(points: &[DataPoint]) -> bool {
    detect_trend_with(points, &DetectionThresholds::default())
}

pub fn detect_trend_with(points: &[DataPoint], thresholds: &DetectionThresholds) -> bool {
    match fit_linear(points) {
        Ok(fit) => fit.slope.abs() > thresholds.trend_slope,
        Err(_) => false,
    }
}

/// Whether the ACF has an interior local peak above the default threshold.
pub fn detect_seasonality(points: &[DataPoint]) -> bool {
    detect_seasonality_with(points, &DetectionThresholds::default())
}

pub fn detect_seasonality_with(points: &[DataPoint], thresholds: &DetectionThresholds) -> bool {
    !seasonal_peaks(points, thresholds).is_empty()
}

/// Lag of the strongest seasonal ACF peak.
///
/// Falls back to [`DEFAULT_SEASONAL_PERIOD`], or [`SHORT_SERIES_SEASONAL_PERIOD`]
/// for series with fewer than two default cycles, when no peak qualifies.
pub fn detect_seasonal_period(points: &[DataPoint]) -> usize {
    detect_seasonal_period_with(points, &DetectionThresholds::default())
}

pub fn detect_seasonal_period_with(
    points: &[DataPoint],
    thresholds: &DetectionThresholds,
) -> usize {
    seasonal_peaks(points, thresholds)
        .into_iter()
        .fold(None, |best: Option<(usize, f64)>, (lag, value)| match best {
            Some((_, best_value)) if best_value >= value => best,
            _ => Some((lag, value)),
        })
        .map(|(lag, _)| lag)
        .unwrap_or(if points.len() < 2 * DEFAULT_SEASONAL_PERIOD {
            SHORT_SERIES_SEASONAL_PERIOD
        } else {
            DEFAULT_SEASONAL_PERIOD
        })
}

/// Interior local ACF maxima above the threshold, as (lag, acf) pairs.
fn seasonal_peaks(points: &[DataPoint], thresholds: &DetectionThresholds) -> Vec<(usize, f64)> {
    let n = points.len();
    if n < MIN_SEASONALITY_POINTS {
        return Vec::new();
    }

    let values: Vec<f64> = sorted_by_x(points).iter().map(|p| p.y).collect();
    let max_lag = (n / 3).min(MAX_SEASONAL_LAG);
    let acf = autocorrelation(&values, max_lag);

    (2..acf.len().saturating_sub(1))
        .filter(|&lag| {
            acf[lag] > thresholds.seasonality_acf
                && acf[lag] > acf[lag - 1]
                && acf[lag] > acf[lag + 1]
        })
        .map(|lag| (lag, acf[lag]))
        .collect()
}

/// Compare the first and second half of the series with default thresholds.
pub fn check_stationarity(series: &[f64]) -> bool {
    check_stationarity_with(series, &DetectionThresholds::default())
}

/// Stationary when both the relative mean change and the relative variance
/// change between halves stay under their thresholds. A first half with a
/// near-zero mean or variance is compared on absolute change.
pub fn check_stationarity_with(series: &[f64], thresholds: &DetectionThresholds) -> bool {
    if series.len() < MIN_STATIONARITY_POINTS {
        return true;
    }

    let (first, second) = series.split_at(series.len() / 2);
    let mean_change = relative_change(mean(first), mean(second));
    let variance_change = relative_change(variance(first), variance(second));

    mean_change < thresholds.stationarity_mean && variance_change < thresholds.stationarity_variance
}

fn relative_change(before: f64, after: f64) -> f64 {
    let delta = (after - before).abs();
    if before.abs() < 1e-10 {
        delta
    } else {
        delta / before.abs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn points(values: &[f64]) -> Vec<DataPoint> {
        values
            .iter()
            .enumerate()
            .map(|(i, &y)| DataPoint::new(i as f64, y))
            .collect()
    }

    fn seasonal_values(period: usize, cycles: usize) -> Vec<f64> {
        (0..period * cycles)
            .map(|i| 50.0 + 10.0 * (2.0 * std::f64::consts::PI * i as f64 / period as f64).sin())
            .collect()
    }

    #[rstest]
    #[case(0.5, true)]
    #[case(-0.5, true)]
    #[case(0.05, false)]
    #[case(0.0, false)]
    fn test_detect_trend(#[case] slope: f64, #[case] expected: bool) {
        let values: Vec<f64> = (0..20).map(|i| 10.0 + slope * i as f64).collect();
        assert_eq!(detect_trend(&points(&values)), expected);
    }

    #[test]
    fn test_trend_threshold_is_configurable() {
        let values: Vec<f64> = (0..20).map(|i| 10.0 + 0.05 * i as f64).collect();
        let thresholds = DetectionThresholds {
            trend_slope: 0.01,
            ..DetectionThresholds::default()
        };
        assert!(detect_trend_with(&points(&values), &thresholds));
    }

    #[test]
    fn test_detect_seasonality() {
        assert!(detect_seasonality(&points(&seasonal_values(7, 8))));

        let linear: Vec<f64> = (0..40).map(|i| i as f64).collect();
        assert!(!detect_seasonality(&points(&linear)));
    }

    #[test]
    fn test_seasonality_requires_twelve_points() {
        let values = seasonal_values(3, 3);
        assert_eq!(values.len(), 9);
        assert!(!detect_seasonality(&points(&values)));
    }

    #[test]
    fn test_detect_seasonal_period() {
        assert_eq!(detect_seasonal_period(&points(&seasonal_values(7, 8))), 7);
        assert_eq!(detect_seasonal_period(&points(&seasonal_values(4, 10))), 4);
    }

    #[test]
    fn test_seasonal_period_defaults() {
        let short: Vec<f64> = (0..15).map(|i| i as f64).collect();
        assert_eq!(detect_seasonal_period(&points(&short)), 4);

        let long: Vec<f64> = (0..40).map(|i| i as f64).collect();
        assert_eq!(detect_seasonal_period(&points(&long)), 12);
    }

    #[test]
    fn test_check_stationarity() {
        let flat_noise = [10.0, 11.0, 9.0, 10.0, 11.0, 9.0, 10.0, 11.0, 9.0, 10.0];
        assert!(check_stationarity(&flat_noise));

        let ramp: Vec<f64> = (1..=20).map(|i| i as f64).collect();
        assert!(!check_stationarity(&ramp));
    }

    #[test]
    fn test_short_series_is_stationary() {
        assert!(check_stationarity(&[1.0, 100.0, 1000.0]));
    }

    #[test]
    fn test_zero_mean_first_half() {
        // First half mean is exactly zero: absolute changes are compared
        let series = [1.0, -1.0, 1.0, -1.0, 1.0, -1.0, 1.0, -1.0];
        assert!(check_stationarity(&series));
    }
}
