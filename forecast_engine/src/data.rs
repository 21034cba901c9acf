//! Date-indexed series and their conversion to regression samples

use crate::error::{ForecastError, Result};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use series_math::DataPoint;

/// A single dated observation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    pub date: NaiveDate,
    pub value: f64,
}

impl TimeSeriesPoint {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// Sort a series ascending by date, returning a new vector
pub fn sort_by_date(series: &[TimeSeriesPoint]) -> Vec<TimeSeriesPoint> {
    let mut sorted = series.to_vec();
    sorted.sort_by_key(|p| p.date);
    sorted
}

/// Build a series from a start date and consecutive daily values
pub fn daily_series(start: NaiveDate, values: &[f64]) -> Vec<TimeSeriesPoint> {
    values
        .iter()
        .enumerate()
        .map(|(i, &value)| TimeSeriesPoint::new(start + Duration::days(i as i64), value))
        .collect()
}

/// Convert a dated series into regression samples.
///
/// The series is sorted first; `x` is the number of days since the earliest
/// date. Returns the samples together with that origin date.
pub fn convert_to_regression_index(
    series: &[TimeSeriesPoint],
) -> Result<(Vec<DataPoint>, NaiveDate)> {
    let sorted = sort_by_date(series);
    let origin = sorted
        .first()
        .map(|p| p.date)
        .ok_or_else(|| ForecastError::DataError("Empty time series data".to_string()))?;

    let points = sorted
        .iter()
        .map(|p| DataPoint::new((p.date - origin).num_days() as f64, p.value))
        .collect();

    Ok((points, origin))
}

/// Map regression samples back onto calendar dates, one day per unit of `x`.
pub fn convert_back_to_dates(points: &[DataPoint], origin: NaiveDate) -> Vec<TimeSeriesPoint> {
    points
        .iter()
        .map(|p| TimeSeriesPoint::new(origin + Duration::days(p.x.round() as i64), p.y))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_regression_index_starts_at_zero() {
        let series = vec![
            TimeSeriesPoint::new(date("2024-03-03"), 3.0),
            TimeSeriesPoint::new(date("2024-03-01"), 1.0),
            TimeSeriesPoint::new(date("2024-03-02"), 2.0),
        ];

        let (points, origin) = convert_to_regression_index(&series).unwrap();
        assert_eq!(origin, date("2024-03-01"));
        assert_eq!(
            points,
            vec![
                DataPoint::new(0.0, 1.0),
                DataPoint::new(1.0, 2.0),
                DataPoint::new(2.0, 3.0),
            ]
        );
    }

    #[test]
    fn test_round_trip_with_gaps() {
        let series = vec![
            TimeSeriesPoint::new(date("2023-12-30"), 5.0),
            TimeSeriesPoint::new(date("2024-01-02"), 6.5),
            TimeSeriesPoint::new(date("2024-02-29"), -1.0),
        ];

        let (points, origin) = convert_to_regression_index(&series).unwrap();
        assert_eq!(points[2].x, 61.0);
        assert_eq!(convert_back_to_dates(&points, origin), series);
    }

    #[test]
    fn test_empty_series() {
        assert!(convert_to_regression_index(&[]).is_err());
    }

    #[test]
    fn test_daily_series() {
        let series = daily_series(date("2024-01-31"), &[1.0, 2.0]);
        assert_eq!(series[1].date, date("2024-02-01"));
    }
}
