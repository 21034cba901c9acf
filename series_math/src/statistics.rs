//! Descriptive statistics and autocorrelation estimators
//!
//! Degenerate inputs (empty or constant series) return neutral values instead
//! of errors: 0 for moments, a zero autocorrelation function.

use crate::linalg::{self, FitOutcome};
use crate::Result;

/// Variance below this is treated as a constant series.
pub const VARIANCE_EPSILON: f64 = 1e-10;

/// Arithmetic mean, 0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population variance (divides by n), 0 for an empty slice.
pub fn variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64
}

/// Population standard deviation.
pub fn std_dev(values: &[f64]) -> f64 {
    variance(values).sqrt()
}

/// Sample autocorrelation for lags `0..=max_lag`.
///
/// Uses the biased estimator (both the lagged covariance and the variance are
/// divided by n). `max_lag` is capped at `n - 1`. A series with ~zero variance
/// yields all zeros, including lag 0.
pub fn autocorrelation(series: &[f64], max_lag: usize) -> Vec<f64> {
    let n = series.len();
    if n == 0 {
        return vec![0.0];
    }
    let max_lag = max_lag.min(n - 1);

    let m = mean(series);
    let centered: Vec<f64> = series.iter().map(|v| v - m).collect();
    let denom: f64 = centered.iter().map(|c| c * c).sum();

    if denom / (n as f64) < VARIANCE_EPSILON {
        return vec![0.0; max_lag + 1];
    }

    (0..=max_lag)
        .map(|lag| {
            let num: f64 = centered[lag..]
                .iter()
                .zip(centered.iter())
                .map(|(a, b)| a * b)
                .sum();
            num / denom
        })
        .collect()
}

/// Partial autocorrelation for lags `0..=max_lag`.
///
/// The value at lag k is the last coefficient of the order-k Yule-Walker
/// system. Lag 0 is 1 by convention; a singular system contributes 0.
pub fn partial_autocorrelation(series: &[f64], max_lag: usize) -> Result<Vec<f64>> {
    let acf = autocorrelation(series, max_lag);
    let max_lag = acf.len() - 1;

    let mut pacf = Vec::with_capacity(max_lag + 1);
    pacf.push(1.0);

    if acf[0] == 0.0 {
        pacf.extend(std::iter::repeat(0.0).take(max_lag));
        return Ok(pacf);
    }

    for k in 1..=max_lag {
        let toeplitz: Vec<Vec<f64>> = (0..k)
            .map(|i| (0..k).map(|j| acf[i.abs_diff(j)]).collect())
            .collect();
        let rhs = &acf[1..=k];

        let phi = match linalg::solve(&toeplitz, rhs)? {
            FitOutcome::Success(phi) => phi[k - 1],
            FitOutcome::Degenerate => 0.0,
        };
        pacf.push(phi);
    }

    Ok(pacf)
}
