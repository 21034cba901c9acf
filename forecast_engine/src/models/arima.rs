//! ARIMA (AutoRegressive Integrated Moving Average) forecasting
//!
//! The series is differenced `d` times, centered on its mean and fitted in
//! two stages: AR(p) by ordinary least squares, then MA(q) on the AR
//! residuals by iterative re-estimation. Moving-average terms follow the
//! Box-Jenkins sign convention `x_t = e_t - Σ θ_i e_{t-i}`.
//!
//! When the AR stage cannot be fitted (singular normal equations or too few
//! points) the model degrades to the differenced mean and says so in
//! [`ArimaParams::fallback`].

use crate::error::{ForecastError, Result};
use crate::models::{
    horizon_points, require_points, ConfidenceInterval, ForecastModel, ModelForecast,
    ModelParameters, TrainedForecastModel,
};
use crate::utils::{validate_periods, z_score};
use serde::{Deserialize, Serialize};
use series_math::linalg::{solve, FitOutcome};
use series_math::statistics::{autocorrelation, mean};
use series_math::{sorted_by_x, DataPoint};
use std::f64::consts::PI;
use tracing::{debug, warn};

/// Iteration cap of the MA re-estimation
pub const MA_MAX_ITERATIONS: usize = 50;
/// MA re-estimation stops once no coefficient moves more than this
pub const MA_TOLERANCE: f64 = 1e-6;
/// MA coefficients are kept inside (-0.99, 0.99)
pub const MA_COEFFICIENT_BOUND: f64 = 0.99;
/// Lower bound on the residual variance used in the likelihood
pub const MIN_RESIDUAL_VARIANCE: f64 = 1e-10;
/// The ACF counts as decayed once one of this many leading lags is inside
/// the `2 / sqrt(n)` band
pub const DIFFERENCING_ACF_LAGS: usize = 3;
/// Per-step growth of the forecast variance: sigma * sqrt(1 + 0.1 h)
pub const HORIZON_VARIANCE_GROWTH: f64 = 0.1;

/// ARIMA order (p, d, q)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArimaOrder {
    /// Autoregressive order
    pub p: usize,
    /// Differencing order
    pub d: usize,
    /// Moving average order
    pub q: usize,
}

impl ArimaOrder {
    pub fn new(p: usize, d: usize, q: usize) -> Self {
        Self { p, d, q }
    }
}

impl std::fmt::Display for ArimaOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ARIMA({},{},{})", self.p, self.d, self.q)
    }
}

/// Upper bounds of the automatic order search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArimaSearch {
    pub max_p: usize,
    pub max_d: usize,
    pub max_q: usize,
}

impl Default for ArimaSearch {
    fn default() -> Self {
        Self {
            max_p: 3,
            max_d: 2,
            max_q: 2,
        }
    }
}

/// Fitted ARIMA parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArimaParams {
    pub p: usize,
    pub d: usize,
    pub q: usize,
    pub ar_coefficients: Vec<f64>,
    pub ma_coefficients: Vec<f64>,
    /// Mean of the differenced series
    pub mean: f64,
    /// Residual variance
    pub sigma2: f64,
    pub aic: f64,
    pub bic: f64,
    /// True when the requested order could not be fitted and the
    /// differenced mean was used instead
    pub fallback: bool,
}

impl ArimaParams {
    pub fn order(&self) -> ArimaOrder {
        ArimaOrder::new(self.p, self.d, self.q)
    }
}

/// Lagged difference: `diff[t] = series[t + lag] - series[t]`
pub fn difference(series: &[f64], lag: usize) -> Vec<f64> {
    if lag == 0 || series.len() <= lag {
        return Vec::new();
    }
    series
        .iter()
        .zip(series[lag..].iter())
        .map(|(prev, next)| next - prev)
        .collect()
}

/// Difference `d` times with lag 1, keeping the last value of every level
/// above the result so forecasts can be integrated back
pub fn difference_levels(series: &[f64], d: usize) -> (Vec<f64>, Vec<f64>) {
    (0..d).fold(
        (series.to_vec(), Vec::with_capacity(d)),
        |(level, mut last_values), _| {
            if let Some(&last) = level.last() {
                last_values.push(last);
            }
            (difference(&level, 1), last_values)
        },
    )
}

/// Undo [`difference_levels`] on values that continue the differenced series
pub fn integrate(differenced: &[f64], last_values: &[f64]) -> Vec<f64> {
    last_values
        .iter()
        .rev()
        .fold(differenced.to_vec(), |values, &start| {
            values
                .iter()
                .scan(start, |acc, diff| {
                    *acc += diff;
                    Some(*acc)
                })
                .collect()
        })
}

/// Least squares AR(p) coefficients of a centered series.
///
/// Degenerate when the normal equations are singular or there are not more
/// regression rows than coefficients.
pub fn fit_ar(centered: &[f64], p: usize) -> Result<FitOutcome<Vec<f64>>> {
    if p == 0 {
        return Ok(FitOutcome::Success(Vec::new()));
    }
    if centered.len().saturating_sub(p) <= p {
        return Ok(FitOutcome::Degenerate);
    }

    let mut xtx = vec![vec![0.0; p]; p];
    let mut xty = vec![0.0; p];
    for t in p..centered.len() {
        for i in 0..p {
            let xi = centered[t - 1 - i];
            xty[i] += xi * centered[t];
            for j in 0..p {
                xtx[i][j] += xi * centered[t - 1 - j];
            }
        }
    }

    Ok(solve(&xtx, &xty)?)
}

/// AR residuals `x_t - Σ φ_i x_{t-i}` for `t >= p`
pub fn ar_residuals(centered: &[f64], coefficients: &[f64]) -> Vec<f64> {
    let p = coefficients.len();
    (p..centered.len())
        .map(|t| {
            let predicted: f64 = coefficients
                .iter()
                .enumerate()
                .map(|(i, phi)| phi * centered[t - 1 - i])
                .sum();
            centered[t] - predicted
        })
        .collect()
}

/// Innovations of an MA process: `e_t = x_t + Σ θ_i e_{t-i}`, with zero
/// innovations before the start
pub fn ma_residuals(series: &[f64], coefficients: &[f64]) -> Vec<f64> {
    let mut residuals = Vec::with_capacity(series.len());
    for (t, &x) in series.iter().enumerate() {
        let carried: f64 = coefficients
            .iter()
            .enumerate()
            .filter(|(i, _)| *i < t)
            .map(|(i, theta)| theta * residuals[t - 1 - i])
            .sum();
        residuals.push(x + carried);
    }
    residuals
}

/// Iterative MA(q) estimation.
///
/// Starting from zero, each pass recomputes the innovations under the current
/// coefficients and subtracts their autocorrelation at lags `1..=q`. The
/// first pass gives `θ_i = -ACF[i]`; later passes correct the coefficients
/// until the innovations carry no autocorrelation at those lags.
pub fn fit_ma(series: &[f64], q: usize) -> Vec<f64> {
    let mut theta = vec![0.0; q];
    if q == 0 {
        return theta;
    }

    for iteration in 0..MA_MAX_ITERATIONS {
        let residuals = ma_residuals(series, &theta);
        let acf = autocorrelation(&residuals, q);

        let updated: Vec<f64> = theta
            .iter()
            .enumerate()
            .map(|(i, t)| {
                let rho = acf.get(i + 1).copied().unwrap_or(0.0);
                (t - rho).clamp(-MA_COEFFICIENT_BOUND, MA_COEFFICIENT_BOUND)
            })
            .collect();

        let change = theta
            .iter()
            .zip(updated.iter())
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f64::max);
        theta = updated;

        if change < MA_TOLERANCE {
            debug!(iteration, ?theta, "MA estimation converged");
            break;
        }
    }
    theta
}

/// Residual variance with AIC and BIC of a Gaussian model with `k` parameters
fn information_criteria(residuals: &[f64], k: usize) -> (f64, f64, f64) {
    let m = residuals.len().max(1) as f64;
    let sigma2 = (residuals.iter().map(|e| e * e).sum::<f64>() / m).max(MIN_RESIDUAL_VARIANCE);
    let log_likelihood = -0.5 * m * ((2.0 * PI * sigma2).ln() + 1.0);
    let aic = -2.0 * log_likelihood + 2.0 * k as f64;
    let bic = -2.0 * log_likelihood + k as f64 * m.ln();
    (sigma2, aic, bic)
}

/// A fitted ARIMA model with the history its forecasts continue from
#[derive(Debug, Clone)]
pub struct ArimaFit {
    params: ArimaParams,
    /// Centered differenced series
    centered: Vec<f64>,
    /// Innovations aligned with `centered`, zero where undefined
    innovations: Vec<f64>,
    /// Last value of each differencing level
    last_values: Vec<f64>,
    /// AIC of the mean-only model on the same residual window
    null_aic: f64,
}

impl ArimaFit {
    pub fn params(&self) -> &ArimaParams {
        &self.params
    }

    pub fn order(&self) -> ArimaOrder {
        self.params.order()
    }

    pub fn is_fallback(&self) -> bool {
        self.params.fallback
    }

    fn residual_count(&self) -> usize {
        self.centered.len().saturating_sub(self.params.p).max(1)
    }

    /// `1 - exp((AIC - AIC_null) / 2m)`, clamped to [0, 1]
    pub fn accuracy(&self) -> f64 {
        let m = self.residual_count() as f64;
        let score = 1.0 - ((self.params.aic - self.null_aic) / (2.0 * m)).exp();
        if score.is_finite() {
            score.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Point forecasts on the original scale
    pub fn forecast_values(&self, periods: usize) -> Vec<f64> {
        let n = self.centered.len();
        let mut history = self.centered.clone();
        let mut innovations = self.innovations.clone();
        history.reserve(periods);
        innovations.reserve(periods);

        for t in n..n + periods {
            let ar: f64 = self
                .params
                .ar_coefficients
                .iter()
                .enumerate()
                .filter(|(i, _)| *i < t)
                .map(|(i, phi)| phi * history[t - 1 - i])
                .sum();
            let ma: f64 = self
                .params
                .ma_coefficients
                .iter()
                .enumerate()
                .filter(|(i, _)| *i < t)
                .map(|(i, theta)| theta * innovations[t - 1 - i])
                .sum();
            history.push(ar - ma);
            innovations.push(0.0);
        }

        let differenced: Vec<f64> = history[n..].iter().map(|x| x + self.params.mean).collect();
        integrate(&differenced, &self.last_values)
    }

    /// Half-widths `z * sigma * sqrt(1 + 0.1 h)`
    pub fn half_widths(&self, periods: usize, z: f64) -> Vec<f64> {
        let sigma = self.params.sigma2.sqrt();
        (1..=periods)
            .map(|h| z * sigma * (1.0 + HORIZON_VARIANCE_GROWTH * h as f64).sqrt())
            .collect()
    }
}

/// Differenced and centered view of a series
struct Prepared {
    centered: Vec<f64>,
    mean: f64,
    last_values: Vec<f64>,
}

fn prepare(values: &[f64], d: usize) -> Result<Prepared> {
    let (differenced, last_values) = difference_levels(values, d);
    if differenced.is_empty() {
        return Err(ForecastError::DataError(format!(
            "Differencing {} times leaves no data from {} points",
            d,
            values.len()
        )));
    }
    let mean = mean(&differenced);
    Ok(Prepared {
        centered: differenced.iter().map(|x| x - mean).collect(),
        mean,
        last_values,
    })
}

fn null_aic(centered: &[f64], window: usize) -> f64 {
    let start = centered.len().saturating_sub(window);
    information_criteria(&centered[start..], 1).1
}

/// Fit exactly the requested order.
///
/// `Degenerate` when the AR stage has no solution or too few residuals are
/// left for the MA stage.
pub fn fit_arma(values: &[f64], order: ArimaOrder) -> Result<FitOutcome<ArimaFit>> {
    let Prepared {
        centered,
        mean,
        last_values,
    } = prepare(values, order.d)?;

    let phi = match fit_ar(&centered, order.p)? {
        FitOutcome::Success(phi) => phi,
        FitOutcome::Degenerate => return Ok(FitOutcome::Degenerate),
    };
    let ar_resid = ar_residuals(&centered, &phi);
    if ar_resid.len() <= order.q {
        return Ok(FitOutcome::Degenerate);
    }

    let theta = fit_ma(&ar_resid, order.q);
    let innovations_tail = ma_residuals(&ar_resid, &theta);
    let (sigma2, aic, bic) = information_criteria(&innovations_tail, order.p + order.q + 1);
    if !aic.is_finite() || phi.iter().chain(theta.iter()).any(|c| !c.is_finite()) {
        return Ok(FitOutcome::Degenerate);
    }

    let mut innovations = vec![0.0; order.p];
    innovations.extend(innovations_tail);

    Ok(FitOutcome::Success(ArimaFit {
        params: ArimaParams {
            p: order.p,
            d: order.d,
            q: order.q,
            ar_coefficients: phi,
            ma_coefficients: theta,
            mean,
            sigma2,
            aic,
            bic,
            fallback: false,
        },
        null_aic: null_aic(&centered, centered.len() - order.p),
        centered,
        innovations,
        last_values,
    }))
}

/// Mean-only model on the `d`-times differenced series
pub fn fit_mean_only(values: &[f64], d: usize) -> Result<ArimaFit> {
    let Prepared {
        centered,
        mean,
        last_values,
    } = prepare(values, d)?;
    let (sigma2, aic, bic) = information_criteria(&centered, 1);

    Ok(ArimaFit {
        params: ArimaParams {
            p: 0,
            d,
            q: 0,
            ar_coefficients: Vec::new(),
            ma_coefficients: Vec::new(),
            mean,
            sigma2,
            aic,
            bic,
            fallback: true,
        },
        null_aic: aic,
        innovations: vec![0.0; centered.len()],
        centered,
        last_values,
    })
}

/// Fit the requested order, degrading to the differenced mean when it
/// cannot be fitted
pub fn fit_arima(values: &[f64], order: ArimaOrder) -> Result<ArimaFit> {
    match fit_arma(values, order) {
        Ok(FitOutcome::Success(fit)) => Ok(fit),
        Ok(FitOutcome::Degenerate) => {
            warn!(%order, "ARIMA fit is degenerate, using the differenced mean");
            fit_mean_only(values, order.d)
        }
        Err(err @ ForecastError::DataError(_)) => Err(err),
        Err(err) => {
            warn!(%order, %err, "ARIMA fit failed, using the differenced mean");
            fit_mean_only(values, order.d)
        }
    }
}

/// Whether the autocorrelation reaches the `2 / sqrt(n)` band within the
/// leading lags. A trend keeps them all outside it.
fn acf_decays(series: &[f64]) -> bool {
    let n = series.len();
    let max_lag = DIFFERENCING_ACF_LAGS.min(n / 2);
    if max_lag == 0 {
        return true;
    }
    let bound = 2.0 / (n as f64).sqrt();
    autocorrelation(series, max_lag)
        .iter()
        .skip(1)
        .any(|rho| rho.abs() < bound)
}

/// Differencing order: difference until the ACF decays, at most `max_d` times
/// and never below three points
pub fn select_differencing(values: &[f64], max_d: usize) -> usize {
    let mut series = values.to_vec();
    let mut d = 0;
    while d < max_d && series.len() > 3 && !acf_decays(&series) {
        series = difference(&series, 1);
        d += 1;
    }
    d
}

/// Choose (p, d, q) by AIC within the given bounds.
///
/// `d` comes from [`select_differencing`]; then every `p` in `0..=max_p` and
/// `q` in `1..=max_q` (or only `q = 0` when `max_q` is zero) is fitted and the
/// first candidate with the lowest AIC wins. Candidates that cannot be fitted
/// or leave fewer than `p + q + 2` residuals are skipped; if none survive the
/// order is `(0, d, min(1, max_q))`.
pub fn auto_select_params(
    values: &[f64],
    max_p: usize,
    max_d: usize,
    max_q: usize,
) -> Result<ArimaOrder> {
    if values.len() < 2 {
        return Err(ForecastError::DataError(format!(
            "ARIMA order selection requires at least 2 data points, got {}",
            values.len()
        )));
    }

    let d = select_differencing(values, max_d);
    let q_range = if max_q == 0 { 0..=0 } else { 1..=max_q };
    let default_order = ArimaOrder::new(0, d, max_q.min(1));

    let best = (0..=max_p)
        .flat_map(|p| q_range.clone().map(move |q| ArimaOrder::new(p, d, q)))
        .filter_map(|order| {
            let residuals = values.len().saturating_sub(order.d + order.p);
            if residuals < order.p + order.q + 2 {
                return None;
            }
            let fit = fit_arma(values, order).ok()?.success()?;
            let aic = fit.params().aic;
            debug!(%order, aic, "ARIMA candidate");
            aic.is_finite().then_some((order, aic))
        })
        .fold(None, |best: Option<(ArimaOrder, f64)>, (order, aic)| match best {
            Some((_, best_aic)) if best_aic <= aic => best,
            _ => Some((order, aic)),
        });

    Ok(best.map_or(default_order, |(order, _)| order))
}

/// ARIMA forecaster with a fixed order or an automatic order search
#[derive(Debug, Clone)]
pub struct ArimaModel {
    /// Name of the model
    name: String,
    order: Option<ArimaOrder>,
    search: ArimaSearch,
}

/// Trained ARIMA model
#[derive(Debug, Clone)]
pub struct TrainedArima {
    /// Name of the model
    name: String,
    fit: ArimaFit,
    /// Last observed x
    last_x: f64,
}

impl ArimaModel {
    /// Fixed order
    pub fn new(p: usize, d: usize, q: usize) -> Self {
        Self {
            name: "ARIMA".to_string(),
            order: Some(ArimaOrder::new(p, d, q)),
            search: ArimaSearch::default(),
        }
    }

    /// Order chosen by [`auto_select_params`] at training time
    pub fn auto(search: ArimaSearch) -> Self {
        Self {
            name: "ARIMA".to_string(),
            order: None,
            search,
        }
    }
}

impl Default for ArimaModel {
    fn default() -> Self {
        Self::auto(ArimaSearch::default())
    }
}

impl ForecastModel for ArimaModel {
    type Trained = TrainedArima;

    fn train(&self, points: &[DataPoint]) -> Result<TrainedArima> {
        require_points(points, &self.name)?;
        let points = sorted_by_x(points);
        let values: Vec<f64> = points.iter().map(|p| p.y).collect();

        let order = match self.order {
            Some(order) => order,
            None => auto_select_params(
                &values,
                self.search.max_p,
                self.search.max_d,
                self.search.max_q,
            )?,
        };
        let fit = fit_arima(&values, order)?;
        debug!(
            order = %fit.order(),
            aic = fit.params().aic,
            fallback = fit.is_fallback(),
            "ARIMA fitted"
        );

        Ok(TrainedArima {
            name: self.name.clone(),
            fit,
            last_x: points[points.len() - 1].x,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TrainedArima {
    pub fn fit(&self) -> &ArimaFit {
        &self.fit
    }
}

impl TrainedForecastModel for TrainedArima {
    fn forecast(&self, periods: usize, confidence_level: f64) -> Result<ModelForecast> {
        validate_periods(periods)?;
        let z = z_score(confidence_level)?;

        let points = horizon_points(self.last_x, &self.fit.forecast_values(periods));
        let half_widths = self.fit.half_widths(periods, z);

        Ok(ModelForecast {
            interval: ConfidenceInterval::symmetric(&points, &half_widths, confidence_level)?,
            points,
            accuracy: self.accuracy(),
            parameters: self.parameters(),
        })
    }

    fn accuracy(&self) -> f64 {
        self.fit.accuracy()
    }

    fn parameters(&self) -> ModelParameters {
        ModelParameters::Arima(self.fit.params().clone())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    /// Deterministic noise in [-0.5, 0.5)
    fn noise(n: usize, seed: u64) -> Vec<f64> {
        let mut state = seed;
        (0..n)
            .map(|_| {
                state = state
                    .wrapping_mul(6364136223846793005)
                    .wrapping_add(1442695040888963407);
                (state >> 11) as f64 / (1u64 << 53) as f64 - 0.5
            })
            .collect()
    }

    fn ar1(n: usize, phi: f64) -> Vec<f64> {
        noise(n, 7).iter().fold(Vec::with_capacity(n), |mut acc, e| {
            let prev = acc.last().copied().unwrap_or(0.0);
            acc.push(phi * prev + e);
            acc
        })
    }

    fn to_points(values: &[f64]) -> Vec<DataPoint> {
        values
            .iter()
            .enumerate()
            .map(|(i, &y)| DataPoint::new(i as f64, y))
            .collect()
    }

    #[test]
    fn test_difference() {
        assert_eq!(difference(&[1.0, 4.0, 9.0, 16.0], 1), vec![3.0, 5.0, 7.0]);
        assert_eq!(difference(&[1.0, 4.0, 9.0, 16.0], 2), vec![8.0, 12.0]);
        assert!(difference(&[1.0], 1).is_empty());
    }

    #[test]
    fn test_integrate_continues_differenced_series() {
        let series: Vec<f64> = (0..8).map(|t| (t * t) as f64).collect();
        let (_, last_values) = difference_levels(&series[..6], 2);
        // Second differences of t^2 are constant 2
        let restored = integrate(&[2.0, 2.0], &last_values);
        assert_eq!(restored, vec![series[6], series[7]]);
    }

    #[test]
    fn test_ar_coefficient_is_recovered() {
        let series = ar1(500, 0.6);
        let m = mean(&series);
        let centered: Vec<f64> = series.iter().map(|x| x - m).collect();
        let phi = fit_ar(&centered, 1).unwrap().success().unwrap();
        assert_abs_diff_eq!(phi[0], 0.6, epsilon = 0.1);
    }

    #[test]
    fn test_singular_ar_is_degenerate() {
        let zeros = vec![0.0; 10];
        assert!(fit_ar(&zeros, 2).unwrap().is_degenerate());
    }

    #[test]
    fn test_ma_coefficient_sign() {
        let e = noise(600, 11);
        let series: Vec<f64> = (1..e.len()).map(|t| e[t] - 0.5 * e[t - 1]).collect();
        let theta = fit_ma(&series, 1);
        assert_abs_diff_eq!(theta[0], 0.5, epsilon = 0.15);
    }

    #[test]
    fn test_ma_innovations_lose_autocorrelation() {
        let e = noise(600, 11);
        let series: Vec<f64> = (1..e.len()).map(|t| e[t] - 0.5 * e[t - 1]).collect();
        let theta = fit_ma(&series, 1);
        let acf = autocorrelation(&ma_residuals(&series, &theta), 1);
        assert!(acf[1].abs() < 0.05);
    }

    #[test]
    fn test_ma_coefficients_are_bounded() {
        let alternating: Vec<f64> = (0..40).map(|t| if t % 2 == 0 { 1.0 } else { -1.0 }).collect();
        for theta in fit_ma(&alternating, 2) {
            assert!(theta.abs() <= MA_COEFFICIENT_BOUND);
        }
    }

    #[test]
    fn test_linear_series_falls_back_to_drift() {
        let series: Vec<f64> = (0..12).map(|t| 3.0 + 2.0 * t as f64).collect();
        let fit = fit_arima(&series, ArimaOrder::new(1, 1, 0)).unwrap();

        assert!(fit.is_fallback());
        let forecast = fit.forecast_values(3);
        assert_abs_diff_eq!(forecast[0], 27.0, epsilon = 1e-9);
        assert_abs_diff_eq!(forecast[2], 31.0, epsilon = 1e-9);
    }

    #[test]
    fn test_constant_series_forecasts_constant() {
        let model = ArimaModel::default();
        let forecast = model
            .train(&to_points(&[4.0; 15]))
            .unwrap()
            .forecast(4, 0.95)
            .unwrap();
        for value in forecast.values() {
            assert_abs_diff_eq!(value, 4.0, epsilon = 1e-9);
        }
    }

    #[rstest]
    #[case(0, 0, 0)]
    #[case(1, 0, 1)]
    #[case(2, 1, 1)]
    #[case(3, 2, 2)]
    fn test_auto_select_respects_bounds(
        #[case] max_p: usize,
        #[case] max_d: usize,
        #[case] max_q: usize,
    ) {
        let trend: Vec<f64> = ar1(60, 0.5)
            .iter()
            .enumerate()
            .map(|(t, x)| x + 0.3 * t as f64)
            .collect();
        let order = auto_select_params(&trend, max_p, max_d, max_q).unwrap();

        assert!(order.p <= max_p);
        assert!(order.d <= max_d);
        assert!(order.q <= max_q);
        if max_q > 0 {
            assert!(order.q >= 1);
        }
    }

    #[rstest]
    #[case(20)]
    #[case(30)]
    #[case(40)]
    #[case(60)]
    fn test_auto_select_differences_trend(#[case] n: usize) {
        let trend: Vec<f64> = (0..n).map(|t| 10.0 + 1.5 * t as f64).collect();
        assert_eq!(select_differencing(&trend, 2), 1);
        assert_eq!(auto_select_params(&trend, 3, 2, 2).unwrap().d, 1);
        assert_eq!(select_differencing(&noise(n, 3), 2), 0);
    }

    #[test]
    fn test_stationary_ar_is_not_differenced() {
        assert_eq!(select_differencing(&ar1(60, 0.5), 2), 0);
    }

    #[test]
    fn test_auto_select_needs_two_points() {
        assert!(matches!(
            auto_select_params(&[1.0], 3, 2, 2),
            Err(ForecastError::DataError(_))
        ));
    }

    #[test]
    fn test_aic_and_bic_reported() {
        let fit = fit_arima(&ar1(120, 0.7), ArimaOrder::new(1, 0, 1)).unwrap();
        let params = fit.params();
        assert!(!params.fallback);
        assert!(params.aic.is_finite());
        // ln(m) > 2 once m > e^2, so BIC penalizes harder
        assert!(params.bic > params.aic);
        assert!(fit.accuracy() > 0.0 && fit.accuracy() <= 1.0);
    }

    #[test]
    fn test_interval_grows_with_horizon() {
        let forecast = ArimaModel::new(1, 0, 0)
            .train(&to_points(&ar1(50, 0.4)))
            .unwrap()
            .forecast(8, 0.9)
            .unwrap();

        let widths = forecast.interval.half_widths();
        assert_eq!(widths.len(), 8);
        for pair in widths.windows(2) {
            assert!(pair[1] > pair[0]);
        }
        assert_abs_diff_eq!(forecast.points[0].x, 50.0);
    }

    #[test]
    fn test_two_points_still_forecast() {
        let forecast = ArimaModel::default()
            .train(&to_points(&[10.0, 12.0]))
            .unwrap()
            .forecast(2, 0.95)
            .unwrap();
        assert_eq!(forecast.points.len(), 2);
        assert!(forecast.values().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_single_point_is_rejected() {
        assert!(matches!(
            ArimaModel::default().train(&to_points(&[1.0])),
            Err(ForecastError::DataError(_))
        ));
    }
}
