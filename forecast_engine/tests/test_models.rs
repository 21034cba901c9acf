use approx::assert_abs_diff_eq;
use forecast_engine::models::arima::ArimaModel;
use forecast_engine::models::exponential_smoothing::{
    ExponentialSmoothingModel, SeasonalMode, SmoothingKind,
};
use forecast_engine::models::linear_regression::LinearRegressionModel;
use forecast_engine::models::{ForecastModel, ModelForecast, TrainedForecastModel};
use forecast_engine::ForecastError;
use series_math::DataPoint;

fn create_test_data() -> Vec<DataPoint> {
    [
        100.0, 102.0, 104.0, 103.0, 105.0, 107.0, 106.0, 109.0, 111.0, 110.0, 113.0, 112.0,
        115.0, 117.0, 116.0, 118.0,
    ]
    .iter()
    .enumerate()
    .map(|(i, &y)| DataPoint::new(i as f64, y))
    .collect()
}

fn assert_well_formed(forecast: &ModelForecast, periods: usize) {
    assert_eq!(forecast.points.len(), periods);
    assert_eq!(forecast.interval.len(), periods);
    assert!((0.0..=1.0).contains(&forecast.accuracy));

    let widths = forecast.interval.half_widths();
    for (i, point) in forecast.points.iter().enumerate() {
        assert_abs_diff_eq!(point.x, 16.0 + i as f64);
        assert!(forecast.interval.upper[i].y >= point.y);
        assert!(forecast.interval.lower[i].y <= point.y);
    }
    for pair in widths.windows(2) {
        assert!(pair[1] >= pair[0] - 1e-12);
    }
}

#[test]
fn test_linear_regression() {
    let data = create_test_data();
    let trained = LinearRegressionModel::new().train(&data).unwrap();
    let forecast = trained.forecast(4, 0.95).unwrap();

    assert_well_formed(&forecast, 4);
    assert!(trained.regression().slope > 0.0);
    assert_eq!(trained.name(), "Linear Regression");
}

#[test]
fn test_exponential_smoothing() {
    let data = create_test_data();
    for kind in [SmoothingKind::Simple, SmoothingKind::Double] {
        let model =
            ExponentialSmoothingModel::optimized(kind, None, SeasonalMode::Additive).unwrap();
        let forecast = model.train(&data).unwrap().forecast(5, 0.9).unwrap();
        assert_well_formed(&forecast, 5);
    }
}

#[test]
fn test_simple_smoothing_forecast_is_final_level() {
    let data = create_test_data();
    let trained = ExponentialSmoothingModel::simple(0.6)
        .unwrap()
        .train(&data)
        .unwrap();
    let level = trained.fit().level();

    for value in trained.forecast(6, 0.95).unwrap().values() {
        assert_eq!(value, level);
    }
}

#[test]
fn test_holt_winters() {
    let pattern = [4.0, -2.0, 1.0, -3.0];
    let data: Vec<DataPoint> = (0..16)
        .map(|t| DataPoint::new(t as f64, 50.0 + t as f64 + pattern[t % 4]))
        .collect();

    let model =
        ExponentialSmoothingModel::optimized(SmoothingKind::Triple, Some(4), SeasonalMode::Additive)
            .unwrap();
    let forecast = model.train(&data).unwrap().forecast(4, 0.95).unwrap();

    assert_well_formed(&forecast, 4);
    for (h, value) in forecast.values().iter().enumerate() {
        let t = 16 + h;
        assert_abs_diff_eq!(*value, 50.0 + t as f64 + pattern[t % 4], epsilon = 1e-6);
    }
}

#[test]
fn test_arima() {
    let data = create_test_data();
    let trained = ArimaModel::default().train(&data).unwrap();
    let forecast = trained.forecast(5, 0.95).unwrap();

    assert_well_formed(&forecast, 5);
    let order = trained.fit().order();
    assert!(order.p <= 3 && order.d <= 2 && order.q <= 2);
}

#[test]
fn test_fixed_order_arima_is_deterministic() {
    let data = create_test_data();
    let model = ArimaModel::new(1, 1, 1);
    let a = model.train(&data).unwrap().forecast(3, 0.95).unwrap();
    let b = model.train(&data).unwrap().forecast(3, 0.95).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_every_model_rejects_a_single_point() {
    let single = vec![DataPoint::new(0.0, 1.0)];

    let linear = LinearRegressionModel::new().train(&single);
    let smoothing = ExponentialSmoothingModel::simple(0.5).unwrap().train(&single);
    let arima = ArimaModel::default().train(&single);

    assert!(matches!(linear, Err(ForecastError::DataError(_))));
    assert!(matches!(smoothing, Err(ForecastError::DataError(_))));
    assert!(matches!(arima, Err(ForecastError::DataError(_))));
}

#[test]
fn test_invalid_confidence_level() {
    let data = create_test_data();
    let trained = LinearRegressionModel::new().train(&data).unwrap();
    assert!(matches!(
        trained.forecast(3, 1.2),
        Err(ForecastError::ValidationError(_))
    ));
}

#[test]
fn test_parameter_export() {
    let data = create_test_data();
    let forecast = ExponentialSmoothingModel::holt(0.5, 0.2)
        .unwrap()
        .train(&data)
        .unwrap()
        .forecast(1, 0.95)
        .unwrap();

    let map = forecast.parameters.to_map();
    assert_eq!(map.get("alpha"), Some(&0.5));
    assert_eq!(map.get("beta"), Some(&0.2));
    assert!(map.contains_key("mse"));
}
