use chrono::NaiveDate;
use timecast_workspace::forecast_engine::data::convert_to_regression_index;
use timecast_workspace::forecast_engine::orchestrator::analyze;
use timecast_workspace::{
    daily_series, forecast, forecast_with_best_method, ForecastMethod, ForecastOptions,
    ForecastResult,
};

const SAMPLE_VALUES: [f64; 30] = [
    15.0, 18.0, 12.0, 20.0, 22.0, 16.0, 10.0, 14.0, 19.0, 23.0, 17.0, 13.0, 21.0, 25.0, 18.0,
    15.0, 12.0, 20.0, 24.0, 19.0, 16.0, 22.0, 26.0, 20.0, 17.0, 14.0, 23.0, 27.0, 21.0, 18.0,
];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    println!("Timecast: Sample Forecast Example");
    println!("=================================\n");

    let start = NaiveDate::from_ymd_opt(2024, 1, 1).ok_or("invalid start date")?;
    let series = daily_series(start, &SAMPLE_VALUES);
    println!("Sample data created: {} daily points\n", series.len());

    let (points, _) = convert_to_regression_index(&series)?;
    let characteristics = analyze(&points);
    println!("Series characteristics: {:?}\n", characteristics);

    for method in [
        ForecastMethod::Linear,
        ForecastMethod::ExpSmoothing,
        ForecastMethod::Arima,
        ForecastMethod::Auto,
    ] {
        let options = ForecastOptions::new(method, 5);
        let result = forecast(&series, &options)?;
        print_result(&format!("Requested {}", method), &result);
    }

    let best = forecast_with_best_method(&series, &ForecastOptions::default())?;
    print_result("Best on holdout", &best);

    println!("JSON export:\n{}", best.to_json()?);
    Ok(())
}

fn print_result(title: &str, result: &ForecastResult) {
    println!("{} -> {} (accuracy {:.3})", title, result.method, result.accuracy);
    for (i, point) in result.forecast_data.iter().enumerate() {
        match &result.confidence_interval {
            Some(interval) => println!(
                "  {}  {:>8.2}  [{:.2}, {:.2}]",
                point.date, point.value, interval.lower[i].value, interval.upper[i].value
            ),
            None => println!("  {}  {:>8.2}", point.date, point.value),
        }
    }
    if let Some(parameters) = &result.parameters {
        println!("  parameters: {:?}", parameters.to_map());
    }
    println!();
}
