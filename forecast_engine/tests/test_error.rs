use forecast_engine::error::ForecastError;
use series_math::MathError;

#[test]
fn test_error_conversion() {
    let math_error = MathError::InsufficientData("need 2 points".to_string());
    let forecast_error = ForecastError::from(math_error);

    match forecast_error {
        ForecastError::MathError(MathError::InsufficientData(msg)) => {
            assert_eq!(msg, "need 2 points")
        }
        other => panic!("Expected MathError variant, got {:?}", other),
    }

    let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    match ForecastError::from(json_error) {
        ForecastError::ConfigError(_) => {}
        other => panic!("Expected ConfigError variant, got {:?}", other),
    }
}

#[test]
fn test_error_display() {
    let error = ForecastError::InvalidParameter("alpha must be between 0 and 1".to_string());
    let error_string = format!("{}", error);
    assert!(error_string.contains("alpha must be between 0 and 1"));

    let error = ForecastError::from(MathError::InvalidInput("empty system".to_string()));
    let error_string = format!("{}", error);
    assert!(error_string.contains("Math error"));
    assert!(error_string.contains("empty system"));
}

#[test]
fn test_validation_classification() {
    assert!(ForecastError::ValidationError("x".to_string()).is_validation());
    assert!(ForecastError::DataError("x".to_string()).is_validation());
    assert!(!ForecastError::ForecastingError("x".to_string()).is_validation());
    assert!(!ForecastError::ConfigError("x".to_string()).is_validation());
}
