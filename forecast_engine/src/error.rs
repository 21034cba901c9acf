//! Error types for the forecast_engine crate

use thiserror::Error;

/// Custom error types for the forecast_engine crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Error related to the shape or content of the input series
    #[error("Data error: {0}")]
    DataError(String),

    /// Error related to forecasting operations
    #[error("Forecasting error: {0}")]
    ForecastingError(String),

    /// Error related to request validation
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Error from invalid model parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error from the numerical layer
    #[error("Math error: {0}")]
    MathError(#[from] series_math::MathError),

    /// Error from reading or writing configuration
    #[error("Config error: {0}")]
    ConfigError(String),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<serde_json::Error> for ForecastError {
    fn from(err: serde_json::Error) -> Self {
        ForecastError::ConfigError(err.to_string())
    }
}

impl ForecastError {
    /// Whether the error comes from validating the caller's request
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ForecastError::ValidationError(_)
                | ForecastError::InvalidParameter(_)
                | ForecastError::DataError(_)
        )
    }
}
