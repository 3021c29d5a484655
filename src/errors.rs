use axum::http::StatusCode;
use thiserror::Error;

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    pub fn internal(err: impl std::error::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }
}

impl From<csv::Error> for AppError {
    fn from(err: csv::Error) -> Self {
        Self::internal(err)
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}

/// Start-up configuration problems.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("unknown variant: {0}")]
    UnknownVariant(String),

    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },

    #[error("low threshold {low} is above high threshold {high}")]
    InvalidThresholds { low: f64, high: f64 },
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;

    #[test]
    fn app_error_keeps_status() {
        let response = AppError::bad_request("value must be >= 0").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = AppError::not_found("no data").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn config_error_display() {
        let err = ConfigError::InvalidValue {
            key: "PORT",
            value: "x".to_string(),
        };
        assert_eq!(err.to_string(), "invalid value for PORT: x");
    }
}
