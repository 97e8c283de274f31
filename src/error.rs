use axum::http::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Failed to fetch catalog{}: {cause}", status_suffix(.status))]
    TransportError {
        status: Option<u16>,
        cause: String,
    },

    #[error("Malformed catalog response: {0}")]
    MalformedResponseError(String),

    #[error("Failed to write catalog to cache: {0}")]
    CacheWriteError(String),

    #[error("Record {index} has no usable `{field}` field")]
    MissingFieldError {
        index: usize,
        field: &'static str,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::TransportError { .. } => StatusCode::BAD_GATEWAY,
            AppError::MalformedResponseError(_) => StatusCode::BAD_GATEWAY,
            AppError::CacheWriteError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::MissingFieldError { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::ConfigError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::TransportError {
            status: err.status().map(|s| s.as_u16()),
            cause: err.to_string(),
        }
    }
}

impl From<redis::RedisError> for AppError {
    fn from(err: redis::RedisError) -> Self {
        AppError::CacheWriteError(err.to_string())
    }
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (status {s})")).unwrap_or_default()
}

pub type Result<T> = std::result::Result<T, AppError>;
