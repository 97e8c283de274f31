use serde::Serialize;
use axum::Json;
use axum::http::StatusCode;
use chrono::Utc;

use crate::error::{AppError, Result};

#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub data: Option<T>,
    pub meta: ResponseMeta,
}

#[derive(Serialize)]
pub struct ResponseMeta {
    pub status: String,
    pub status_code: u16,
    pub timestamp: String,
    pub message: Option<String>,
}

/// Status plus `{ data, meta }` envelope; every route answers with one.
pub type Reply<T> = (StatusCode, Json<ApiResponse<T>>);

fn reply<T>(status: StatusCode, data: Option<T>, message: Option<String>) -> Reply<T> {
    let label = if status.is_success() { "success" } else { "error" };
    let meta = ResponseMeta {
        status: label.to_string(),
        status_code: status.as_u16(),
        timestamp: Utc::now().to_rfc3339(),
        message,
    };
    (status, Json(ApiResponse { data, meta }))
}

pub fn success<T: Serialize>(data: T) -> Reply<T> {
    reply(StatusCode::OK, Some(data), None)
}

pub fn error<T>(status: StatusCode, message: String) -> Reply<T> {
    reply(status, None, Some(message))
}

pub fn failure<T>(err: AppError) -> Reply<T> {
    error(err.status_code(), err.to_string())
}

pub fn from_result<T: Serialize>(result: Result<T>) -> Reply<T> {
    match result {
        Ok(data) => success(data),
        Err(err) => failure(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_carry_message_and_no_data() {
        let (status, Json(body)) = failure::<()>(AppError::MalformedResponseError("no list".into()));
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body.meta.status, "error");
        assert_eq!(body.meta.status_code, 502);
        assert_eq!(body.meta.message.as_deref(), Some("Malformed catalog response: no list"));
        assert!(body.data.is_none());
    }

    #[test]
    fn success_wraps_data() {
        let (status, Json(body)) = from_result(Ok(vec!["NY"]));
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.meta.status, "success");
        assert_eq!(body.data, Some(vec!["NY"]));
        assert!(body.meta.message.is_none());
    }
}
