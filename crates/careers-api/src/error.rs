//! API error types.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::services::AggregationError;
use crate::store::StoreError;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Aggregation(AggregationError),
}

impl From<AggregationError> for ApiError {
    fn from(e: AggregationError) -> Self {
        match e {
            AggregationError::Store(e) => ApiError::Store(e),
            other => ApiError::Aggregation(other),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Store(StoreError::Unavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Store(StoreError::Conflict(_)) => StatusCode::CONFLICT,
            ApiError::Store(_) | ApiError::Aggregation(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Extra fields identifying the records involved, if any.
    fn details(&self) -> Option<serde_json::Value> {
        match self {
            ApiError::Aggregation(AggregationError::DanglingReference { application_id, job_id }) => {
                Some(json!({ "application_id": application_id, "job_id": job_id }))
            }
            _ => None,
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            error!(status = status.as_u16(), "Request failed: {}", self);
        }

        // Don't expose backend error details in production
        let message = match &self {
            ApiError::Store(StoreError::Backend(_)) if is_production() => {
                "An internal error occurred".to_string()
            }
            _ => self.to_string(),
        };

        let body = ErrorResponse {
            error: message,
            details: self.details(),
        };

        (status, Json(body)).into_response()
    }
}

/// Whether `ENVIRONMENT` is `production`, in any case.
fn is_production() -> bool {
    std::env::var("ENVIRONMENT").is_ok_and(|v| v.eq_ignore_ascii_case("production"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::bad_request("x").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::from(StoreError::Unavailable("down".into())).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError::from(StoreError::Conflict("raced".into())).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(StoreError::Backend("boom".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_store_failure_during_aggregation_keeps_store_status() {
        let err = ApiError::from(AggregationError::Store(StoreError::Unavailable("down".into())));
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_dangling_reference_details() {
        let err = ApiError::from(AggregationError::DanglingReference {
            application_id: "A1".into(),
            job_id: "J9".into(),
        });
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.details(), Some(json!({"application_id": "A1", "job_id": "J9"})));
    }

    async fn body_of(err: ApiError) -> serde_json::Value {
        let response = err.into_response();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    #[serial]
    async fn test_backend_detail_hidden_in_production() {
        std::env::set_var("ENVIRONMENT", "Production");
        let hidden = body_of(ApiError::from(StoreError::Backend("disk on fire".into()))).await;
        let conflict = body_of(ApiError::from(StoreError::Conflict("raced".into()))).await;
        std::env::remove_var("ENVIRONMENT");

        assert_eq!(hidden["error"], "An internal error occurred");
        assert!(conflict["error"].as_str().unwrap().contains("raced"));
    }

    #[tokio::test]
    #[serial]
    async fn test_backend_detail_shown_outside_production() {
        std::env::remove_var("ENVIRONMENT");
        let body = body_of(ApiError::from(StoreError::Backend("disk on fire".into()))).await;
        assert!(body["error"].as_str().unwrap().contains("disk on fire"));
    }
}
