//! Error taxonomy for figure requests and its mapping to HTTP responses.
//!
//! | kind       | status           | body                               |
//! |------------|------------------|------------------------------------|
//! | validation | 400              | the validation message             |
//! | upstream   | upstream status  | `ML service error: {body}`         |
//! | transport  | 500              | `Failed to fetch figure image`     |
//!
//! Transport details are logged, never returned to the caller.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::figure::params::ParamError;

#[derive(Debug, thiserror::Error)]
pub enum FigureError {
    #[error(transparent)]
    Invalid(#[from] ParamError),

    /// The ML image service answered with a non-2xx status.
    #[error("ML service error: {body}")]
    Upstream { status: StatusCode, body: String },

    /// Anything else: connect failure, timeout, broken body.
    #[error("Failed to fetch figure image")]
    Transport(#[from] reqwest::Error),
}

/// JSON envelope shared by every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl FigureError {
    pub fn status(&self) -> StatusCode {
        match self {
            FigureError::Invalid(_) => StatusCode::BAD_REQUEST,
            FigureError::Upstream { status, .. } => *status,
            FigureError::Transport(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Metric label for this failure.
    pub fn outcome(&self) -> &'static str {
        match self {
            FigureError::Invalid(ParamError::InvalidPath) => "invalid_path",
            FigureError::Invalid(ParamError::InvalidDatasetId) => "invalid_dataset_id",
            FigureError::Invalid(ParamError::InvalidImageType) => "invalid_image_type",
            FigureError::Upstream { .. } => "upstream_error",
            FigureError::Transport(_) => "transport_error",
        }
    }

    /// Log at a level matching who is at fault.
    pub fn log(&self, request_id: &str) {
        match self {
            FigureError::Invalid(e) => {
                tracing::debug!(request_id = %request_id, reason = %e, "Rejected figure request");
            }
            FigureError::Upstream { status, body } => {
                tracing::warn!(
                    request_id = %request_id,
                    status = %status,
                    body = %body,
                    "ML service returned an error status"
                );
            }
            FigureError::Transport(e) => {
                tracing::error!(
                    request_id = %request_id,
                    error = %e,
                    timeout = e.is_timeout(),
                    connect = e.is_connect(),
                    "Error fetching figure image"
                );
            }
        }
    }
}

impl IntoResponse for FigureError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use axum::http::header;

    async fn body_json(err: FigureError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json"
        );
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_validation_errors_are_bad_request() {
        let cases = [
            (
                ParamError::InvalidPath,
                "Invalid path. Expected /api/ml/hsi/figure/{dataset_id}/{image_type}",
            ),
            (ParamError::InvalidDatasetId, "Invalid dataset_id. Use 1, 2, or 6"),
            (
                ParamError::InvalidImageType,
                "Invalid image_type. Use fc, gt, pr, or legend",
            ),
        ];

        for (param, message) in cases {
            let (status, json) = body_json(param.into()).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(json, serde_json::json!({ "error": message }));
        }
    }

    #[tokio::test]
    async fn test_upstream_status_is_relayed() {
        let err = FigureError::Upstream {
            status: StatusCode::SERVICE_UNAVAILABLE,
            body: "model still loading".into(),
        };
        assert_eq!(err.outcome(), "upstream_error");

        let (status, json) = body_json(err).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json["error"], "ML service error: model still loading");
    }

    #[tokio::test]
    async fn test_upstream_body_is_escaped() {
        let raw = "{\"detail\": \"bad \\\"id\\\"\"}\n\ttrailing";
        let (_, json) = body_json(FigureError::Upstream {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            body: raw.into(),
        })
        .await;
        assert_eq!(json["error"], format!("ML service error: {raw}"));
    }

    #[test]
    fn test_outcome_labels() {
        assert_eq!(
            FigureError::from(ParamError::InvalidPath).outcome(),
            "invalid_path"
        );
        assert_eq!(
            FigureError::from(ParamError::InvalidImageType).status(),
            StatusCode::BAD_REQUEST
        );
    }
}
