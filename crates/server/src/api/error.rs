//! OpenAI-shaped error responses.
//!
//! Every failure leaves the gateway as `{"error": {"message", "type",
//! "code"?}}`. Backend JSON errors are forwarded verbatim with their
//! original status so the client sees upstream provenance.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::egress::ForwardError;

#[derive(Debug)]
pub enum ApiError {
    /// Undecodable request body (400).
    InvalidRequest(String),
    /// `stream: true` against the emulation endpoint (501).
    StreamingUnsupported,
    /// Anything that went wrong talking to the backend.
    Forward(ForwardError),
}

impl From<ForwardError> for ApiError {
    fn from(err: ForwardError) -> Self {
        ApiError::Forward(err)
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
    r#type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<&'static str>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, code, message) = match self {
            ApiError::InvalidRequest(msg) => (
                StatusCode::BAD_REQUEST,
                "invalid_request_error",
                Some("invalid_request"),
                msg,
            ),
            ApiError::StreamingUnsupported => (
                StatusCode::NOT_IMPLEMENTED,
                "invalid_request_error",
                None,
                "Streaming is not currently supported".to_string(),
            ),
            ApiError::Forward(err) => {
                let status = match &err {
                    ForwardError::Timeout(_) | ForwardError::Transport(_) => {
                        StatusCode::INTERNAL_SERVER_ERROR
                    }
                    ForwardError::Unreachable(_) => StatusCode::SERVICE_UNAVAILABLE,
                    ForwardError::NonJsonBody => StatusCode::BAD_GATEWAY,
                    ForwardError::Upstream { status, body } => {
                        // Upstream JSON errors pass through untouched.
                        let status = StatusCode::from_u16(*status)
                            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                        return (status, axum::Json(body.clone())).into_response();
                    }
                };
                let error_type = match &err {
                    ForwardError::Unreachable(_) => "service_unavailable_error",
                    _ => "server_error",
                };
                (status, error_type, None, err.to_string())
            }
        };

        let body = ErrorResponse {
            error: ErrorBody {
                message,
                r#type: error_type,
                code,
            },
        };

        (status, axum::Json(body)).into_response()
    }
}
