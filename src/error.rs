use axum::Json;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid PNR number")]
    InvalidInput,
    #[error("PNR service unreachable: {0}")]
    UpstreamUnavailable(String),
    #[error("PNR service responded with {0}")]
    UpstreamError(StatusCode),
    #[error("no embedded status data in PNR page")]
    NotFound,
    #[error("embedded status data is not valid JSON: {0}")]
    ParseError(#[from] serde_json::Error),
    #[error("internal error: {0}")]
    InternalError(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: &'static str,
}

impl FetchError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            FetchError::InvalidInput => StatusCode::BAD_REQUEST,
            FetchError::UpstreamUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            // 上游 5xx 原样转发，其余非 2xx 视为网关错误
            FetchError::UpstreamError(status) if status.is_server_error() => *status,
            FetchError::UpstreamError(_) => StatusCode::BAD_GATEWAY,
            FetchError::NotFound => StatusCode::NOT_FOUND,
            FetchError::ParseError(_) | FetchError::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            FetchError::InvalidInput => "Invalid PNR number. PNR should be 10 digits.",
            FetchError::UpstreamUnavailable(_) => "Failed to connect to PNR service",
            FetchError::UpstreamError(_) => "Failed to retrieve PNR status",
            FetchError::NotFound => "PNR status not found",
            FetchError::ParseError(_) => "Failed to parse PNR status",
            FetchError::InternalError(_) => "Internal server error",
        }
    }
}

impl IntoResponse for FetchError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            error: self.message(),
        });

        (self.status_code(), body).into_response()
    }
}
