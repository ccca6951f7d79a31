//! Boundary errors and their HTTP rendering.
//!
//! Every failure leaves as `{"error": "<message>"}`. The status for an
//! upstream failure is chosen by the route, except `ApiError::NotFound`,
//! which is always 404.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tablebridge_core::ApiError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// Missing or blank input, caught before any remote call.
    #[error("{0}")]
    Validation(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("{source}")]
    Upstream { status: StatusCode, source: ApiError },
}

impl AppError {
    pub fn upstream(status: StatusCode) -> impl FnOnce(ApiError) -> AppError {
        move |source| AppError::Upstream { status, source }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::Upstream {
                source: ApiError::NotFound,
                ..
            } => StatusCode::NOT_FOUND,
            AppError::Upstream { status, .. } => *status,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
