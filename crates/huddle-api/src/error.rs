use axum::{
    Json,
    extract::rejection::QueryRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use huddle_core::CoreError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// JSON body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: u16,
    pub name: &'static str,
    pub message: String,
}

impl ApiError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Core(CoreError::invalid(msg))
    }

    pub fn denied(msg: impl Into<String>) -> Self {
        Self::Core(CoreError::denied(msg))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Core(e) if e.is_input_error() => StatusCode::BAD_REQUEST,
            Self::Core(CoreError::AccessDenied(_)) => StatusCode::FORBIDDEN,
            Self::Core(_) | Self::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn name(&self) -> &'static str {
        match self.status() {
            StatusCode::BAD_REQUEST => "InputError",
            StatusCode::FORBIDDEN => "AccessError",
            _ => "System Error",
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::invalid(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("Request failed: {:#}", self);
            "internal server error".to_string()
        } else {
            self.to_string()
        };

        let body = ErrorBody {
            code: status.as_u16(),
            name: self.name(),
            message,
        };
        (status, Json(body)).into_response()
    }
}
