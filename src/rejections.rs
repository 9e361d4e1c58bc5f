use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Request-level failure taxonomy. Every variant renders as a `{"message"}`
/// JSON body with the matching status code.
#[derive(Debug)]
pub enum AppError {
    /// Missing or malformed input, and unique-key conflicts (both 400).
    Input(String),
    Unauthorized(&'static str),
    /// Entity exists but the caller does not own it.
    Forbidden(&'static str),
    /// Entity absent, or absent-as-far-as-the-caller-can-tell.
    NotFound(String),
    /// Persistence failure; surfaces the underlying error message.
    Internal(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::Input(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> &str {
        match self {
            AppError::Input(m) | AppError::NotFound(m) | AppError::Internal(m) => m.as_str(),
            AppError::Unauthorized(m) | AppError::Forbidden(m) => m,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "message": self.message() }))).into_response()
    }
}

/// Adapters from `color_eyre::Result` to `AppError`, logging on the way.
pub trait ResultExt<T> {
    /// Map a persistence/service error to a 500, logging it with context.
    fn reject(self, context: &'static str) -> Result<T, AppError>;

    /// Map an error to a 400 with the given client-facing message.
    fn reject_input(self, message: &'static str) -> Result<T, AppError>;
}

impl<T> ResultExt<T> for color_eyre::Result<T> {
    fn reject(self, context: &'static str) -> Result<T, AppError> {
        self.map_err(|e| {
            tracing::error!("{context}: {e}");
            AppError::Internal(e.to_string())
        })
    }

    fn reject_input(self, message: &'static str) -> Result<T, AppError> {
        self.map_err(|e| {
            tracing::error!("{message}: {e}");
            AppError::Input(message.to_string())
        })
    }
}
