//! HTTP error mapping
//!
//! Every failure leaves the server as `{"error": {"code", "message"}}` with
//! a matching status.

use crate::composer::ComposeError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WebError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl WebError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Config(_) | Self::Io(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "bad_request",
            Self::NotFound(_) => "not_found",
            Self::Config(_) | Self::Io(_) | Self::Internal(_) => "internal",
        }
    }
}

impl From<ComposeError> for WebError {
    fn from(err: ComposeError) -> Self {
        match err {
            ComposeError::NotFound(id) => Self::NotFound(format!("unknown screen '{id}'")),
            ComposeError::InvalidRequest(message) => Self::BadRequest(message),
            ComposeError::Directory(source) => Self::Internal(format!("{source:#}")),
            ComposeError::TimedOut(after) => {
                Self::Internal(format!("composition timed out after {after:?}"))
            }
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            // Details stay in the log
            Self::Config(_) | Self::Io(_) | Self::Internal(_) => {
                tracing::error!(error = %self, "Request failed");
                "screen composition failed".to_string()
            }
            Self::BadRequest(message) | Self::NotFound(message) => message.clone(),
        };
        let body = json!({
            "error": {
                "code": self.code(),
                "message": message,
            }
        });
        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, WebError>;
