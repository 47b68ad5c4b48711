//! Application error types and HTTP response mapping.
//!
//! Defines `AppError` for every failure a handler can surface and implements
//! Axum's `IntoResponse` so errors turn into JSON bodies of the form
//! `{"error": "..."}`.
//!
//! Error mappings:
//! - `MissingArgument` → 400
//! - `Forbidden` → 403
//! - `Spawn`, `Internal` → 500
//!
//! A script that runs and exits non-zero is not an error here; see
//! `routes::script_response`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Missing argument {0}")]
    MissingArgument(&'static str),

    #[error("Forbidden")]
    Forbidden,

    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MissingArgument(_) => StatusCode::BAD_REQUEST,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::Spawn { .. } | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{}", self);
        }

        let body = Json(json!({
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
