//! Errors raised at the crate's boundaries.
//!
//! The computation engine itself never fails; these errors come from
//! loading configuration and validating API requests.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PayrollError {
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid payroll configuration in {path:?}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid bind address {0:?}")]
    BindAddress(String),

    #[error("month must be between 1 and 12, got {0}")]
    InvalidMonth(u32),

    #[error("failed to write export: {0}")]
    Csv(#[from] csv::Error),
}

impl PayrollError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            PayrollError::InvalidMonth(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for PayrollError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({"error": self.to_string()}));
        (self.status_code(), body).into_response()
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, PayrollError>;
