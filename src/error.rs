use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;
use tracing::{error, warn};

use crate::models::ErrorResponse;

/// Custom error type for the application
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    /// Missing or malformed request fields. Never reaches the model.
    InvalidInput(String),
    /// The deployment lacks a required secret.
    Configuration(String),
    /// The generative-language service failed or answered with an error.
    Upstream(String),
    /// Unknown catalog id on a read endpoint.
    NotFound(String),
}

impl AppError {
    pub fn message(&self) -> &str {
        match self {
            AppError::InvalidInput(msg)
            | AppError::Configuration(msg)
            | AppError::Upstream(msg)
            | AppError::NotFound(msg) => msg,
        }
    }

    /// Every proxy failure shares one status so that callers cannot tell
    /// input problems from upstream ones by status alone.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
            AppError::Configuration(msg) => write!(f, "configuration error: {msg}"),
            AppError::Upstream(msg) => write!(f, "upstream error: {msg}"),
            AppError::NotFound(msg) => write!(f, "not found: {msg}"),
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::InvalidInput(_) | AppError::NotFound(_) => warn!("{}", self),
            AppError::Configuration(_) | AppError::Upstream(_) => error!("{}", self),
        }

        let status = self.status();
        let body = Json(ErrorResponse::new(self.message()));

        (status, body).into_response()
    }
}

/// Result type for application handlers
pub type AppResult<T> = Result<T, AppError>;
