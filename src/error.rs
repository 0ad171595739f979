//! Error type shared by the record store, the report pipeline and the web layer.

#[cfg(feature = "web")]
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Everything that can go wrong while serving a single interaction.
///
/// None of these are retried; the user resolves them by trying again.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("file error: {0}")]
    Io(#[from] std::io::Error),

    /// The record or user file could not be parsed (missing columns, bad numbers).
    #[error("record file error: {0}")]
    Csv(#[from] csv::Error),

    /// Submitted form values outside their allowed ranges.
    #[error("{0}")]
    Validation(String),

    #[error("chart rendering failed: {0}")]
    Chart(String),

    #[error("export failed: {0}")]
    Export(String),

    #[error("template error: {0}")]
    Template(String),

    #[error("record store lock poisoned")]
    StorePoisoned,
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(feature = "web")]
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Validation(message) => (StatusCode::BAD_REQUEST, message).into_response(),
            other => {
                log::error!("request failed: {}", other);
                (StatusCode::INTERNAL_SERVER_ERROR, other.to_string()).into_response()
            }
        }
    }
}
