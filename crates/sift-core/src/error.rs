//! Error types for Sift

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Fallback classifier not configured")]
    ServiceUnavailable,

    #[error("Fallback classifier failed: {0}")]
    ServiceError(String),

    #[error("Fallback returned a malformed result: {0}")]
    MalformedResult(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Stable machine-readable kind, surfaced in API error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::InvalidRequest(_) => "invalid_request",
            Error::ServiceUnavailable => "service_unavailable",
            Error::ServiceError(_) => "service_error",
            Error::MalformedResult(_) => "malformed_result",
            Error::Http(_) => "http_error",
            Error::Json(_) => "json_error",
            Error::Csv(_) => "csv_error",
            Error::Io(_) => "io_error",
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
