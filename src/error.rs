//! Error taxonomy for the upload and export endpoints

use thiserror::Error;

/// Failures surfaced to the browser as `{"error": message}`
#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed or missing request fields
    #[error("{0}")]
    InvalidRequest(String),

    /// The uploaded payload could not be read, in memory or from disk
    #[error("Error reading Excel file: {primary} | Fallback error: {fallback}")]
    Decode { primary: String, fallback: String },

    #[error("Unsupported export format: {0}")]
    UnsupportedFormat(String),

    #[error("No data loaded. Please load an Excel file first.")]
    NoTableLoaded,

    #[error("Export error: {0}")]
    Export(String),

    /// A blocking decode or encode task panicked or was cancelled
    #[error("Background task failed: {0}")]
    Worker(String),
}

impl AppError {
    /// Short machine-readable name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::InvalidRequest(_) => "invalid_request",
            AppError::Decode { .. } => "decode",
            AppError::UnsupportedFormat(_) => "unsupported_format",
            AppError::NoTableLoaded => "no_table_loaded",
            AppError::Export(_) => "export",
            AppError::Worker(_) => "worker",
        }
    }
}
