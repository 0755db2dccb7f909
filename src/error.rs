//! Error types for loading and aggregating the report table.
//!
//! Library code returns these typed errors; the binary wraps them with
//! `anyhow` context.

use thiserror::Error;

/// Errors raised while resolving, fetching or parsing the source sheet.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LoadError {
    #[error("invalid sheet locator: {0}")]
    InvalidLocator(String),

    #[error("failed to fetch sheet: {detail}")]
    FetchFailure { detail: String },
}

impl LoadError {
    pub fn fetch(detail: impl Into<String>) -> Self {
        LoadError::FetchFailure {
            detail: detail.into(),
        }
    }
}

impl From<reqwest::Error> for LoadError {
    fn from(e: reqwest::Error) -> Self {
        LoadError::fetch(e.to_string())
    }
}

impl From<csv::Error> for LoadError {
    fn from(e: csv::Error) -> Self {
        LoadError::fetch(format!("malformed CSV: {}", e))
    }
}

impl From<std::io::Error> for LoadError {
    fn from(e: std::io::Error) -> Self {
        LoadError::fetch(e.to_string())
    }
}

/// Errors raised when a table lacks what an aggregation needs.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AggregationError {
    #[error("required column not found: {column}")]
    MissingColumn { column: String },
}

impl AggregationError {
    pub fn missing(column: &str) -> Self {
        AggregationError::MissingColumn {
            column: column.to_string(),
        }
    }
}

/// Errors raised while writing exports.
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),
}
