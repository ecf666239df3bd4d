//! Table decoding and fetching errors

use thiserror::Error;

/// Errors raised while decoding a catalog or interchangeability table
#[derive(Debug, Error)]
pub enum TableError {
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("table has no header row")]
    MissingHeader,

    #[error("catalog is missing required column {0}")]
    MissingColumn(&'static str),

    #[error("invalid number {value:?} in column {column} at row {row}")]
    InvalidNumber {
        row: usize,
        column: String,
        value: String,
    },

    #[error("invalid boolean {value:?} in column {column} at row {row}")]
    InvalidFlag {
        row: usize,
        column: String,
        value: String,
    },

    #[error("duplicate instance type {0} in catalog")]
    DuplicateInstance(String),

    #[error("duplicate row {0} in interchangeability matrix")]
    DuplicateRow(String),
}

/// Errors raised while fetching raw table bytes
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("invalid table location {0:?}")]
    InvalidKey(String),

    #[error("table {key} not found")]
    NotFound { key: String },

    #[error("failed to read table {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to fetch table {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("fetching table {url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("invalid bucket URL {0}")]
    InvalidUrl(#[from] url::ParseError),
}
