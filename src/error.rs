//! Error types for the price pipeline.

use std::path::PathBuf;

use arrow::error::ArrowError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PricesError {
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("line {line}: empty market-change list")]
    EmptyMarketChange { line: usize },

    #[error("duplicate observation for {runner_name:?} at {}", display_ms(.publish_time))]
    DuplicateObservation { publish_time: i64, runner_name: String },

    #[error("arrow error: {0}")]
    Arrow(#[from] ArrowError),
}

/// Renders epoch milliseconds the way the tables show them.
pub fn format_ms(ms: i64) -> String {
    match chrono::DateTime::from_timestamp_millis(ms) {
        Some(dt) => dt.naive_utc().format("%Y-%m-%d %H:%M:%S%.3f").to_string(),
        None => format!("{ms}ms"),
    }
}

fn display_ms(ms: &i64) -> String {
    format_ms(*ms)
}

pub type Result<T> = std::result::Result<T, PricesError>;
