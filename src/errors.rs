//! Error types for the aggregation API.

use thiserror::Error;

/// Errors reported by filtering and aggregation entry points.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The filter can never match anything (inverted date or value range).
    #[error("invalid filter: {reason}")]
    InvalidFilter { reason: String },

    /// A grouping dimension name outside the supported set.
    #[error("unknown group key: {0:?}")]
    UnknownGroupKey(String),
}

pub type ReportResult<T> = Result<T, ReportError>;
