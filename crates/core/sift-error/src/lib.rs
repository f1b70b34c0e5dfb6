//! Error types for snapsift.
//!
//! This crate provides:
//! - [`SiftError`] - Top-level error enum for the filter engine
//! - The [`Result`] alias used throughout the workspace
//!
//! Every error is raised at the point of detection and propagates to the
//! caller unchanged; the engine never catches or retries internally.

use thiserror::Error;

/// Top-level error type for the snapsift filter engine.
#[derive(Error, Debug)]
pub enum SiftError {
    /// A required parameter was omitted (repository name, `direction`,
    /// `timestring` when the age source is the snapshot name).
    #[error("Missing required argument: {0}")]
    MissingArgument(String),

    /// A supplied parameter had an unrecognized or structurally invalid
    /// value (bad state, bad pattern kind, bad unit, bad direction, a null
    /// pattern value).
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    /// A filter-chain entry is structurally malformed (missing or invalid
    /// `filtertype`).
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The snapshot listing could not be fetched, or the named repository
    /// does not exist. Wraps the underlying source error.
    #[error("Failed to fetch snapshot listing: {0}")]
    FailedExecution(#[source] anyhow::Error),

    /// The working set is empty where a caller demanded at least one
    /// surviving snapshot.
    #[error("No snapshots remain in the working set")]
    NoSnapshots,
}

/// Result type alias using SiftError.
pub type Result<T> = std::result::Result<T, SiftError>;
