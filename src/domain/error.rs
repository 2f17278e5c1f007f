//! Error types for the grid engine.
//!
//! This module defines the centralized error type [`GridError`] and a type alias
//! [`Result`] used at the crate's fallible boundaries: configuration loading,
//! record ingestion and log file setup. The engine stages themselves (filter,
//! sort, window, selection) never fail; stale or malformed inputs there degrade
//! to no-ops instead.

use thiserror::Error;

/// The main error type for grid operations.
///
/// Most variants wrap underlying errors from external crates using `#[from]`
/// for automatic conversion.
///
/// # Examples
///
/// ```
/// use virtgrid::GridError;
///
/// fn validate_overscan(overscan: i64) -> Result<(), GridError> {
///     if overscan < 0 {
///         return Err(GridError::Config("overscan must not be negative".to_string()));
///     }
///     Ok(())
/// }
///
/// assert!(validate_overscan(-1).is_err());
/// ```
#[derive(Debug, Error)]
pub enum GridError {
    /// Two records in one collection reported the same row identity.
    ///
    /// Returned when the active [`DuplicatePolicy`](crate::engine::DuplicatePolicy)
    /// is `FailFast`. The id is rendered with its `Debug` representation.
    #[error("duplicate row id {id} in record collection")]
    DuplicateRowId {
        /// Debug rendering of the offending id.
        id: String,
    },

    /// A JSON record did not carry its designated id field.
    #[error("record at index {index} has no usable `{field}` id field")]
    MissingRowId {
        /// Position of the record in the input array.
        index: usize,
        /// Name of the id field that was expected.
        field: String,
    },

    /// Configuration is invalid or malformed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Filesystem or I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON input could not be parsed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML configuration could not be parsed.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// A specialized `Result` type for grid operations.
pub type Result<T> = std::result::Result<T, GridError>;
