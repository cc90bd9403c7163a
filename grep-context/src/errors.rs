//! Crate-wide error hierarchy for grep-context.
//!
//! Display strings double as the user-facing text: the tool boundary renders
//! them as `Error: <display>`.

use thiserror::Error;

/// Convenient alias for crate-wide results.
pub type GrepContextResult<T> = Result<T, GrepContextError>;

/// Root error type for the grep-context crate.
#[derive(Debug, Error)]
pub enum GrepContextError {
    /// Search root is missing or is not a directory.
    #[error("Repository root does not exist: {0}")]
    RootNotFound(String),

    /// User-supplied regular expression failed to compile.
    #[error("Invalid regex pattern: {pattern}\n{reason}")]
    InvalidRegex { pattern: String, reason: String },

    /// Background search task panicked or was cancelled.
    #[error("search task failed: {0}")]
    Task(String),
}
