//! Crate-wide error hierarchy for diff-context.

use thiserror::Error;

/// Convenient alias for crate-wide results.
pub type DiffContextResult<T> = Result<T, DiffContextError>;

/// Root error type for the diff-context crate.
#[derive(Debug, Error)]
pub enum DiffContextError {
    /// Unified diff parsing failure.
    #[error(transparent)]
    DiffParse(#[from] DiffParseError),

    /// I/O failure while loading diff text from disk.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Diff file requested by the caller does not exist.
    #[error("diff file not found: {0}")]
    NotFound(String),
}

/// Unified diff parser errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DiffParseError {
    /// Hunk header could not be parsed or had invalid counters.
    #[error("invalid hunk header at line {line}: {header}")]
    InvalidHunkHeader { line: usize, header: String },

    /// A hunk header appeared before any `---`/`+++` file header.
    #[error("hunk found outside of a file section at line {line}")]
    HunkOutsideFile { line: usize },

    /// Hunk body ended early or ran past the lengths declared in its header.
    #[error("hunk body does not match its header at line {line}: expected -{expected_source}/+{expected_target} lines")]
    HunkLengthMismatch {
        line: usize,
        expected_source: u32,
        expected_target: u32,
    },

    /// Integer overflow while computing line ranges.
    #[error("integer overflow")]
    Overflow,
}
