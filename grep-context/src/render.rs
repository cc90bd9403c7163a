//! Plain-text rendering of search results.

use crate::errors::GrepContextError;
use crate::types::{GrepMatch, SearchOutcome};

/// Closes every match block.
pub const BLOCK_DELIMITER: &str = "--------------------------------------------------";

const BLOCK_SEPARATOR: &str = "\n\n";

impl GrepMatch {
    /// ```text
    /// File: src/app.py
    /// Match: Line 12: def main():
    /// Context (Lines 10-14):
    /// 10: ...
    /// ```
    pub fn render(&self) -> String {
        let mut out = format!(
            "File: {}\nMatch: Line {}: {}\nContext (Lines {}-{}):\n",
            self.path,
            self.line_number,
            self.line,
            self.window_start(),
            self.window_end()
        );
        for (n, text) in &self.window {
            out.push_str(&format!("{n}: {text}\n"));
        }
        out.push_str(BLOCK_DELIMITER);
        out
    }
}

impl SearchOutcome {
    pub fn render(&self) -> String {
        match self {
            SearchOutcome::Matches { matches } => matches
                .iter()
                .map(GrepMatch::render)
                .collect::<Vec<_>>()
                .join(BLOCK_SEPARATOR),
            SearchOutcome::NoMatches { pattern } => {
                format!("No matches found for pattern: {pattern}")
            }
        }
    }
}

pub fn render_error(err: &GrepContextError) -> String {
    format!("Error: {err}")
}
