use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub const DEFAULT_CONTEXT_LINES: usize = 10;
pub const DEFAULT_MAX_RESULTS: usize = 50;
pub const DEFAULT_INCLUDE: &str = "*";

/// Caller-facing search request, as it arrives from a tool invocation.
///
/// Missing fields take the documented defaults; `include_patterns: None`
/// means "every file".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrepRequest {
    pub pattern: String,
    pub is_regex: bool,
    pub case_sensitive: bool,
    pub include_patterns: Option<Vec<String>>,
    pub exclude_patterns: Option<Vec<String>>,
    pub context_lines: usize,
    pub max_results: usize,
}

impl Default for GrepRequest {
    fn default() -> Self {
        Self {
            pattern: String::new(),
            is_regex: false,
            case_sensitive: true,
            include_patterns: None,
            exclude_patterns: None,
            context_lines: DEFAULT_CONTEXT_LINES,
            max_results: DEFAULT_MAX_RESULTS,
        }
    }
}

impl GrepRequest {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            ..Self::default()
        }
    }

    /// Resolve against a concrete root into a cacheable query.
    pub fn into_query(self, root: PathBuf) -> GrepQuery {
        let include = self
            .include_patterns
            .unwrap_or_else(|| vec![DEFAULT_INCLUDE.to_string()]);
        GrepQuery {
            root,
            pattern: self.pattern,
            is_regex: self.is_regex,
            case_sensitive: self.case_sensitive,
            include_globs: include.into(),
            exclude_globs: self.exclude_patterns.unwrap_or_default().into(),
            context_lines: self.context_lines,
            max_results: self.max_results,
        }
    }
}

/// Fully-resolved search parameters. Two equal queries return the same
/// outcome, so this is also the cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GrepQuery {
    pub root: PathBuf,
    pub pattern: String,
    pub is_regex: bool,
    pub case_sensitive: bool,
    pub include_globs: Arc<[String]>,
    pub exclude_globs: Arc<[String]>,
    pub context_lines: usize,
    pub max_results: usize,
}

impl GrepQuery {
    pub fn new(root: impl Into<PathBuf>, pattern: impl Into<String>) -> Self {
        GrepRequest::new(pattern).into_query(root.into())
    }

    pub fn regex(mut self, yes: bool) -> Self {
        self.is_regex = yes;
        self
    }

    pub fn case_sensitive(mut self, yes: bool) -> Self {
        self.case_sensitive = yes;
        self
    }

    pub fn include<I, S>(mut self, globs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include_globs = globs.into_iter().map(Into::into).collect();
        self
    }

    pub fn exclude<I, S>(mut self, globs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_globs = globs.into_iter().map(Into::into).collect();
        self
    }

    pub fn context_lines(mut self, n: usize) -> Self {
        self.context_lines = n;
        self
    }

    pub fn max_results(mut self, n: usize) -> Self {
        self.max_results = n;
        self
    }
}

/// One matching line and its clipped window of neighbours.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrepMatch {
    /// Path relative to the search root, `/`-separated.
    pub path: String,
    /// 1-based.
    pub line_number: usize,
    /// Matching line with trailing whitespace removed.
    pub line: String,
    /// `(line_number, text)` pairs, inclusive, in file order.
    pub window: Vec<(usize, String)>,
}

impl GrepMatch {
    pub fn window_start(&self) -> usize {
        self.window.first().map_or(self.line_number, |(n, _)| *n)
    }

    pub fn window_end(&self) -> usize {
        self.window.last().map_or(self.line_number, |(n, _)| *n)
    }
}

/// Result of a successful search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SearchOutcome {
    Matches { matches: Vec<GrepMatch> },
    NoMatches { pattern: String },
}

impl SearchOutcome {
    pub fn matches(&self) -> &[GrepMatch] {
        match self {
            SearchOutcome::Matches { matches } => matches,
            SearchOutcome::NoMatches { .. } => &[],
        }
    }

    pub fn match_count(&self) -> usize {
        self.matches().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_defaults_fill_missing_fields() {
        let req: GrepRequest = serde_json::from_str(r#"{"pattern":"TODO"}"#).unwrap();
        assert_eq!(req.context_lines, 10);
        assert_eq!(req.max_results, 50);
        assert!(req.case_sensitive);
        assert!(!req.is_regex);

        let q = req.into_query(PathBuf::from("/repo"));
        assert_eq!(&*q.include_globs, &["*".to_string()]);
        assert!(q.exclude_globs.is_empty());
    }

    #[test]
    fn equal_queries_are_equal_keys() {
        let a = GrepQuery::new("/repo", "x").include(["*.rs"]);
        let b = GrepRequest {
            include_patterns: Some(vec!["*.rs".into()]),
            ..GrepRequest::new("x")
        }
        .into_query("/repo".into());
        assert_eq!(a, b);
        assert_ne!(a, b.clone().case_sensitive(false));
    }
}
