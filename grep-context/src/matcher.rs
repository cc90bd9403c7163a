//! Pattern compilation, per-file scanning and the bounded search loop.
//!
//! Files are pulled from the walker in batches; each batch is scanned on the
//! rayon pool and merged back in traversal order, so the output (including
//! where truncation happens) is identical to a sequential scan.

use std::borrow::Cow;
use std::fs;

use rayon::prelude::*;
use regex::{Regex, RegexBuilder};
use tracing::{debug, info, trace};

use crate::binary::is_binary_file;
use crate::errors::{GrepContextError, GrepContextResult};
use crate::types::{GrepMatch, GrepQuery, SearchOutcome};
use crate::walker::{FileFilter, WalkedFile, walk_files};

/// Compile the user pattern. Literal patterns are escaped first.
pub fn compile_pattern(
    pattern: &str,
    is_regex: bool,
    case_sensitive: bool,
) -> GrepContextResult<Regex> {
    let source: Cow<'_, str> = if is_regex {
        Cow::Borrowed(pattern)
    } else {
        Cow::Owned(regex::escape(pattern))
    };
    RegexBuilder::new(&source)
        .case_insensitive(!case_sensitive)
        .build()
        .map_err(|e| GrepContextError::InvalidRegex {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })
}

/// Collects matches up to a fixed limit. Once full, callers stop walking.
#[derive(Debug)]
pub struct ResultAccumulator {
    limit: usize,
    matches: Vec<GrepMatch>,
}

impl ResultAccumulator {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            matches: Vec::with_capacity(limit.min(256)),
        }
    }

    /// Store `m` unless full. Returns `false` if it was dropped.
    pub fn push(&mut self, m: GrepMatch) -> bool {
        if self.is_full() {
            return false;
        }
        self.matches.push(m);
        true
    }

    pub fn is_full(&self) -> bool {
        self.matches.len() >= self.limit
    }

    pub fn remaining(&self) -> usize {
        self.limit.saturating_sub(self.matches.len())
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn into_matches(self) -> Vec<GrepMatch> {
        self.matches
    }
}

/// Scan decoded text line by line, returning at most `cap` matches.
///
/// Windows span `context_lines` on each side, clipped to `[1, line_count]`.
pub fn scan_text(
    rel_path: &str,
    text: &str,
    regex: &Regex,
    context_lines: usize,
    cap: usize,
) -> Vec<GrepMatch> {
    let lines: Vec<&str> = text.lines().collect();
    let mut out = Vec::new();

    for (idx, line) in lines.iter().enumerate() {
        if out.len() >= cap {
            break;
        }
        if !regex.is_match(line) {
            continue;
        }
        let n = idx + 1;
        let start = n.saturating_sub(context_lines).max(1);
        let end = n.saturating_add(context_lines).min(lines.len());
        let window = (start..=end)
            .map(|k| (k, lines[k - 1].trim_end().to_string()))
            .collect();

        out.push(GrepMatch {
            path: rel_path.to_string(),
            line_number: n,
            line: line.trim_end().to_string(),
            window,
        });
    }
    out
}

/// Scan one candidate file. Binary or unreadable files yield nothing.
pub fn scan_file(
    file: &WalkedFile,
    regex: &Regex,
    context_lines: usize,
    cap: usize,
) -> Vec<GrepMatch> {
    if is_binary_file(&file.path) {
        trace!(path = %file.rel_path, "matcher: skip binary");
        return Vec::new();
    }
    let bytes = match fs::read(&file.path) {
        Ok(b) => b,
        Err(e) => {
            debug!(path = %file.rel_path, error = %e, "matcher: skip unreadable file");
            return Vec::new();
        }
    };
    let text = String::from_utf8_lossy(&bytes);
    scan_text(&file.rel_path, &text, regex, context_lines, cap)
}

/// Run a full search for `query`, scanning `scan_batch` files per round.
pub fn search(query: &GrepQuery, scan_batch: usize) -> GrepContextResult<SearchOutcome> {
    let root = query.root.as_path();
    if !root.is_dir() {
        return Err(GrepContextError::RootNotFound(root.display().to_string()));
    }
    let regex = compile_pattern(&query.pattern, query.is_regex, query.case_sensitive)?;
    let filter = FileFilter::new(&query.include_globs, &query.exclude_globs);

    let acc = scan_files(
        walk_files(root, &filter),
        &regex,
        query.context_lines,
        query.max_results,
        scan_batch,
    );

    info!(
        root = %root.display(),
        pattern = %query.pattern,
        matches = acc.len(),
        "grep: search finished"
    );

    if acc.is_empty() {
        return Ok(SearchOutcome::NoMatches {
            pattern: query.pattern.clone(),
        });
    }
    Ok(SearchOutcome::Matches {
        matches: acc.into_matches(),
    })
}

/// Scan `files` in order, `scan_batch` at a time on the rayon pool, until
/// `max_results` matches are collected. A file that cannot be read
/// contributes nothing; the rest are still scanned.
pub fn scan_files(
    files: impl IntoIterator<Item = WalkedFile>,
    regex: &Regex,
    context_lines: usize,
    max_results: usize,
    scan_batch: usize,
) -> ResultAccumulator {
    let mut acc = ResultAccumulator::new(max_results);
    let mut files = files.into_iter();
    let batch_size = scan_batch.max(1);
    let mut batch: Vec<WalkedFile> = Vec::with_capacity(batch_size);
    let mut scanned = 0usize;

    while !acc.is_full() {
        batch.clear();
        batch.extend(files.by_ref().take(batch_size));
        if batch.is_empty() {
            break;
        }
        scanned += batch.len();

        let cap = acc.remaining();
        let found: Vec<Vec<GrepMatch>> = batch
            .par_iter()
            .map(|f| scan_file(f, regex, context_lines, cap))
            .collect();

        for m in found.into_iter().flatten() {
            if !acc.push(m) {
                break;
            }
        }
    }

    debug!(files = scanned, matches = acc.len(), "grep: files scanned");
    acc
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "one\ntwo TODO\nthree\nfour\nfive TODO   \nsix\n";

    #[test]
    fn literal_pattern_is_escaped() {
        let re = compile_pattern("a.b(", false, true).unwrap();
        assert!(re.is_match("x a.b( y"));
        assert!(!re.is_match("axb("));
    }

    #[test]
    fn invalid_regex_reports_pattern() {
        let err = compile_pattern("(unclosed", true, true).unwrap_err();
        assert!(err.to_string().starts_with("Invalid regex pattern: (unclosed\n"));
    }

    #[test]
    fn case_insensitive_literal() {
        let re = compile_pattern("todo", false, false).unwrap();
        assert!(re.is_match("// TODO: later"));
    }

    #[test]
    fn windows_are_clipped() {
        let re = compile_pattern("TODO", false, true).unwrap();
        let got = scan_text("a.txt", SAMPLE, &re, 2, usize::MAX);
        assert_eq!(got.len(), 2);

        assert_eq!(got[0].line_number, 2);
        assert_eq!((got[0].window_start(), got[0].window_end()), (1, 4));

        assert_eq!(got[1].line, "five TODO");
        assert_eq!((got[1].window_start(), got[1].window_end()), (3, 6));
    }

    #[test]
    fn zero_context_is_just_the_line() {
        let re = compile_pattern("three", false, true).unwrap();
        let got = scan_text("a.txt", SAMPLE, &re, 0, usize::MAX);
        assert_eq!(got[0].window, vec![(3, "three".to_string())]);
    }

    #[test]
    fn cap_limits_per_file_matches() {
        let re = compile_pattern("TODO", false, true).unwrap();
        assert_eq!(scan_text("a.txt", SAMPLE, &re, 0, 1).len(), 1);
    }

    #[test]
    fn unreadable_file_does_not_stop_the_scan() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "needle a\n").unwrap();
        std::fs::write(dir.path().join("c.txt"), "needle c\n").unwrap();
        let file = |name: &str| WalkedFile {
            path: dir.path().join(name),
            rel_path: name.to_string(),
        };
        let re = compile_pattern("needle", false, true).unwrap();

        for batch in [1, 2, 8] {
            let files = vec![file("a.txt"), file("b_missing.txt"), file("c.txt")];
            let got: Vec<String> = scan_files(files, &re, 0, 10, batch)
                .into_matches()
                .into_iter()
                .map(|m| m.path)
                .collect();
            assert_eq!(got, vec!["a.txt", "c.txt"], "batch size {batch}");
        }
    }

    #[test]
    fn accumulator_stops_at_limit() {
        let mut acc = ResultAccumulator::new(1);
        let m = GrepMatch {
            path: "a".into(),
            line_number: 1,
            line: "x".into(),
            window: vec![],
        };
        assert!(acc.push(m.clone()));
        assert!(acc.is_full());
        assert!(!acc.push(m));
        assert_eq!(acc.len(), 1);

        assert!(ResultAccumulator::new(0).is_full());
    }
}
