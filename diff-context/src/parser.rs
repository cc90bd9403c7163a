//! Unified diff parser for diff-context.
//!
//! Understands git-style and plain unified diffs:
//! - `diff --git a/X b/Y`, `--- <path>`, `+++ <path>` file headers
//!   (`/dev/null` marks an added or removed file);
//! - `new file mode`, `deleted file mode`, `rename from/to` extended headers;
//! - `Binary files ... differ` / `GIT binary patch` markers;
//! - hunks headed `@@ -<old_start>[,<old_len>] +<new_start>[,<new_len>] @@`.
//!
//! Hunk bodies are consumed strictly by the declared lengths, so a body that
//! ends early is reported as an error instead of being silently accepted.

use tracing::debug;

use crate::errors::DiffParseError;
use crate::types::{DiffLine, FilePatch, Hunk};

const DEV_NULL: &str = "/dev/null";

/// Parses a unified diff text into per-file patches, in diff order.
///
/// Text that contains no file headers at all yields an empty list.
pub fn parse_patch(diff: &str) -> Result<Vec<FilePatch>, DiffParseError> {
    let mut files: Vec<FilePatch> = Vec::new();
    let mut current: Option<FileState> = None;
    let mut hunk: Option<HunkState> = None;

    for (idx, line) in diff.lines().enumerate() {
        let lineno = idx + 1;

        if let Some(state) = hunk.as_mut() {
            state.push_body_line(line, lineno)?;
            if state.is_complete() {
                let done = hunk.take().map(HunkState::finish);
                if let (Some(file), Some(h)) = (current.as_mut(), done) {
                    file.patch.hunks.push(h);
                }
            }
            continue;
        }

        if let Some(rest) = line.strip_prefix("diff --git ") {
            flush(&mut files, current.take());
            let mut state = FileState::default();
            if let Some((src, dst)) = split_git_header(rest) {
                state.patch.source_path = Some(src.to_string());
                state.patch.target_path = Some(dst.to_string());
            }
            current = Some(state);
        } else if let Some(rest) = line.strip_prefix("--- ") {
            // Plain diffs have no `diff --git` line: `---` opens a new file.
            let opens_new = match current.as_ref() {
                None => true,
                Some(f) => f.saw_source_header || !f.patch.hunks.is_empty(),
            };
            if opens_new {
                flush(&mut files, current.take());
                current = Some(FileState::default());
            }
            if let Some(file) = current.as_mut() {
                file.saw_source_header = true;
                match header_path(rest) {
                    Some(p) => file.patch.source_path = Some(p),
                    None => {
                        file.patch.source_path = None;
                        file.patch.is_added = true;
                    }
                }
            }
        } else if let Some(rest) = line.strip_prefix("+++ ") {
            let file = current.get_or_insert_with(FileState::default);
            match header_path(rest) {
                Some(p) => file.patch.target_path = Some(p),
                None => {
                    file.patch.target_path = None;
                    file.patch.is_removed = true;
                }
            }
        } else if line.starts_with("@@") {
            let Some(file) = current.as_mut() else {
                return Err(DiffParseError::HunkOutsideFile { line: lineno });
            };
            let state = HunkState::open(line, lineno)?;
            if state.is_complete() {
                file.patch.hunks.push(state.finish());
            } else {
                hunk = Some(state);
            }
        } else if let Some(file) = current.as_mut() {
            if !file.patch.hunks.is_empty() && is_body_line(line) {
                // Past the declared hunk length: dropped, like other unidiff readers.
                debug!(line = lineno, "ignoring diff line outside any hunk");
            } else {
                apply_extended_header(&mut file.patch, line);
            }
        }
        // Anything else (prelude, `index ...`, `\ No newline` after a hunk) is ignored.
    }

    if let Some(state) = hunk {
        return Err(DiffParseError::HunkLengthMismatch {
            line: diff.lines().count(),
            expected_source: state.hunk.source_length,
            expected_target: state.hunk.target_length,
        });
    }
    flush(&mut files, current);

    Ok(files)
}

#[derive(Default)]
struct FileState {
    patch: FilePatch,
    saw_source_header: bool,
}

fn flush(files: &mut Vec<FilePatch>, state: Option<FileState>) {
    if let Some(state) = state {
        files.push(state.patch);
    }
}

/// Hunk being filled; counts down the declared lengths.
struct HunkState {
    hunk: Hunk,
    source_left: u32,
    target_left: u32,
    next_source: u32,
    next_target: u32,
}

impl HunkState {
    fn open(header: &str, lineno: usize) -> Result<Self, DiffParseError> {
        let h = parse_hunk_header(header, lineno)?;
        Ok(Self {
            source_left: h.source_length,
            target_left: h.target_length,
            next_source: h.source_start,
            next_target: h.target_start,
            hunk: Hunk {
                source_start: h.source_start,
                source_length: h.source_length,
                target_start: h.target_start,
                target_length: h.target_length,
                section_header: h.section,
                lines: Vec::new(),
            },
        })
    }

    fn is_complete(&self) -> bool {
        self.source_left == 0 && self.target_left == 0
    }

    fn finish(self) -> Hunk {
        self.hunk
    }

    fn push_body_line(&mut self, line: &str, lineno: usize) -> Result<(), DiffParseError> {
        let (expected_source, expected_target) = (self.hunk.source_length, self.hunk.target_length);
        let mismatch = || DiffParseError::HunkLengthMismatch {
            line: lineno,
            expected_source,
            expected_target,
        };

        if line.starts_with('\\') {
            // "\ No newline at end of file"
            return Ok(());
        }

        if let Some(content) = line.strip_prefix('+') {
            if self.target_left == 0 {
                return Err(mismatch());
            }
            self.hunk.lines.push(DiffLine::Added {
                target_line: self.next_target,
                content: content.to_string(),
            });
            self.target_left -= 1;
            self.next_target = bump(self.next_target)?;
        } else if let Some(content) = line.strip_prefix('-') {
            if self.source_left == 0 {
                return Err(mismatch());
            }
            self.hunk.lines.push(DiffLine::Removed {
                source_line: self.next_source,
                content: content.to_string(),
            });
            self.source_left -= 1;
            self.next_source = bump(self.next_source)?;
        } else if line.is_empty() || line.starts_with(' ') {
            // Some tools strip the single space of blank context lines.
            if self.source_left == 0 || self.target_left == 0 {
                return Err(mismatch());
            }
            self.hunk.lines.push(DiffLine::Context {
                source_line: self.next_source,
                target_line: self.next_target,
                content: line.get(1..).unwrap_or_default().to_string(),
            });
            self.source_left -= 1;
            self.target_left -= 1;
            self.next_source = bump(self.next_source)?;
            self.next_target = bump(self.next_target)?;
        } else {
            return Err(mismatch());
        }
        Ok(())
    }
}

fn is_body_line(line: &str) -> bool {
    matches!(line.as_bytes().first(), Some(b'+' | b'-' | b' '))
}

fn bump(n: u32) -> Result<u32, DiffParseError> {
    n.checked_add(1).ok_or(DiffParseError::Overflow)
}

struct HunkHeader {
    source_start: u32,
    source_length: u32,
    target_start: u32,
    target_length: u32,
    section: Option<String>,
}

fn parse_hunk_header(line: &str, lineno: usize) -> Result<HunkHeader, DiffParseError> {
    let invalid = || DiffParseError::InvalidHunkHeader {
        line: lineno,
        header: line.to_string(),
    };

    // "@@ -1,5 +1,7 @@ optional text"
    let rest = line.strip_prefix("@@ ").ok_or_else(invalid)?;
    let (ranges, section) = rest.split_once(" @@").ok_or_else(invalid)?;

    let mut parts = ranges.split_whitespace();
    let old_part = parts
        .next()
        .and_then(|p| p.strip_prefix('-'))
        .ok_or_else(invalid)?;
    let new_part = parts
        .next()
        .and_then(|p| p.strip_prefix('+'))
        .ok_or_else(invalid)?;
    if parts.next().is_some() {
        return Err(invalid());
    }

    let (source_start, source_length) = split_range(old_part).ok_or_else(invalid)?;
    let (target_start, target_length) = split_range(new_part).ok_or_else(invalid)?;

    let section = section.trim();
    Ok(HunkHeader {
        source_start,
        source_length,
        target_start,
        target_length,
        section: (!section.is_empty()).then(|| section.to_string()),
    })
}

/// Splits "12,7" into (12, 7); a bare "12" means a one-line range.
fn split_range(s: &str) -> Option<(u32, u32)> {
    match s.split_once(',') {
        Some((start, len)) => Some((start.parse().ok()?, len.parse().ok()?)),
        None => Some((s.parse().ok()?, 1)),
    }
}

/// Splits the `a/X b/Y` tail of a `diff --git` line.
fn split_git_header(rest: &str) -> Option<(&str, &str)> {
    let idx = rest.rfind(" b/")?;
    Some((rest[..idx].trim(), rest[idx + 1..].trim()))
}

/// Path from a `---`/`+++` header, `None` for `/dev/null`. Drops the optional
/// tab-separated timestamp.
fn header_path(rest: &str) -> Option<String> {
    let path = rest.split('\t').next().unwrap_or(rest).trim();
    if path == DEV_NULL {
        None
    } else {
        Some(path.to_string())
    }
}

fn apply_extended_header(patch: &mut FilePatch, line: &str) {
    if line.starts_with("new file mode") {
        patch.is_added = true;
    } else if line.starts_with("deleted file mode") {
        patch.is_removed = true;
    } else if let Some(from) = line.strip_prefix("rename from ") {
        patch.is_rename = true;
        patch.source_path = Some(from.trim().to_string());
    } else if let Some(to) = line.strip_prefix("rename to ") {
        patch.is_rename = true;
        patch.target_path = Some(to.trim().to_string());
    } else if line.starts_with("GIT binary patch")
        || (line.starts_with("Binary files ") && line.ends_with(" differ"))
    {
        patch.is_binary = true;
    }
}
