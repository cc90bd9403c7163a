//! Data model for parsed diffs and the per-file context built from them.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// One line inside a diff hunk.
///
/// Line numbers are 1-based and come from the hunk header positions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiffLine {
    Added {
        target_line: u32,
        content: String,
    },
    Removed {
        source_line: u32,
        content: String,
    },
    Context {
        source_line: u32,
        target_line: u32,
        content: String,
    },
}

impl DiffLine {
    pub fn is_added(&self) -> bool {
        matches!(self, DiffLine::Added { .. })
    }
}

/// A diff hunk (continuous block of changes).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hunk {
    pub source_start: u32,
    pub source_length: u32,
    pub target_start: u32,
    pub target_length: u32,
    /// Free text after the closing `@@` (usually the enclosing function).
    pub section_header: Option<String>,
    pub lines: Vec<DiffLine>,
}

/// File-level change and its hunks, as it appears in the diff.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilePatch {
    /// Old path as written in the diff (`a/...`), `None` for `/dev/null`.
    pub source_path: Option<String>,
    /// New path as written in the diff (`b/...`), `None` for `/dev/null`.
    pub target_path: Option<String>,
    pub is_added: bool,
    pub is_removed: bool,
    pub is_rename: bool,
    pub is_binary: bool,
    pub hunks: Vec<Hunk>,
}

impl FilePatch {
    /// Normalized identity of the file: the new path, or the old one for deletions.
    pub fn path(&self) -> String {
        let raw = if self.is_removed {
            self.source_path.as_deref().or(self.target_path.as_deref())
        } else {
            self.target_path.as_deref().or(self.source_path.as_deref())
        };
        crate::path::normalize_file_path(raw.unwrap_or_default())
    }
}

/// Classification of a line present in the new file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChangeKind {
    Added,
    Context,
    /// An added line that directly replaces a nearby removed line.
    Modified,
}

impl ChangeKind {
    /// Marker used in the numbered rendering.
    pub fn marker(self) -> char {
        match self {
            ChangeKind::Added => '+',
            ChangeKind::Modified => '~',
            ChangeKind::Context => ' ',
        }
    }

    pub fn is_change(self) -> bool {
        !matches!(self, ChangeKind::Context)
    }
}

/// A new-file line with its absolute line number and classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedLine {
    pub line_number: u32,
    pub content: String,
    pub kind: ChangeKind,
}

/// Numbered view of one file's new content as far as the diff reveals it.
///
/// `added` and `modified` are disjoint and reference new-file lines that are
/// present in `lines`; `removed` references old-file lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileContext {
    pub file_path: String,
    pub lines: Vec<ClassifiedLine>,
    pub added: BTreeSet<u32>,
    pub modified: BTreeSet<u32>,
    pub removed: BTreeSet<u32>,
    pub context_text: String,
}

impl FileContext {
    /// Content of a new-file line, without its trailing line terminator.
    pub fn line_content(&self, line_number: u32) -> Option<&str> {
        self.lines
            .binary_search_by_key(&line_number, |l| l.line_number)
            .ok()
            .map(|idx| self.lines[idx].content.trim_end_matches(['\n', '\r']))
    }

    /// `true` if the line was added or modified by the diff.
    pub fn is_line_changed(&self, line_number: u32) -> bool {
        self.added.contains(&line_number) || self.modified.contains(&line_number)
    }

    pub fn changed_lines(&self) -> impl Iterator<Item = &ClassifiedLine> {
        self.lines.iter().filter(|l| l.kind.is_change())
    }
}
