//! Numbered rendering of classified lines for prompt assembly.
//!
//! Output shape (consumed verbatim downstream, keep it stable):
//! ```text
//! File: src/main.py
//! ================================================================================
//!     10: print("hello")
//! +   11: print("world")
//! ~   12: print("done!")
//! ================================================================================
//! ```

use std::collections::BTreeSet;

use crate::types::{ClassifiedLine, FileContext};

const SEPARATOR_WIDTH: usize = 80;

/// Which classified lines to include when rendering a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContextSelection {
    /// Every line the diff reveals.
    #[default]
    Full,
    /// Added and modified lines only.
    ChangedOnly,
    /// Changed lines plus lines within `n` of a changed line.
    Around(u32),
}

/// Render `lines` under a `File:` header with markers and 4-column line numbers.
pub fn format_context_text(file_path: &str, lines: &[ClassifiedLine]) -> String {
    if lines.is_empty() {
        return format!("File: {file_path}\n(No new content in this file)\n");
    }

    let separator = "=".repeat(SEPARATOR_WIDTH);
    let mut out: Vec<String> = Vec::with_capacity(lines.len() + 3);
    out.push(format!("File: {file_path}"));
    out.push(separator.clone());
    for line in lines {
        let content = line.content.trim_end_matches(['\n', '\r']);
        out.push(format!(
            "{} {:>4}: {}",
            line.kind.marker(),
            line.line_number,
            content
        ));
    }
    out.push(separator);
    out.join("\n")
}

/// Subset of `lines` picked by `selection`, in input order.
pub fn select_lines(lines: &[ClassifiedLine], selection: ContextSelection) -> Vec<ClassifiedLine> {
    match selection {
        ContextSelection::Full => lines.to_vec(),
        ContextSelection::ChangedOnly => lines
            .iter()
            .filter(|l| l.kind.is_change())
            .cloned()
            .collect(),
        ContextSelection::Around(radius) => {
            let changed: BTreeSet<u32> = lines
                .iter()
                .filter(|l| l.kind.is_change())
                .map(|l| l.line_number)
                .collect();
            lines
                .iter()
                .filter(|l| {
                    let lo = l.line_number.saturating_sub(radius);
                    let hi = l.line_number.saturating_add(radius);
                    changed.range(lo..=hi).next().is_some()
                })
                .cloned()
                .collect()
        }
    }
}

impl FileContext {
    /// Keep only the lines picked by `selection` and re-render
    /// `context_text`. `added`/`modified` shrink with `lines`; `removed` is
    /// kept as is.
    pub fn narrowed(mut self, selection: ContextSelection) -> Self {
        if selection == ContextSelection::Full {
            return self;
        }
        self.lines = select_lines(&self.lines, selection);
        let kept: BTreeSet<u32> = self.lines.iter().map(|l| l.line_number).collect();
        self.added.retain(|n| kept.contains(n));
        self.modified.retain(|n| kept.contains(n));
        self.context_text = format_context_text(&self.file_path, &self.lines);
        self
    }
}
