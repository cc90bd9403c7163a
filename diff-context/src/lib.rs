//! Diff context builder.
//!
//! Turns unified diff text into per-file [`FileContext`] values: every line
//! the diff reveals about the new file, numbered with its absolute post-change
//! line number and classified as added, modified or context, plus a numbered
//! rendering ready to be dropped into a review prompt.
//!
//! 1) **Parse** — [`parser::parse_patch`] splits the diff into files and hunks.
//! 2) **Reconstruct** — [`reconstruct::reconstruct`] walks hunks and assigns
//!    new-file line numbers, collecting added/modified/removed sets.
//! 3) **Format** — [`format::format_context_text`] renders the `File:` block.
//!
//! Malformed diffs never fail the public entry points: they are logged and
//! produce an empty mapping.

pub mod cfg;
pub mod errors;
pub mod format;
pub mod parser;
pub mod path;
pub mod reconstruct;
pub mod types;

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use tracing::{debug, error, info};

use crate::cfg::DiffContextConfig;
use crate::errors::{DiffContextError, DiffContextResult};
use crate::format::{format_context_text, select_lines};
use crate::path::normalize_file_path;

pub use crate::format::ContextSelection;
pub use crate::types::{ChangeKind, ClassifiedLine, FileContext, FilePatch};

/// Parse a diff and build a [`FileContext`] for every file with new content.
///
/// Binary files and deleted files are skipped. Keys are normalized paths
/// (no `a/`/`b/` prefix). Returns an empty map for empty or unparsable input.
///
/// # Example
/// ```
/// let diff = "\
/// diff --git a/src/main.py b/src/main.py
/// --- a/src/main.py
/// +++ b/src/main.py
/// @@ -10,2 +10,3 @@
///  print(\"hello\")
/// +print(\"world\")
///  print(\"done\")
/// ";
/// let contexts = diff_context::parse_diff_with_line_numbers(diff);
/// let ctx = &contexts["src/main.py"];
/// assert!(ctx.added.contains(&11));
/// assert_eq!(ctx.line_content(12), Some("print(\"done\")"));
/// ```
pub fn parse_diff_with_line_numbers(diff: &str) -> BTreeMap<String, FileContext> {
    parse_diff_with_options(diff, &DiffContextConfig::default())
}

/// Same as [`parse_diff_with_line_numbers`] with explicit configuration.
pub fn parse_diff_with_options(
    diff: &str,
    cfg: &DiffContextConfig,
) -> BTreeMap<String, FileContext> {
    match try_parse_diff(diff, cfg) {
        Ok(out) => out,
        Err(e) => {
            error!(error = %e, "failed to parse diff content");
            BTreeMap::new()
        }
    }
}

/// Strict variant of [`parse_diff_with_options`]: malformed diffs are
/// returned as [`DiffContextError::DiffParse`] instead of an empty map.
pub fn try_parse_diff(
    diff: &str,
    cfg: &DiffContextConfig,
) -> DiffContextResult<BTreeMap<String, FileContext>> {
    let mut out = BTreeMap::new();
    if diff.trim().is_empty() {
        return Ok(out);
    }

    let patches = parser::parse_patch(diff)?;
    for patch in &patches {
        let file_path = patch.path();
        if patch.is_binary || patch.is_removed {
            debug!(
                path = %file_path,
                binary = patch.is_binary,
                removed = patch.is_removed,
                "skipping file without new content"
            );
            continue;
        }
        let ctx = build_file_context(patch, cfg);
        out.insert(ctx.file_path.clone(), ctx);
    }

    info!(
        files = out.len(),
        skipped = patches.len().saturating_sub(out.len()),
        "diff context built"
    );
    Ok(out)
}

/// Build the numbered context for a single parsed file.
pub fn build_file_context(patch: &FilePatch, cfg: &DiffContextConfig) -> FileContext {
    let file_path = patch.path();
    let rec = reconstruct::reconstruct(&patch.hunks, cfg.modified_distance);
    let context_text = format_context_text(&file_path, &rec.lines);

    FileContext {
        file_path,
        lines: rec.lines,
        added: rec.added,
        modified: rec.modified,
        removed: rec.removed,
        context_text,
    }
}

/// Context for one file of the diff, looked up by a caller-supplied path
/// with or without `a/`/`b/` prefixes.
pub fn get_file_context(diff: &str, file_path: &str) -> Option<FileContext> {
    let mut all = parse_diff_with_line_numbers(diff);

    if let Some(ctx) = all.remove(file_path) {
        return Some(ctx);
    }
    let normalized = normalize_file_path(file_path);
    if let Some(ctx) = all.remove(&normalized) {
        return Some(ctx);
    }
    all.into_iter()
        .find(|(stored, _)| normalize_file_path(stored) == normalized)
        .map(|(_, ctx)| ctx)
}

/// Rendered context for one file, narrowed by `selection`.
///
/// Returns an empty string if the file is not part of the diff.
pub fn generate_context_text_for_file(
    diff: &str,
    file_path: &str,
    selection: ContextSelection,
) -> String {
    let Some(ctx) = get_file_context(diff, file_path) else {
        return String::new();
    };
    match selection {
        ContextSelection::Full => ctx.context_text,
        other => format_context_text(file_path, &select_lines(&ctx.lines, other)),
    }
}

/// Read diff text from disk.
pub fn load_diff_from_file(path: &Path) -> DiffContextResult<String> {
    if !path.exists() {
        return Err(DiffContextError::NotFound(path.display().to_string()));
    }
    Ok(fs::read_to_string(path)?)
}
