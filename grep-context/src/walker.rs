//! Deterministic repository traversal with directory pruning and glob filters.
//!
//! Order is fixed so that result truncation is reproducible: within each
//! directory, files come before subdirectories and both are sorted by name.

use std::path::{Component, Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use tracing::{debug, trace, warn};
use walkdir::{DirEntry, WalkDir};

/// Directory names never descended into (in addition to any dot-directory).
pub const IGNORED_DIRS: &[&str] = &[
    ".git",
    "node_modules",
    "__pycache__",
    ".pytest_cache",
    ".mypy_cache",
    ".venv",
    "venv",
    "env",
    ".env",
    "dist",
    "build",
    "target",
    ".idea",
    ".vscode",
];

/// A candidate file that passed the include/exclude filters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkedFile {
    pub path: PathBuf,
    /// Root-relative, `/`-separated.
    pub rel_path: String,
}

/// Include/exclude glob filter. Each pattern is tested against both the
/// bare file name and the root-relative path.
#[derive(Debug, Clone)]
pub struct FileFilter {
    include: Option<GlobSet>,
    exclude: Option<GlobSet>,
}

impl FileFilter {
    pub fn new(include: &[String], exclude: &[String]) -> Self {
        Self {
            include: build_globset(include),
            exclude: build_globset(exclude),
        }
    }

    /// A file passes when it matches at least one include pattern and no
    /// exclude pattern. No include patterns means nothing passes.
    pub fn accepts(&self, file_name: &str, rel_path: &str) -> bool {
        let hit = |gs: &GlobSet| gs.is_match(file_name) || gs.is_match(rel_path);
        match &self.include {
            Some(inc) if hit(inc) => !self.exclude.as_ref().is_some_and(hit),
            _ => false,
        }
    }
}

/// Build a `GlobSet` from patterns. Blank or invalid patterns are skipped.
pub fn build_globset(patterns: &[String]) -> Option<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    let mut added = 0usize;
    for pat in patterns {
        if pat.trim().is_empty() {
            continue;
        }
        match Glob::new(pat) {
            Ok(g) => {
                builder.add(g);
                added += 1;
            }
            Err(e) => warn!(pattern = %pat, error = %e, "walker: skipping invalid glob"),
        }
    }
    if added == 0 {
        return None;
    }
    builder.build().ok()
}

/// Lazily yield candidate files under `root` in traversal order.
///
/// Symlinks to regular files are yielded; directory symlinks are never
/// descended into. Dangling links and unreadable entries are skipped.
pub fn walk_files<'a>(
    root: &'a Path,
    filter: &'a FileFilter,
) -> impl Iterator<Item = WalkedFile> + 'a {
    WalkDir::new(root)
        .follow_links(false)
        .sort_by(|a, b| {
            a.file_type()
                .is_dir()
                .cmp(&b.file_type().is_dir())
                .then_with(|| a.file_name().cmp(b.file_name()))
        })
        .into_iter()
        .filter_entry(keep_entry)
        .filter_map(|entry| match entry {
            Ok(e) => Some(e),
            Err(err) => {
                debug!(error = %err, "walker: skip unreadable entry");
                None
            }
        })
        .filter(is_regular_file)
        .filter_map(move |e| {
            let rel_path = relative_unix(root, e.path());
            let accepted = filter.accepts(&e.file_name().to_string_lossy(), &rel_path);
            if accepted {
                Some(WalkedFile {
                    path: e.into_path(),
                    rel_path,
                })
            } else {
                trace!(path = %rel_path, "walker: filtered out");
                None
            }
        })
}

fn is_regular_file(entry: &DirEntry) -> bool {
    let ft = entry.file_type();
    ft.is_file() || (ft.is_symlink() && entry.path().is_file())
}

/// Prune dot-directories and well-known vendor/build folders. The root
/// itself is always kept.
fn keep_entry(entry: &DirEntry) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return true;
    }
    let name = entry.file_name().to_string_lossy();
    !(name.starts_with('.') || IGNORED_DIRS.contains(&name.as_ref()))
}

/// Root-relative path joined with `/` regardless of platform.
pub fn relative_unix(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
