//! Runtime configuration loaded from environment variables.

use std::path::{Path, PathBuf};

use crate::cache::DEFAULT_CACHE_CAPACITY;

/// Files handed to the worker pool per round.
pub const DEFAULT_SCAN_BATCH: usize = 64;

/// Config bag for repository search. All fields have defaults via `from_env`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GrepConfig {
    /// Default search root when the caller does not pass one.
    pub repo_root: PathBuf,
    /// Max number of distinct queries kept in the LRU cache.
    pub cache_capacity: usize,
    /// Number of candidate files scanned in parallel per round.
    pub scan_batch: usize,
}

impl Default for GrepConfig {
    fn default() -> Self {
        Self {
            repo_root: resolve_repo_root(None),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            scan_batch: DEFAULT_SCAN_BATCH,
        }
    }
}

impl GrepConfig {
    /// Build from environment variables with sensible defaults.
    ///
    /// - `REPO_ROOT` (default: current directory)
    /// - `GREP_CACHE_CAPACITY` (default: 128)
    /// - `GREP_SCAN_BATCH` (default: 64)
    pub fn from_env() -> Self {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Same as [`GrepConfig::from_env`] with an arbitrary key lookup.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let repo_root = get("REPO_ROOT")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(current_dir);
        Self {
            repo_root,
            cache_capacity: parse(&get, "GREP_CACHE_CAPACITY", DEFAULT_CACHE_CAPACITY),
            scan_batch: parse(&get, "GREP_SCAN_BATCH", DEFAULT_SCAN_BATCH).max(1),
        }
    }
}

/// Explicit root, else `REPO_ROOT`, else the current working directory.
pub fn resolve_repo_root(explicit: Option<&Path>) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }
    std::env::var("REPO_ROOT")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(current_dir)
}

fn current_dir() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

fn parse<T: std::str::FromStr>(get: &impl Fn(&str) -> Option<String>, k: &str, dflt: T) -> T {
    get(k).and_then(|v| v.trim().parse().ok()).unwrap_or(dflt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn explicit_root_wins() {
        let root = resolve_repo_root(Some(Path::new("/tmp/some/repo")));
        assert_eq!(root, PathBuf::from("/tmp/some/repo"));
    }

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k: &str| map.get(k).cloned()
    }

    #[test]
    fn defaults() {
        let cfg = GrepConfig::default();
        assert_eq!(cfg.cache_capacity, 128);
        assert_eq!(cfg.scan_batch, 64);

        let from_empty = GrepConfig::from_lookup(lookup(&[]));
        assert_eq!(from_empty.cache_capacity, 128);
        assert_eq!(from_empty.scan_batch, 64);
    }

    #[test]
    fn overrides_and_scan_batch_clamp() {
        let cfg = GrepConfig::from_lookup(lookup(&[
            ("REPO_ROOT", "/work/repo"),
            ("GREP_CACHE_CAPACITY", "16"),
            ("GREP_SCAN_BATCH", "0"),
        ]));
        assert_eq!(cfg.repo_root, PathBuf::from("/work/repo"));
        assert_eq!(cfg.cache_capacity, 16);
        assert_eq!(cfg.scan_batch, 1);

        let junk = GrepConfig::from_lookup(lookup(&[("GREP_SCAN_BATCH", "many")]));
        assert_eq!(junk.scan_batch, 64);
    }
}
