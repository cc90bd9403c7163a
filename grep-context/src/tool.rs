//! Tool boundary: cached searcher plus the caller-facing `GrepTool`.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde::Serialize;
use tracing::{debug, error, warn};

use crate::cache::{CacheStats, QueryCache};
use crate::cfg::{GrepConfig, resolve_repo_root};
use crate::errors::{GrepContextError, GrepContextResult};
use crate::matcher;
use crate::render::render_error;
use crate::types::{GrepQuery, GrepRequest, SearchOutcome};

/// Runs searches through a query cache. Identical queries are answered
/// without walking the tree again.
#[derive(Debug)]
pub struct GrepSearcher {
    cache: QueryCache<GrepQuery, Arc<SearchOutcome>>,
    scan_batch: usize,
    walks: AtomicUsize,
}

impl GrepSearcher {
    pub fn new(cfg: &GrepConfig) -> Self {
        Self::with_cache(QueryCache::new(cfg.cache_capacity), cfg.scan_batch)
    }

    pub fn with_cache(cache: QueryCache<GrepQuery, Arc<SearchOutcome>>, scan_batch: usize) -> Self {
        Self {
            cache,
            scan_batch: scan_batch.max(1),
            walks: AtomicUsize::new(0),
        }
    }

    pub fn search(&self, query: &GrepQuery) -> GrepContextResult<Arc<SearchOutcome>> {
        self.cache.get_or_try_insert_with(query, || {
            self.walks.fetch_add(1, Ordering::Relaxed);
            matcher::search(query, self.scan_batch).map(Arc::new)
        })
    }

    /// Rendered text for `query`; errors become `Error: ...` strings.
    pub fn search_text(&self, query: &GrepQuery) -> String {
        match self.search(query) {
            Ok(outcome) => outcome.render(),
            Err(e) => render_error(&e),
        }
    }

    /// Number of searches that actually walked the tree.
    pub fn walk_count(&self) -> usize {
        self.walks.load(Ordering::Relaxed)
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}

/// Structured reply of a tool invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GrepToolOutput {
    /// Match blocks, the no-matches sentinel, or an `Error: ...` string.
    pub result: String,
    pub pattern: String,
    pub match_count: usize,
    pub error: Option<String>,
}

impl GrepToolOutput {
    fn failed(pattern: String, err: &GrepContextError) -> Self {
        Self {
            result: render_error(err),
            pattern,
            match_count: 0,
            error: Some(err.to_string()),
        }
    }
}

/// Repository search tool bound to a workspace root.
#[derive(Debug, Clone)]
pub struct GrepTool {
    workspace_root: PathBuf,
    searcher: Arc<GrepSearcher>,
}

impl GrepTool {
    /// `workspace_root: None` falls back to `REPO_ROOT`, then the current dir.
    pub fn new(workspace_root: Option<PathBuf>, searcher: Arc<GrepSearcher>) -> Self {
        Self {
            workspace_root: resolve_repo_root(workspace_root.as_deref()),
            searcher,
        }
    }

    pub fn from_config(cfg: &GrepConfig) -> Self {
        Self {
            workspace_root: cfg.repo_root.clone(),
            searcher: Arc::new(GrepSearcher::new(cfg)),
        }
    }

    pub fn workspace_root(&self) -> &std::path::Path {
        &self.workspace_root
    }

    pub fn searcher(&self) -> &GrepSearcher {
        &self.searcher
    }

    pub fn run(&self, request: GrepRequest) -> GrepToolOutput {
        let query = request.into_query(self.workspace_root.clone());
        debug!(
            pattern = %query.pattern,
            regex = query.is_regex,
            root = %query.root.display(),
            "grep tool invoked"
        );

        match self.searcher.search(&query) {
            Ok(outcome) => GrepToolOutput {
                result: outcome.render(),
                match_count: outcome.match_count(),
                pattern: query.pattern,
                error: None,
            },
            Err(e) => {
                warn!(pattern = %query.pattern, error = %e, "grep tool failed");
                GrepToolOutput::failed(query.pattern, &e)
            }
        }
    }

    /// Same as [`GrepTool::run`], executed on the blocking pool.
    pub async fn run_async(&self, request: GrepRequest) -> GrepToolOutput {
        let pattern = request.pattern.clone();
        let tool = self.clone();
        match tokio::task::spawn_blocking(move || tool.run(request)).await {
            Ok(out) => out,
            Err(join) => {
                error!(error = %join, "grep task failed");
                GrepToolOutput::failed(pattern, &GrepContextError::Task(join.to_string()))
            }
        }
    }
}
