//! Repository grep with context windows.
//!
//! 1) **Walk** — [`walker::walk_files`] yields candidate files in a fixed
//!    order, pruning vendor/hidden directories and applying glob filters.
//! 2) **Sniff** — [`binary::is_binary_file`] drops binary files.
//! 3) **Match** — [`matcher::search`] scans files in parallel batches and
//!    stops once `max_results` matches are collected.
//! 4) **Cache** — [`tool::GrepSearcher`] memoizes outcomes per
//!    [`GrepQuery`] in a bounded LRU ([`cache::QueryCache`]).
//!
//! The caller-facing entry point is [`GrepTool`]:
//!
//! ```no_run
//! use std::sync::Arc;
//! use grep_context::{GrepConfig, GrepRequest, GrepSearcher, GrepTool};
//!
//! let cfg = GrepConfig::from_env();
//! let tool = GrepTool::new(None, Arc::new(GrepSearcher::new(&cfg)));
//! let out = tool.run(GrepRequest::new("TODO"));
//! println!("{}", out.result);
//! ```

pub mod binary;
pub mod cache;
pub mod cfg;
pub mod errors;
pub mod matcher;
pub mod render;
pub mod tool;
pub mod types;
pub mod walker;

pub use crate::cache::{CacheStats, QueryCache};
pub use crate::cfg::GrepConfig;
pub use crate::errors::{GrepContextError, GrepContextResult};
pub use crate::tool::{GrepSearcher, GrepTool, GrepToolOutput};
pub use crate::types::{GrepMatch, GrepQuery, GrepRequest, SearchOutcome};
