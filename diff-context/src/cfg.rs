//! Runtime configuration loaded from environment variables.

use crate::reconstruct::MODIFIED_LINE_DISTANCE;

/// Knobs for diff context building. All fields have defaults via `from_env`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiffContextConfig {
    /// Max distance between a removed line and the following added line for
    /// the added line to be reported as modified.
    pub modified_distance: u32,
}

impl Default for DiffContextConfig {
    fn default() -> Self {
        Self {
            modified_distance: MODIFIED_LINE_DISTANCE,
        }
    }
}

impl DiffContextConfig {
    /// Build from environment variables with sensible defaults.
    ///
    /// # Example
    /// ```
    /// use diff_context::cfg::DiffContextConfig;
    /// let cfg = DiffContextConfig::from_env();
    /// assert_eq!(DiffContextConfig::default().modified_distance, 3);
    /// # let _ = cfg;
    /// ```
    pub fn from_env() -> Self {
        Self {
            modified_distance: parse("DIFF_MODIFIED_DISTANCE", MODIFIED_LINE_DISTANCE),
        }
    }
}

fn parse<T: std::str::FromStr>(k: &str, dflt: T) -> T {
    std::env::var(k)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(dflt)
}
