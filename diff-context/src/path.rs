//! Path helpers for diff file names.

/// Strip the `a/` or `b/` diff prefix and any leading `/`, leaving a
/// repository-relative path.
///
/// # Example
/// ```
/// use diff_context::path::normalize_file_path;
///
/// assert_eq!(normalize_file_path("b/src/main.rs"), "src/main.rs");
/// assert_eq!(normalize_file_path("/src/main.rs"), "src/main.rs");
/// assert_eq!(normalize_file_path("src/main.rs"), "src/main.rs");
/// ```
pub fn normalize_file_path(path: &str) -> String {
    let path = path.trim();
    let path = path
        .strip_prefix("a/")
        .or_else(|| path.strip_prefix("b/"))
        .unwrap_or(path);
    path.trim_start_matches('/').to_string()
}
