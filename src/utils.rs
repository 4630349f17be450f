/*!
 * Utility functions for project-context
 */

use std::borrow::Cow;
use std::path::Path;

use once_cell::sync::Lazy;

/// Name of the per-project rule file
pub const CONFIG_FILE_NAME: &str = ".project-context.toml";

/// Name of the generated XML document
pub const OUTPUT_FILE_NAME: &str = "project-context.xml";

/// Relative path of `path` under `root`, joined with `/`.
///
/// Returns `None` for paths outside `root` and for `root` itself.
pub fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<_> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

/// Escape the five XML special characters (`<`, `>`, `&`, `'`, `"`)
pub fn escape_xml(raw: &str) -> Cow<'_, str> {
    quick_xml::escape::escape(raw)
}

/// Format a human-readable file size
pub fn format_file_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} bytes", size)
    }
}

/// Default entries hidden from the file tree
pub static DEFAULT_EXCLUDED_FROM_TREE: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        ".nuxt",
        ".git",
        ".output",
        "node_modules",
        CONFIG_FILE_NAME,
        OUTPUT_FILE_NAME,
        "build",
        "dist",
    ]
});

/// Default entries ignored by every stage
pub static DEFAULT_IGNORED: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        ".nuxt",
        ".output",
        "yarn.lock",
        "node_modules",
        ".git",
        CONFIG_FILE_NAME,
        OUTPUT_FILE_NAME,
        "build",
        "dist",
    ]
});
