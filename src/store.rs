/*!
 * Persisted rule set: creation, loading and include-list synchronisation
 *
 * The rule file is TOML with three arrays. Inactive include entries are kept
 * as commented lines inside the `included_paths` block, so that block is
 * rewritten textually between its `included_paths = [` and `]` marker lines
 * while everything else in the file is left byte-for-byte intact.
 */

use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use serde::Deserialize;
use walkdir::WalkDir;

use crate::bail;
use crate::error::Result;
use crate::matcher::PathMatcher;
use crate::types::{IncludedPath, RuleSet};
use crate::utils::{relative_path, CONFIG_FILE_NAME, DEFAULT_EXCLUDED_FROM_TREE, DEFAULT_IGNORED};

const INCLUDED_START: &str = "included_paths = [";
const SECTION_END: &str = "]";

/// On-disk layout of the rule file
#[derive(Debug, Deserialize)]
struct RuleFile {
    #[serde(default)]
    excluded_from_file_tree: Vec<String>,
    #[serde(default)]
    ignored_paths: Vec<String>,
    #[serde(default)]
    included_paths: Vec<String>,
}

/// Wrapper used to parse a single include line as a TOML array
#[derive(Debug, Deserialize)]
struct EntryLine {
    entry: Vec<String>,
}

/// Rule file bound to one project root
#[derive(Debug, Clone)]
pub struct ConfigStore {
    root: PathBuf,
    path: PathBuf,
    matcher: PathMatcher,
}

impl ConfigStore {
    /// Create a store for the rule file at the root of `root`
    pub fn new(root: impl Into<PathBuf>, matcher: PathMatcher) -> Self {
        let root = root.into();
        Self {
            path: root.join(CONFIG_FILE_NAME),
            root,
            matcher,
        }
    }

    /// Location of the rule file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the rule file with default lists if it does not exist yet.
    ///
    /// `initial_paths` are written to the include list, all inactive. An
    /// existing file is never touched.
    pub fn ensure_exists(&self, initial_paths: &[String]) -> Result<PathBuf> {
        if self.path.exists() {
            debug!("Using existing config file {}", self.path.display());
            return Ok(self.path.clone());
        }

        fs::write(&self.path, default_config_content(initial_paths))?;
        info!("Created new config file at {}", self.path.display());
        Ok(self.path.clone())
    }

    /// Load the rule set from disk
    pub fn load(&self) -> Result<RuleSet> {
        let content = fs::read_to_string(&self.path)?;
        parse_rules(&content)
    }

    /// List every file and directory under the root that is not ignored,
    /// sorted and deduplicated
    pub fn discover_paths(&self, rules: &RuleSet) -> Vec<String> {
        let mut paths = BTreeSet::new();

        let walker = WalkDir::new(&self.root)
            .min_depth(1)
            .follow_links(false)
            .into_iter()
            .filter_entry(|entry| match relative_path(&self.root, entry.path()) {
                Some(rel) => !self.matcher.is_ignored(&rel, rules),
                None => false,
            });

        for entry in walker {
            match entry {
                Ok(entry) => {
                    match relative_path(&self.root, entry.path()) {
                        // Include entries are one per line
                        Some(rel) if rel.contains(['\n', '\r']) => {
                            warn!("Skipping path with a line break: {:?}", rel)
                        }
                        Some(rel) => {
                            paths.insert(rel);
                        }
                        None => {}
                    }
                }
                Err(e) => warn!("Unable to access entry: {}", e),
            }
        }

        paths.into_iter().collect()
    }

    /// Rewrite the include list so it holds exactly `discovered`.
    ///
    /// An entry stays active only when it was active before and `reset` is
    /// false; everything else is written commented out.
    pub fn sync_included(&self, discovered: &[String], reset: bool) -> Result<()> {
        let content = fs::read_to_string(&self.path)?;
        let previous = parse_rules(&content)?;
        let active: HashSet<&str> = previous.active_included().collect();

        let newline = line_ending(&content);
        let lines: Vec<&str> = content.split(newline).collect();
        let Some((start, end)) = find_included_block(&lines) else {
            bail!(
                ConfigFormat,
                "could not find the `{}` ... `{}` block in {}",
                INCLUDED_START,
                SECTION_END,
                self.path.display()
            );
        };

        let entries: Vec<IncludedPath> = discovered
            .iter()
            .map(|path| IncludedPath {
                path: path.clone(),
                active: !reset && active.contains(path.as_str()),
            })
            .collect();
        let block = render_included_lines(&entries);

        let updated = lines[..=start]
            .iter()
            .map(|line| line.to_string())
            .chain(block)
            .chain(lines[end..].iter().map(|line| line.to_string()))
            .collect::<Vec<_>>()
            .join(newline);

        if updated == content {
            debug!("Included paths in {} already up to date", self.path.display());
            return Ok(());
        }

        fs::write(&self.path, updated)?;
        info!("Updated included paths in {}", self.path.display());
        Ok(())
    }
}

/// Parse rule file content into a rule set
pub fn parse_rules(content: &str) -> Result<RuleSet> {
    let file: RuleFile = toml::from_str(content)?;
    let lines: Vec<&str> = content.split('\n').collect();

    let included = match find_included_block(&lines) {
        Some((start, end)) => {
            let entries = parse_included_lines(&lines[start + 1..end]);
            let listed_active: Vec<&str> = entries
                .iter()
                .filter(|entry| entry.active)
                .map(|entry| entry.path.as_str())
                .collect();

            if listed_active == file.included_paths {
                entries
            } else {
                debug!("Include block layout differs from parsed array, treating all entries as active");
                file.included_paths.into_iter().map(IncludedPath::active).collect()
            }
        }
        None => file.included_paths.into_iter().map(IncludedPath::active).collect(),
    };

    Ok(RuleSet {
        ignored: file.ignored_paths,
        excluded_from_tree: file.excluded_from_file_tree,
        included,
    })
}

/// Line terminator used by existing content, CRLF when any line has one
fn line_ending(content: &str) -> &'static str {
    if content.contains("\r\n") {
        "\r\n"
    } else {
        "\n"
    }
}

/// Locate the `included_paths = [` line and its closing `]` line
fn find_included_block(lines: &[&str]) -> Option<(usize, usize)> {
    let start = lines.iter().position(|line| line.trim() == INCLUDED_START)?;
    let end = lines[start + 1..]
        .iter()
        .position(|line| line.trim() == SECTION_END)?;
    Some((start, start + 1 + end))
}

/// Read include entries from the lines between the block markers
fn parse_included_lines(lines: &[&str]) -> Vec<IncludedPath> {
    let mut entries = Vec::new();

    for line in lines {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let (body, active) = match trimmed.strip_prefix('#') {
            Some(rest) => (rest.trim(), false),
            None => (trimmed, true),
        };

        // Plain comments that are not quoted entries fail to parse and are skipped
        let wrapped = format!("entry = [\n{}\n]", body);
        match toml::from_str::<EntryLine>(&wrapped) {
            Ok(parsed) => entries.extend(
                parsed
                    .entry
                    .into_iter()
                    .map(|path| IncludedPath { path, active }),
            ),
            Err(_) if !active => continue,
            Err(e) => debug!("Unparseable include line {:?}: {}", trimmed, e),
        }
    }

    entries
}

/// Render include entries as block lines, commenting inactive ones
fn render_included_lines(entries: &[IncludedPath]) -> Vec<String> {
    entries
        .iter()
        .enumerate()
        .map(|(idx, entry)| {
            let marker = if entry.active { "" } else { "# " };
            let separator = if idx + 1 < entries.len() { "," } else { "" };
            format!("  {}{}{}", marker, quote(&entry.path), separator)
        })
        .collect()
}

/// Default rule file with the given paths listed inactive
fn default_config_content(initial_paths: &[String]) -> String {
    let included: Vec<IncludedPath> = initial_paths
        .iter()
        .map(|path| IncludedPath::inactive(path.as_str()))
        .collect();
    let mut included_block = render_included_lines(&included).join("\n");
    if !included_block.is_empty() {
        included_block.push('\n');
    }

    format!(
        "# Files/directories to exclude from tree visualization\n\
         excluded_from_file_tree = [\n{}\n]\n\
         \n\
         # Files/directories to completely ignore\n\
         ignored_paths = [\n{}\n]\n\
         \n\
         # Paths to include in XML content\n\
         {}\n{}{}\n",
        render_list(&DEFAULT_EXCLUDED_FROM_TREE),
        render_list(&DEFAULT_IGNORED),
        INCLUDED_START,
        included_block,
        SECTION_END,
    )
}

fn render_list(items: &[&str]) -> String {
    items
        .iter()
        .map(|item| format!("  {}", quote(item)))
        .collect::<Vec<_>>()
        .join(",\n")
}

/// Encode a path as a TOML string
fn quote(path: &str) -> String {
    toml::Value::String(path.to_owned()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ContextError;
    use tempfile::tempdir;

    const SAMPLE: &str = r#"# rules
excluded_from_file_tree = [
  ".git"
]

ignored_paths = [
  "ignored"
]

# Paths to include in XML content
included_paths = [
  "a.ts",
  # "b.ts",
  # just a note
  "src"
]
"#;

    #[test]
    fn test_parse_rules_keeps_inactive_entries_in_order() {
        let rules = parse_rules(SAMPLE).unwrap();

        assert_eq!(rules.ignored, vec!["ignored".to_string()]);
        assert_eq!(rules.excluded_from_tree, vec![".git".to_string()]);
        assert_eq!(
            rules.included,
            vec![
                IncludedPath::active("a.ts"),
                IncludedPath::inactive("b.ts"),
                IncludedPath::active("src"),
            ]
        );
    }

    #[test]
    fn test_parse_inline_array_treats_entries_as_active() {
        let rules = parse_rules("included_paths = [\"a\", \"b\"]\n").unwrap();
        assert_eq!(
            rules.included,
            vec![IncludedPath::active("a"), IncludedPath::active("b")]
        );
        assert!(rules.ignored.is_empty());
    }

    #[test]
    fn test_parse_invalid_toml() {
        let err = parse_rules("included_paths = [\n  \"a\",\n").unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_quote_round_trips_through_toml() {
        assert_eq!(quote("src/main.rs"), "\"src/main.rs\"");

        for path in [r#"we"ird\path"#, "it's\ttabbed", "dir/ünïcode.md", r#"both ' and ""#] {
            let rules = parse_rules(&format!(
                "included_paths = [\n  {},\n  # {}\n]\n",
                quote(path),
                quote(path)
            ))
            .unwrap();
            assert_eq!(
                rules.included,
                vec![IncludedPath::active(path), IncludedPath::inactive(path)]
            );
        }
    }

    #[test]
    fn test_sync_keeps_crlf_line_endings() {
        let temp_dir = tempdir().unwrap();
        let store = ConfigStore::new(temp_dir.path(), PathMatcher::default());
        fs::write(
            store.path(),
            "ignored_paths = [\r\n  \"x\"\r\n]\r\n\r\nincluded_paths = [\r\n  \"a.ts\"\r\n]\r\n",
        )
        .unwrap();

        let discovered = vec!["a.ts".to_string(), "b.ts".to_string()];
        store.sync_included(&discovered, false).unwrap();
        let first = fs::read_to_string(store.path()).unwrap();

        assert_eq!(
            first,
            "ignored_paths = [\r\n  \"x\"\r\n]\r\n\r\nincluded_paths = [\r\n  \"a.ts\",\r\n  # \"b.ts\"\r\n]\r\n"
        );
        assert!(!first.replace("\r\n", "").contains('\n'));

        store.sync_included(&discovered, false).unwrap();
        assert_eq!(fs::read_to_string(store.path()).unwrap(), first);
        assert_eq!(
            store.load().unwrap().included,
            vec![IncludedPath::active("a.ts"), IncludedPath::inactive("b.ts")]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_discovery_skips_paths_with_line_breaks() {
        let temp_dir = tempdir().unwrap();
        fs::write(temp_dir.path().join("ok.txt"), "").unwrap();
        fs::write(temp_dir.path().join("two\nlines.txt"), "").unwrap();
        let store = ConfigStore::new(temp_dir.path(), PathMatcher::default());

        assert_eq!(store.discover_paths(&RuleSet::default()), vec!["ok.txt"]);
    }

    #[test]
    fn test_default_config_is_valid() {
        let content = default_config_content(&["a.ts".to_string(), "b.ts".to_string()]);
        let rules = parse_rules(&content).unwrap();

        assert!(rules.ignored.iter().any(|p| p == CONFIG_FILE_NAME));
        assert!(rules.excluded_from_tree.iter().any(|p| p == ".git"));
        assert_eq!(
            rules.included,
            vec![IncludedPath::inactive("a.ts"), IncludedPath::inactive("b.ts")]
        );

        let empty = parse_rules(&default_config_content(&[])).unwrap();
        assert!(empty.included.is_empty());
    }

    #[test]
    fn test_ensure_exists_never_overwrites() {
        let temp_dir = tempdir().unwrap();
        let store = ConfigStore::new(temp_dir.path(), PathMatcher::default());

        let path = store.ensure_exists(&[]).unwrap();
        assert_eq!(path, temp_dir.path().join(CONFIG_FILE_NAME));

        fs::write(&path, SAMPLE).unwrap();
        store.ensure_exists(&["other".to_string()]).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), SAMPLE);
    }

    #[test]
    fn test_sync_without_markers_fails_and_leaves_file() {
        let temp_dir = tempdir().unwrap();
        let store = ConfigStore::new(temp_dir.path(), PathMatcher::default());
        let original = "ignored_paths = []\nincluded_paths = [\"a.ts\"]\n";
        fs::write(store.path(), original).unwrap();

        let err = store
            .sync_included(&["a.ts".to_string()], false)
            .unwrap_err();
        assert!(matches!(err, ContextError::ConfigFormat(_)));
        assert_eq!(fs::read_to_string(store.path()).unwrap(), original);
    }
}
