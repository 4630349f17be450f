/*!
 * File tree rendering
 */

use std::path::{Path, PathBuf};

use log::warn;
use walkdir::{DirEntry, WalkDir};

use crate::matcher::PathMatcher;
use crate::types::{RuleSet, TreeOrder};
use crate::utils::relative_path;

const BRANCH: &str = "├── ";
const LAST_BRANCH: &str = "└── ";
const PIPE: &str = "│   ";
const SPACE: &str = "    ";

/// Renders the project tree with box-drawing prefixes
pub struct TreeWalker {
    root: PathBuf,
    matcher: PathMatcher,
    order: TreeOrder,
}

impl TreeWalker {
    /// Create a tree walker for `root`
    pub fn new(root: impl Into<PathBuf>, matcher: PathMatcher, order: TreeOrder) -> Self {
        Self {
            root: root.into(),
            matcher,
            order,
        }
    }

    /// Render every entry that is neither ignored nor excluded from the tree,
    /// one per line
    pub fn render(&self, rules: &RuleSet) -> String {
        let mut out = String::new();
        self.render_dir(&self.root, rules, "", &mut out);
        out
    }

    fn render_dir(&self, dir: &Path, rules: &RuleSet, prefix: &str, out: &mut String) {
        let entries = self.visible_children(dir, rules);
        let count = entries.len();

        for (index, entry) in entries.into_iter().enumerate() {
            let is_last = index + 1 == count;
            let name = entry.file_name().to_string_lossy();
            let connector = if is_last { LAST_BRANCH } else { BRANCH };

            if entry.file_type().is_dir() {
                out.push_str(&format!("{}{}{}/\n", prefix, connector, name));
                let child_prefix = format!("{}{}", prefix, if is_last { SPACE } else { PIPE });
                self.render_dir(entry.path(), rules, &child_prefix, out);
            } else {
                out.push_str(&format!("{}{}{}\n", prefix, connector, name));
            }
        }
    }

    /// Direct children of `dir` that survive the rules, in the configured order
    fn visible_children(&self, dir: &Path, rules: &RuleSet) -> Vec<DirEntry> {
        let mut walker = WalkDir::new(dir).min_depth(1).max_depth(1).follow_links(false);
        if self.order == TreeOrder::Lexicographic {
            walker = walker.sort_by_file_name();
        }

        walker
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!("Unable to read {}: {}", dir.display(), e);
                    None
                }
            })
            .filter(|entry| match relative_path(&self.root, entry.path()) {
                Some(rel) => {
                    let class = self.matcher.classify(&rel, rules);
                    !class.ignored && !class.excluded_from_tree
                }
                None => false,
            })
            .collect()
    }
}
