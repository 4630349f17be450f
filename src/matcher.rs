/*!
 * Path classification against a rule set
 *
 * All paths handled here are relative to the project root and use `/` as the
 * separator, whatever the host platform.
 */

use crate::types::{Classification, MatchMode, RuleSet};

/// Decides whether a relative path is ignored, hidden from the tree or
/// included for content collection
#[derive(Debug, Clone, Copy, Default)]
pub struct PathMatcher {
    mode: MatchMode,
}

impl PathMatcher {
    /// Create a matcher using the given rule matching mode
    pub fn new(mode: MatchMode) -> Self {
        Self { mode }
    }

    /// Classify a path against the ignore and tree-exclusion lists
    pub fn classify(&self, path: &str, rules: &RuleSet) -> Classification {
        Classification {
            ignored: self.is_ignored(path, rules),
            excluded_from_tree: self.is_excluded_from_tree(path, rules),
        }
    }

    /// Check if a path matches any `ignored` rule
    pub fn is_ignored(&self, path: &str, rules: &RuleSet) -> bool {
        rules
            .ignored
            .iter()
            .any(|rule| matches_rule(path, rule, self.mode))
    }

    /// Check if a path matches any `excluded_from_tree` rule
    pub fn is_excluded_from_tree(&self, path: &str, rules: &RuleSet) -> bool {
        rules
            .excluded_from_tree
            .iter()
            .any(|rule| matches_rule(path, rule, self.mode))
    }

    /// Check if a path should have its content collected.
    ///
    /// A path is included when it equals an active entry or lies inside one.
    /// With no active entries nothing is included.
    pub fn is_included(&self, path: &str, rules: &RuleSet) -> bool {
        if self.is_ignored(path, rules) {
            return false;
        }

        rules
            .active_included()
            .any(|entry| matches_rule(path, entry, MatchMode::Segment))
    }

    /// Check if some active entry lies strictly inside the directory `dir`
    pub fn leads_to_included(&self, dir: &str, rules: &RuleSet) -> bool {
        let dir = normalize_rule(dir);
        if dir.is_empty() {
            return rules.active_included().next().is_some();
        }

        rules.active_included().any(|entry| {
            let entry = normalize_rule(entry);
            entry.len() > dir.len()
                && entry.starts_with(dir)
                && entry.as_bytes()[dir.len()] == b'/'
        })
    }
}

/// Test a relative path against a single rule
pub fn matches_rule(path: &str, rule: &str, mode: MatchMode) -> bool {
    let rule = normalize_rule(rule);
    if rule.is_empty() {
        return false;
    }

    match mode {
        MatchMode::Prefix => path.starts_with(rule),
        MatchMode::Segment => {
            path == rule
                || (path.starts_with(rule) && path.as_bytes().get(rule.len()) == Some(&b'/'))
        }
    }
}

/// Strip a leading `./` and trailing separators from a rule
fn normalize_rule(rule: &str) -> &str {
    let rule = rule.trim();
    let rule = rule.strip_prefix("./").unwrap_or(rule);
    rule.trim_end_matches('/')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::IncludedPath;

    fn rules() -> RuleSet {
        RuleSet {
            ignored: vec!["build".into(), "node_modules".into()],
            excluded_from_tree: vec![".git".into()],
            included: vec![
                IncludedPath::active("src"),
                IncludedPath::active("docs/guide.md"),
                IncludedPath::inactive("README.md"),
            ],
        }
    }

    #[test]
    fn test_segment_matching() {
        assert!(matches_rule("build", "build", MatchMode::Segment));
        assert!(matches_rule("build/x.ts", "build", MatchMode::Segment));
        assert!(!matches_rule("build2", "build", MatchMode::Segment));
        assert!(!matches_rule("src/build", "build", MatchMode::Segment));
    }

    #[test]
    fn test_prefix_matching_keeps_legacy_behavior() {
        assert!(matches_rule("build", "build", MatchMode::Prefix));
        assert!(matches_rule("build/x.ts", "build", MatchMode::Prefix));
        assert!(matches_rule("build2", "build", MatchMode::Prefix));
    }

    #[test]
    fn test_rule_normalization() {
        assert!(matches_rule("dist/app.js", "./dist/", MatchMode::Segment));
        assert!(!matches_rule("anything", "", MatchMode::Segment));
        assert!(!matches_rule("anything", "", MatchMode::Prefix));
    }

    #[test]
    fn test_classify() {
        let matcher = PathMatcher::default();
        let rules = rules();

        assert_eq!(
            matcher.classify("build/out.js", &rules),
            Classification {
                ignored: true,
                excluded_from_tree: false
            }
        );
        assert_eq!(
            matcher.classify(".git/config", &rules),
            Classification {
                ignored: false,
                excluded_from_tree: true
            }
        );
        assert_eq!(matcher.classify("src/lib.rs", &rules), Classification::default());
    }

    #[test]
    fn test_inclusion() {
        let matcher = PathMatcher::default();
        let rules = rules();

        assert!(matcher.is_included("src", &rules));
        assert!(matcher.is_included("src/main.rs", &rules));
        assert!(matcher.is_included("docs/guide.md", &rules));
        assert!(!matcher.is_included("docs/other.md", &rules));
        assert!(!matcher.is_included("srcx/main.rs", &rules));
        // Inactive entries are remembered but not collected
        assert!(!matcher.is_included("README.md", &rules));
    }

    #[test]
    fn test_ignored_paths_are_never_included() {
        let matcher = PathMatcher::default();
        let mut rules = rules();
        rules.included.push(IncludedPath::active("build/keep.js"));

        assert!(!matcher.is_included("build/keep.js", &rules));
    }

    #[test]
    fn test_empty_include_list_includes_nothing() {
        let matcher = PathMatcher::default();
        let rules = RuleSet::default();

        assert!(!matcher.is_included("src/main.rs", &rules));
        assert!(!matcher.leads_to_included("", &rules));
    }

    #[test]
    fn test_leads_to_included() {
        let matcher = PathMatcher::default();
        let rules = rules();

        assert!(matcher.leads_to_included("docs", &rules));
        assert!(matcher.leads_to_included("", &rules));
        assert!(!matcher.leads_to_included("doc", &rules));
        assert!(!matcher.leads_to_included("src", &rules));
    }
}
