/*!
 * Core types and data structures for the project-context application
 */

/// How rule strings are compared against relative paths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    /// Whole-segment match: `build` matches `build` and `build/x`, not `build2`
    #[default]
    Segment,
    /// Raw string prefix: `build` also matches `build2`
    Prefix,
}

/// Sibling order used when rendering the file tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeOrder {
    /// Sort siblings by file name
    #[default]
    Lexicographic,
    /// Keep the order the filesystem enumerates entries in
    Raw,
}

/// An entry of the `included_paths` list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludedPath {
    /// Path relative to the project root
    pub path: String,
    /// Whether the entry is uncommented and will be collected
    pub active: bool,
}

impl IncludedPath {
    pub fn active(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            active: true,
        }
    }

    pub fn inactive(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            active: false,
        }
    }
}

/// The rules governing every traversal decision
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    /// Paths invisible to every stage
    pub ignored: Vec<String>,
    /// Paths hidden from the tree only
    pub excluded_from_tree: Vec<String>,
    /// Paths known to the include list, active or not
    pub included: Vec<IncludedPath>,
}

impl RuleSet {
    /// Active include entries, in file order
    pub fn active_included(&self) -> impl Iterator<Item = &str> {
        self.included
            .iter()
            .filter(|entry| entry.active)
            .map(|entry| entry.path.as_str())
    }
}

/// Result of matching a relative path against a rule set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Classification {
    pub ignored: bool,
    pub excluded_from_tree: bool,
}

/// A file whose content was gathered for the output document
#[derive(Debug, Clone)]
pub struct CollectedFile {
    /// Relative path from the project root
    pub path: String,
    /// Text content (or a placeholder for oversized files)
    pub content: String,
    /// Number of lines
    pub lines: usize,
    /// Number of characters
    pub chars: usize,
}

/// A single dependency listed in the project manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    pub name: String,
    pub version: String,
}

/// Metadata extracted from the project manifest
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectMetadata {
    /// Manifest file the metadata came from
    pub manifest: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub version: Option<String>,
    pub dependencies: Vec<Dependency>,
}

/// Outcome of looking up project metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectInfo {
    /// A manifest was found and parsed
    Found(ProjectMetadata),
    /// No known manifest exists in the project root
    Missing,
    /// A manifest exists but could not be read or parsed
    Unreadable {
        /// Manifest file name
        manifest: String,
        /// Why reading failed
        reason: String,
    },
}

/// The assembled document written to the output file
#[derive(Debug, Clone)]
pub struct ProjectContext {
    /// Project metadata block
    pub info: ProjectInfo,
    /// Rendered file tree
    pub tree: String,
    /// Collected file contents, in collection order
    pub files: Vec<CollectedFile>,
}
