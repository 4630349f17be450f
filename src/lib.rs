/*!
 * project-context - Generate an XML snapshot of a project for LLM context
 *
 * This library keeps a per-project include list (`.project-context.toml`)
 * in sync with the directory tree and assembles project metadata, the file
 * tree and the contents of the selected files into one XML document.
 */

pub mod assembler;
pub mod collector;
pub mod config;
pub mod error;
pub mod matcher;
pub mod metadata;
pub mod report;
pub mod store;
pub mod tree;
pub mod types;
pub mod utils;
pub mod writer;


// Re-export main components for easier access
pub use assembler::ContextAssembler;
pub use collector::Collector;
pub use config::Config;
pub use error::{ContextError, Result};
pub use matcher::PathMatcher;
pub use report::{ContextReport, FileReportInfo, ReportFormat, Reporter};
pub use store::ConfigStore;
pub use tree::TreeWalker;
pub use types::{
    Classification, CollectedFile, Dependency, IncludedPath, MatchMode, ProjectContext,
    ProjectInfo, ProjectMetadata, RuleSet, TreeOrder,
};
pub use writer::XmlWriter;

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
