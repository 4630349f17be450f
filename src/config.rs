/*!
 * Configuration handling for project-context
 */

use std::path::{Path, PathBuf};

use clap::Parser;

use crate::error::Result;
use crate::types::{MatchMode, TreeOrder};
use crate::utils::OUTPUT_FILE_NAME;
use crate::{bail, ensure};

/// Literal first argument that selects reset mode
pub const RESET_TOKEN: &str = "reset";

/// Default size limit for collected file content (1MB)
pub const DEFAULT_MAX_FILE_SIZE: u64 = 1_048_576;

/// Command-line arguments for project-context
#[derive(Parser, Debug, Clone)]
#[clap(
    name = "project-context",
    version = env!("CARGO_PKG_VERSION"),
    about = "Generate an XML snapshot of a project for LLM context",
    long_about = "Keeps a .project-context.toml include list in sync with the project tree and writes project-context.xml containing project metadata, the file tree and the contents of every active included path.\n\nPass `reset` before the directory to mark every included path inactive again."
)]
pub struct Args {
    /// Target directory, or `reset` followed by the target directory
    #[clap(value_name = "reset|DIRECTORY")]
    pub first: Option<String>,

    /// Target directory when `reset` is given
    #[clap(value_name = "DIRECTORY")]
    pub directory: Option<String>,
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    /// Target directory to process
    pub target_dir: PathBuf,

    /// Output XML file path
    pub output_file: PathBuf,

    /// Mark every included path inactive while syncing
    pub reset: bool,

    /// Sibling order in the rendered tree
    pub tree_order: TreeOrder,

    /// How ignore and tree-exclusion rules match paths
    pub match_mode: MatchMode,

    /// Files larger than this get a placeholder instead of their content
    pub max_file_size: u64,
}

impl Config {
    /// Configuration with defaults for the given target directory
    pub fn new(target_dir: impl Into<PathBuf>) -> Self {
        let target_dir = target_dir.into();
        Self {
            output_file: target_dir.join(OUTPUT_FILE_NAME),
            target_dir,
            reset: false,
            tree_order: TreeOrder::default(),
            match_mode: MatchMode::default(),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }

    /// Create configuration from command-line arguments
    pub fn from_args(args: Args) -> Result<Self> {
        let (reset, directory) = match (args.first, args.directory) {
            (Some(first), directory) if first == RESET_TOKEN => (true, directory),
            (first, None) => (false, first),
            (None, directory) => (false, directory),
            (Some(first), Some(extra)) => bail!(
                InvalidArgument,
                "unexpected argument '{}' after directory '{}' (use `{} <DIRECTORY>` to reset)",
                extra,
                first,
                RESET_TOKEN
            ),
        };

        let mut config = Self::new(directory.unwrap_or_else(|| ".".to_string()));
        config.reset = reset;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.target_dir.is_dir(),
            PathNotFound,
            "Target directory does not exist: {}",
            display_absolute(&self.target_dir).display()
        );

        Ok(())
    }
}

fn display_absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
