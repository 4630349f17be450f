/*!
 * End-to-end context generation
 */

use std::time::Instant;

use log::info;

use crate::collector::Collector;
use crate::config::Config;
use crate::error::Result;
use crate::matcher::PathMatcher;
use crate::metadata::load_project_info;
use crate::report::{ContextReport, FileReportInfo};
use crate::store::ConfigStore;
use crate::tree::TreeWalker;
use crate::types::ProjectContext;
use crate::writer::XmlWriter;

/// Runs the config → discover → sync → render → write pipeline
pub struct ContextAssembler {
    config: Config,
}

impl ContextAssembler {
    /// Create an assembler for a validated configuration
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Generate the context document.
    ///
    /// Config problems abort the run before the output file is touched.
    pub fn run(&self) -> Result<ContextReport> {
        let start_time = Instant::now();
        let root = &self.config.target_dir;
        let matcher = PathMatcher::new(self.config.match_mode);

        let store = ConfigStore::new(root, matcher);
        let config_path = store.ensure_exists(&[])?;
        let rules = store.load()?;

        let discovered = store.discover_paths(&rules);
        store.sync_included(&discovered, self.config.reset)?;
        let rules = store.load()?;

        let tree = TreeWalker::new(root, matcher, self.config.tree_order).render(&rules);
        let files = Collector::new(root, matcher, self.config.max_file_size).collect_listed(&rules);

        let context = ProjectContext {
            info: load_project_info(root),
            tree,
            files,
        };

        let writer = XmlWriter::new(&self.config.output_file);
        writer.write(&context)?;
        info!(
            "Project context has been generated in {}",
            writer.output_file().display()
        );

        Ok(ContextReport {
            output_file: self.config.output_file.display().to_string(),
            config_file: config_path.display().to_string(),
            reset: self.config.reset,
            duration: start_time.elapsed(),
            files_included: context.files.len(),
            total_lines: context.files.iter().map(|f| f.lines).sum(),
            total_chars: context.files.iter().map(|f| f.chars).sum(),
            file_details: context
                .files
                .iter()
                .map(|f| {
                    (
                        f.path.clone(),
                        FileReportInfo {
                            lines: f.lines,
                            chars: f.chars,
                        },
                    )
                })
                .collect(),
        })
    }
}
