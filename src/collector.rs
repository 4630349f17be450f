/*!
 * Content collection for included files
 */

use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use walkdir::WalkDir;

use crate::matcher::PathMatcher;
use crate::types::{CollectedFile, RuleSet};
use crate::utils::{format_file_size, relative_path};

/// Bytes sampled when sniffing whether a file is text
const SNIFF_LEN: usize = 8192;

/// Kinds of file the collector distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileKind {
    Text,
    Binary,
}

/// Collects `(path, content)` pairs for the files a rule set includes
pub struct Collector {
    root: PathBuf,
    matcher: PathMatcher,
    max_file_size: u64,
}

impl Collector {
    /// Create a collector for `root`
    pub fn new(root: impl Into<PathBuf>, matcher: PathMatcher, max_file_size: u64) -> Self {
        Self {
            root: root.into(),
            matcher,
            max_file_size,
        }
    }

    /// Walk the whole tree and collect every file the rules include.
    ///
    /// Directories are entered when they are included themselves or when an
    /// active entry lies below them.
    pub fn collect_walk(&self, rules: &RuleSet) -> Vec<CollectedFile> {
        let mut files = Vec::new();

        let walker = WalkDir::new(&self.root)
            .min_depth(1)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| match relative_path(&self.root, entry.path()) {
                Some(rel) if entry.file_type().is_dir() => {
                    !self.matcher.is_ignored(&rel, rules)
                        && (self.matcher.is_included(&rel, rules)
                            || self.matcher.leads_to_included(&rel, rules))
                }
                Some(rel) => self.matcher.is_included(&rel, rules),
                None => false,
            });

        for entry in walker {
            match entry {
                Ok(entry) if entry.file_type().is_dir() => {
                    debug!("Entering directory: {}", entry.path().display());
                }
                Ok(entry) => {
                    if let Some(rel) = relative_path(&self.root, entry.path()) {
                        if let Some(file) = self.read_entry(entry.path(), rel) {
                            files.push(file);
                        }
                    }
                }
                Err(e) => warn!("Unable to access entry: {}", e),
            }
        }

        files
    }

    /// Collect the active include entries in list order.
    ///
    /// Listed directories are recursed into; each file is emitted once even
    /// when it is covered by several entries.
    pub fn collect_listed(&self, rules: &RuleSet) -> Vec<CollectedFile> {
        let mut files = Vec::new();
        let mut seen = HashSet::new();

        for listed in rules.active_included() {
            if self.matcher.is_ignored(listed, rules) {
                debug!("Skipping ignored include entry {}", listed);
                continue;
            }

            let abs_path = self.root.join(listed);
            let metadata = match fs::metadata(&abs_path) {
                Ok(metadata) => metadata,
                Err(e) => {
                    warn!("Unable to access {}: {}", listed, e);
                    continue;
                }
            };

            if metadata.is_dir() {
                for file in self.collect_dir(&abs_path, rules) {
                    if seen.insert(file.path.clone()) {
                        files.push(file);
                    }
                }
            } else if seen.insert(listed.to_string()) {
                if let Some(file) = self.read_entry(&abs_path, listed.to_string()) {
                    files.push(file);
                }
            }
        }

        files
    }

    /// Collect every non-ignored file below an included directory
    fn collect_dir(&self, dir: &Path, rules: &RuleSet) -> Vec<CollectedFile> {
        let mut files = Vec::new();

        let walker = WalkDir::new(dir)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| match relative_path(&self.root, entry.path()) {
                Some(rel) => !self.matcher.is_ignored(&rel, rules),
                None => false,
            });

        for entry in walker {
            match entry {
                Ok(entry) if entry.file_type().is_dir() => {}
                Ok(entry) => {
                    if let Some(rel) = relative_path(&self.root, entry.path()) {
                        if let Some(file) = self.read_entry(entry.path(), rel) {
                            files.push(file);
                        }
                    }
                }
                Err(e) => warn!("Unable to access entry: {}", e),
            }
        }

        files
    }

    /// Read one file, logging and skipping it on failure
    fn read_entry(&self, abs_path: &Path, rel_path: String) -> Option<CollectedFile> {
        match self.read_file(abs_path, rel_path.clone()) {
            Ok(Some(file)) => {
                info!("Added {} to context.", file.path);
                Some(file)
            }
            Ok(None) => None,
            Err(e) => {
                warn!("Unable to read file {}: {}", rel_path, e);
                None
            }
        }
    }

    /// Read a file's content; `None` for files that are not text
    fn read_file(&self, abs_path: &Path, rel_path: String) -> io::Result<Option<CollectedFile>> {
        let metadata = fs::metadata(abs_path)?;

        if !metadata.is_file() {
            debug!("Skipping {}: not a regular file", rel_path);
            return Ok(None);
        }

        // Skip large files
        if metadata.len() > self.max_file_size {
            warn!(
                "{} exceeds {}, content omitted",
                rel_path,
                format_file_size(self.max_file_size)
            );
            return Ok(Some(CollectedFile {
                path: rel_path,
                content: format!(
                    "File too large to include content. Size: {}",
                    format_file_size(metadata.len())
                ),
                lines: 0,
                chars: 0,
            }));
        }

        if file_kind(abs_path)? == FileKind::Binary {
            warn!("Skipping binary file {}", rel_path);
            return Ok(None);
        }

        let (content, lossy) = decode_text(fs::read(abs_path)?);
        if lossy {
            warn!(
                "{} contains invalid UTF-8 past the first {} bytes, replaced with U+FFFD",
                rel_path, SNIFF_LEN
            );
        }

        Ok(Some(CollectedFile {
            path: rel_path,
            lines: content.lines().count(),
            chars: content.chars().count(),
            content,
        }))
    }
}

/// Decode file bytes as UTF-8, flagging lossy replacement
fn decode_text(bytes: Vec<u8>) -> (String, bool) {
    match String::from_utf8(bytes) {
        Ok(text) => (text, false),
        Err(e) => (String::from_utf8_lossy(e.as_bytes()).into_owned(), true),
    }
}

/// Sniff the start of a file to tell text from binary
fn file_kind(path: &Path) -> io::Result<FileKind> {
    let mut buffer = vec![0; SNIFF_LEN];
    let mut file = File::open(path)?;
    let bytes_read = file.read(&mut buffer)?;
    buffer.truncate(bytes_read);

    if buffer.is_empty() {
        return Ok(FileKind::Text);
    }

    // A multi-byte character cut at the end of the sample is still text
    let valid_utf8 = match std::str::from_utf8(&buffer) {
        Ok(_) => true,
        Err(e) => e.error_len().is_none(),
    };
    if !valid_utf8 {
        return Ok(FileKind::Binary);
    }

    // Count binary characters (0x00-0x08, 0x0E-0x1F)
    let binary_count = buffer
        .iter()
        .filter(|&&b| (b < 9) || (b > 13 && b < 32))
        .count();
    let binary_ratio = binary_count as f32 / buffer.len() as f32;

    if binary_ratio < 0.1 {
        Ok(FileKind::Text)
    } else {
        Ok(FileKind::Binary)
    }
}
