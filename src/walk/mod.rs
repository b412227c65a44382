//! Directory traversal feeding the index
//!
//! The walker enumerates PNG files under a root, asks the reader for each
//! file's metadata payload, parses it, and collects the outcomes into a
//! partial [`Index`] that the caller merges into the persisted one. One bad
//! file never aborts a walk: reader and parse failures become error entries.

use crate::error::{Error, Result};
use crate::index::Index;
use crate::parse::{parse_parameters, IndexError, ParseError, ParseOutcome};
use crate::reader::MetadataReader;
use indicatif::ProgressBar;
use std::path::Path;
use tracing::{debug, info, trace, warn};
use walkdir::WalkDir;

/// Options recognized by a walk
#[derive(Debug, Clone)]
pub struct WalkOptions {
    /// Exclude any path containing the substring "grid" (composite images)
    pub skip_grid_files: bool,

    /// Stop enumerating once this many entries exist, counting entries
    /// already present in the index. `None` disables the limit.
    pub max_files: Option<usize>,

    /// Defensive recursion cap
    pub max_depth: usize,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            skip_grid_files: true,
            max_files: None,
            max_depth: 32,
        }
    }
}

/// Counters from one walk, for the run summary
#[derive(Debug, Clone, Copy, Default)]
pub struct WalkStats {
    /// Newly indexed files, error entries included
    pub discovered: usize,

    /// Error entries among the discovered files
    pub errors: usize,

    /// Files skipped because they were already indexed
    pub skipped_existing: usize,
}

/// Walks a directory tree and produces parse outcomes
pub struct Walker<R> {
    reader: R,
    options: WalkOptions,
}

impl<R: MetadataReader> Walker<R> {
    pub fn new(reader: R, options: WalkOptions) -> Self {
        Self { reader, options }
    }

    /// Walk `root` depth-first and return the partial index of files not
    /// already present in `existing`. The caller merges the result; this
    /// function never mutates shared state.
    pub fn walk(
        &self,
        root: &Path,
        existing: &Index,
        progress: Option<&ProgressBar>,
    ) -> Result<(Index, WalkStats)> {
        let root = std::fs::canonicalize(root)?;
        if !root.is_dir() {
            return Err(Error::InvalidPath(format!(
                "search root is not a directory: {}",
                root.display()
            )));
        }

        let mut partial = Index::new();
        let mut stats = WalkStats::default();

        for entry in WalkDir::new(&root).max_depth(self.options.max_depth) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    warn!("Skipping unreadable entry: {}", err);
                    continue;
                }
            };

            if let Some(max) = self.options.max_files {
                if existing.len() + partial.len() >= max {
                    debug!("File limit {} reached, stopping walk", max);
                    break;
                }
            }

            if !entry.file_type().is_file() || !is_png(entry.path()) {
                continue;
            }

            let key = canonical_key(entry.path());

            if self.options.skip_grid_files && key.contains("grid") {
                trace!("Skipping grid file {}", key);
                continue;
            }

            if existing.contains(&key) || partial.contains(&key) {
                stats.skipped_existing += 1;
                continue;
            }

            if let Some(bar) = progress {
                bar.inc(1);
                bar.set_message(key.clone());
            }

            let outcome = self.read_outcome(entry.path());
            if outcome.is_error() {
                stats.errors += 1;
            }
            stats.discovered += 1;
            partial.insert(key, outcome);
        }

        info!(
            "Walk of {:?} found {} new files ({} errors, {} already indexed)",
            root, stats.discovered, stats.errors, stats.skipped_existing
        );
        Ok((partial, stats))
    }

    /// Read and parse one file. Every failure becomes an error entry; the
    /// file handle is released before the next file either way.
    fn read_outcome(&self, path: &Path) -> ParseOutcome {
        match self.reader.read_parameters(path) {
            Ok(Some(text)) => match parse_parameters(&text) {
                Ok(record) => ParseOutcome::Record(record),
                Err(err) => {
                    debug!("{}: {}", path.display(), err);
                    ParseOutcome::Error(err.into())
                }
            },
            Ok(None) => {
                debug!("{}: no parameters chunk", path.display());
                ParseOutcome::Error(ParseError::MissingMetadata.into())
            }
            Err(err) => {
                warn!("{}: {}", path.display(), err);
                ParseOutcome::Error(IndexError::unreadable(err))
            }
        }
    }
}

fn is_png(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("png"))
        .unwrap_or(false)
}

/// Canonical index key: absolute path with forward-slash separators
fn canonical_key(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
