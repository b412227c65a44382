//! Index command implementation

use crate::config::Config;
use crate::error::{Error, Result};
use crate::index::IndexStore;
use crate::reader::MetadataReader;
use crate::walk::Walker;
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

/// Index run options (command-line overrides on top of the config)
#[derive(Debug, Clone, Default)]
pub struct IndexOptions {
    /// Directory to walk; falls back to `search_root` from the config
    pub root: Option<PathBuf>,
    /// Discard the persisted index before walking
    pub reset: bool,
    /// Override `walk.max_files`
    pub max_files: Option<usize>,
    /// Index grid images too
    pub include_grids: bool,
    /// Override `walk.max_depth`
    pub max_depth: Option<usize>,
}

/// Summary of one index run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexStats {
    pub root: PathBuf,
    pub indexed: usize,
    pub errors: usize,
    pub skipped_existing: usize,
    pub total_entries: usize,
}

/// Walk the search root, merge the discoveries into the persisted index,
/// and save it back. Store failures are fatal; per-file failures are not.
pub fn cmd_index<R: MetadataReader>(
    config: &Config,
    store: &IndexStore,
    reader: R,
    options: IndexOptions,
) -> Result<IndexStats> {
    let root = options
        .root
        .clone()
        .or_else(|| config.search_root.clone())
        .ok_or_else(|| {
            Error::Config(
                "no search root: pass a directory or set search_root in the config".to_string(),
            )
        })?;
    // Resolve now so the run summary names the same path the index keys use
    let root = std::fs::canonicalize(&root)?;

    let mut index = if options.reset || config.reset_on_start {
        info!("Resetting index before walk");
        store.reset()?
    } else {
        store.load()?
    };

    let mut walk_options = config.walk_options();
    if options.include_grids {
        walk_options.skip_grid_files = false;
    }
    if options.max_files.is_some() {
        walk_options.max_files = options.max_files;
    }
    if let Some(depth) = options.max_depth {
        walk_options.max_depth = depth;
    }

    info!("Indexing {:?}", root);
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner} {pos} files  {wide_msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    bar.enable_steady_tick(Duration::from_millis(100));

    let walker = Walker::new(reader, walk_options);
    let walked = walker.walk(&root, &index, Some(&bar));
    bar.finish_and_clear();
    let (partial, stats) = walked?;

    index.merge(partial);
    store.save(&index)?;

    Ok(IndexStats {
        root,
        indexed: stats.discovered,
        errors: stats.errors,
        skipped_existing: stats.skipped_existing,
        total_entries: index.len(),
    })
}

/// Print an index run summary to console
pub fn print_index_stats(stats: &IndexStats) {
    println!("\n✓ Indexation done: {}", stats.root.display());
    println!("  Newly indexed:   {}", stats.indexed);
    println!("  Errors:          {}", stats.errors);
    println!("  Already indexed: {}", stats.skipped_existing);
    println!("  Total entries:   {}", stats.total_entries);
}
