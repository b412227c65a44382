//! Error listing command implementation
//!
//! Surfaces the index entries that failed to parse, so a run never silently
//! drops a discovered file.

use crate::error::Result;
use crate::index::IndexStore;
use serde::{Deserialize, Serialize};

/// One failed index entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEntry {
    pub path: String,
    pub message: String,
}

/// List all error entries from the persisted index
pub fn cmd_list_errors(store: &IndexStore) -> Result<Vec<ErrorEntry>> {
    let index = store.load()?;
    Ok(index
        .errors()
        .map(|(path, err)| ErrorEntry {
            path: path.to_string(),
            message: err.error.clone(),
        })
        .collect())
}

/// Print error entries to console
pub fn print_error_entries(entries: &[ErrorEntry]) {
    if entries.is_empty() {
        println!("No error entries in the index");
        return;
    }

    println!("\n{} error entries:\n", entries.len());
    for entry in entries {
        println!("{}", entry.path);
        println!("    {}", entry.message);
    }
}
