//! Status command implementation

use crate::config::Config;
use crate::error::Result;
use crate::index::IndexStore;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Status information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusInfo {
    pub config_path: String,
    pub index_path: String,
    pub index_exists: bool,
    pub total_entries: usize,
    pub records: usize,
    pub errors: usize,
}

/// Get system status
pub fn cmd_status(config: &Config, store: &IndexStore) -> Result<StatusInfo> {
    info!("Getting status");

    let index_exists = store.path().exists();
    let index = store.load()?;
    let errors = index.error_count();

    Ok(StatusInfo {
        config_path: config.paths.config_file.display().to_string(),
        index_path: store.path().display().to_string(),
        index_exists,
        total_entries: index.len(),
        records: index.len() - errors,
        errors,
    })
}

/// Print status to console
pub fn print_status(status: &StatusInfo) {
    println!("\nstable-collector status\n");
    println!("  Config: {}", status.config_path);
    println!(
        "  Index:  {} ({})",
        status.index_path,
        if status.index_exists {
            "exists"
        } else {
            "not created yet"
        }
    );
    println!("  Entries: {}", status.total_entries);
    println!("    Records: {}", status.records);
    println!("    Errors:  {}", status.errors);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::Index;
    use crate::parse::{parse_parameters, ParseError, ParseOutcome};
    use tempfile::TempDir;

    #[test]
    fn test_status_counts_records_and_errors() {
        let tmp = TempDir::new().unwrap();
        let store = IndexStore::new(tmp.path().join("index.json"));

        let mut index = Index::new();
        let blob =
            "a cat\nSteps: 20, Sampler: Euler, CFG scale: 7, Seed: 1, Size: 512x512, Model: foo";
        index.insert(
            "out/cat.png".to_string(),
            ParseOutcome::Record(parse_parameters(blob).unwrap()),
        );
        index.insert(
            "out/bad.png".to_string(),
            ParseOutcome::Error(ParseError::MissingMetadata.into()),
        );
        store.save(&index).unwrap();

        let status = cmd_status(&Config::default(), &store).unwrap();
        assert!(status.index_exists);
        assert_eq!(status.total_entries, 2);
        assert_eq!(status.records, 1);
        assert_eq!(status.errors, 1);
    }

    #[test]
    fn test_status_with_no_index_file() {
        let tmp = TempDir::new().unwrap();
        let store = IndexStore::new(tmp.path().join("index.json"));

        let status = cmd_status(&Config::default(), &store).unwrap();
        assert!(!status.index_exists);
        assert_eq!(status.total_entries, 0);
    }
}
