//! Persisted index of parse outcomes
//!
//! The index is a JSON document mapping canonical image paths to either the
//! parsed record fields or an `{ "error": ... }` marker. Insertion order is
//! preserved so query results come back in discovery order, stable across
//! runs unless the store is explicitly reset.

use crate::error::Result;
use crate::parse::{ImageRecord, IndexError, ParseOutcome};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// In-memory mapping from canonical file path to parse outcome
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Index {
    entries: IndexMap<String, ParseOutcome>,
}

impl Index {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an outcome under a canonical path key. Existing entries are
    /// never overwritten; re-walks are idempotent.
    pub fn insert(&mut self, path: String, outcome: ParseOutcome) -> bool {
        if self.entries.contains_key(&path) {
            return false;
        }
        self.entries.insert(path, outcome);
        true
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    pub fn get(&self, path: &str) -> Option<&ParseOutcome> {
        self.entries.get(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ParseOutcome)> {
        self.entries.iter()
    }

    /// Successfully parsed entries only
    pub fn records(&self) -> impl Iterator<Item = (&str, &ImageRecord)> {
        self.entries
            .iter()
            .filter_map(|(path, outcome)| outcome.record().map(|r| (path.as_str(), r)))
    }

    /// Error entries only
    pub fn errors(&self) -> impl Iterator<Item = (&str, &IndexError)> {
        self.entries
            .iter()
            .filter_map(|(path, outcome)| outcome.error().map(|e| (path.as_str(), e)))
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    /// Fold a partial index (one walk's discoveries) into this one.
    /// Previously stored entries win on key collisions.
    pub fn merge(&mut self, other: Index) {
        for (path, outcome) in other.entries {
            self.entries.entry(path).or_insert(outcome);
        }
    }
}

/// Owns the persisted index document on disk
#[derive(Debug, Clone)]
pub struct IndexStore {
    path: PathBuf,
}

impl IndexStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the persisted index. An absent or empty file yields an empty
    /// index; a present but malformed document is a fatal error, since a
    /// broken index invalidates all downstream querying.
    pub fn load(&self) -> Result<Index> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("No index file at {:?}, starting empty", self.path);
                return Ok(Index::new());
            }
            Err(err) => return Err(err.into()),
        };

        if content.trim().is_empty() {
            return Ok(Index::new());
        }

        let index: Index = serde_json::from_str(&content)?;
        debug!("Loaded {} entries from {:?}", index.len(), self.path);
        Ok(index)
    }

    /// Serialize the full index, whole-file overwrite semantics.
    pub fn save(&self, index: &Index) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(index)?;
        std::fs::write(&self.path, content)?;
        info!("Saved {} entries to {:?}", index.len(), self.path);
        Ok(())
    }

    /// Discard the persisted document and return an empty index. This is
    /// destructive and distinct from [`IndexStore::load`].
    pub fn reset(&self) -> Result<Index> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => info!("Reset index at {:?}", self.path),
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => return Err(err.into()),
        }
        Ok(Index::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_parameters;
    use tempfile::TempDir;

    fn sample_outcome() -> ParseOutcome {
        let blob =
            "a cat\nSteps: 20, Sampler: Euler, CFG scale: 7, Seed: 123, Size: 512x512, Model: foo";
        ParseOutcome::Record(parse_parameters(blob).unwrap())
    }

    fn error_outcome() -> ParseOutcome {
        ParseOutcome::Error(IndexError {
            error: "no generation parameters found".to_string(),
        })
    }

    #[test]
    fn test_insert_preserves_first_entry() {
        let mut index = Index::new();
        assert!(index.insert("a.png".to_string(), sample_outcome()));
        assert!(!index.insert("a.png".to_string(), error_outcome()));
        assert_eq!(index.len(), 1);
        assert!(index.get("a.png").unwrap().record().is_some());
    }

    #[test]
    fn test_records_and_errors_split() {
        let mut index = Index::new();
        index.insert("a.png".to_string(), sample_outcome());
        index.insert("b.png".to_string(), error_outcome());

        assert_eq!(index.records().count(), 1);
        assert_eq!(index.error_count(), 1);
        assert_eq!(index.errors().next().unwrap().0, "b.png");
    }

    #[test]
    fn test_merge_keeps_existing_entries() {
        let mut index = Index::new();
        index.insert("a.png".to_string(), sample_outcome());

        let mut partial = Index::new();
        partial.insert("a.png".to_string(), error_outcome());
        partial.insert("b.png".to_string(), sample_outcome());

        index.merge(partial);
        assert_eq!(index.len(), 2);
        assert!(index.get("a.png").unwrap().record().is_some());
    }

    #[test]
    fn test_load_absent_file_is_empty() {
        let tmp = TempDir::new().unwrap();
        let store = IndexStore::new(tmp.path().join("index.json"));
        let index = store.load().unwrap();
        assert!(index.is_empty());
    }

    #[test]
    fn test_load_empty_file_is_empty() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("index.json");
        std::fs::write(&path, "").unwrap();
        let index = IndexStore::new(path).load().unwrap();
        assert!(index.is_empty());
    }

    #[test]
    fn test_load_malformed_document_fails() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("index.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(IndexStore::new(path).load().is_err());
    }

    #[test]
    fn test_save_load_round_trip_keeps_order() {
        let tmp = TempDir::new().unwrap();
        let store = IndexStore::new(tmp.path().join("nested/index.json"));

        let mut index = Index::new();
        index.insert("z.png".to_string(), sample_outcome());
        index.insert("a.png".to_string(), error_outcome());
        index.insert("m.png".to_string(), sample_outcome());

        store.save(&index).unwrap();
        let loaded = store.load().unwrap();

        assert_eq!(loaded, index);
        let keys: Vec<&String> = loaded.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["z.png", "a.png", "m.png"]);
    }

    #[test]
    fn test_reset_discards_persisted_content() {
        let tmp = TempDir::new().unwrap();
        let store = IndexStore::new(tmp.path().join("index.json"));

        let mut index = Index::new();
        index.insert("a.png".to_string(), sample_outcome());
        store.save(&index).unwrap();

        let empty = store.reset().unwrap();
        assert!(empty.is_empty());
        assert!(!store.path().exists());
        assert!(store.load().unwrap().is_empty());

        // Resetting again with no file present is fine
        assert!(store.reset().unwrap().is_empty());
    }
}
