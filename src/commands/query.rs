//! Query command implementation
//!
//! The matched path list is the hand-off point to an external viewer; this
//! command only loads, searches, and prints.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::index::IndexStore;
use crate::query::search;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Query options
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    /// Search term; when absent one is drawn from `query.candidates`
    pub term: Option<String>,
}

/// Query result for CLI display
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryOutput {
    pub term: String,
    /// Whether the term was picked at random from the candidate list
    pub random_term: bool,
    pub total_entries: usize,
    pub matches: Vec<String>,
}

/// Execute a query against the persisted index (read-only)
pub fn cmd_query(config: &Config, store: &IndexStore, options: QueryOptions) -> Result<QueryOutput> {
    let index = store.load()?;

    let (term, random_term) = match options.term {
        Some(term) => (term, false),
        None => (pick_candidate(&config.query.candidates)?, true),
    };
    info!("Querying: {}", term);

    let matches: Vec<String> = search(&index, &term)
        .into_iter()
        .map(String::from)
        .collect();
    info!("Returning {} results", matches.len());

    Ok(QueryOutput {
        term,
        random_term,
        total_entries: index.len(),
        matches,
    })
}

fn pick_candidate(candidates: &[String]) -> Result<String> {
    use rand::seq::SliceRandom;

    let mut rng = rand::thread_rng();
    candidates
        .choose(&mut rng)
        .cloned()
        .ok_or_else(|| Error::Config("query.candidates is empty".to_string()))
}

/// Print matched paths to console, one per line
pub fn print_query_results(output: &QueryOutput) {
    if output.random_term {
        println!("\n🔍 Query (random): {}\n", output.term);
    } else {
        println!("\n🔍 Query: {}\n", output.term);
    }

    if output.matches.is_empty() {
        println!("No matches among {} indexed entries", output.total_entries);
        return;
    }

    for path in &output.matches {
        println!("{}", path);
    }
    println!(
        "\n{} of {} entries matched",
        output.matches.len(),
        output.total_entries
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::Index;
    use crate::parse::{parse_parameters, ParseOutcome};
    use tempfile::TempDir;

    fn store_with_index(tmp: &TempDir) -> IndexStore {
        let store = IndexStore::new(tmp.path().join("index.json"));
        let mut index = Index::new();
        for (path, prompt) in [("out/cat.png", "a cat"), ("out/dog.png", "a dog")] {
            let blob = format!(
                "{}\nSteps: 20, Sampler: Euler, CFG scale: 7, Seed: 1, Size: 512x512, Model: foo",
                prompt
            );
            index.insert(
                path.to_string(),
                ParseOutcome::Record(parse_parameters(&blob).unwrap()),
            );
        }
        store.save(&index).unwrap();
        store
    }

    #[test]
    fn test_explicit_term() {
        let tmp = TempDir::new().unwrap();
        let store = store_with_index(&tmp);
        let config = Config::default();

        let output = cmd_query(
            &config,
            &store,
            QueryOptions {
                term: Some("cat".to_string()),
            },
        )
        .unwrap();

        assert!(!output.random_term);
        assert_eq!(output.matches, ["out/cat.png"]);
        assert_eq!(output.total_entries, 2);
    }

    #[test]
    fn test_random_term_comes_from_candidates() {
        let tmp = TempDir::new().unwrap();
        let store = store_with_index(&tmp);
        let mut config = Config::default();
        config.query.candidates = vec!["dog".to_string()];

        let output = cmd_query(&config, &store, QueryOptions::default()).unwrap();
        assert!(output.random_term);
        assert_eq!(output.term, "dog");
        assert_eq!(output.matches, ["out/dog.png"]);
    }

    #[test]
    fn test_absent_index_yields_no_matches() {
        let tmp = TempDir::new().unwrap();
        let store = IndexStore::new(tmp.path().join("missing.json"));
        let config = Config::default();

        let output = cmd_query(
            &config,
            &store,
            QueryOptions {
                term: Some("cat".to_string()),
            },
        )
        .unwrap();
        assert!(output.matches.is_empty());
        assert_eq!(output.total_entries, 0);
    }
}
