//! Substring search over the index
//!
//! A record matches when the term occurs in any of its field values; error
//! entries never match. Results keep index iteration order (discovery order
//! at indexing time), which is what the viewer expects.

use crate::index::Index;

/// Return the paths of all records matching `term`, in index order.
///
/// Read-only over the index and infallible: an empty or error-only index
/// simply yields no matches.
pub fn search<'a>(index: &'a Index, term: &str) -> Vec<&'a str> {
    index
        .records()
        .filter(|(_, record)| record.field_values().iter().any(|value| value.contains(term)))
        .map(|(path, _)| path)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::{parse_parameters, ParseError, ParseOutcome};

    fn record_outcome(prompt: &str) -> ParseOutcome {
        let blob = format!(
            "{}\nSteps: 20, Sampler: Euler, CFG scale: 7, Seed: 123, Size: 512x512, Model: foo",
            prompt
        );
        ParseOutcome::Record(parse_parameters(&blob).unwrap())
    }

    fn sample_index() -> Index {
        let mut index = Index::new();
        index.insert("out/cat.png".to_string(), record_outcome("a cat"));
        index.insert("out/dog.png".to_string(), record_outcome("a dog"));
        index.insert(
            "out/bad.png".to_string(),
            ParseOutcome::Error(ParseError::MissingMetadata.into()),
        );
        index
    }

    #[test]
    fn test_matches_prompt_substring() {
        let index = sample_index();
        assert_eq!(search(&index, "cat"), ["out/cat.png"]);
        assert_eq!(search(&index, "dog"), ["out/dog.png"]);
    }

    #[test]
    fn test_matches_any_field() {
        let index = sample_index();
        // "Euler" and "512x512" live in sampler/size fields of both records
        assert_eq!(search(&index, "Euler").len(), 2);
        assert_eq!(search(&index, "512x512").len(), 2);
        assert_eq!(search(&index, "123").len(), 2);
    }

    #[test]
    fn test_error_entries_never_match() {
        let index = sample_index();
        // The error message contains "parameters"; it must still not match
        assert!(search(&index, "parameters").is_empty());
        assert!(search(&index, "bad").is_empty());
    }

    #[test]
    fn test_results_keep_insertion_order() {
        let mut index = Index::new();
        index.insert("z.png".to_string(), record_outcome("night sky"));
        index.insert("a.png".to_string(), record_outcome("night city"));
        assert_eq!(search(&index, "night"), ["z.png", "a.png"]);
    }

    #[test]
    fn test_empty_index_yields_nothing() {
        assert!(search(&Index::new(), "anything").is_empty());
    }

    #[test]
    fn test_no_match_yields_nothing() {
        assert!(search(&sample_index(), "unicorn").is_empty());
    }
}
