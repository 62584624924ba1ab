//! Tier 1: Tokenizer and query invariants
//!
//! Indexed words and query terms pass through the same tokenizer, so a
//! record's own text must always find the record.

use fuzzdex::engine::search::{split_into_words, split_str};
use fuzzdex::{IndexText, SearchConfig};
use proptest::prelude::*;

use crate::test_utils::{config, index, index_with, Person};

#[test]
fn test_query_uses_configured_word_length() {
    let (index, _) = index_with(SearchConfig {
        max_word_length: 4,
        ..config()
    });
    assert_eq!(index.query("searching SEARCHES").terms(), ["sear"]);
}

#[test]
fn test_blank_query_through_facade() {
    let (index, _) = index();
    assert!(index.query("  '' -- ").is_empty());
    assert!(index.find_results("  '' -- ", 10, 1).is_empty());
    assert_eq!(index.count_results(""), 0);
}

#[test]
fn test_list_text_flattened() {
    let text = IndexText::List(vec![Some("Ada".into()), None, Some("Byron".into())]);
    assert_eq!(split_into_words(&text, 64), vec!["ada", "byron"]);
}

#[test]
fn test_punctuation_in_query_ignored() {
    let (index, _) = index();
    index
        .create_search_index(&Person::new(1, "O'Neil", "well-known"))
        .unwrap();
    assert_eq!(index.count_results("o'neil!"), 1);
    assert_eq!(index.count_results("known, well"), 1);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Tokenizing already-tokenized text changes nothing
    #[test]
    fn prop_tokenize_idempotent(text in "[a-zA-Z0-9' ,.!?-]{0,60}") {
        let once = split_str(&text, 64);
        let twice = split_str(&once.join(" "), 64);
        prop_assert_eq!(once, twice);
    }

    /// Query terms are distinct and drawn from the tokens
    #[test]
    fn prop_query_terms_distinct(text in "[a-cA-C ]{0,40}") {
        let (index, _) = index();
        let tokens = split_str(&text, 64);
        let query = index.query(&text);
        let mut sorted = query.terms().to_vec();
        sorted.sort();
        sorted.dedup();
        prop_assert_eq!(sorted.len(), query.len());
        for term in query.terms() {
            prop_assert!(tokens.contains(term));
        }
    }

    /// A record is always found by its own name
    #[test]
    fn prop_record_found_by_own_text(name in "[a-z]{1,8}( [a-z]{1,8}){0,2}") {
        let (index, _) = index();
        index.create_search_index(&Person::new(5, &name, "")).unwrap();
        let hits = index.find_results(&name, 10, 1);
        prop_assert_eq!(hits.len(), 1);
        prop_assert_eq!(hits[0].record_id, 5);
    }
}
