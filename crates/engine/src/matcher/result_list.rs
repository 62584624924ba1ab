//! Result list: runs the configured strategies in order and merges their
//! output under the three reduction factors.
//!
//! - `matches_reduction_factor`: applied by each [`Matcher`] to its scope
//! - `limit_reduction_factor`: a candidate is skipped when any of its terms
//!   already gathered that many results
//! - `type_reduction_factor`: a term that gathered that many results is
//!   dropped before later strategies run
//!
//! Results are counted in postings (`entries_count`), not words. A word is
//! credited to the first (most specific) tier that accepts it and never again.

use super::{MatchResult, Matcher};
use fuzzdex_core::types::WordId;
use fuzzdex_storage::Tables;
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::BTreeMap;
use tracing::trace;

/// Merged output of every strategy for one query
#[derive(Debug, Clone, Default)]
pub struct ResultList {
    results: Vec<MatchResult>,
    counts_by_term: FxHashMap<String, u64>,
    counts_by_word: FxHashMap<WordId, u64>,
    accepted: FxHashSet<WordId>,
    limited_words: BTreeMap<WordId, i32>,
    unlimited_words: Vec<WordId>,
    remaining_terms: Vec<String>,
}

impl ResultList {
    /// Match `terms` against the dictionary with `matchers`, in order
    pub fn build(view: &Tables, matchers: &[Matcher], terms: &[String]) -> Self {
        let mut list = ResultList::default();
        let mut remaining: Vec<String> = terms.to_vec();

        'matchers: for matcher in matchers {
            if remaining.is_empty() {
                break;
            }
            for mut result in matcher.find(view, &remaining) {
                if result.is_empty() {
                    continue;
                }
                let mut credits: Vec<(String, WordId)> = Vec::new();
                for candidate in result.candidates() {
                    let id = candidate.word.id;
                    if list.accepted.contains(&id) {
                        continue;
                    }
                    let saturated = candidate
                        .terms
                        .iter()
                        .any(|t| list.count_for_term(t) >= result.limit_reduction_factor());
                    if saturated {
                        continue;
                    }

                    let count = candidate.word.entries_count;
                    list.accepted.insert(id);
                    list.counts_by_word.insert(id, count);
                    if candidate.word.rank_limit > 0 {
                        list.limited_words.insert(id, candidate.word.rank_limit);
                    } else {
                        list.unlimited_words.push(id);
                    }
                    for term in &candidate.terms {
                        credits.push((term.clone(), id));
                        let total = list.counts_by_term.entry(term.clone()).or_insert(0);
                        *total += count;
                        if *total >= result.type_reduction_factor() {
                            remaining.retain(|t| t != term);
                        }
                    }
                }
                for (term, id) in credits {
                    result.credit(&term, id);
                }
                if result.has_credits() {
                    trace!(
                        match_type = %result.match_type(),
                        tier = result.tier(),
                        words = result.words().len(),
                        "matcher tier credited words"
                    );
                    list.results.push(result);
                }
                if remaining.is_empty() {
                    break 'matchers;
                }
            }
        }

        list.remaining_terms = remaining;
        list
    }

    /// Credited tiers, most specific first
    pub fn results(&self) -> &[MatchResult] {
        &self.results
    }

    /// True when no word matched
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Matched words that carry a rank cutoff, with the cutoff
    pub fn limited_words(&self) -> &BTreeMap<WordId, i32> {
        &self.limited_words
    }

    /// Matched words without a rank cutoff, in acceptance order
    pub fn unlimited_words(&self) -> &[WordId] {
        &self.unlimited_words
    }

    /// Every matched word, ascending
    pub fn word_ids(&self) -> Vec<WordId> {
        let mut ids: Vec<WordId> = self.accepted.iter().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Postings gathered so far for a term
    pub fn count_for_term(&self, term: &str) -> u64 {
        self.counts_by_term.get(term).copied().unwrap_or(0)
    }

    /// `entries_count` of a matched word when it was accepted
    pub fn count_for_word(&self, word: WordId) -> Option<u64> {
        self.counts_by_word.get(&word).copied()
    }

    /// Terms still open when matching stopped
    pub fn remaining_terms(&self) -> &[String] {
        &self.remaining_terms
    }

    /// Rank multiplier of the first tier crediting `word`, or 1
    pub fn rank_multiplier_for(&self, word: WordId) -> f64 {
        self.results
            .iter()
            .find(|r| r.contains_word(word))
            .map(|r| r.rank_multiplier())
            .unwrap_or(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::compute_keys;
    use fuzzdex_core::config::SearchConfig;
    use fuzzdex_core::match_type::MatchType;
    use fuzzdex_core::types::NewWord;
    use fuzzdex_storage::{IndexStore, InsertOutcome};

    fn setup(words: &[(&str, u64, i32)], config: &SearchConfig) -> IndexStore {
        let store = IndexStore::new();
        let mut txn = store.begin();
        for (word, count, rank_limit) in words {
            let id = match txn.insert_word(NewWord {
                word: word.to_string(),
                keys: compute_keys(word, config),
            }) {
                InsertOutcome::Inserted(id) => id,
                InsertOutcome::Duplicate(w) => panic!("duplicate {}", w),
            };
            txn.set_entries_count(id, *count).unwrap();
            txn.set_rank_limit(id, *rank_limit).unwrap();
        }
        txn.commit();
        store
    }

    fn terms(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn word_id(store: &IndexStore, word: &str) -> WordId {
        store.read().word_by_text(word).map(|w| w.id).unwrap()
    }

    #[test]
    fn test_empty_query() {
        let config = SearchConfig::default();
        let store = setup(&[("thing", 1, 0)], &config);
        let list = ResultList::build(&store.read(), &Matcher::performed(&config), &[]);
        assert!(list.is_empty());
        assert!(list.word_ids().is_empty());
    }

    #[test]
    fn test_word_credited_once() {
        let config = SearchConfig {
            perform_match_types: vec![MatchType::Exact, MatchType::Stem],
            ..SearchConfig::default()
        };
        let store = setup(&[("thing", 1, 0), ("things", 1, 0)], &config);
        let list = ResultList::build(&store.read(), &Matcher::performed(&config), &terms(&["thing"]));
        let types: Vec<MatchType> = list.results().iter().map(|r| r.match_type()).collect();
        assert_eq!(types, vec![MatchType::Exact, MatchType::Stem]);
        assert_eq!(list.results()[0].words(), vec![word_id(&store, "thing")]);
        assert_eq!(list.results()[1].words(), vec![word_id(&store, "things")]);
        assert_eq!(list.rank_multiplier_for(word_id(&store, "thing")), 130.0);
        assert_eq!(list.rank_multiplier_for(word_id(&store, "things")), 12.0);
        assert_eq!(list.count_for_term("thing"), 2);
    }

    #[test]
    fn test_type_reduction_stops_later_matchers() {
        let mut config = SearchConfig {
            perform_match_types: vec![MatchType::Exact, MatchType::Stem],
            ..SearchConfig::default()
        };
        config.matchers.exact.type_reduction_factor = Some(5);
        let store = setup(&[("thing", 5, 0), ("things", 1, 0)], &config);
        let list = ResultList::build(&store.read(), &Matcher::performed(&config), &terms(&["thing"]));
        assert_eq!(list.results().len(), 1);
        assert_eq!(list.word_ids(), vec![word_id(&store, "thing")]);
        assert!(list.remaining_terms().is_empty());
    }

    #[test]
    fn test_type_reduction_only_drops_saturated_term() {
        let mut config = SearchConfig {
            perform_match_types: vec![MatchType::Exact, MatchType::StartWith],
            ..SearchConfig::default()
        };
        config.matchers.exact.type_reduction_factor = Some(5);
        let store = setup(
            &[("thing", 5, 0), ("things", 1, 0), ("other", 1, 0), ("others", 1, 0)],
            &config,
        );
        let list = ResultList::build(
            &store.read(),
            &Matcher::performed(&config),
            &terms(&["thing", "other"]),
        );
        let ids = list.word_ids();
        assert!(ids.contains(&word_id(&store, "others")));
        assert!(!ids.contains(&word_id(&store, "things")));
    }

    #[test]
    fn test_limit_reduction_caps_within_matcher() {
        let mut config = SearchConfig {
            perform_match_types: vec![MatchType::StartWith],
            ..SearchConfig::default()
        };
        config.matchers.start_with.limit_reduction_factor = Some(5);
        let store = setup(&[("tea", 3, 0), ("ten", 3, 0), ("tent", 3, 0)], &config);
        let list = ResultList::build(&store.read(), &Matcher::performed(&config), &terms(&["te"]));
        assert_eq!(list.word_ids().len(), 2);
        assert_eq!(list.count_for_term("te"), 6);
        assert!(!list.word_ids().contains(&word_id(&store, "tent")));
    }

    #[test]
    fn test_limited_and_unlimited_words() {
        let config = SearchConfig {
            perform_match_types: vec![MatchType::Exact],
            ..SearchConfig::default()
        };
        let store = setup(&[("common", 5000, 120), ("rare", 2, 0)], &config);
        let list = ResultList::build(
            &store.read(),
            &Matcher::performed(&config),
            &terms(&["common", "rare"]),
        );
        let common = word_id(&store, "common");
        let rare = word_id(&store, "rare");
        assert_eq!(list.limited_words().get(&common), Some(&120));
        assert_eq!(list.unlimited_words(), &[rare]);
        assert_eq!(list.count_for_word(common), Some(5000));
    }

    #[test]
    fn test_unmatched_terms_remain() {
        let config = SearchConfig::default();
        let store = setup(&[("thing", 1, 0)], &config);
        let list = ResultList::build(&store.read(), &Matcher::performed(&config), &terms(&["zzz"]));
        assert!(list.is_empty());
        assert_eq!(list.remaining_terms(), &["zzz".to_string()]);
    }
}
