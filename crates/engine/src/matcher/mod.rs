//! Matcher strategies
//!
//! A [`Matcher`] pairs a [`MatchType`] with its resolved tunables and knows,
//! for that strategy:
//!
//! - which query terms it can work with (`accepts`)
//! - which dictionary key columns it fills at index time (`index_keys`)
//! - how to turn terms into a bounded candidate scope and per-tier
//!   `key -> terms` maps (`find`)
//!
//! Strategies are a closed set; adding one means adding a `MatchType`
//! variant and its arms here.

pub mod leet;
mod result;
mod result_list;

pub use result::{Candidate, MatchResult};
pub use result_list::ResultList;

use crate::search::phonetic::{american_soundex, double_metaphone, metaphone, soundex};
use crate::search::stemmer::stem_key;
use fuzzdex_core::config::SearchConfig;
use fuzzdex_core::match_type::{MatchType, MatcherTuning};
use fuzzdex_core::types::{MatcherColumn, MatcherKeys};
use fuzzdex_storage::{Tables, WordFilter};
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::collections::BTreeMap;

/// A configured strategy
#[derive(Debug, Clone, PartialEq)]
pub struct Matcher {
    match_type: MatchType,
    tuning: MatcherTuning,
}

impl Matcher {
    /// Strategy with explicit tunables
    pub fn new(match_type: MatchType, tuning: MatcherTuning) -> Self {
        Matcher { match_type, tuning }
    }

    /// Strategy with built-in tunables plus configured overrides
    pub fn from_config(match_type: MatchType, config: &SearchConfig) -> Self {
        Matcher::new(match_type, config.tuning(match_type))
    }

    /// Strategies to run at query time, in configured order
    pub fn performed(config: &SearchConfig) -> Vec<Matcher> {
        config
            .perform_match_types
            .iter()
            .map(|t| Matcher::from_config(*t, config))
            .collect()
    }

    /// Strategy type
    pub fn match_type(&self) -> MatchType {
        self.match_type
    }

    /// Resolved tunables
    pub fn tuning(&self) -> &MatcherTuning {
        &self.tuning
    }

    /// Whether this strategy can do anything with `term`
    pub fn accepts(&self, term: &str) -> bool {
        if !self.tuning.length_allows(term) {
            return false;
        }
        let letters = term.chars().filter(char::is_ascii_lowercase).count();
        match self.match_type {
            MatchType::Metaphone | MatchType::DoubleMetaphone => {
                if term.chars().count() == 1 {
                    letters == 1
                } else {
                    letters >= 2
                }
            }
            MatchType::Soundex => term.chars().count() > 2 && letters >= 3,
            MatchType::AmericanSoundex => letters >= 1,
            MatchType::Exact
            | MatchType::Leet
            | MatchType::Stem
            | MatchType::StartWith
            | MatchType::Initials => true,
        }
    }

    /// Split terms into those this strategy accepts and those it rejects
    pub fn partition_terms<'a>(&self, terms: &'a [String]) -> (Vec<&'a String>, Vec<&'a String>) {
        terms.iter().partition(|t| self.accepts(t))
    }

    /// Key column values for `word`, one per column in
    /// [`MatchType::index_columns`]. Ineligible words get `None`.
    pub fn index_keys(&self, word: &str) -> Vec<(MatcherColumn, Option<String>)> {
        let max = self.tuning.max_key_length;
        let eligible = self.accepts(word);
        match self.match_type {
            MatchType::Stem => vec![(
                MatcherColumn::Stem,
                eligible.then(|| stem_key(word, max)),
            )],
            MatchType::Metaphone => vec![(
                MatcherColumn::Metaphone,
                eligible.then(|| truncate(metaphone(word), max)).flatten(),
            )],
            MatchType::DoubleMetaphone => {
                let (primary, secondary) = if eligible {
                    let (p, s) = double_metaphone(word, max);
                    (truncate(p, max), s.and_then(|s| truncate(s, max)))
                } else {
                    (None, None)
                };
                vec![
                    (MatcherColumn::PrimaryMetaphone, primary),
                    (MatcherColumn::SecondaryMetaphone, secondary),
                ]
            }
            MatchType::Soundex => vec![(
                MatcherColumn::Soundex,
                eligible
                    .then(|| soundex(word))
                    .flatten()
                    .and_then(|k| truncate(k, max)),
            )],
            MatchType::AmericanSoundex => vec![(
                MatcherColumn::AmericanSoundex,
                eligible
                    .then(|| american_soundex(word, max))
                    .flatten()
                    .and_then(|k| truncate(k, max)),
            )],
            MatchType::Exact | MatchType::Leet | MatchType::StartWith | MatchType::Initials => {
                Vec::new()
            }
        }
    }

    /// Write this strategy's key columns for `word` into `keys`
    pub fn fill_keys(&self, word: &str, keys: &mut MatcherKeys) {
        for (column, value) in self.index_keys(word) {
            keys.set(column, value);
        }
    }

    /// Query-side keys of every accepted term, per tier
    fn plan(&self, terms: &[&String]) -> Plan {
        let max = self.tuning.max_key_length;
        match self.match_type {
            MatchType::Exact => {
                let map = KeyMap::from_pairs(terms.iter().map(|t| (t.to_string(), *t)));
                Plan::keyed(
                    WordFilter::column_in(MatcherColumn::Word, map.keys()),
                    vec![(MatcherColumn::Word, map)],
                )
            }
            MatchType::Leet => {
                let map = KeyMap::from_pairs(terms.iter().flat_map(|t| {
                    leet::expansions(t, leet::MAX_EXPANSIONS)
                        .into_iter()
                        .map(move |spelling| (spelling, *t))
                }));
                Plan::keyed(
                    WordFilter::column_in(MatcherColumn::Word, map.keys()),
                    vec![(MatcherColumn::Word, map)],
                )
            }
            MatchType::Stem => {
                let by_stem = KeyMap::from_pairs(terms.iter().map(|t| (stem_key(t, max), *t)));
                let by_term = KeyMap::from_pairs(terms.iter().map(|t| (t.to_string(), *t)));
                let mut values = by_stem.keys();
                values.extend(by_term.keys());
                Plan::keyed(
                    WordFilter::column_in(MatcherColumn::Stem, values),
                    vec![(MatcherColumn::Stem, by_stem), (MatcherColumn::Stem, by_term)],
                )
            }
            MatchType::Metaphone => {
                let map = KeyMap::from_pairs(
                    terms
                        .iter()
                        .filter_map(|t| truncate(metaphone(t), max).map(|k| (k, *t))),
                );
                Plan::keyed(
                    WordFilter::column_in(MatcherColumn::Metaphone, map.keys()),
                    vec![(MatcherColumn::Metaphone, map)],
                )
            }
            MatchType::DoubleMetaphone => {
                let mut pairs_primary = Vec::new();
                let mut pairs_secondary = Vec::new();
                for t in terms {
                    let (p, s) = double_metaphone(t, max);
                    if let Some(p) = truncate(p, max) {
                        pairs_primary.push((p, *t));
                    }
                    if let Some(s) = s.and_then(|s| truncate(s, max)) {
                        pairs_secondary.push((s, *t));
                    }
                }
                let primary = KeyMap::from_pairs(pairs_primary);
                let secondary = KeyMap::from_pairs(pairs_secondary);
                let mut values = primary.keys();
                values.extend(secondary.keys());
                Plan::keyed(
                    WordFilter::AnyColumnIn {
                        columns: vec![
                            MatcherColumn::PrimaryMetaphone,
                            MatcherColumn::SecondaryMetaphone,
                        ],
                        values,
                    },
                    vec![
                        (MatcherColumn::PrimaryMetaphone, primary.clone()),
                        (MatcherColumn::PrimaryMetaphone, secondary.clone()),
                        (MatcherColumn::SecondaryMetaphone, primary),
                        (MatcherColumn::SecondaryMetaphone, secondary),
                    ],
                )
            }
            MatchType::Soundex => {
                let map = KeyMap::from_pairs(terms.iter().filter_map(|t| {
                    soundex(t).and_then(|k| truncate(k, max)).map(|k| (k, *t))
                }));
                Plan::keyed(
                    WordFilter::column_in(MatcherColumn::Soundex, map.keys()),
                    vec![(MatcherColumn::Soundex, map)],
                )
            }
            MatchType::AmericanSoundex => {
                let map = KeyMap::from_pairs(terms.iter().filter_map(|t| {
                    american_soundex(t, max)
                        .and_then(|k| truncate(k, max))
                        .map(|k| (k, *t))
                }));
                Plan::keyed(
                    WordFilter::column_in(MatcherColumn::AmericanSoundex, map.keys()),
                    vec![(MatcherColumn::AmericanSoundex, map)],
                )
            }
            MatchType::StartWith => Plan {
                filter: WordFilter::WordPrefix(terms.iter().map(|t| t.to_string()).collect()),
                tiers: vec![(MatcherColumn::Word, TermRule::Prefix)],
            },
            MatchType::Initials => {
                let mut letters = Vec::new();
                let mut firsts = Vec::new();
                for t in terms {
                    let mut chars = t.chars();
                    match (chars.next(), chars.next()) {
                        (Some(_), None) => push_unique(&mut letters, t.to_string()),
                        (Some(first), Some(_)) => push_unique(&mut firsts, first.to_string()),
                        (None, _) => {}
                    }
                }
                Plan {
                    filter: WordFilter::Or(vec![
                        WordFilter::WordPrefix(letters),
                        WordFilter::column_in(MatcherColumn::Word, firsts),
                    ]),
                    tiers: vec![(MatcherColumn::Word, TermRule::Initials)],
                }
            }
        }
    }

    /// Run this strategy against the dictionary for the still-open `terms`.
    ///
    /// One candidate scope (least common words first, at most
    /// `matches_reduction_factor`) is shared by every tier; each tier keeps the
    /// candidates whose key column maps back to at least one term. Returns no
    /// results when no term is accepted.
    pub fn find(&self, view: &Tables, terms: &[String]) -> Vec<MatchResult> {
        let (accepted, _) = self.partition_terms(terms);
        if accepted.is_empty() {
            return Vec::new();
        }
        let plan = self.plan(&accepted);
        let scope = view.candidate_words(&plan.filter, self.tuning.matches_reduction_factor);
        plan.tiers
            .into_iter()
            .enumerate()
            .map(|(tier, (column, rule))| {
                let candidates = scope
                    .iter()
                    .filter_map(|word| {
                        let value = word.column(column)?;
                        let terms = rule.terms_for(value, &accepted);
                        (!terms.is_empty()).then(|| Candidate {
                            word: word.clone(),
                            terms,
                        })
                    })
                    .collect();
                MatchResult::new(self, tier, candidates)
            })
            .collect()
    }

    /// Which words each accepted term reaches, ignoring every reduction
    /// factor except the candidate scope limit.
    pub fn explain(&self, view: &Tables, terms: &[String]) -> MatcherExplanation {
        let (accepted, rejected) = self.partition_terms(terms);
        let mut matches: BTreeMap<String, Vec<String>> = accepted
            .iter()
            .map(|t| (t.to_string(), Vec::new()))
            .collect();
        for result in self.find(view, terms) {
            for candidate in result.candidates() {
                for term in &candidate.terms {
                    let words = matches.entry(term.clone()).or_default();
                    if !words.contains(&candidate.word.word) {
                        words.push(candidate.word.word.clone());
                    }
                }
            }
        }
        MatcherExplanation {
            match_type: self.match_type,
            accepted_terms: accepted.into_iter().cloned().collect(),
            rejected_terms: rejected.into_iter().cloned().collect(),
            matches,
        }
    }
}

/// Key columns of a new word for every index-time strategy in `config`
pub fn compute_keys(word: &str, config: &SearchConfig) -> MatcherKeys {
    let mut keys = MatcherKeys::default();
    for match_type in &config.index_match_types {
        Matcher::from_config(*match_type, config).fill_keys(word, &mut keys);
    }
    keys
}

/// What one strategy does with a query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatcherExplanation {
    /// Strategy
    pub match_type: MatchType,
    /// Terms the strategy considered
    pub accepted_terms: Vec<String>,
    /// Terms it skipped (too short, wrong characters...)
    pub rejected_terms: Vec<String>,
    /// Dictionary words reached per accepted term, least common first
    pub matches: BTreeMap<String, Vec<String>>,
}

/// `key -> terms` for strategies with precomputed keys
#[derive(Debug, Clone, Default)]
struct KeyMap(FxHashMap<String, Vec<String>>);

impl KeyMap {
    fn from_pairs<'a>(pairs: impl IntoIterator<Item = (String, &'a String)>) -> Self {
        let mut map: FxHashMap<String, Vec<String>> = FxHashMap::default();
        for (key, term) in pairs {
            let terms = map.entry(key).or_default();
            if !terms.contains(term) {
                terms.push(term.clone());
            }
        }
        KeyMap(map)
    }

    fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.0.keys().cloned().collect();
        keys.sort();
        keys
    }
}

/// How a tier maps a candidate's column value back to terms
#[derive(Debug, Clone)]
enum TermRule {
    Keyed(KeyMap),
    /// Word starts with the term
    Prefix,
    /// Single-letter term: word starts with it; longer term: word is its
    /// first letter
    Initials,
}

impl TermRule {
    fn terms_for(&self, value: &str, accepted: &[&String]) -> Vec<String> {
        match self {
            TermRule::Keyed(map) => map.0.get(value).cloned().unwrap_or_default(),
            TermRule::Prefix => accepted
                .iter()
                .filter(|t| value.starts_with(t.as_str()))
                .map(|t| t.to_string())
                .collect(),
            TermRule::Initials => accepted
                .iter()
                .filter(|t| {
                    let mut chars = t.chars();
                    match (chars.next(), chars.next()) {
                        (Some(_), None) => value.starts_with(t.as_str()),
                        (Some(first), Some(_)) => {
                            let mut word = value.chars();
                            word.next() == Some(first) && word.next().is_none()
                        }
                        (None, _) => false,
                    }
                })
                .map(|t| t.to_string())
                .collect(),
        }
    }
}

struct Plan {
    filter: WordFilter,
    tiers: Vec<(MatcherColumn, TermRule)>,
}

impl Plan {
    fn keyed(filter: WordFilter, tiers: Vec<(MatcherColumn, KeyMap)>) -> Self {
        Plan {
            filter,
            tiers: tiers
                .into_iter()
                .map(|(column, map)| (column, TermRule::Keyed(map)))
                .collect(),
        }
    }
}

fn truncate(key: String, max: usize) -> Option<String> {
    if key.is_empty() {
        return None;
    }
    match key.char_indices().nth(max) {
        Some((idx, _)) => Some(key[..idx].to_string()),
        None => Some(key),
    }
}

fn push_unique(list: &mut Vec<String>, value: String) {
    if !list.contains(&value) {
        list.push(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fuzzdex_core::types::{NewWord, WordRow};
    use fuzzdex_storage::{IndexStore, InsertOutcome};

    fn words_of(rows: &[WordRow]) -> Vec<&str> {
        rows.iter().map(|w| w.word.as_str()).collect()
    }

    fn config_with(types: &[MatchType]) -> SearchConfig {
        SearchConfig {
            perform_match_types: types.to_vec(),
            index_match_types: vec![
                MatchType::Stem,
                MatchType::Metaphone,
                MatchType::DoubleMetaphone,
                MatchType::Soundex,
                MatchType::AmericanSoundex,
            ],
            ..SearchConfig::default()
        }
    }

    fn store_with(words: &[&str], config: &SearchConfig) -> IndexStore {
        let store = IndexStore::new();
        let mut txn = store.begin();
        for word in words {
            let outcome = txn.insert_word(NewWord {
                word: word.to_string(),
                keys: compute_keys(word, config),
            });
            assert!(matches!(outcome, InsertOutcome::Inserted(_)));
        }
        txn.commit();
        store
    }

    fn matched(match_type: MatchType, indexed: &str, query: &str) -> bool {
        let config = config_with(&[match_type]);
        let store = store_with(&[indexed], &config);
        let matcher = Matcher::from_config(match_type, &config);
        let terms = vec![query.to_string()];
        let view = store.read();
        matcher
            .find(&view, &terms)
            .iter()
            .any(|r| !r.candidates().is_empty())
    }

    // === Eligibility ===

    #[test]
    fn test_accepts_by_type() {
        let config = SearchConfig::default();
        let m = |t| Matcher::from_config(t, &config);
        assert!(m(MatchType::Metaphone).accepts("t"));
        assert!(!m(MatchType::Metaphone).accepts("1"));
        assert!(!m(MatchType::Metaphone).accepts("t1"));
        assert!(m(MatchType::Metaphone).accepts("th1ng"));
        assert!(!m(MatchType::Soundex).accepts("th"));
        assert!(!m(MatchType::Soundex).accepts("th1"));
        assert!(m(MatchType::Soundex).accepts("thi"));
        assert!(m(MatchType::AmericanSoundex).accepts("1a"));
        assert!(!m(MatchType::AmericanSoundex).accepts("123"));
        assert!(!m(MatchType::StartWith).accepts("t"));
        assert!(m(MatchType::Leet).accepts("abcdefghi"));
        assert!(!m(MatchType::Leet).accepts("abcdefghij"));
    }

    #[test]
    fn test_partition_terms() {
        let config = SearchConfig::default();
        let matcher = Matcher::from_config(MatchType::Soundex, &config);
        let terms = vec!["a".to_string(), "norm".to_string()];
        let (accepted, rejected) = matcher.partition_terms(&terms);
        assert_eq!(accepted, vec!["norm"]);
        assert_eq!(rejected, vec!["a"]);
    }

    // === Index keys ===

    #[test]
    fn test_compute_keys() {
        let config = config_with(&[]);
        let keys = compute_keys("things", &config);
        assert_eq!(keys.stem.as_deref(), Some("thing"));
        assert_eq!(keys.metaphone.as_deref(), Some("0NKS"));
        assert_eq!(keys.primary_metaphone.as_deref(), Some("0NKS"));
        assert_eq!(keys.secondary_metaphone.as_deref(), Some("TNKS"));
        assert_eq!(keys.soundex.as_deref(), Some("T520"));
        assert_eq!(keys.american_soundex.as_deref(), Some("T520"));
    }

    #[test]
    fn test_compute_keys_ineligible() {
        let config = config_with(&[]);
        let keys = compute_keys("42", &config);
        assert_eq!(keys.stem.as_deref(), Some("42"));
        assert_eq!(keys.metaphone, None);
        assert_eq!(keys.primary_metaphone, None);
        assert_eq!(keys.soundex, None);
        assert_eq!(keys.american_soundex, None);
    }

    #[test]
    fn test_compute_keys_only_configured_types() {
        let config = SearchConfig {
            index_match_types: vec![MatchType::Stem],
            ..SearchConfig::default()
        };
        let keys = compute_keys("things", &config);
        assert_eq!(keys.stem.as_deref(), Some("thing"));
        assert_eq!(keys.metaphone, None);
    }

    #[test]
    fn test_key_length_override() {
        let mut config = config_with(&[]);
        config.matchers.american_soundex.max_key_length = Some(4);
        let keys = compute_keys("reallylongword", &config);
        assert_eq!(keys.american_soundex.as_deref(), Some("R452"));
    }

    // === Strategy behavior against an indexed 'thing' ===

    #[test]
    fn test_exact() {
        assert!(matched(MatchType::Exact, "thing", "thing"));
        assert!(!matched(MatchType::Exact, "thing", "things"));
    }

    #[test]
    fn test_stem() {
        assert!(!matched(MatchType::Stem, "thing", "thin"));
        assert!(matched(MatchType::Stem, "thing", "thing"));
        assert!(matched(MatchType::Stem, "thing", "things"));
        assert!(!matched(MatchType::Stem, "thing", "th1ng"));
        assert!(!matched(MatchType::Stem, "thing", "theng"));
        assert!(!matched(MatchType::Stem, "thing", "think"));
    }

    #[test]
    fn test_metaphone() {
        assert!(!matched(MatchType::Metaphone, "thing", "thin"));
        assert!(matched(MatchType::Metaphone, "thing", "thing"));
        assert!(!matched(MatchType::Metaphone, "thing", "things"));
        assert!(matched(MatchType::Metaphone, "thing", "th1ng"));
        assert!(matched(MatchType::Metaphone, "thing", "theng"));
        assert!(matched(MatchType::Metaphone, "thing", "think"));
    }

    #[test]
    fn test_double_metaphone() {
        assert!(matched(MatchType::DoubleMetaphone, "thing", "thing"));
        assert!(matched(MatchType::DoubleMetaphone, "thing", "think"));
        assert!(!matched(MatchType::DoubleMetaphone, "thing", "thin"));
        assert!(matched(MatchType::DoubleMetaphone, "smith", "schmidt"));
    }

    #[test]
    fn test_soundex() {
        assert!(!matched(MatchType::Soundex, "thing", "thin"));
        assert!(matched(MatchType::Soundex, "thing", "thing"));
        assert!(matched(MatchType::Soundex, "thing", "things"));
        assert!(!matched(MatchType::Soundex, "thing", "th1ng"));
        assert!(matched(MatchType::Soundex, "thing", "theng"));
        assert!(matched(MatchType::Soundex, "thing", "think"));
        assert!(!matched(MatchType::Soundex, "t", "t"));
        assert!(!matched(MatchType::Soundex, "th", "th"));
        assert!(matched(MatchType::Soundex, "thi", "thi"));
        assert!(!matched(MatchType::Soundex, "thi1", "thi1"));
    }

    #[test]
    fn test_american_soundex() {
        assert!(matched(MatchType::AmericanSoundex, "thing", "thing"));
        assert!(matched(MatchType::AmericanSoundex, "thing", "theng"));
        assert!(matched(MatchType::AmericanSoundex, "thing", "th1ng"));
        assert!(!matched(MatchType::AmericanSoundex, "thing", "thin"));
    }

    #[test]
    fn test_leet() {
        assert!(!matched(MatchType::Leet, "thing", "thin"));
        assert!(matched(MatchType::Leet, "thing", "thing"));
        assert!(!matched(MatchType::Leet, "thing", "things"));
        assert!(matched(MatchType::Leet, "thing", "th1ng"));
        assert!(!matched(MatchType::Leet, "thing", "theng"));
        assert!(!matched(MatchType::Leet, "thing", "think"));
    }

    #[test]
    fn test_start_with() {
        assert!(matched(MatchType::StartWith, "thing", "thin"));
        assert!(matched(MatchType::StartWith, "thing", "thing"));
        assert!(!matched(MatchType::StartWith, "thing", "things"));
        assert!(!matched(MatchType::StartWith, "thing", "th1ng"));
        assert!(!matched(MatchType::StartWith, "thing", "theng"));
        assert!(!matched(MatchType::StartWith, "thing", "think"));
        assert!(!matched(MatchType::StartWith, "t", "t"));
        assert!(matched(MatchType::StartWith, "th", "th"));
    }

    #[test]
    fn test_initials() {
        assert!(matched(MatchType::Initials, "thing", "t"));
        assert!(!matched(MatchType::Initials, "thing", "th"));
        assert!(!matched(MatchType::Initials, "thing", "thing"));
        assert!(matched(MatchType::Initials, "t", "t"));
        assert!(matched(MatchType::Initials, "t", "th"));
        assert!(matched(MatchType::Initials, "t", "this"));
        assert!(!matched(MatchType::Initials, "th", "th"));
    }

    // === Tiers ===

    #[test]
    fn test_stem_tiers() {
        let config = config_with(&[MatchType::Stem]);
        let store = store_with(&["thing", "things"], &config);
        let matcher = Matcher::from_config(MatchType::Stem, &config);
        let view = store.read();
        let results = matcher.find(&view, &["things".to_string()]);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].rank_multiplier(), 12.0);
        let rows: Vec<WordRow> = results[0].candidates().iter().map(|c| c.word.clone()).collect();
        let mut words = words_of(&rows);
        words.sort();
        assert_eq!(words, vec!["thing", "things"]);
        // raw term "things" is nobody's stem
        assert!(results[1].candidates().is_empty());
        assert_eq!(results[1].rank_multiplier(), 11.0);
    }

    #[test]
    fn test_double_metaphone_tier_order() {
        let config = config_with(&[MatchType::DoubleMetaphone]);
        let store = store_with(&["smith"], &config);
        let matcher = Matcher::from_config(MatchType::DoubleMetaphone, &config);
        let view = store.read();
        // schmidt: XMT / SMT; smith: SM0 / XMT
        let results = matcher.find(&view, &["schmidt".to_string()]);
        let hits: Vec<(usize, f64)> = results
            .iter()
            .filter(|r| !r.candidates().is_empty())
            .map(|r| (r.tier(), r.rank_multiplier()))
            .collect();
        assert_eq!(hits, vec![(2, 4.0)]);
    }

    #[test]
    fn test_no_accepted_terms_no_results() {
        let config = config_with(&[MatchType::Soundex]);
        let store = store_with(&["thing"], &config);
        let matcher = Matcher::from_config(MatchType::Soundex, &config);
        let view = store.read();
        assert!(matcher.find(&view, &["ab".to_string()]).is_empty());
    }

    #[test]
    fn test_scope_limited_least_common_first() {
        let mut config = config_with(&[MatchType::StartWith]);
        config.matchers.start_with.matches_reduction_factor = Some(2);
        let store = store_with(&["tea", "ten", "tent"], &config);
        {
            let view = store.read();
            let tea = view.word_by_text("tea").map(|w| w.id);
            drop(view);
            let mut txn = store.begin();
            if let Some(id) = tea {
                txn.set_entries_count(id, 10).unwrap();
            }
            txn.commit();
        }
        let matcher = Matcher::from_config(MatchType::StartWith, &config);
        let view = store.read();
        let results = matcher.find(&view, &["te".to_string()]);
        let rows: Vec<WordRow> = results[0].candidates().iter().map(|c| c.word.clone()).collect();
        assert_eq!(words_of(&rows), vec!["ten", "tent"]);
    }

    // === Explain ===

    #[test]
    fn test_explain() {
        let config = config_with(&[MatchType::Soundex]);
        let store = store_with(&["thing", "think"], &config);
        let matcher = Matcher::from_config(MatchType::Soundex, &config);
        let view = store.read();
        let terms = vec!["theng".to_string(), "a".to_string()];
        let explanation = matcher.explain(&view, &terms);
        assert_eq!(explanation.accepted_terms, vec!["theng"]);
        assert_eq!(explanation.rejected_terms, vec!["a"]);
        let mut words = explanation.matches["theng"].clone();
        words.sort();
        assert_eq!(words, vec!["thing", "think"]);
    }
}
