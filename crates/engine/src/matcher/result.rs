//! Output of one strategy tier

use super::Matcher;
use fuzzdex_core::match_type::MatchType;
use fuzzdex_core::types::{WordId, WordRow};
use std::collections::BTreeMap;

/// A dictionary word reached by a tier, with the query terms that reached it
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// The word row as read from the dictionary
    pub word: WordRow,
    /// Originating query terms, in query order
    pub terms: Vec<String>,
}

/// One tier of one strategy: its multipliers, its candidates, and (after
/// [`super::ResultList`] has run) the words it was credited with per term.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    match_type: MatchType,
    tier: usize,
    rank_multiplier: f64,
    term_multiplier: f64,
    limit_reduction_factor: u64,
    type_reduction_factor: u64,
    candidates: Vec<Candidate>,
    list_map: BTreeMap<String, Vec<WordId>>,
}

impl MatchResult {
    pub(crate) fn new(matcher: &Matcher, tier: usize, candidates: Vec<Candidate>) -> Self {
        let tuning = matcher.tuning();
        MatchResult {
            match_type: matcher.match_type(),
            tier,
            rank_multiplier: tuning.rank_multipliers.get(tier).copied().unwrap_or(1.0),
            term_multiplier: tuning.term_multipliers.get(tier).copied().unwrap_or(1.0),
            limit_reduction_factor: tuning.limit_reduction_factor,
            type_reduction_factor: tuning.type_reduction_factor,
            candidates,
            list_map: BTreeMap::new(),
        }
    }

    pub fn match_type(&self) -> MatchType {
        self.match_type
    }

    /// Tier index within the strategy (0 for single-tier strategies)
    pub fn tier(&self) -> usize {
        self.tier
    }

    pub fn rank_multiplier(&self) -> f64 {
        self.rank_multiplier
    }

    pub fn term_multiplier(&self) -> f64 {
        self.term_multiplier
    }

    pub fn limit_reduction_factor(&self) -> u64 {
        self.limit_reduction_factor
    }

    pub fn type_reduction_factor(&self) -> u64 {
        self.type_reduction_factor
    }

    /// Candidates, least common word first
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    /// True when the tier reached no dictionary word at all
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Accepted words per term
    pub fn list_map(&self) -> &BTreeMap<String, Vec<WordId>> {
        &self.list_map
    }

    /// Every accepted word, ascending
    pub fn words(&self) -> Vec<WordId> {
        let mut ids: Vec<WordId> = self.list_map.values().flatten().copied().collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    /// Does this tier credit `word` to any term?
    pub fn contains_word(&self, word: WordId) -> bool {
        self.list_map.values().any(|ids| ids.contains(&word))
    }

    pub(crate) fn credit(&mut self, term: &str, word: WordId) {
        self.list_map.entry(term.to_string()).or_default().push(word);
    }

    pub(crate) fn has_credits(&self) -> bool {
        !self.list_map.is_empty()
    }
}
