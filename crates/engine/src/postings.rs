//! Posting store queries: filtering, row scoring and pagination
//!
//! Rows are scored in-process over the postings of the matched words:
//!
//! ```text
//! score(row) = RankFactor × TermFactor × PriorityFactor
//! ```
//!
//! - RankFactor: sum of `rank × multiplier` over the row's postings, the
//!   multiplier coming from the most specific tier crediting the word
//! - TermFactor: per tier, `(terms the row satisfied via it) ^ term_multiplier`,
//!   summed
//! - PriorityFactor: the row priority, or [`PRIORITY_FLOOR`] when not positive
//!
//! A posting of a word with a rank cutoff only counts when its rank is above
//! the cutoff.

use crate::matcher::ResultList;
use fuzzdex_core::types::{EntryRow, ModelId, RowKey, WordId};
use fuzzdex_storage::Tables;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;
use std::collections::BTreeMap;

/// Priority used for rows whose priority is zero or negative
pub const PRIORITY_FLOOR: f64 = 0.001;

/// One ranked record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    /// Packed model/record id
    pub row_key: RowKey,
    /// Record type
    pub model_id: ModelId,
    /// Record id within its type
    pub record_id: u64,
    /// Row score
    pub score: f64,
}

/// One page of hits plus the total number of matching rows
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SearchPage {
    /// Hits of the requested page, best first
    pub hits: Vec<SearchHit>,
    /// Matching rows across all pages
    pub total: usize,
}

#[derive(Debug, Default)]
struct RowScore {
    rank_factor: f64,
    priority: Option<f64>,
    words: FxHashSet<WordId>,
}

/// Postings that pass the cutoff filter, ascending by id
fn matching_postings<'a>(view: &'a Tables, list: &ResultList) -> Vec<&'a EntryRow> {
    if list.is_empty() {
        return Vec::new();
    }
    let unlimited: FxHashSet<WordId> = list.unlimited_words().iter().copied().collect();
    let limited = list.limited_words();
    view.entries_for_words(&list.word_ids())
        .into_iter()
        .filter(|e| {
            unlimited.contains(&e.word_id)
                || limited
                    .get(&e.word_id)
                    .map_or(false, |cutoff| e.rank > *cutoff)
        })
        .collect()
}

/// Every matching row, scored and ordered by score descending then row key
pub fn rank_rows(view: &Tables, list: &ResultList) -> Vec<SearchHit> {
    let postings = matching_postings(view, list);
    if postings.is_empty() {
        return Vec::new();
    }

    let mut multipliers: FxHashMap<WordId, f64> = FxHashMap::default();
    let mut rows: BTreeMap<RowKey, RowScore> = BTreeMap::new();
    for posting in postings {
        let multiplier = *multipliers
            .entry(posting.word_id)
            .or_insert_with(|| list.rank_multiplier_for(posting.word_id));
        let row = rows.entry(posting.row_key).or_default();
        row.rank_factor += multiplier * f64::from(posting.rank);
        // postings arrive by ascending id; the first one carries the row priority
        if row.priority.is_none() {
            row.priority = Some(posting.row_priority);
        }
        row.words.insert(posting.word_id);
    }

    let mut hits: Vec<SearchHit> = rows
        .into_iter()
        .map(|(row_key, row)| {
            let term_factor = term_factor(list, &row.words);
            let priority = match row.priority {
                Some(p) if p > 0.0 => p,
                _ => PRIORITY_FLOOR,
            };
            SearchHit {
                row_key,
                model_id: row_key.model_id(),
                record_id: row_key.record_id(),
                score: row.rank_factor * term_factor * priority,
            }
        })
        .collect();
    hits.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.row_key.cmp(&b.row_key))
    });
    hits
}

fn term_factor(list: &ResultList, words: &FxHashSet<WordId>) -> f64 {
    list.results()
        .iter()
        .map(|result| {
            let satisfied = result
                .list_map()
                .values()
                .filter(|ids| ids.iter().any(|id| words.contains(id)))
                .count();
            (satisfied as f64).powf(result.term_multiplier())
        })
        .sum()
}

/// One page of ranked rows; pages are 1-based and page 0 reads as page 1
pub fn find_results(
    view: &Tables,
    list: &ResultList,
    page_size: usize,
    page_number: usize,
) -> Vec<SearchHit> {
    paginate(rank_rows(view, list), page_size, page_number)
}

/// Number of distinct rows with at least one matching posting
pub fn count_results(view: &Tables, list: &ResultList) -> usize {
    matching_postings(view, list)
        .into_iter()
        .map(|e| e.row_key)
        .collect::<FxHashSet<RowKey>>()
        .len()
}

/// Rank once, return the requested page and the total
pub fn search_page(
    view: &Tables,
    list: &ResultList,
    page_size: usize,
    page_number: usize,
) -> SearchPage {
    let ranked = rank_rows(view, list);
    let total = ranked.len();
    SearchPage {
        hits: paginate(ranked, page_size, page_number),
        total,
    }
}

fn paginate(ranked: Vec<SearchHit>, page_size: usize, page_number: usize) -> Vec<SearchHit> {
    let offset = page_size.saturating_mul(page_number.saturating_sub(1));
    ranked.into_iter().skip(offset).take(page_size).collect()
}
