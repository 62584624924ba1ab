//! The `words` and `entries` tables with their indexes
//!
//! # Design
//!
//! - `words`: FxHashMap by id, plus an ordered unique index on the word text
//!   (prefix scans are range scans) and one hash index per matcher column
//! - `entries`: FxHashMap by id, plus hash indexes by word, by row key and by
//!   model
//!
//! Indexes are maintained by the `put_*`/`remove_*` primitives only; the
//! public surface of this module is read-only. Mutation goes through
//! [`crate::WriteTxn`], which records undo information for every primitive it
//! calls.

use fuzzdex_core::types::{EntryId, EntryRow, MatcherColumn, ModelId, RowKey, WordId, WordRow};
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::BTreeMap;
use std::ops::Bound;

/// Predicate over dictionary words, the storage analogue of a `WHERE` clause
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WordFilter {
    /// `column IN (values)`
    ColumnIn {
        /// Column to compare
        column: MatcherColumn,
        /// Accepted values
        values: Vec<String>,
    },
    /// `c1 IN (values) OR c2 IN (values) ...`
    AnyColumnIn {
        /// Columns to compare
        columns: Vec<MatcherColumn>,
        /// Accepted values
        values: Vec<String>,
    },
    /// Word starts with any of the prefixes
    WordPrefix(Vec<String>),
    /// Union of filters
    Or(Vec<WordFilter>),
}

impl WordFilter {
    /// Shorthand for `column IN (values)`
    pub fn column_in(column: MatcherColumn, values: impl IntoIterator<Item = String>) -> Self {
        WordFilter::ColumnIn {
            column,
            values: values.into_iter().collect(),
        }
    }
}

/// In-memory rows and indexes of both tables
#[derive(Debug, Default, Clone)]
pub struct Tables {
    pub(crate) words: FxHashMap<WordId, WordRow>,
    pub(crate) word_index: BTreeMap<String, WordId>,
    pub(crate) key_index: FxHashMap<MatcherColumn, FxHashMap<String, FxHashSet<WordId>>>,
    pub(crate) entries: FxHashMap<EntryId, EntryRow>,
    pub(crate) entries_by_word: FxHashMap<WordId, FxHashSet<EntryId>>,
    pub(crate) entries_by_row: FxHashMap<RowKey, FxHashSet<EntryId>>,
    pub(crate) entries_by_model: FxHashMap<ModelId, FxHashSet<EntryId>>,
    pub(crate) next_word_id: u64,
    pub(crate) next_entry_id: u64,
}

impl Tables {
    /// Create empty tables
    pub fn new() -> Self {
        Tables {
            next_word_id: 1,
            next_entry_id: 1,
            ..Default::default()
        }
    }

    // ========================================================================
    // Words
    // ========================================================================

    /// Number of dictionary words
    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    /// Word by id
    pub fn word(&self, id: WordId) -> Option<&WordRow> {
        self.words.get(&id)
    }

    /// Word by its text (unique index lookup)
    pub fn word_by_text(&self, word: &str) -> Option<&WordRow> {
        self.word_index.get(word).and_then(|id| self.words.get(id))
    }

    /// Batch lookup of existing word ids; missing tokens are absent from the map
    pub fn word_ids_for<S: AsRef<str>>(&self, tokens: &[S]) -> FxHashMap<String, WordId> {
        let mut map = FxHashMap::default();
        for token in tokens {
            let token = token.as_ref();
            if let Some(id) = self.word_index.get(token) {
                map.insert(token.to_string(), *id);
            }
        }
        map
    }

    /// All word ids, ascending
    pub fn word_ids(&self) -> Vec<WordId> {
        let mut ids: Vec<WordId> = self.words.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Words accepted by `filter`, least-posted first (ties by id), at most `limit`
    pub fn candidate_words(&self, filter: &WordFilter, limit: usize) -> Vec<WordRow> {
        let mut ids = FxHashSet::default();
        self.collect_filter(filter, &mut ids);
        let mut rows: Vec<&WordRow> = ids.iter().filter_map(|id| self.words.get(id)).collect();
        rows.sort_by(|a, b| {
            a.entries_count
                .cmp(&b.entries_count)
                .then_with(|| a.id.cmp(&b.id))
        });
        rows.into_iter().take(limit).cloned().collect()
    }

    fn collect_filter(&self, filter: &WordFilter, out: &mut FxHashSet<WordId>) {
        match filter {
            WordFilter::ColumnIn { column, values } => self.collect_column(*column, values, out),
            WordFilter::AnyColumnIn { columns, values } => {
                for column in columns {
                    self.collect_column(*column, values, out);
                }
            }
            WordFilter::WordPrefix(prefixes) => {
                for prefix in prefixes {
                    let range = self
                        .word_index
                        .range::<str, _>((Bound::Included(prefix.as_str()), Bound::Unbounded));
                    for (word, id) in range {
                        if !word.starts_with(prefix.as_str()) {
                            break;
                        }
                        out.insert(*id);
                    }
                }
            }
            WordFilter::Or(filters) => {
                for f in filters {
                    self.collect_filter(f, out);
                }
            }
        }
    }

    fn collect_column(&self, column: MatcherColumn, values: &[String], out: &mut FxHashSet<WordId>) {
        if column == MatcherColumn::Word {
            for value in values {
                if let Some(id) = self.word_index.get(value) {
                    out.insert(*id);
                }
            }
            return;
        }
        if let Some(index) = self.key_index.get(&column) {
            for value in values {
                if let Some(ids) = index.get(value) {
                    out.extend(ids.iter().copied());
                }
            }
        }
    }

    /// Words with no postings, ascending by id
    pub fn orphan_word_ids(&self) -> Vec<WordId> {
        let mut ids: Vec<WordId> = self
            .words
            .keys()
            .filter(|id| self.live_entry_count(**id) == 0)
            .copied()
            .collect();
        ids.sort_unstable();
        ids
    }

    // ========================================================================
    // Entries
    // ========================================================================

    /// Number of postings
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Posting by id
    pub fn entry(&self, id: EntryId) -> Option<&EntryRow> {
        self.entries.get(&id)
    }

    /// Number of postings actually referencing a word
    pub fn live_entry_count(&self, word_id: WordId) -> u64 {
        self.entries_by_word
            .get(&word_id)
            .map(|set| set.len() as u64)
            .unwrap_or(0)
    }

    /// Postings of one record, ascending by id
    pub fn entries_for_row(&self, row_key: RowKey) -> Vec<&EntryRow> {
        self.entries_in(self.entries_by_row.get(&row_key))
    }

    /// Postings of one word, ascending by id
    pub fn entries_for_word(&self, word_id: WordId) -> Vec<&EntryRow> {
        self.entries_in(self.entries_by_word.get(&word_id))
    }

    /// Postings of several words, ascending by id
    pub fn entries_for_words(&self, word_ids: &[WordId]) -> Vec<&EntryRow> {
        let mut rows: Vec<&EntryRow> = word_ids
            .iter()
            .filter_map(|id| self.entries_by_word.get(id))
            .flat_map(|set| set.iter())
            .filter_map(|id| self.entries.get(id))
            .collect();
        rows.sort_by_key(|e| e.id);
        rows.dedup_by_key(|e| e.id);
        rows
    }

    /// Postings of one model, ascending by id
    pub fn entries_for_model(&self, model_id: ModelId) -> Vec<&EntryRow> {
        self.entries_in(self.entries_by_model.get(&model_id))
    }

    /// Ranks of a word's postings, highest first
    pub fn ranks_desc(&self, word_id: WordId) -> Vec<i32> {
        let mut ranks: Vec<i32> = self
            .entries_for_word(word_id)
            .into_iter()
            .map(|e| e.rank)
            .collect();
        ranks.sort_unstable_by(|a, b| b.cmp(a));
        ranks
    }

    fn entries_in(&self, ids: Option<&FxHashSet<EntryId>>) -> Vec<&EntryRow> {
        let mut rows: Vec<&EntryRow> = ids
            .into_iter()
            .flat_map(|set| set.iter())
            .filter_map(|id| self.entries.get(id))
            .collect();
        rows.sort_by_key(|e| e.id);
        rows
    }

    // ========================================================================
    // Index-maintaining primitives (used by WriteTxn and its rollback)
    // ========================================================================

    pub(crate) fn put_word(&mut self, row: WordRow) -> Option<WordRow> {
        let old = self.remove_word(row.id);
        self.word_index.insert(row.word.clone(), row.id);
        for column in MatcherColumn::KEY_COLUMNS {
            if let Some(key) = row.keys.get(column) {
                self.key_index
                    .entry(column)
                    .or_default()
                    .entry(key.to_string())
                    .or_default()
                    .insert(row.id);
            }
        }
        self.words.insert(row.id, row);
        old
    }

    pub(crate) fn remove_word(&mut self, id: WordId) -> Option<WordRow> {
        let row = self.words.remove(&id)?;
        self.word_index.remove(&row.word);
        for column in MatcherColumn::KEY_COLUMNS {
            if let Some(key) = row.keys.get(column) {
                if let Some(index) = self.key_index.get_mut(&column) {
                    if let Some(ids) = index.get_mut(key) {
                        ids.remove(&id);
                        if ids.is_empty() {
                            index.remove(key);
                        }
                    }
                }
            }
        }
        Some(row)
    }

    pub(crate) fn put_entry(&mut self, row: EntryRow) -> Option<EntryRow> {
        let old = self.remove_entry(row.id);
        self.entries_by_word.entry(row.word_id).or_default().insert(row.id);
        self.entries_by_row.entry(row.row_key).or_default().insert(row.id);
        self.entries_by_model.entry(row.model_id).or_default().insert(row.id);
        self.entries.insert(row.id, row);
        old
    }

    pub(crate) fn remove_entry(&mut self, id: EntryId) -> Option<EntryRow> {
        let row = self.entries.remove(&id)?;
        remove_from(&mut self.entries_by_word, &row.word_id, id);
        remove_from(&mut self.entries_by_row, &row.row_key, id);
        remove_from(&mut self.entries_by_model, &row.model_id, id);
        Some(row)
    }
}

fn remove_from<K: std::hash::Hash + Eq>(
    index: &mut FxHashMap<K, FxHashSet<EntryId>>,
    key: &K,
    id: EntryId,
) {
    if let Some(set) = index.get_mut(key) {
        set.remove(&id);
        if set.is_empty() {
            index.remove(key);
        }
    }
}
