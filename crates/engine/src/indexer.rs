//! Index maintainer
//!
//! Keeps postings in step with host records and dictionary statistics in
//! step with postings. Every operation runs its posting writes and the
//! matching count/cutoff updates in one write transaction, so a failure
//! midway rolls both back together.
//!
//! # Diffing
//!
//! A record's desired state is a `word -> rank` map (token weights summed
//! across fields) plus one priority. Against the postings already stored for
//! the record:
//!
//! | stored | desired | action |
//! |--------|---------|--------|
//! | yes    | same rank and priority | nothing |
//! | yes    | other rank or priority | update |
//! | yes    | absent  | delete, count - 1 |
//! | no     | present | insert, count + 1 |
//!
//! Re-indexing an unchanged record therefore writes nothing.

use crate::dictionary::Dictionary;
use crate::registry::ModelRegistry;
use crate::search::split_into_words;
use fuzzdex_core::error::Result;
use fuzzdex_core::record::Indexable;
use fuzzdex_core::types::{
    normalize_priority, EntryRow, ModelId, NewEntry, RowKey, WordId, DEFAULT_ROW_PRIORITY,
};
use fuzzdex_storage::{IndexStore, WriteTxn};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::ops::AddAssign;
use std::sync::Arc;
use tracing::{debug, info};

/// Posting writes made by an index operation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IndexReport {
    /// Records visited
    pub records: usize,
    /// Postings inserted
    pub inserted: usize,
    /// Postings whose rank or priority changed
    pub updated: usize,
    /// Postings deleted
    pub deleted: usize,
    /// Orphan words removed
    pub words_deleted: usize,
}

impl IndexReport {
    /// Total posting writes
    pub fn writes(&self) -> usize {
        self.inserted + self.updated + self.deleted
    }

    /// True when nothing was written
    pub fn is_noop(&self) -> bool {
        self.writes() == 0 && self.words_deleted == 0
    }
}

impl AddAssign for IndexReport {
    fn add_assign(&mut self, other: Self) {
        self.records += other.records;
        self.inserted += other.inserted;
        self.updated += other.updated;
        self.deleted += other.deleted;
        self.words_deleted += other.words_deleted;
    }
}

/// Outcome of a maintenance pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MaintenanceReport {
    /// Words whose posting count was wrong
    pub counts_fixed: usize,
    /// Words whose rank cutoff changed
    pub cutoffs_changed: usize,
    /// Orphan words removed
    pub orphans_deleted: usize,
}

/// Sum token weights across fields
///
/// Every occurrence of a token adds its field's weight, so repeated words
/// accumulate.
pub fn collect_ranks(record: &dyn Indexable, max_word_length: usize) -> BTreeMap<String, i32> {
    let mut ranks: BTreeMap<String, i32> = BTreeMap::new();
    for field in record.search_index_info() {
        for token in split_into_words(&field.text, max_word_length) {
            let rank = ranks.entry(token).or_insert(0);
            *rank = rank.saturating_add(field.weight);
        }
    }
    ranks
}

/// Pending statistics changes of one transaction
#[derive(Debug, Default)]
struct StatDeltas {
    counts: BTreeMap<WordId, i64>,
    reranked: BTreeSet<WordId>,
    decremented: BTreeSet<WordId>,
}

impl StatDeltas {
    fn add(&mut self, word: WordId) {
        *self.counts.entry(word).or_insert(0) += 1;
    }

    fn remove(&mut self, word: WordId) {
        *self.counts.entry(word).or_insert(0) -= 1;
        self.decremented.insert(word);
    }

    fn touched(&self) -> Vec<WordId> {
        let mut ids: BTreeSet<WordId> = self.reranked.clone();
        ids.extend(self.counts.iter().filter(|(_, d)| **d != 0).map(|(id, _)| *id));
        ids.into_iter().collect()
    }
}

/// Create, update and delete postings for host records
#[derive(Debug, Clone)]
pub struct IndexMaintainer {
    dictionary: Dictionary,
    registry: Arc<ModelRegistry>,
}

impl IndexMaintainer {
    pub fn new(dictionary: Dictionary, registry: Arc<ModelRegistry>) -> Self {
        IndexMaintainer {
            dictionary,
            registry,
        }
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    fn store(&self) -> &IndexStore {
        self.dictionary.store()
    }

    fn row_key(&self, record: &dyn Indexable) -> Result<RowKey> {
        let model_id = self.registry.model_id_of(record)?;
        RowKey::new(model_id, record.record_id())
    }

    // ========================================================================
    // Per-record operations
    // ========================================================================

    /// Index a record; a record that already has postings is diffed instead
    ///
    /// # Errors
    ///
    /// [`fuzzdex_core::Error::UnregisteredModel`] if the record's type was
    /// never registered.
    pub fn create(&self, record: &dyn Indexable) -> Result<IndexReport> {
        self.update(record)
    }

    /// Bring a record's postings in line with its current fields and priority
    pub fn update(&self, record: &dyn Indexable) -> Result<IndexReport> {
        let row_key = self.row_key(record)?;
        let ranks = collect_ranks(record, self.dictionary.config().max_word_length);
        let tokens: Vec<&String> = ranks.keys().collect();
        self.dictionary.find_or_create_ids(&tokens)?;

        let mut txn = self.store().begin();
        let ids = self.dictionary.ensure_ids(&mut txn, &tokens)?;
        let mut deltas = StatDeltas::default();
        let mut report = IndexReport {
            records: 1,
            ..IndexReport::default()
        };
        self.diff_row(
            &mut txn,
            row_key,
            &ranks,
            &ids,
            record.search_priority(),
            &mut deltas,
            &mut report,
        )?;
        self.apply_stats(&mut txn, &deltas)?;
        txn.commit();

        debug!(
            row = %row_key,
            inserted = report.inserted,
            updated = report.updated,
            deleted = report.deleted,
            "indexed record"
        );
        Ok(report)
    }

    /// Rewrite the priority of a record's postings without touching ranks
    ///
    /// A record without a priority of its own is left alone.
    pub fn update_priority(&self, record: &dyn Indexable) -> Result<IndexReport> {
        let row_key = self.row_key(record)?;
        let mut report = IndexReport {
            records: 1,
            ..IndexReport::default()
        };
        let Some(priority) = record.search_priority().map(normalize_priority) else {
            return Ok(report);
        };

        let mut txn = self.store().begin();
        let ids: Vec<_> = txn.entries_for_row(row_key).iter().map(|e| e.id).collect();
        for id in ids {
            if txn.update_entry(id, None, Some(priority))? {
                report.updated += 1;
            }
        }
        txn.commit();
        debug!(row = %row_key, updated = report.updated, "updated record priority");
        Ok(report)
    }

    /// Remove a record's postings and any word left without postings
    pub fn delete(&self, record: &dyn Indexable) -> Result<IndexReport> {
        let model_id = self.registry.model_id_of(record)?;
        self.delete_record(model_id, record.record_id())
    }

    /// Remove the postings of one record by id
    pub fn delete_record(&self, model_id: ModelId, record_id: u64) -> Result<IndexReport> {
        let row_key = RowKey::new(model_id, record_id)?;
        let mut txn = self.store().begin();
        let mut deltas = StatDeltas::default();
        let mut report = IndexReport {
            records: 1,
            ..IndexReport::default()
        };
        self.remove_row(&mut txn, row_key, &mut deltas, &mut report)?;
        self.apply_stats(&mut txn, &deltas)?;
        report.words_deleted = self.delete_orphans(&mut txn, &deltas)?;
        txn.commit();
        debug!(row = %row_key, deleted = report.deleted, "deleted record index");
        Ok(report)
    }

    // ========================================================================
    // Whole-model operations
    // ========================================================================

    /// Create and update the index of every record of a model, then remove
    /// postings of records the source no longer has
    ///
    /// Records are read in id batches of `batch_size`; each batch is one
    /// transaction. Must not run concurrently with other writes to the
    /// same model.
    pub fn sync_model(&self, model_id: ModelId) -> Result<IndexReport> {
        let source = self.registry.source(model_id)?;
        let indexed: BTreeSet<u64> = self
            .store()
            .read()
            .entries_for_model(model_id)
            .iter()
            .map(|e| e.record_id)
            .collect();
        let batch_size = self.dictionary.config().batch_size.max(1);

        let mut report = IndexReport::default();
        let mut decremented: BTreeSet<WordId> = BTreeSet::new();
        let mut after: Option<u64> = None;
        let mut batches = 0usize;
        loop {
            let records = source.scope_batch(after, batch_size);
            let from = after.map_or(0, |a| a.saturating_add(1));
            let last = records.iter().map(|r| r.record_id()).max();
            // the final (short) batch closes the range at the top
            let upto = if records.len() < batch_size {
                u64::MAX
            } else {
                last.unwrap_or(u64::MAX)
            };

            let mut rows: Vec<(RowKey, BTreeMap<String, i32>, Option<f64>)> =
                Vec::with_capacity(records.len());
            let mut present: FxHashSet<u64> = FxHashSet::default();
            for record in &records {
                present.insert(record.record_id());
                rows.push((
                    RowKey::new(model_id, record.record_id())?,
                    collect_ranks(&**record, self.dictionary.config().max_word_length),
                    record.search_priority(),
                ));
            }
            let tokens: Vec<&String> = {
                let mut set: BTreeSet<&String> = BTreeSet::new();
                for (_, ranks, _) in &rows {
                    set.extend(ranks.keys());
                }
                set.into_iter().collect()
            };
            self.dictionary.find_or_create_ids(&tokens)?;

            let mut txn = self.store().begin();
            let ids = self.dictionary.ensure_ids(&mut txn, &tokens)?;
            let mut deltas = StatDeltas::default();
            let mut batch = IndexReport::default();
            for (row_key, ranks, priority) in &rows {
                batch.records += 1;
                self.diff_row(&mut txn, *row_key, ranks, &ids, *priority, &mut deltas, &mut batch)?;
            }
            let vanished: Vec<u64> = if from <= upto {
                indexed
                    .range(from..=upto)
                    .filter(|id| !present.contains(*id))
                    .copied()
                    .collect()
            } else {
                Vec::new()
            };
            for record_id in vanished {
                let row_key = RowKey::new(model_id, record_id)?;
                self.remove_row(&mut txn, row_key, &mut deltas, &mut batch)?;
            }
            self.apply_stats(&mut txn, &deltas)?;
            txn.commit();

            decremented.extend(deltas.decremented.iter().copied());
            report += batch;
            batches += 1;
            info!(
                model_id = model_id.0,
                batch = batches,
                records = batch.records,
                writes = batch.writes(),
                "synced model batch"
            );

            if records.len() < batch_size {
                break;
            }
            after = last;
        }

        if !decremented.is_empty() {
            let ids: Vec<WordId> = decremented.into_iter().collect();
            let mut txn = self.store().begin();
            report.words_deleted = self.dictionary.delete_orphans(&mut txn, Some(&ids))?;
            txn.commit();
        }
        info!(
            model_id = model_id.0,
            records = report.records,
            inserted = report.inserted,
            updated = report.updated,
            deleted = report.deleted,
            words_deleted = report.words_deleted,
            "synced model index"
        );
        Ok(report)
    }

    /// Remove every posting of a model, `batch_size` records per transaction
    pub fn delete_model_index(&self, model_id: ModelId) -> Result<IndexReport> {
        let rows: Vec<RowKey> = {
            let view = self.store().read();
            let keys: BTreeSet<RowKey> = view
                .entries_for_model(model_id)
                .iter()
                .map(|e| e.row_key)
                .collect();
            keys.into_iter().collect()
        };

        let mut report = IndexReport::default();
        for chunk in rows.chunks(self.dictionary.config().batch_size.max(1)) {
            let mut txn = self.store().begin();
            let mut deltas = StatDeltas::default();
            let mut batch = IndexReport::default();
            for row_key in chunk {
                batch.records += 1;
                self.remove_row(&mut txn, *row_key, &mut deltas, &mut batch)?;
            }
            self.apply_stats(&mut txn, &deltas)?;
            batch.words_deleted = self.delete_orphans(&mut txn, &deltas)?;
            txn.commit();
            report += batch;
        }
        info!(
            model_id = model_id.0,
            records = report.records,
            deleted = report.deleted,
            words_deleted = report.words_deleted,
            "deleted model index"
        );
        Ok(report)
    }

    // ========================================================================
    // Maintenance
    // ========================================================================

    /// Recount every word, recompute every rank cutoff, delete orphans
    pub fn maintain(&self) -> Result<MaintenanceReport> {
        let ids = self.store().read().word_ids();
        let mut report = MaintenanceReport::default();
        for chunk in ids.chunks(self.dictionary.config().batch_size.max(1)) {
            let mut txn = self.store().begin();
            report.counts_fixed += self.dictionary.update_counts(&mut txn, chunk)?;
            report.cutoffs_changed += self.dictionary.update_ranks(&mut txn, chunk)?;
            txn.commit();
        }
        let mut txn = self.store().begin();
        report.orphans_deleted = self.dictionary.delete_orphans(&mut txn, None)?;
        txn.commit();
        info!(
            counts_fixed = report.counts_fixed,
            cutoffs_changed = report.cutoffs_changed,
            orphans_deleted = report.orphans_deleted,
            "maintenance pass finished"
        );
        Ok(report)
    }

    // ========================================================================
    // Internals
    // ========================================================================

    #[allow(clippy::too_many_arguments)]
    fn diff_row(
        &self,
        txn: &mut WriteTxn<'_>,
        row_key: RowKey,
        ranks: &BTreeMap<String, i32>,
        ids: &FxHashMap<String, WordId>,
        priority: Option<f64>,
        deltas: &mut StatDeltas,
        report: &mut IndexReport,
    ) -> Result<()> {
        let existing: Vec<EntryRow> = txn.entries_for_row(row_key).into_iter().cloned().collect();
        let priority = match priority {
            Some(p) => normalize_priority(p),
            None => existing
                .first()
                .map_or(DEFAULT_ROW_PRIORITY, |e| e.row_priority),
        };

        let mut desired: FxHashMap<WordId, i32> = FxHashMap::default();
        for (token, rank) in ranks {
            if let Some(id) = ids.get(token) {
                desired.insert(*id, *rank);
            }
        }

        let mut stored: FxHashSet<WordId> = FxHashSet::default();
        for entry in &existing {
            stored.insert(entry.word_id);
            match desired.get(&entry.word_id) {
                Some(rank) => {
                    let new_rank = (entry.rank != *rank).then_some(*rank);
                    let new_priority = (entry.row_priority != priority).then_some(priority);
                    if new_rank.is_none() && new_priority.is_none() {
                        continue;
                    }
                    txn.update_entry(entry.id, new_rank, new_priority)?;
                    if new_rank.is_some() {
                        deltas.reranked.insert(entry.word_id);
                    }
                    report.updated += 1;
                }
                None => {
                    txn.delete_entry(entry.id)?;
                    deltas.remove(entry.word_id);
                    report.deleted += 1;
                }
            }
        }

        let mut fresh: Vec<(WordId, i32)> = desired
            .into_iter()
            .filter(|(id, _)| !stored.contains(id))
            .collect();
        fresh.sort_unstable();
        for (word_id, rank) in fresh {
            txn.insert_entry(NewEntry {
                word_id,
                row_key,
                rank,
                row_priority: priority,
            })?;
            deltas.add(word_id);
            report.inserted += 1;
        }
        Ok(())
    }

    fn remove_row(
        &self,
        txn: &mut WriteTxn<'_>,
        row_key: RowKey,
        deltas: &mut StatDeltas,
        report: &mut IndexReport,
    ) -> Result<()> {
        let existing: Vec<(_, WordId)> = txn
            .entries_for_row(row_key)
            .iter()
            .map(|e| (e.id, e.word_id))
            .collect();
        for (id, word_id) in existing {
            txn.delete_entry(id)?;
            deltas.remove(word_id);
            report.deleted += 1;
        }
        Ok(())
    }

    fn apply_stats(&self, txn: &mut WriteTxn<'_>, deltas: &StatDeltas) -> Result<()> {
        self.dictionary.adjust_counts(txn, &deltas.counts)?;
        if self.dictionary.config().refresh_cutoffs_on_write {
            self.dictionary.update_ranks(txn, &deltas.touched())?;
        }
        Ok(())
    }

    fn delete_orphans(&self, txn: &mut WriteTxn<'_>, deltas: &StatDeltas) -> Result<usize> {
        if deltas.decremented.is_empty() {
            return Ok(0);
        }
        let ids: Vec<WordId> = deltas.decremented.iter().copied().collect();
        self.dictionary.delete_orphans(txn, Some(&ids))
    }
}
