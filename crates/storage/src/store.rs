//! Transactional table store
//!
//! `IndexStore` wraps [`Tables`] in a `parking_lot::RwLock`. Readers take a
//! shared guard; a [`WriteTxn`] holds the exclusive guard for its whole
//! lifetime and keeps an undo log, so a transaction dropped without
//! [`WriteTxn::commit`] (for example because an error was propagated with `?`)
//! leaves the tables exactly as they were.
//!
//! # Versioning
//!
//! The store keeps a commit version that advances once per committed
//! transaction that changed at least one row. Transactions that end up
//! writing nothing do not move it, which makes "this operation wrote nothing"
//! directly observable.
//!
//! # Scope
//!
//! The store lives in process memory only. Nothing is written to disk, so an
//! index is rebuilt after a restart (`SearchIndex::sync_model` per model), and
//! concurrent writers must be threads sharing one `Arc<IndexStore>`, not
//! separate processes. Separate stores never see each other's rows.

use crate::tables::Tables;
use fuzzdex_core::error::{Error, Result};
use fuzzdex_core::types::{
    EntryId, EntryRow, MatcherKeys, NewEntry, NewWord, WordId, WordRow,
};
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::ops::Deref;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::trace;

/// Shared read view of the tables
pub type ReadView<'a> = RwLockReadGuard<'a, Tables>;

/// Result of inserting a word under the unique `word` index
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    /// Row created with this id
    Inserted(WordId),
    /// Another row already holds this word
    Duplicate(String),
}

/// Row counts and version of a store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreStats {
    /// Dictionary words
    pub words: usize,
    /// Postings
    pub entries: usize,
    /// Commit version
    pub version: u64,
}

/// Thread-safe owner of the index tables
pub struct IndexStore {
    tables: RwLock<Tables>,
    version: AtomicU64,
}

impl IndexStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::new()),
            version: AtomicU64::new(0),
        }
    }

    /// Current commit version
    #[inline]
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }

    /// Take a shared read view
    ///
    /// Must not be held while beginning a write transaction on the same
    /// thread.
    pub fn read(&self) -> ReadView<'_> {
        self.tables.read()
    }

    /// Begin a write transaction
    pub fn begin(&self) -> WriteTxn<'_> {
        let guard = self.tables.write();
        let sequences = (guard.next_word_id, guard.next_entry_id);
        WriteTxn {
            guard,
            version: &self.version,
            undo: Vec::new(),
            sequences,
            committed: false,
        }
    }

    /// Run `f` in a write transaction; commit on `Ok`, roll back on `Err`
    pub fn transaction<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut WriteTxn<'_>) -> Result<T>,
    {
        let mut txn = self.begin();
        let value = f(&mut txn)?;
        txn.commit();
        Ok(value)
    }

    /// Row counts and version
    pub fn stats(&self) -> StoreStats {
        let tables = self.read();
        StoreStats {
            words: tables.word_count(),
            entries: tables.entry_count(),
            version: self.version(),
        }
    }
}

impl Default for IndexStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for IndexStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let stats = self.stats();
        f.debug_struct("IndexStore")
            .field("words", &stats.words)
            .field("entries", &stats.entries)
            .field("version", &stats.version)
            .finish()
    }
}

// ============================================================================
// Write transaction
// ============================================================================

#[derive(Debug)]
enum Undo {
    WordInserted(WordId),
    WordChanged(WordRow),
    WordDeleted(WordRow),
    EntryInserted(EntryId),
    EntryChanged(EntryRow),
    EntryDeleted(EntryRow),
    Truncated(Box<Tables>),
}

/// Exclusive, undo-logged write transaction
///
/// Dereferences to [`Tables`] so reads inside the transaction see its own
/// writes.
pub struct WriteTxn<'a> {
    guard: RwLockWriteGuard<'a, Tables>,
    version: &'a AtomicU64,
    undo: Vec<Undo>,
    sequences: (u64, u64),
    committed: bool,
}

impl<'a> WriteTxn<'a> {
    /// Number of row writes made so far
    pub fn writes(&self) -> usize {
        self.undo.len()
    }

    /// Make the writes permanent; returns the number of row writes
    pub fn commit(mut self) -> usize {
        let writes = self.undo.len();
        if writes > 0 {
            let version = self.version.fetch_add(1, Ordering::AcqRel) + 1;
            trace!(writes, version, "committed write transaction");
        }
        self.undo.clear();
        self.committed = true;
        writes
    }

    /// Undo every write and release the lock
    pub fn rollback(self) {
        // Drop performs the rollback.
    }

    fn undo_all(&mut self) {
        let tables = &mut *self.guard;
        while let Some(op) = self.undo.pop() {
            match op {
                Undo::WordInserted(id) => {
                    tables.remove_word(id);
                }
                Undo::WordChanged(row) | Undo::WordDeleted(row) => {
                    tables.put_word(row);
                }
                Undo::EntryInserted(id) => {
                    tables.remove_entry(id);
                }
                Undo::EntryChanged(row) | Undo::EntryDeleted(row) => {
                    tables.put_entry(row);
                }
                Undo::Truncated(previous) => {
                    *tables = *previous;
                }
            }
        }
        tables.next_word_id = self.sequences.0;
        tables.next_entry_id = self.sequences.1;
    }

    fn word_row(&self, id: WordId) -> Result<WordRow> {
        self.guard
            .word(id)
            .cloned()
            .ok_or(Error::WordNotFound(id))
    }

    fn replace_word(&mut self, row: WordRow) {
        if let Some(old) = self.guard.put_word(row) {
            self.undo.push(Undo::WordChanged(old));
        }
    }

    fn replace_entry(&mut self, row: EntryRow) {
        if let Some(old) = self.guard.put_entry(row) {
            self.undo.push(Undo::EntryChanged(old));
        }
    }

    // ========================================================================
    // Words
    // ========================================================================

    /// Insert a word unless its text is already taken
    pub fn insert_word(&mut self, new: NewWord) -> InsertOutcome {
        if self.guard.word_by_text(&new.word).is_some() {
            return InsertOutcome::Duplicate(new.word);
        }
        let id = WordId(self.guard.next_word_id);
        self.guard.next_word_id += 1;
        self.guard.put_word(WordRow {
            id,
            word: new.word,
            entries_count: 0,
            rank_limit: 0,
            keys: new.keys,
        });
        self.undo.push(Undo::WordInserted(id));
        InsertOutcome::Inserted(id)
    }

    /// Overwrite a word's matcher keys; returns whether anything changed
    pub fn set_word_keys(&mut self, id: WordId, keys: MatcherKeys) -> Result<bool> {
        let mut row = self.word_row(id)?;
        if row.keys == keys {
            return Ok(false);
        }
        row.keys = keys;
        self.replace_word(row);
        Ok(true)
    }

    /// Add `delta` to a word's posting count, saturating at zero
    pub fn adjust_entries_count(&mut self, id: WordId, delta: i64) -> Result<u64> {
        let mut row = self.word_row(id)?;
        let count = if delta >= 0 {
            row.entries_count.saturating_add(delta.unsigned_abs())
        } else {
            row.entries_count.saturating_sub(delta.unsigned_abs())
        };
        if count != row.entries_count {
            row.entries_count = count;
            self.replace_word(row);
        }
        Ok(count)
    }

    /// Set a word's posting count; returns whether it changed
    pub fn set_entries_count(&mut self, id: WordId, count: u64) -> Result<bool> {
        let mut row = self.word_row(id)?;
        if row.entries_count == count {
            return Ok(false);
        }
        row.entries_count = count;
        self.replace_word(row);
        Ok(true)
    }

    /// Set a word's rank cutoff; returns whether it changed
    pub fn set_rank_limit(&mut self, id: WordId, rank_limit: i32) -> Result<bool> {
        let mut row = self.word_row(id)?;
        if row.rank_limit == rank_limit {
            return Ok(false);
        }
        row.rank_limit = rank_limit;
        self.replace_word(row);
        Ok(true)
    }

    /// Delete a word; resets the word id sequence once the table is empty
    pub fn delete_word(&mut self, id: WordId) -> Result<WordRow> {
        let row = self.guard.remove_word(id).ok_or(Error::WordNotFound(id))?;
        self.undo.push(Undo::WordDeleted(row.clone()));
        if self.guard.word_count() == 0 {
            self.guard.next_word_id = 1;
        }
        Ok(row)
    }

    // ========================================================================
    // Entries
    // ========================================================================

    /// Insert a posting
    ///
    /// # Errors
    ///
    /// [`Error::WordNotFound`] if the word does not exist, and
    /// [`Error::StorageError`] if the record already has a posting for it.
    pub fn insert_entry(&mut self, new: NewEntry) -> Result<EntryId> {
        if self.guard.word(new.word_id).is_none() {
            return Err(Error::WordNotFound(new.word_id));
        }
        let duplicate = self
            .guard
            .entries_for_row(new.row_key)
            .iter()
            .any(|e| e.word_id == new.word_id);
        if duplicate {
            return Err(Error::StorageError(format!(
                "row {} already has a posting for {}",
                new.row_key, new.word_id
            )));
        }
        let id = EntryId(self.guard.next_entry_id);
        self.guard.next_entry_id += 1;
        self.guard.put_entry(EntryRow {
            id,
            word_id: new.word_id,
            row_key: new.row_key,
            model_id: new.row_key.model_id(),
            record_id: new.row_key.record_id(),
            rank: new.rank,
            row_priority: new.row_priority,
        });
        self.undo.push(Undo::EntryInserted(id));
        Ok(id)
    }

    /// Change a posting's rank and/or priority; returns whether anything changed
    pub fn update_entry(
        &mut self,
        id: EntryId,
        rank: Option<i32>,
        row_priority: Option<f64>,
    ) -> Result<bool> {
        let mut row = self
            .guard
            .entry(id)
            .cloned()
            .ok_or(Error::EntryNotFound(id))?;
        let mut changed = false;
        if let Some(rank) = rank {
            if row.rank != rank {
                row.rank = rank;
                changed = true;
            }
        }
        if let Some(priority) = row_priority {
            if row.row_priority != priority {
                row.row_priority = priority;
                changed = true;
            }
        }
        if changed {
            self.replace_entry(row);
        }
        Ok(changed)
    }

    /// Delete a posting; resets the entry id sequence once the table is empty
    pub fn delete_entry(&mut self, id: EntryId) -> Result<EntryRow> {
        let row = self.guard.remove_entry(id).ok_or(Error::EntryNotFound(id))?;
        self.undo.push(Undo::EntryDeleted(row.clone()));
        if self.guard.entry_count() == 0 {
            self.guard.next_entry_id = 1;
        }
        Ok(row)
    }

    /// Remove every row of both tables and reset the id sequences
    pub fn truncate(&mut self) {
        let previous = std::mem::replace(&mut *self.guard, Tables::new());
        self.undo.push(Undo::Truncated(Box::new(previous)));
    }
}

impl Deref for WriteTxn<'_> {
    type Target = Tables;

    fn deref(&self) -> &Tables {
        &self.guard
    }
}

impl Drop for WriteTxn<'_> {
    fn drop(&mut self) {
        if !self.committed {
            let writes = self.undo.len();
            self.undo_all();
            if writes > 0 {
                trace!(writes, "rolled back write transaction");
            }
        }
    }
}

impl std::fmt::Debug for WriteTxn<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WriteTxn")
            .field("writes", &self.undo.len())
            .field("committed", &self.committed)
            .finish()
    }
}
