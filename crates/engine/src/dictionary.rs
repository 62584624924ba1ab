//! Word dictionary
//!
//! Owns the `words` table semantics: find-or-create of tokens with their
//! matcher keys, posting counts, rank cutoffs and orphan cleanup.
//!
//! # Word creation
//!
//! New words are created optimistically in their own short write
//! transaction: look up what exists under a read view, compute keys for the
//! misses without holding any lock, then insert under the unique `word`
//! index. If another writer created one of the words in between, the whole
//! attempt is rolled back and retried through the collision retrier.
//!
//! # Statistics
//!
//! Count and cutoff maintenance works inside a caller's [`WriteTxn`], so
//! postings and statistics commit or roll back together.

use crate::matcher::Matcher;
use fuzzdex_concurrency::{retry_on_collision, Attempt, RetryPolicy};
use fuzzdex_core::config::SearchConfig;
use fuzzdex_core::error::{Error, Result};
use fuzzdex_core::match_type::MatchType;
use fuzzdex_core::types::{MatcherKeys, NewWord, WordId};
use fuzzdex_storage::{IndexStore, InsertOutcome, WriteTxn};
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Rank cutoff for a word with `count` postings whose ranks, highest first,
/// are `ranks_desc`.
///
/// Words with at most `rank_reduction_factor` postings get 0 (no cutoff).
/// Others get the rank found at offset `rank_reduction_factor` (0 past the
/// end), capped at `min_rank_reduction`.
pub fn rank_limit_for(
    ranks_desc: &[i32],
    count: u64,
    rank_reduction_factor: u64,
    min_rank_reduction: i32,
) -> i32 {
    if count <= rank_reduction_factor {
        return 0;
    }
    let at_offset = usize::try_from(rank_reduction_factor)
        .ok()
        .and_then(|offset| ranks_desc.get(offset))
        .copied()
        .unwrap_or(0);
    at_offset.min(min_rank_reduction)
}

/// Dictionary operations over a shared store
#[derive(Debug, Clone)]
pub struct Dictionary {
    store: Arc<IndexStore>,
    config: Arc<SearchConfig>,
    policy: RetryPolicy,
    key_matchers: Vec<Matcher>,
}

impl Dictionary {
    /// Dictionary over `store` using the index-time strategies of `config`
    pub fn new(store: Arc<IndexStore>, config: Arc<SearchConfig>) -> Self {
        let policy = RetryPolicy::from(&config.collision);
        let key_matchers = config
            .index_match_types
            .iter()
            .map(|t| Matcher::from_config(*t, &config))
            .collect();
        Dictionary {
            store,
            config,
            policy,
            key_matchers,
        }
    }

    /// Replace the collision retry policy
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn store(&self) -> &Arc<IndexStore> {
        &self.store
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Matcher keys a new word would be stored with
    pub fn compute_keys(&self, word: &str) -> MatcherKeys {
        let mut keys = MatcherKeys::default();
        for matcher in &self.key_matchers {
            matcher.fill_keys(word, &mut keys);
        }
        keys
    }

    // ========================================================================
    // Find or create
    // ========================================================================

    /// Ids of `tokens`, creating the missing words
    ///
    /// # Errors
    ///
    /// [`fuzzdex_core::Error::TooManyCollisions`] when concurrent creators
    /// keep winning the race past the retry budget.
    pub fn find_or_create_ids<S: AsRef<str>>(
        &self,
        tokens: &[S],
    ) -> Result<FxHashMap<String, WordId>> {
        retry_on_collision(&self.policy, |_| self.try_find_or_create(tokens))
    }

    fn try_find_or_create<S: AsRef<str>>(
        &self,
        tokens: &[S],
    ) -> Result<Attempt<FxHashMap<String, WordId>>> {
        let (ids, new_words) = self.plan_missing(tokens);
        if new_words.is_empty() {
            return Ok(Attempt::Done(ids));
        }
        Ok(self.insert_missing(self.store.begin(), ids, new_words))
    }

    /// Ids already in the dictionary plus the rows still to create, keys
    /// computed, with no lock held afterwards
    fn plan_missing<S: AsRef<str>>(
        &self,
        tokens: &[S],
    ) -> (FxHashMap<String, WordId>, Vec<NewWord>) {
        let ids = self.store.read().word_ids_for(tokens);
        let mut missing: Vec<&str> = Vec::new();
        for token in tokens {
            let token = token.as_ref();
            if !ids.contains_key(token) && !missing.contains(&token) {
                missing.push(token);
            }
        }
        let new_words = missing
            .into_iter()
            .map(|word| NewWord {
                word: word.to_string(),
                keys: self.compute_keys(word),
            })
            .collect();
        (ids, new_words)
    }

    /// Insert `new_words` in `txn` and commit, or roll everything back on
    /// the first word another writer created since the lookup
    fn insert_missing(
        &self,
        mut txn: WriteTxn<'_>,
        mut ids: FxHashMap<String, WordId>,
        new_words: Vec<NewWord>,
    ) -> Attempt<FxHashMap<String, WordId>> {
        for new in new_words {
            let word = new.word.clone();
            match txn.insert_word(new) {
                InsertOutcome::Inserted(id) => {
                    ids.insert(word, id);
                }
                InsertOutcome::Duplicate(word) => {
                    txn.rollback();
                    return Attempt::Collision(word);
                }
            }
        }
        let created = txn.commit();
        debug!(created, "created dictionary words");
        Attempt::Done(ids)
    }

    /// Ids of `tokens` as seen by `txn`, inserting any word that is missing
    ///
    /// Used inside a record transaction after [`Self::find_or_create_ids`]:
    /// a concurrent orphan cleanup may have removed a freshly created word
    /// before its first posting landed. The transaction holds the store
    /// exclusively, so inserts here cannot collide.
    pub fn ensure_ids<S: AsRef<str>>(
        &self,
        txn: &mut WriteTxn<'_>,
        tokens: &[S],
    ) -> Result<FxHashMap<String, WordId>> {
        let mut ids = txn.word_ids_for(tokens);
        for token in tokens {
            let token = token.as_ref();
            if ids.contains_key(token) {
                continue;
            }
            let new = NewWord {
                word: token.to_string(),
                keys: self.compute_keys(token),
            };
            match txn.insert_word(new) {
                InsertOutcome::Inserted(id) => {
                    ids.insert(token.to_string(), id);
                }
                InsertOutcome::Duplicate(word) => {
                    return Err(Error::StorageError(format!(
                        "word '{}' appeared inside an exclusive transaction",
                        word
                    )));
                }
            }
        }
        Ok(ids)
    }

    // ========================================================================
    // Posting counts
    // ========================================================================

    /// Add `amount` to the posting count of each word
    pub fn increment(&self, txn: &mut WriteTxn<'_>, ids: &[WordId], amount: u64) -> Result<()> {
        let delta = i64::try_from(amount).unwrap_or(i64::MAX);
        for id in ids {
            txn.adjust_entries_count(*id, delta)?;
        }
        Ok(())
    }

    /// Subtract `amount` from the posting count of each word, stopping at zero
    pub fn decrement(&self, txn: &mut WriteTxn<'_>, ids: &[WordId], amount: u64) -> Result<()> {
        let delta = i64::try_from(amount).map(|d| -d).unwrap_or(i64::MIN);
        for id in ids {
            txn.adjust_entries_count(*id, delta)?;
        }
        Ok(())
    }

    /// Apply grouped count changes (word -> signed delta)
    pub fn adjust_counts(&self, txn: &mut WriteTxn<'_>, deltas: &BTreeMap<WordId, i64>) -> Result<()> {
        for (id, delta) in deltas {
            if *delta != 0 {
                txn.adjust_entries_count(*id, *delta)?;
            }
        }
        Ok(())
    }

    /// Recount postings of each word exactly; returns how many counts changed
    pub fn update_counts(&self, txn: &mut WriteTxn<'_>, ids: &[WordId]) -> Result<usize> {
        let mut changed = 0;
        for id in ids {
            if txn.word(*id).is_none() {
                continue;
            }
            let live = txn.live_entry_count(*id);
            if txn.set_entries_count(*id, live)? {
                changed += 1;
            }
        }
        Ok(changed)
    }

    // ========================================================================
    // Rank cutoffs
    // ========================================================================

    /// Recompute the rank cutoff of each word; returns how many changed
    pub fn update_ranks(&self, txn: &mut WriteTxn<'_>, ids: &[WordId]) -> Result<usize> {
        let mut changed = 0;
        for id in ids {
            let Some(count) = txn.word(*id).map(|w| w.entries_count) else {
                continue;
            };
            let limit = if count > self.config.rank_reduction_factor {
                rank_limit_for(
                    &txn.ranks_desc(*id),
                    count,
                    self.config.rank_reduction_factor,
                    self.config.min_rank_reduction,
                )
            } else {
                0
            };
            if txn.set_rank_limit(*id, limit)? {
                changed += 1;
            }
        }
        Ok(changed)
    }

    // ========================================================================
    // Orphans
    // ========================================================================

    /// Delete words without postings, among `ids` or across the whole
    /// dictionary; returns how many were deleted
    pub fn delete_orphans(&self, txn: &mut WriteTxn<'_>, ids: Option<&[WordId]>) -> Result<usize> {
        let orphans: Vec<WordId> = match ids {
            Some(ids) => ids
                .iter()
                .copied()
                .filter(|id| txn.word(*id).is_some() && txn.live_entry_count(*id) == 0)
                .collect(),
            None => txn.orphan_word_ids(),
        };
        for id in &orphans {
            txn.delete_word(*id)?;
        }
        if !orphans.is_empty() {
            debug!(deleted = orphans.len(), "deleted orphan words");
        }
        Ok(orphans.len())
    }

    // ========================================================================
    // Key rebuild
    // ========================================================================

    /// Recompute one strategy's key columns for every word, in id batches of
    /// `batch_size`; returns how many words changed.
    ///
    /// Strategies outside `index_match_types` are rebuilt too, so a newly
    /// enabled strategy can be backfilled before it is added to the config.
    pub fn rebuild_matcher_keys(&self, match_type: MatchType) -> Result<usize> {
        let matcher = Matcher::from_config(match_type, &self.config);
        if match_type.index_columns().is_empty() {
            return Ok(0);
        }
        let ids = self.store.read().word_ids();
        let mut changed = 0;
        for batch in ids.chunks(self.config.batch_size.max(1)) {
            let mut txn = self.store.begin();
            for id in batch {
                let Some(row) = txn.word(*id).cloned() else {
                    continue;
                };
                let mut keys = row.keys.clone();
                matcher.fill_keys(&row.word, &mut keys);
                if txn.set_word_keys(*id, keys)? {
                    changed += 1;
                }
            }
            txn.commit();
        }
        info!(match_type = %match_type, changed, "rebuilt matcher keys");
        Ok(changed)
    }
}
