//! `SearchIndex`: the public face of the engine
//!
//! Owns the table store, the configuration and the model registry, and
//! wires the dictionary, matchers, posting queries and index maintainer
//! together.
//!
//! # Indexing switch
//!
//! Per-record writes (`create_search_index`, `update_search_index`,
//! `update_search_priority`, `delete_search_index`) can be switched off,
//! for bulk imports that sync whole models afterwards. While off they are
//! no-ops returning an empty report. Queries and whole-model operations are
//! not affected.

use crate::dictionary::Dictionary;
use crate::indexer::{IndexMaintainer, IndexReport, MaintenanceReport};
use crate::matcher::{Matcher, MatcherExplanation, ResultList};
use crate::postings::{self, SearchHit, SearchPage};
use crate::registry::ModelRegistry;
use crate::search::Query;
use fuzzdex_core::config::SearchConfig;
use fuzzdex_core::error::Result;
use fuzzdex_core::match_type::MatchType;
use fuzzdex_core::record::{Indexable, RecordSource};
use fuzzdex_core::types::ModelId;
use fuzzdex_storage::{IndexStore, StoreStats};
use serde::Serialize;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// What every configured strategy does with a query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Explanation {
    /// Normalized query terms
    pub terms: Vec<String>,
    /// One entry per performed strategy, in configured order
    pub matchers: Vec<MatcherExplanation>,
}

/// Full-text and fuzzy search over registered record types
#[derive(Debug)]
pub struct SearchIndex {
    store: Arc<IndexStore>,
    config: Arc<SearchConfig>,
    registry: Arc<ModelRegistry>,
    matchers: Vec<Matcher>,
    maintainer: IndexMaintainer,
    indexing: AtomicBool,
}

impl SearchIndex {
    /// Index over a fresh, empty store
    ///
    /// # Errors
    ///
    /// [`fuzzdex_core::Error::InvalidConfig`] if `config` does not validate.
    pub fn new(config: SearchConfig) -> Result<Self> {
        Self::with_store(Arc::new(IndexStore::new()), config)
    }

    /// Index over an existing store
    pub fn with_store(store: Arc<IndexStore>, config: SearchConfig) -> Result<Self> {
        config.validate()?;
        let config = Arc::new(config);
        let registry = Arc::new(ModelRegistry::new());
        let dictionary = Dictionary::new(Arc::clone(&store), Arc::clone(&config));
        let maintainer = IndexMaintainer::new(dictionary, Arc::clone(&registry));
        info!(
            perform = ?config.perform_match_types,
            index = ?config.index_match_types,
            "search index ready"
        );
        Ok(SearchIndex {
            matchers: Matcher::performed(&config),
            store,
            config,
            registry,
            maintainer,
            indexing: AtomicBool::new(true),
        })
    }

    /// Index configured from a TOML file
    pub fn from_config_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::new(SearchConfig::from_file(path)?)
    }

    /// Register a record type under `model_id`
    pub fn register_model(&self, model_id: ModelId, source: Arc<dyn RecordSource>) -> Result<()> {
        self.registry.register(model_id, source)
    }

    pub fn store(&self) -> &Arc<IndexStore> {
        &self.store
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<ModelRegistry> {
        &self.registry
    }

    pub fn dictionary(&self) -> &Dictionary {
        self.maintainer.dictionary()
    }

    /// Row counts and commit version of the store
    pub fn stats(&self) -> StoreStats {
        self.store.stats()
    }

    // ========================================================================
    // Indexing switch
    // ========================================================================

    /// Turn per-record indexing on or off
    pub fn set_indexing_enabled(&self, enabled: bool) {
        self.indexing.store(enabled, Ordering::Release);
        debug!(enabled, "indexing switch changed");
    }

    /// Whether per-record writes currently do anything
    pub fn is_indexing_enabled(&self) -> bool {
        self.indexing.load(Ordering::Acquire)
    }

    /// Run `f` with per-record indexing off, restoring the previous state
    /// afterwards (also on panic)
    pub fn without_indexing<T>(&self, f: impl FnOnce() -> T) -> T {
        struct Restore<'a>(&'a AtomicBool, bool);
        impl Drop for Restore<'_> {
            fn drop(&mut self) {
                self.0.store(self.1, Ordering::Release);
            }
        }
        let _restore = Restore(&self.indexing, self.indexing.swap(false, Ordering::AcqRel));
        f()
    }

    // ========================================================================
    // Per-record maintenance
    // ========================================================================

    /// Index a new record
    pub fn create_search_index(&self, record: &dyn Indexable) -> Result<IndexReport> {
        if !self.is_indexing_enabled() {
            return Ok(IndexReport::default());
        }
        self.maintainer.create(record)
    }

    /// Re-index a changed record; writes nothing when nothing changed
    pub fn update_search_index(&self, record: &dyn Indexable) -> Result<IndexReport> {
        if !self.is_indexing_enabled() {
            return Ok(IndexReport::default());
        }
        self.maintainer.update(record)
    }

    /// Refresh only the record's priority
    pub fn update_search_priority(&self, record: &dyn Indexable) -> Result<IndexReport> {
        if !self.is_indexing_enabled() {
            return Ok(IndexReport::default());
        }
        self.maintainer.update_priority(record)
    }

    /// Remove a record from the index
    pub fn delete_search_index(&self, record: &dyn Indexable) -> Result<IndexReport> {
        if !self.is_indexing_enabled() {
            return Ok(IndexReport::default());
        }
        self.maintainer.delete(record)
    }

    // ========================================================================
    // Whole-model and maintenance operations
    // ========================================================================

    /// Create and update every record of a model and drop vanished ones
    pub fn sync_model(&self, model_id: ModelId) -> Result<IndexReport> {
        self.maintainer.sync_model(model_id)
    }

    /// Remove every posting of a model
    pub fn delete_model_index(&self, model_id: ModelId) -> Result<IndexReport> {
        self.maintainer.delete_model_index(model_id)
    }

    /// Exact recount, cutoff recomputation and orphan cleanup
    pub fn maintain(&self) -> Result<MaintenanceReport> {
        self.maintainer.maintain()
    }

    /// Recompute one strategy's key columns for every word
    pub fn rebuild_matcher_keys(&self, match_type: MatchType) -> Result<usize> {
        self.dictionary().rebuild_matcher_keys(match_type)
    }

    /// Drop every word and posting
    pub fn truncate(&self) {
        let mut txn = self.store.begin();
        txn.truncate();
        txn.commit();
        info!("search index truncated");
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Normalized terms of raw query text
    pub fn query(&self, text: &str) -> Query {
        Query::parse(text, self.config.max_word_length)
    }

    fn result_list(&self, view: &fuzzdex_storage::Tables, query: &Query) -> ResultList {
        ResultList::build(view, &self.matchers, query.terms())
    }

    /// One page of ranked hits; `page_number` is 1-based
    pub fn find_results(&self, text: &str, page_size: usize, page_number: usize) -> Vec<SearchHit> {
        let query = self.query(text);
        if query.is_empty() {
            return Vec::new();
        }
        let view = self.store.read();
        let list = self.result_list(&view, &query);
        postings::find_results(&view, &list, page_size, page_number)
    }

    /// Number of matching records
    pub fn count_results(&self, text: &str) -> usize {
        let query = self.query(text);
        if query.is_empty() {
            return 0;
        }
        let view = self.store.read();
        let list = self.result_list(&view, &query);
        postings::count_results(&view, &list)
    }

    /// One page of hits plus the total, matching only once
    pub fn search(&self, text: &str, page_size: usize, page_number: usize) -> SearchPage {
        let query = self.query(text);
        if query.is_empty() {
            return SearchPage::default();
        }
        let view = self.store.read();
        let list = self.result_list(&view, &query);
        let page = postings::search_page(&view, &list, page_size, page_number);
        debug!(
            terms = query.len(),
            matched_words = list.word_ids().len(),
            total = page.total,
            "search"
        );
        page
    }

    /// Per-strategy view of what a query matches
    pub fn explain(&self, text: &str) -> Explanation {
        let query = self.query(text);
        let view = self.store.read();
        Explanation {
            terms: query.terms().to_vec(),
            matchers: self
                .matchers
                .iter()
                .map(|m| m.explain(&view, query.terms()))
                .collect(),
        }
    }

    /// Load the records behind `hits`, in hit order, skipping records that
    /// no longer exist
    ///
    /// # Errors
    ///
    /// [`fuzzdex_core::Error::UnknownModelId`] for a hit whose model is not
    /// registered.
    pub fn models(&self, hits: &[SearchHit]) -> Result<Vec<Arc<dyn Indexable>>> {
        let mut records = Vec::with_capacity(hits.len());
        for hit in hits {
            if let Some(record) = self.registry.load(hit.model_id, hit.record_id)? {
                records.push(record);
            }
        }
        Ok(records)
    }
}
