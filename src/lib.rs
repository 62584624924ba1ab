//! fuzzdex: full-text and fuzzy search over application records
//!
//! Records of any type take part by implementing [`Indexable`] and
//! registering a [`RecordSource`] under a [`ModelId`]. The [`SearchIndex`]
//! keeps an inverted index of their weighted fields and answers ranked,
//! paginated queries through a configurable chain of matcher strategies
//! (exact, leet, stem, metaphone, double metaphone, soundex, prefix,
//! initials).
//!
//! # Example
//!
//! ```
//! use fuzzdex::{IndexField, Indexable, ModelId, RecordSource, SearchConfig, SearchIndex};
//! use std::sync::Arc;
//!
//! struct Book { id: u64, title: String }
//!
//! impl Indexable for Book {
//!     fn type_name(&self) -> &str { "Book" }
//!     fn record_id(&self) -> u64 { self.id }
//!     fn search_index_info(&self) -> Vec<IndexField> {
//!         vec![IndexField::new(self.title.clone(), 10)]
//!     }
//! }
//!
//! struct Books;
//!
//! impl RecordSource for Books {
//!     fn type_name(&self) -> &str { "Book" }
//!     fn load(&self, _id: u64) -> Option<Arc<dyn Indexable>> { None }
//!     fn scope_batch(&self, _after: Option<u64>, _limit: usize) -> Vec<Arc<dyn Indexable>> {
//!         Vec::new()
//!     }
//! }
//!
//! let index = SearchIndex::new(SearchConfig::default()).unwrap();
//! index.register_model(ModelId(1), Arc::new(Books)).unwrap();
//! index
//!     .create_search_index(&Book { id: 7, title: "The Hobbit".into() })
//!     .unwrap();
//!
//! let hits = index.find_results("hobbits", 10, 1);
//! assert_eq!(hits[0].record_id, 7);
//! ```

// ============================================================================
// Configuration and errors
// ============================================================================

pub use fuzzdex_core::config::{CollisionConfig, SearchConfig};
pub use fuzzdex_core::error::{Error, Result};
pub use fuzzdex_core::match_type::{MatchType, MatcherOverride, MatcherOverrides, MatcherTuning};

// ============================================================================
// Host record contract
// ============================================================================

pub use fuzzdex_core::record::{IndexField, IndexText, Indexable, RecordSource};
pub use fuzzdex_core::types::{ModelId, RowKey, WordId, DEFAULT_ROW_PRIORITY};

// ============================================================================
// Engine
// ============================================================================

pub use fuzzdex_engine::{
    Explanation, IndexReport, MaintenanceReport, MatcherExplanation, Query, SearchHit,
    SearchIndex, SearchPage,
};

/// Lower-level building blocks
pub mod engine {
    pub use fuzzdex_engine::{dictionary, indexer, matcher, postings, registry, search};
}

/// Table store
pub mod storage {
    pub use fuzzdex_storage::*;
}

/// Collision retry
pub mod concurrency {
    pub use fuzzdex_concurrency::*;
}
