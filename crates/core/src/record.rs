//! Host record contract
//!
//! The index never owns application records. A record type takes part by
//! implementing [`Indexable`] (what to index) and registering a
//! [`RecordSource`] (how to load records back by id).

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Weight used for a field when none is given
pub const DEFAULT_FIELD_WEIGHT: i32 = 1;

/// Text of one indexed field
///
/// Lists are flattened; `None` and blank items are skipped.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IndexText {
    /// Nothing to index
    #[default]
    None,
    /// A single string
    Text(String),
    /// Several strings, any of which may be missing
    List(Vec<Option<String>>),
}

impl IndexText {
    /// Iterate over the non-blank strings
    pub fn parts(&self) -> impl Iterator<Item = &str> {
        let items: Vec<&str> = match self {
            IndexText::None => Vec::new(),
            IndexText::Text(s) => vec![s.as_str()],
            IndexText::List(items) => items.iter().filter_map(|i| i.as_deref()).collect(),
        };
        items.into_iter().filter(|s| !s.trim().is_empty())
    }

    /// True if there is nothing to tokenize
    pub fn is_blank(&self) -> bool {
        self.parts().next().is_none()
    }
}

impl From<&str> for IndexText {
    fn from(s: &str) -> Self {
        IndexText::Text(s.to_string())
    }
}

impl From<String> for IndexText {
    fn from(s: String) -> Self {
        IndexText::Text(s)
    }
}

impl From<Option<String>> for IndexText {
    fn from(s: Option<String>) -> Self {
        s.map_or(IndexText::None, IndexText::Text)
    }
}

impl From<Vec<String>> for IndexText {
    fn from(items: Vec<String>) -> Self {
        IndexText::List(items.into_iter().map(Some).collect())
    }
}

impl From<Vec<Option<String>>> for IndexText {
    fn from(items: Vec<Option<String>>) -> Self {
        IndexText::List(items)
    }
}

/// One field of a record's index description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexField {
    /// Field text
    pub text: IndexText,
    /// Rank contributed by each occurrence of a token in this field
    pub weight: i32,
}

impl IndexField {
    /// Field with an explicit weight
    pub fn new(text: impl Into<IndexText>, weight: i32) -> Self {
        IndexField {
            text: text.into(),
            weight,
        }
    }

    /// Field with the default weight
    pub fn text(text: impl Into<IndexText>) -> Self {
        Self::new(text, DEFAULT_FIELD_WEIGHT)
    }
}

/// A host record that can be indexed
pub trait Indexable: Send + Sync {
    /// Registered type name of the record
    fn type_name(&self) -> &str;

    /// Record id within its type
    fn record_id(&self) -> u64;

    /// Fields to index
    fn search_index_info(&self) -> Vec<IndexField>;

    /// Record priority; `None` keeps the stored (or default) priority
    fn search_priority(&self) -> Option<f64> {
        None
    }
}

/// Loader for records of one type
pub trait RecordSource: Send + Sync {
    /// Type name this source serves
    fn type_name(&self) -> &str;

    /// Load one record; `None` if it no longer exists
    fn load(&self, record_id: u64) -> Option<Arc<dyn Indexable>>;

    /// Records with id greater than `after`, ascending by id, at most `limit`
    fn scope_batch(&self, after: Option<u64>, limit: usize) -> Vec<Arc<dyn Indexable>>;
}
