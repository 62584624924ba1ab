//! Core types for fuzzdex
//!
//! Shared vocabulary of the workspace: identifiers and row types of the two
//! index tables, the matcher strategy set with its tunables, configuration,
//! the host record contract and the error type.

pub mod config;
pub mod error;
pub mod match_type;
pub mod record;
pub mod types;

pub use config::{CollisionConfig, SearchConfig};
pub use error::{Error, Result};
pub use match_type::{MatchType, MatcherOverride, MatcherOverrides, MatcherTuning, Multipliers};
pub use record::{IndexField, IndexText, Indexable, RecordSource, DEFAULT_FIELD_WEIGHT};
pub use types::{
    normalize_priority, EntryId, EntryRow, MatcherColumn, MatcherKeys, ModelId, NewEntry,
    NewWord, RowKey, WordId, WordRow, DEFAULT_ROW_PRIORITY, MAX_RECORD_ID, MODEL_ID_BITS,
};
