//! Identifier and row types shared by storage and engine
//!
//! The two persisted tables are `words` (the dictionary) and `entries`
//! (postings). Both are plain data here; all behavior lives in the storage
//! and engine crates.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of low bits of a [`RowKey`] that hold the model id.
pub const MODEL_ID_BITS: u32 = 8;

/// Largest record id that still fits in a [`RowKey`].
pub const MAX_RECORD_ID: u64 = (1u64 << (64 - MODEL_ID_BITS)) - 1;

/// Priority stored on entries created without an explicit one.
pub const DEFAULT_ROW_PRIORITY: f64 = 0.5;

// ============================================================================
// Identifiers
// ============================================================================

/// Dictionary word identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WordId(pub u64);

impl fmt::Display for WordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "word#{}", self.0)
    }
}

/// Posting (entry) identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntryId(pub u64);

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entry#{}", self.0)
    }
}

/// Small stable integer assigned to each indexable record type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ModelId(pub u8);

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "model#{}", self.0)
    }
}

/// Composite row identifier grouping every posting of one record
///
/// Packs `(record_id << 8) | model_id` into one sortable integer, so ordering
/// by row key is ordering by record id first, then model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RowKey(pub u64);

impl RowKey {
    /// Pack a model id and record id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RecordIdOutOfRange`] if `record_id` needs more than
    /// 56 bits.
    pub fn new(model_id: ModelId, record_id: u64) -> Result<Self> {
        if record_id > MAX_RECORD_ID {
            return Err(Error::RecordIdOutOfRange(record_id));
        }
        Ok(RowKey((record_id << MODEL_ID_BITS) | u64::from(model_id.0)))
    }

    /// Model id packed into the low bits
    pub fn model_id(self) -> ModelId {
        ModelId((self.0 & 0xFF) as u8)
    }

    /// Record id packed into the high bits
    pub fn record_id(self) -> u64 {
        self.0 >> MODEL_ID_BITS
    }
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.model_id().0, self.record_id())
    }
}

// ============================================================================
// Matcher columns
// ============================================================================

/// Columns of the `words` table that matchers look words up by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatcherColumn {
    /// The normalized token itself
    Word,
    /// Porter stem
    Stem,
    /// Metaphone key
    Metaphone,
    /// Classic 4-character soundex
    Soundex,
    /// Double metaphone primary key
    PrimaryMetaphone,
    /// Double metaphone secondary key
    SecondaryMetaphone,
    /// American soundex (configurable length)
    AmericanSoundex,
}

impl MatcherColumn {
    /// Every key column (excludes [`MatcherColumn::Word`])
    pub const KEY_COLUMNS: [MatcherColumn; 6] = [
        MatcherColumn::Stem,
        MatcherColumn::Metaphone,
        MatcherColumn::Soundex,
        MatcherColumn::PrimaryMetaphone,
        MatcherColumn::SecondaryMetaphone,
        MatcherColumn::AmericanSoundex,
    ];

    /// Column name in the persisted schema
    pub fn as_str(self) -> &'static str {
        match self {
            MatcherColumn::Word => "word",
            MatcherColumn::Stem => "stem",
            MatcherColumn::Metaphone => "metaphone",
            MatcherColumn::Soundex => "soundex",
            MatcherColumn::PrimaryMetaphone => "primary_metaphone",
            MatcherColumn::SecondaryMetaphone => "secondary_metaphone",
            MatcherColumn::AmericanSoundex => "american_soundex",
        }
    }
}

/// Precomputed matcher keys of one word
///
/// Computed once when the word is created and only recomputed by an explicit
/// key rebuild. `None` means the matcher does not apply to the word (or was
/// not enabled when the word was created).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatcherKeys {
    /// Porter stem
    pub stem: Option<String>,
    /// Metaphone key
    pub metaphone: Option<String>,
    /// Classic soundex
    pub soundex: Option<String>,
    /// Double metaphone primary
    pub primary_metaphone: Option<String>,
    /// Double metaphone secondary
    pub secondary_metaphone: Option<String>,
    /// American soundex
    pub american_soundex: Option<String>,
}

impl MatcherKeys {
    /// Key stored in a column; [`MatcherColumn::Word`] has no key here.
    pub fn get(&self, column: MatcherColumn) -> Option<&str> {
        match column {
            MatcherColumn::Word => None,
            MatcherColumn::Stem => self.stem.as_deref(),
            MatcherColumn::Metaphone => self.metaphone.as_deref(),
            MatcherColumn::Soundex => self.soundex.as_deref(),
            MatcherColumn::PrimaryMetaphone => self.primary_metaphone.as_deref(),
            MatcherColumn::SecondaryMetaphone => self.secondary_metaphone.as_deref(),
            MatcherColumn::AmericanSoundex => self.american_soundex.as_deref(),
        }
    }

    /// Overwrite one column
    pub fn set(&mut self, column: MatcherColumn, value: Option<String>) {
        match column {
            MatcherColumn::Word => {}
            MatcherColumn::Stem => self.stem = value,
            MatcherColumn::Metaphone => self.metaphone = value,
            MatcherColumn::Soundex => self.soundex = value,
            MatcherColumn::PrimaryMetaphone => self.primary_metaphone = value,
            MatcherColumn::SecondaryMetaphone => self.secondary_metaphone = value,
            MatcherColumn::AmericanSoundex => self.american_soundex = value,
        }
    }
}

// ============================================================================
// Rows
// ============================================================================

/// One dictionary entry (`words` table)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordRow {
    /// Row id
    pub id: WordId,
    /// Normalized, length-capped token; unique
    pub word: String,
    /// Number of postings referencing this word
    pub entries_count: u64,
    /// Rank cutoff; postings at or below it are skipped. 0 = no cutoff
    pub rank_limit: i32,
    /// Matcher keys
    pub keys: MatcherKeys,
}

impl WordRow {
    /// Value of a matcher column for this word
    pub fn column(&self, column: MatcherColumn) -> Option<&str> {
        match column {
            MatcherColumn::Word => Some(self.word.as_str()),
            other => self.keys.get(other),
        }
    }
}

/// Word about to be inserted
#[derive(Debug, Clone, PartialEq)]
pub struct NewWord {
    /// Normalized token
    pub word: String,
    /// Matcher keys computed for it
    pub keys: MatcherKeys,
}

/// One posting (`entries` table)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryRow {
    /// Row id
    pub id: EntryId,
    /// Word this posting belongs to
    pub word_id: WordId,
    /// Packed model/record id
    pub row_key: RowKey,
    /// Record type
    pub model_id: ModelId,
    /// Record id within its type
    pub record_id: u64,
    /// Summed field weight of the word in this record
    pub rank: i32,
    /// Record-level priority
    pub row_priority: f64,
}

/// Posting about to be inserted
#[derive(Debug, Clone, PartialEq)]
pub struct NewEntry {
    /// Word id
    pub word_id: WordId,
    /// Packed model/record id
    pub row_key: RowKey,
    /// Rank
    pub rank: i32,
    /// Record priority
    pub row_priority: f64,
}

/// Round a priority to 15 decimal places.
///
/// Priorities are compared for equality when diffing, so they are always
/// stored in this normalized form.
pub fn normalize_priority(priority: f64) -> f64 {
    if !priority.is_finite() {
        return 0.0;
    }
    const SCALE: f64 = 1e15;
    let scaled = priority * SCALE;
    if !scaled.is_finite() || scaled.abs() >= 9.0e15 {
        return priority;
    }
    scaled.round() / SCALE
}
