//! Search configuration
//!
//! Every field has a default, so an empty TOML document (or no file at all)
//! yields a working configuration. Per-matcher tunables are given as partial
//! `[matchers.<name>]` tables and merged onto the built-in values.
//!
//! ```toml
//! max_word_length = 64
//! perform_match_types = ["exact", "stem", "metaphone"]
//! index_match_types = ["stem", "metaphone"]
//!
//! [collision]
//! max_retries = 4
//!
//! [matchers.exact]
//! rank_multipliers = [150.0]
//! ```

use crate::error::{Error, Result};
use crate::match_type::{MatchType, MatcherOverrides, MatcherTuning};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Word uniqueness collision retry settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionConfig {
    /// Retries after the first attempt
    pub max_retries: usize,
    /// Backoff windows `[min_ms, max_ms]`; retry `n` sleeps a random duration
    /// from window `n`, the last window repeating
    pub backoff_ms: Vec<[u64; 2]>,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        CollisionConfig {
            max_retries: 4,
            backoff_ms: vec![[0, 100], [100, 1000], [1000, 3000], [6000, 9000]],
        }
    }
}

impl CollisionConfig {
    /// Retry without sleeping (tests, single-writer deployments)
    pub fn without_backoff(max_retries: usize) -> Self {
        CollisionConfig {
            max_retries,
            backoff_ms: vec![[0, 0]],
        }
    }
}

/// Top-level configuration of a search index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Tokens are truncated to this many characters
    pub max_word_length: usize,
    /// Words with more postings than this get a rank cutoff
    pub rank_reduction_factor: u64,
    /// Upper bound of a word's rank cutoff
    pub min_rank_reduction: i32,
    /// Matchers tried at query time, in order
    pub perform_match_types: Vec<MatchType>,
    /// Matchers whose keys are computed for new words
    pub index_match_types: Vec<MatchType>,
    /// Records loaded per batch during bulk sync
    pub batch_size: usize,
    /// Recompute rank cutoffs of touched words on every write
    pub refresh_cutoffs_on_write: bool,
    /// Collision retry settings
    pub collision: CollisionConfig,
    /// Per-matcher overrides
    pub matchers: MatcherOverrides,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            max_word_length: 64,
            rank_reduction_factor: 1200,
            min_rank_reduction: 120,
            perform_match_types: vec![
                MatchType::Exact,
                MatchType::Stem,
                MatchType::Metaphone,
                MatchType::StartWith,
                MatchType::DoubleMetaphone,
                MatchType::Soundex,
            ],
            index_match_types: vec![
                MatchType::Stem,
                MatchType::Soundex,
                MatchType::Metaphone,
                MatchType::DoubleMetaphone,
            ],
            batch_size: 100,
            refresh_cutoffs_on_write: true,
            collision: CollisionConfig::default(),
            matchers: MatcherOverrides::default(),
        }
    }
}

impl SearchConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: SearchConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Serialize to TOML
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// TOML document with every default written out
    pub fn default_toml() -> String {
        // Serializing the default value cannot fail: every field is a plain
        // scalar, array or table.
        toml::to_string_pretty(&SearchConfig::default()).unwrap_or_default()
    }

    /// Tunables of one matcher with overrides applied
    pub fn tuning(&self, match_type: MatchType) -> MatcherTuning {
        match_type
            .default_tuning()
            .with_override(self.matchers.get(match_type))
    }

    /// Check internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.max_word_length == 0 {
            return Err(Error::InvalidConfig(
                "max_word_length must be greater than 0".into(),
            ));
        }
        if self.batch_size == 0 {
            return Err(Error::InvalidConfig(
                "batch_size must be greater than 0".into(),
            ));
        }
        if self.min_rank_reduction < 0 {
            return Err(Error::InvalidConfig(
                "min_rank_reduction must not be negative".into(),
            ));
        }
        if self.collision.backoff_ms.is_empty() {
            return Err(Error::InvalidConfig(
                "collision.backoff_ms needs at least one window".into(),
            ));
        }
        if let Some([min, max]) = self.collision.backoff_ms.iter().find(|[a, b]| a > b) {
            return Err(Error::InvalidConfig(format!(
                "collision backoff window [{}, {}] is inverted",
                min, max
            )));
        }

        for (i, t) in self.perform_match_types.iter().enumerate() {
            if self.perform_match_types[..i].contains(t) {
                return Err(Error::InvalidConfig(format!(
                    "match type '{}' is listed twice",
                    t
                )));
            }
            let missing_column = !t.index_columns().is_empty()
                && !self.index_match_types.contains(t);
            if missing_column {
                return Err(Error::InvalidConfig(format!(
                    "match type '{}' is performed but its keys are not indexed",
                    t
                )));
            }
        }

        for t in MatchType::ALL {
            let tuning = self.tuning(t);
            if tuning.rank_multipliers.len() != t.tiers()
                || tuning.term_multipliers.len() != t.tiers()
            {
                return Err(Error::InvalidConfig(format!(
                    "matcher '{}' needs {} rank and term multipliers",
                    t,
                    t.tiers()
                )));
            }
            if tuning.matches_reduction_factor == 0 {
                return Err(Error::InvalidConfig(format!(
                    "matcher '{}' matches_reduction_factor must be greater than 0",
                    t
                )));
            }
            if tuning.max_key_length == 0 {
                return Err(Error::InvalidConfig(format!(
                    "matcher '{}' max_key_length must be greater than 0",
                    t
                )));
            }
        }
        Ok(())
    }
}
