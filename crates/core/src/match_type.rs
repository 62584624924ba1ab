//! Matcher strategy identifiers and their tunables
//!
//! The algorithms themselves live in the engine; this module only names the
//! closed set of strategies and carries their default multipliers, reduction
//! factors and length limits so configuration can refer to them.

use crate::types::MatcherColumn;
use serde::{Deserialize, Serialize};
use smallvec::{smallvec, SmallVec};
use std::fmt;

/// Multiplier tuple, one value per match tier
pub type Multipliers = SmallVec<[f64; 4]>;

/// Closed set of matcher strategies, listed from most to least specific
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    /// Term equals the word
    Exact,
    /// Leet-speak substitutions of the term equal the word
    Leet,
    /// Porter stems agree
    Stem,
    /// Metaphone keys agree
    Metaphone,
    /// Double metaphone primary/secondary keys agree
    DoubleMetaphone,
    /// Classic soundex codes agree
    Soundex,
    /// American soundex codes (configurable length) agree
    AmericanSoundex,
    /// Word starts with the term
    StartWith,
    /// Single letters match words starting with them, and vice versa
    Initials,
}

impl MatchType {
    /// Every strategy
    pub const ALL: [MatchType; 9] = [
        MatchType::Exact,
        MatchType::Leet,
        MatchType::Stem,
        MatchType::Metaphone,
        MatchType::DoubleMetaphone,
        MatchType::Soundex,
        MatchType::AmericanSoundex,
        MatchType::StartWith,
        MatchType::Initials,
    ];

    /// Configuration name
    pub fn name(self) -> &'static str {
        match self {
            MatchType::Exact => "exact",
            MatchType::Leet => "leet",
            MatchType::Stem => "stem",
            MatchType::Metaphone => "metaphone",
            MatchType::DoubleMetaphone => "double_metaphone",
            MatchType::Soundex => "soundex",
            MatchType::AmericanSoundex => "american_soundex",
            MatchType::StartWith => "start_with",
            MatchType::Initials => "initials",
        }
    }

    /// Number of distinct match tiers (and so multipliers) this strategy has
    pub fn tiers(self) -> usize {
        match self {
            MatchType::Stem => 2,
            MatchType::DoubleMetaphone => 4,
            _ => 1,
        }
    }

    /// Word columns that must be populated at index time for this strategy
    pub fn index_columns(self) -> &'static [MatcherColumn] {
        match self {
            MatchType::Stem => &[MatcherColumn::Stem],
            MatchType::Metaphone => &[MatcherColumn::Metaphone],
            MatchType::DoubleMetaphone => &[
                MatcherColumn::PrimaryMetaphone,
                MatcherColumn::SecondaryMetaphone,
            ],
            MatchType::Soundex => &[MatcherColumn::Soundex],
            MatchType::AmericanSoundex => &[MatcherColumn::AmericanSoundex],
            MatchType::Exact | MatchType::Leet | MatchType::StartWith | MatchType::Initials => &[],
        }
    }

    /// Built-in tunables
    pub fn default_tuning(self) -> MatcherTuning {
        let base = MatcherTuning::base();
        match self {
            MatchType::Exact => MatcherTuning {
                rank_multipliers: smallvec![130.0],
                term_multipliers: smallvec![1.90],
                ..base
            },
            MatchType::Leet => MatcherTuning {
                rank_multipliers: smallvec![13.0],
                term_multipliers: smallvec![1.40],
                max_term_length: Some(9),
                ..base
            },
            MatchType::Stem => MatcherTuning {
                rank_multipliers: smallvec![12.0, 11.0],
                term_multipliers: smallvec![1.30, 1.25],
                ..base
            },
            MatchType::Metaphone => MatcherTuning {
                rank_multipliers: smallvec![10.0],
                term_multipliers: smallvec![1.20],
                ..base
            },
            MatchType::DoubleMetaphone => MatcherTuning {
                rank_multipliers: smallvec![6.0, 5.0, 4.0, 3.0],
                term_multipliers: smallvec![1.14, 1.13, 1.12, 1.11],
                max_key_length: 4,
                ..base
            },
            MatchType::Soundex => MatcherTuning {
                rank_multipliers: smallvec![1.0],
                term_multipliers: smallvec![1.0],
                max_key_length: 4,
                ..base
            },
            MatchType::AmericanSoundex => MatcherTuning {
                rank_multipliers: smallvec![10.0],
                term_multipliers: smallvec![1.23],
                ..base
            },
            MatchType::StartWith => MatcherTuning {
                rank_multipliers: smallvec![8.0],
                term_multipliers: smallvec![1.15],
                min_term_length: Some(2),
                ..base
            },
            MatchType::Initials => MatcherTuning {
                rank_multipliers: smallvec![7.0],
                term_multipliers: smallvec![1.15],
                matches_reduction_factor: 250,
                ..base
            },
        }
    }
}

impl fmt::Display for MatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Resolved tunables of one strategy
#[derive(Debug, Clone, PartialEq)]
pub struct MatcherTuning {
    /// Rank multiplier per tier
    pub rank_multipliers: Multipliers,
    /// Term (exponent) multiplier per tier
    pub term_multipliers: Multipliers,
    /// Candidate words considered per invocation, least common first
    pub matches_reduction_factor: usize,
    /// Stop accepting words for a term within this strategy past this many results
    pub limit_reduction_factor: u64,
    /// Drop a term from later strategies once it has this many results
    pub type_reduction_factor: u64,
    /// Terms shorter than this are not eligible
    pub min_term_length: Option<usize>,
    /// Terms longer than this are not eligible
    pub max_term_length: Option<usize>,
    /// Maximum length of a computed key
    pub max_key_length: usize,
}

impl MatcherTuning {
    fn base() -> Self {
        MatcherTuning {
            rank_multipliers: smallvec![1.0],
            term_multipliers: smallvec![1.0],
            matches_reduction_factor: 50,
            limit_reduction_factor: 200,
            type_reduction_factor: 100,
            min_term_length: None,
            max_term_length: None,
            max_key_length: 64,
        }
    }

    /// Apply configured overrides on top of these values
    pub fn with_override(mut self, ov: &MatcherOverride) -> Self {
        if let Some(v) = &ov.rank_multipliers {
            self.rank_multipliers = v.iter().copied().collect();
        }
        if let Some(v) = &ov.term_multipliers {
            self.term_multipliers = v.iter().copied().collect();
        }
        if let Some(v) = ov.matches_reduction_factor {
            self.matches_reduction_factor = v;
        }
        if let Some(v) = ov.limit_reduction_factor {
            self.limit_reduction_factor = v;
        }
        if let Some(v) = ov.type_reduction_factor {
            self.type_reduction_factor = v;
        }
        if let Some(v) = ov.min_term_length {
            self.min_term_length = Some(v);
        }
        if let Some(v) = ov.max_term_length {
            self.max_term_length = Some(v);
        }
        if let Some(v) = ov.max_key_length {
            self.max_key_length = v;
        }
        self
    }

    /// Whether a term's length is within the configured bounds
    pub fn length_allows(&self, term: &str) -> bool {
        let len = term.chars().count();
        if let Some(min) = self.min_term_length {
            if len < min {
                return false;
            }
        }
        if let Some(max) = self.max_term_length {
            if len > max {
                return false;
            }
        }
        true
    }
}

/// Optional per-strategy settings read from configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherOverride {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank_multipliers: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub term_multipliers: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matches_reduction_factor: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit_reduction_factor: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_reduction_factor: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_term_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_term_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_key_length: Option<usize>,
}

/// Overrides for every strategy (`[matchers.<name>]` tables)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherOverrides {
    pub exact: MatcherOverride,
    pub leet: MatcherOverride,
    pub stem: MatcherOverride,
    pub metaphone: MatcherOverride,
    pub double_metaphone: MatcherOverride,
    pub soundex: MatcherOverride,
    pub american_soundex: MatcherOverride,
    pub start_with: MatcherOverride,
    pub initials: MatcherOverride,
}

impl MatcherOverrides {
    /// Overrides for one strategy
    pub fn get(&self, match_type: MatchType) -> &MatcherOverride {
        match match_type {
            MatchType::Exact => &self.exact,
            MatchType::Leet => &self.leet,
            MatchType::Stem => &self.stem,
            MatchType::Metaphone => &self.metaphone,
            MatchType::DoubleMetaphone => &self.double_metaphone,
            MatchType::Soundex => &self.soundex,
            MatchType::AmericanSoundex => &self.american_soundex,
            MatchType::StartWith => &self.start_with,
            MatchType::Initials => &self.initials,
        }
    }

    /// Mutable overrides for one strategy
    pub fn get_mut(&mut self, match_type: MatchType) -> &mut MatcherOverride {
        match match_type {
            MatchType::Exact => &mut self.exact,
            MatchType::Leet => &mut self.leet,
            MatchType::Stem => &mut self.stem,
            MatchType::Metaphone => &mut self.metaphone,
            MatchType::DoubleMetaphone => &mut self.double_metaphone,
            MatchType::Soundex => &mut self.soundex,
            MatchType::AmericanSoundex => &mut self.american_soundex,
            MatchType::StartWith => &mut self.start_with,
            MatchType::Initials => &mut self.initials,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tunings_have_one_multiplier_per_tier() {
        for t in MatchType::ALL {
            let tuning = t.default_tuning();
            assert_eq!(tuning.rank_multipliers.len(), t.tiers(), "{}", t);
            assert_eq!(tuning.term_multipliers.len(), t.tiers(), "{}", t);
        }
    }

    #[test]
    fn test_default_multipliers() {
        let exact = MatchType::Exact.default_tuning();
        assert_eq!(exact.rank_multipliers[0], 130.0);
        assert_eq!(exact.term_multipliers[0], 1.90);
        let dm = MatchType::DoubleMetaphone.default_tuning();
        assert_eq!(dm.rank_multipliers.as_slice(), &[6.0, 5.0, 4.0, 3.0]);
        assert_eq!(MatchType::StartWith.default_tuning().rank_multipliers[0], 8.0);
        assert_eq!(MatchType::Initials.default_tuning().rank_multipliers[0], 7.0);
        assert_eq!(MatchType::Soundex.default_tuning().term_multipliers[0], 1.0);
    }

    #[test]
    fn test_default_reduction_factors() {
        let t = MatchType::Exact.default_tuning();
        assert_eq!(t.matches_reduction_factor, 50);
        assert_eq!(t.limit_reduction_factor, 200);
        assert_eq!(t.type_reduction_factor, 100);
        assert_eq!(
            MatchType::Initials.default_tuning().matches_reduction_factor,
            250
        );
    }

    #[test]
    fn test_override_merges() {
        let ov = MatcherOverride {
            rank_multipliers: Some(vec![99.0]),
            max_term_length: Some(5),
            ..Default::default()
        };
        let t = MatchType::Exact.default_tuning().with_override(&ov);
        assert_eq!(t.rank_multipliers.as_slice(), &[99.0]);
        assert_eq!(t.term_multipliers.as_slice(), &[1.90]);
        assert_eq!(t.max_term_length, Some(5));
        assert_eq!(t.matches_reduction_factor, 50);
    }

    #[test]
    fn test_length_allows() {
        let t = MatchType::StartWith.default_tuning();
        assert!(!t.length_allows("a"));
        assert!(t.length_allows("ab"));
        let leet = MatchType::Leet.default_tuning();
        assert!(leet.length_allows("abcdefghi"));
        assert!(!leet.length_allows("abcdefghij"));
    }

    #[test]
    fn test_index_columns() {
        assert!(MatchType::Exact.index_columns().is_empty());
        assert_eq!(MatchType::DoubleMetaphone.index_columns().len(), 2);
        assert_eq!(MatchType::Stem.index_columns(), &[MatcherColumn::Stem]);
    }

    #[test]
    fn test_names_round_trip_through_serde() {
        #[derive(Serialize, Deserialize)]
        struct Wrapper {
            t: MatchType,
        }
        for t in MatchType::ALL {
            let s = toml::to_string(&Wrapper { t }).unwrap();
            assert!(s.contains(t.name()));
            let back: Wrapper = toml::from_str(&s).unwrap();
            assert_eq!(back.t, t);
        }
    }
}
