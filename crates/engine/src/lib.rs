//! Search engine for fuzzdex
//!
//! This crate contains:
//! - `search`: tokenizer, Porter stemmer and phonetic encoders
//! - `matcher`: matcher strategies and the result list that merges them
//! - `dictionary`: find-or-create of words, counts, rank cutoffs, orphans
//! - `postings`: row scoring, ordering and pagination
//! - `indexer`: per-record and whole-model index maintenance
//! - `registry`: model id to record source mapping
//! - `index`: the `SearchIndex` facade

pub mod dictionary;
pub mod index;
pub mod indexer;
pub mod matcher;
pub mod postings;
pub mod registry;
pub mod search;

pub use dictionary::{rank_limit_for, Dictionary};
pub use index::{Explanation, SearchIndex};
pub use indexer::{collect_ranks, IndexMaintainer, IndexReport, MaintenanceReport};
pub use matcher::{Candidate, MatchResult, Matcher, MatcherExplanation, ResultList};
pub use postings::{SearchHit, SearchPage, PRIORITY_FLOOR};
pub use registry::ModelRegistry;
pub use search::{split_into_words, split_str, Query};
