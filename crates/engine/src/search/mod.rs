//! Text analysis
//!
//! This module contains:
//! - `tokenizer`: word splitting and query parsing
//! - `stemmer`: Porter stemmer
//! - `phonetic`: sound-alike key encoders

pub mod phonetic;
pub mod stemmer;
pub mod tokenizer;

pub use tokenizer::{split_into_words, split_str, Query};
