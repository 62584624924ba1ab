//! Text tokenizer
//!
//! Pipeline: case-fold → extract words → cap length
//!
//! A word is a run of Unicode alphanumeric characters, optionally joined by
//! single apostrophes to further alphanumeric runs (`don't`, `o'neil`).
//! Apostrophes at either end of a word are dropped, since they cannot be told
//! apart from quotes. Dashes and all other punctuation separate words.
//!
//! Case folding is Unicode full default folding, so `Straße` and `STRASSE`
//! produce the same word.

use fuzzdex_core::record::IndexText;
use std::collections::HashSet;

/// Split one string into words, each capped at `max_len` characters.
///
/// Duplicates are kept, so repeated words accumulate weight when indexing.
///
/// # Example
///
/// ```
/// use fuzzdex_engine::search::tokenizer::split_str;
///
/// let words = split_str("'a b 'c' 'd e'f' g'", 64);
/// assert_eq!(words, vec!["a", "b", "c", "d", "e'f", "g"]);
/// ```
pub fn split_str(text: &str, max_len: usize) -> Vec<String> {
    let folded = caseless::default_case_fold_str(text);
    let chars: Vec<char> = folded.chars().collect();
    let mut words = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        if !chars[i].is_alphanumeric() {
            i += 1;
            continue;
        }
        let start = i;
        loop {
            while i < chars.len() && chars[i].is_alphanumeric() {
                i += 1;
            }
            let joined = i + 1 < chars.len() && chars[i] == '\'' && chars[i + 1].is_alphanumeric();
            if !joined {
                break;
            }
            i += 1;
        }
        let mut word: String = chars[start..i].iter().take(max_len).collect();
        // a cap can land just past a joining apostrophe
        if word.ends_with('\'') {
            word.pop();
        }
        if !word.is_empty() {
            words.push(word);
        }
    }
    words
}

/// Split index text (a string or a list of strings) into words.
///
/// Lists are flattened; missing and blank items are skipped.
pub fn split_into_words(text: &IndexText, max_len: usize) -> Vec<String> {
    text.parts()
        .flat_map(|part| split_str(part, max_len))
        .collect()
}

/// Deduplicated, order-preserving query terms
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    terms: Vec<String>,
}

impl Query {
    /// Parse raw query text
    ///
    /// # Example
    ///
    /// ```
    /// use fuzzdex_engine::search::tokenizer::Query;
    ///
    /// let query = Query::parse("text TEXT text", 64);
    /// assert_eq!(query.terms(), ["text"]);
    /// ```
    pub fn parse(text: &str, max_len: usize) -> Self {
        Self::from_words(split_str(text, max_len))
    }

    /// Build a query from already-normalized words
    pub fn from_words(words: impl IntoIterator<Item = String>) -> Self {
        let mut seen = HashSet::new();
        let terms = words
            .into_iter()
            .filter(|w| seen.insert(w.clone()))
            .collect();
        Query { terms }
    }

    /// Terms in first-seen order
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// Number of distinct terms
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// True for empty or all-blank input
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}
