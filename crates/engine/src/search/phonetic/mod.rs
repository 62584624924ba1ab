//! Phonetic encoders
//!
//! Pure functions from a word to a sound key. Words that sound alike in
//! English map to the same key, so a dictionary column holding the key can be
//! matched with plain equality.
//!
//! - `metaphone`: one variable-length key
//! - `double_metaphone`: primary plus optional alternate key
//! - `soundex`: classic four-character code
//! - `american_soundex`: American variant with configurable length

mod double_metaphone;
mod metaphone;
mod soundex;

pub use double_metaphone::double_metaphone;
pub use metaphone::metaphone;
pub use soundex::{american_soundex, soundex};
