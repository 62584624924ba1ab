//! Search Comprehensive Test Suite
//!
//! Cross-crate tests run through the `fuzzdex` facade.
//!
//! ## Test Tiers
//!
//! - **Tier 1**: Tokenizer and query invariants
//! - **Tier 2**: Index invariants under random write sequences
//! - **Tier 3**: Ranking scenarios
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --test search_comprehensive
//! ```

// Test modules
mod test_utils;

// Tier 1: Tokenizer and query invariants
mod tier1_tokenizer_invariants;

// Tier 2: Index invariants
mod tier2_index_invariants;

// Tier 3: Ranking scenarios
mod tier3_ranking_scenarios;
