//! Tier 2: Index invariants under random write sequences
//!
//! After any sequence of create/update/delete calls:
//! - every word's posting count equals its live postings
//! - rank cutoffs agree with the counts
//! - each record has at most one posting per word
//! - a full model sync of the final records is a no-op

use fuzzdex::storage::IndexStore;
use fuzzdex::{RowKey, SearchConfig};
use proptest::prelude::*;
use std::collections::BTreeSet;

use crate::test_utils::{assert_statistics, config, index_with, Person, PEOPLE};

const WORDS: &[&str] = &["ann", "anne", "bob", "robert", "smith", "smyth", "lee", "li"];

#[derive(Debug, Clone)]
enum Op {
    Upsert { id: u64, name: Vec<usize>, bio: Vec<usize> },
    Delete { id: u64 },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    let words = || prop::collection::vec(0..WORDS.len(), 0..4);
    prop_oneof![
        3 => (0u64..6, words(), words()).prop_map(|(id, name, bio)| Op::Upsert { id, name, bio }),
        1 => (0u64..6).prop_map(|id| Op::Delete { id }),
    ]
}

fn text(words: &[usize]) -> String {
    words.iter().map(|&i| WORDS[i]).collect::<Vec<_>>().join(" ")
}

fn small_cutoffs() -> SearchConfig {
    SearchConfig {
        rank_reduction_factor: 2,
        min_rank_reduction: 40,
        ..config()
    }
}

fn assert_one_posting_per_word(store: &IndexStore, record_id: u64) {
    let view = store.read();
    let Ok(row_key) = RowKey::new(PEOPLE, record_id) else {
        panic!("record id out of range");
    };
    let mut seen = BTreeSet::new();
    for entry in view.entries_for_row(row_key) {
        assert!(seen.insert(entry.word_id), "duplicate posting in row {}", record_id);
        assert_eq!(entry.record_id, record_id);
        assert_eq!(entry.model_id, PEOPLE);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_statistics_hold(ops in prop::collection::vec(op_strategy(), 1..25)) {
        let (index, people) = index_with(small_cutoffs());
        for op in &ops {
            match op {
                Op::Upsert { id, name, bio } => {
                    let person = Person::new(*id, &text(name), &text(bio));
                    people.0.lock().insert(*id, person.clone());
                    index.update_search_index(&person).unwrap();
                }
                Op::Delete { id } => {
                    let removed = people.0.lock().remove(id);
                    if let Some(person) = removed {
                        index.delete_search_index(&person).unwrap();
                    }
                }
            }
        }

        assert_statistics(&index);
        for id in 0..6 {
            assert_one_posting_per_word(index.store(), id);
        }

        let report = index.sync_model(PEOPLE).unwrap();
        prop_assert_eq!(report.writes(), 0, "sync after incremental writes: {:?}", report);

        let maintenance = index.maintain().unwrap();
        prop_assert_eq!(maintenance.counts_fixed, 0);
        prop_assert_eq!(maintenance.cutoffs_changed, 0);
        assert_statistics(&index);
        prop_assert!(index.store().read().orphan_word_ids().is_empty());
    }

    #[test]
    fn prop_delete_everything_leaves_empty_tables(
        ops in prop::collection::vec(op_strategy(), 1..15)
    ) {
        let (index, people) = index_with(small_cutoffs());
        for op in &ops {
            if let Op::Upsert { id, name, bio } = op {
                let person = Person::new(*id, &text(name), &text(bio));
                people.0.lock().insert(*id, person.clone());
                index.update_search_index(&person).unwrap();
            }
        }

        index.delete_model_index(PEOPLE).unwrap();
        index.maintain().unwrap();
        let stats = index.stats();
        prop_assert_eq!(stats.entries, 0);
        prop_assert_eq!(stats.words, 0);
        prop_assert_eq!(index.count_results("ann bob smith lee"), 0);
    }
}
