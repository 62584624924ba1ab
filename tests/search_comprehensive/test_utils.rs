//! Shared fixtures: a small host model and index helpers

use fuzzdex::{
    CollisionConfig, IndexField, Indexable, ModelId, RecordSource, SearchConfig, SearchIndex,
};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;

pub const PEOPLE: ModelId = ModelId(3);

/// Install a test-writer subscriber once per test binary
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

#[derive(Debug, Clone)]
pub struct Person {
    pub id: u64,
    pub name: String,
    pub bio: String,
    pub priority: Option<f64>,
}

impl Person {
    pub fn new(id: u64, name: &str, bio: &str) -> Self {
        Person {
            id,
            name: name.to_string(),
            bio: bio.to_string(),
            priority: None,
        }
    }
}

impl Indexable for Person {
    fn type_name(&self) -> &str {
        "Person"
    }
    fn record_id(&self) -> u64 {
        self.id
    }
    fn search_index_info(&self) -> Vec<IndexField> {
        vec![
            IndexField::new(self.name.clone(), 51),
            IndexField::new(self.bio.clone(), 1),
        ]
    }
    fn search_priority(&self) -> Option<f64> {
        self.priority
    }
}

#[derive(Default)]
pub struct People(pub Mutex<BTreeMap<u64, Person>>);

impl RecordSource for People {
    fn type_name(&self) -> &str {
        "Person"
    }
    fn load(&self, record_id: u64) -> Option<Arc<dyn Indexable>> {
        self.0
            .lock()
            .get(&record_id)
            .cloned()
            .map(|p| Arc::new(p) as Arc<dyn Indexable>)
    }
    fn scope_batch(&self, after: Option<u64>, limit: usize) -> Vec<Arc<dyn Indexable>> {
        let from = after.map_or(0, |a| a + 1);
        self.0
            .lock()
            .range(from..)
            .take(limit)
            .map(|(_, p)| Arc::new(p.clone()) as Arc<dyn Indexable>)
            .collect()
    }
}

pub fn config() -> SearchConfig {
    SearchConfig {
        collision: CollisionConfig::without_backoff(4),
        ..SearchConfig::default()
    }
}

pub fn index_with(config: SearchConfig) -> (SearchIndex, Arc<People>) {
    init_tracing();
    let index = SearchIndex::new(config).unwrap();
    let people = Arc::new(People::default());
    index.register_model(PEOPLE, people.clone()).unwrap();
    (index, people)
}

pub fn index() -> (SearchIndex, Arc<People>) {
    index_with(config())
}

/// Posting counts and rank cutoffs agree with the postings
pub fn assert_statistics(index: &SearchIndex) {
    let view = index.store().read();
    let config = index.config();
    for id in view.word_ids() {
        let word = view.word(id).unwrap();
        assert_eq!(
            word.entries_count,
            view.live_entry_count(id),
            "posting count of '{}'",
            word.word
        );
        if word.entries_count <= config.rank_reduction_factor {
            assert_eq!(word.rank_limit, 0, "rank cutoff of '{}'", word.word);
        } else {
            assert!(word.rank_limit <= config.min_rank_reduction);
        }
    }
}
