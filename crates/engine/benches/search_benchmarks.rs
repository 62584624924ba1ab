//! Search Benchmarks
//!
//! Query latency and per-record indexing cost over a synthetic corpus.
//!
//! ## Running
//!
//! ```bash
//! cargo bench --bench search_benchmarks
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use fuzzdex_core::config::{CollisionConfig, SearchConfig};
use fuzzdex_core::record::{IndexField, Indexable, RecordSource};
use fuzzdex_core::types::ModelId;
use fuzzdex_engine::SearchIndex;
use std::sync::Arc;
use std::time::Duration;

// =============================================================================
// Corpus
// =============================================================================

const SYLLABLES: [&str; 12] = [
    "ka", "lo", "mi", "ra", "te", "su", "no", "vi", "pe", "do", "ri", "xa",
];

/// Deterministic pseudo-word for `n`
fn word(n: u64) -> String {
    let mut n = n;
    let mut out = String::new();
    for _ in 0..3 {
        out.push_str(SYLLABLES[(n % SYLLABLES.len() as u64) as usize]);
        n /= SYLLABLES.len() as u64;
    }
    out
}

#[derive(Debug, Clone)]
struct Article {
    id: u64,
    title: String,
    body: String,
}

impl Article {
    fn generate(id: u64) -> Self {
        let title = (0..3).map(|i| word(id * 7 + i)).collect::<Vec<_>>().join(" ");
        let body = (0..20).map(|i| word(id * 13 + i * 31)).collect::<Vec<_>>().join(" ");
        Article { id, title, body }
    }
}

impl Indexable for Article {
    fn type_name(&self) -> &str {
        "Article"
    }
    fn record_id(&self) -> u64 {
        self.id
    }
    fn search_index_info(&self) -> Vec<IndexField> {
        vec![
            IndexField::new(self.title.clone(), 51),
            IndexField::new(self.body.clone(), 1),
        ]
    }
}

struct Articles(u64);

impl RecordSource for Articles {
    fn type_name(&self) -> &str {
        "Article"
    }
    fn load(&self, record_id: u64) -> Option<Arc<dyn Indexable>> {
        (1..=self.0)
            .contains(&record_id)
            .then(|| Arc::new(Article::generate(record_id)) as Arc<dyn Indexable>)
    }
    fn scope_batch(&self, after: Option<u64>, limit: usize) -> Vec<Arc<dyn Indexable>> {
        let from = after.map_or(1, |a| a + 1);
        (from..=self.0)
            .take(limit)
            .map(|id| Arc::new(Article::generate(id)) as Arc<dyn Indexable>)
            .collect()
    }
}

fn populated(records: u64) -> SearchIndex {
    let config = SearchConfig {
        collision: CollisionConfig::without_backoff(4),
        batch_size: 500,
        ..SearchConfig::default()
    };
    let index = SearchIndex::new(config).unwrap();
    index
        .register_model(ModelId(1), Arc::new(Articles(records)))
        .unwrap();
    index.sync_model(ModelId(1)).unwrap();
    index
}

// =============================================================================
// Query latency
// =============================================================================

fn query_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("query");
    group.throughput(Throughput::Elements(1));

    for records in [1_000u64, 10_000] {
        let index = populated(records);
        let exact = format!("{} {}", word(7), word(8));
        let fuzzy = format!("{}x {}", word(7), &word(8)[..4]);

        group.bench_with_input(BenchmarkId::new("exact", records), &exact, |b, q| {
            b.iter(|| black_box(index.search(q, 20, 1)));
        });
        group.bench_with_input(BenchmarkId::new("fuzzy", records), &fuzzy, |b, q| {
            b.iter(|| black_box(index.search(q, 20, 1)));
        });
        group.bench_with_input(BenchmarkId::new("count", records), &exact, |b, q| {
            b.iter(|| black_box(index.count_results(q)));
        });
    }

    group.finish();
}

// =============================================================================
// Indexing
// =============================================================================

fn indexing_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("indexing");
    let index = populated(1_000);

    group.bench_function("update_unchanged", |b| {
        let article = Article::generate(500);
        b.iter(|| black_box(index.update_search_index(&article).unwrap()));
    });

    group.bench_function("update_changed", |b| {
        let mut article = Article::generate(501);
        let mut n = 0u64;
        b.iter(|| {
            n += 1;
            article.title = format!("{} {}", word(n), word(n + 1));
            black_box(index.update_search_index(&article).unwrap())
        });
    });

    group.finish();
}

criterion_group!(
    name = search;
    config = Criterion::default().measurement_time(Duration::from_secs(10));
    targets = query_benchmarks, indexing_benchmarks
);

criterion_main!(search);
