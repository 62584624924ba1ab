//! Tier 3: Ranking scenarios through the facade

use fuzzdex::{MatchType, SearchConfig};

use crate::test_utils::{config, index, index_with, Person, PEOPLE};

fn add(index: &fuzzdex::SearchIndex, people: &crate::test_utils::People, person: Person) {
    people.0.lock().insert(person.id, person.clone());
    index.create_search_index(&person).unwrap();
}

// === Match quality ===

#[test]
fn test_exact_outranks_sound_alike() {
    let (index, people) = index();
    add(&index, &people, Person::new(1, "Smyth", ""));
    add(&index, &people, Person::new(2, "Smith", ""));

    let hits = index.find_results("smith", 10, 1);
    let ids: Vec<u64> = hits.iter().map(|h| h.record_id).collect();
    assert_eq!(ids, vec![2, 1]);
    assert!(hits[0].score > hits[1].score);
}

#[test]
fn test_more_terms_outrank_heavier_single_term() {
    let (index, people) = index();
    add(&index, &people, Person::new(1, "Ann", "ann ann ann"));
    add(&index, &people, Person::new(2, "Ann Lee", ""));

    let hits = index.find_results("ann lee", 10, 1);
    assert_eq!(hits[0].record_id, 2);
    assert_eq!(hits.len(), 2);
}

#[test]
fn test_name_outranks_bio() {
    let (index, people) = index();
    add(&index, &people, Person::new(1, "Robert", "ann"));
    add(&index, &people, Person::new(2, "Ann", "robert"));

    assert_eq!(index.find_results("ann", 10, 1)[0].record_id, 2);
    assert_eq!(index.find_results("robert", 10, 1)[0].record_id, 1);
}

#[test]
fn test_exact_only_config_skips_fuzzy() {
    let (index, people) = index_with(SearchConfig {
        perform_match_types: vec![MatchType::Exact],
        ..config()
    });
    add(&index, &people, Person::new(1, "Smyth", ""));
    add(&index, &people, Person::new(2, "Smith", ""));

    let hits = index.find_results("smith", 10, 1);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].record_id, 2);
}

// === Priority ===

#[test]
fn test_priority_breaks_equal_text() {
    let (index, people) = index();
    let mut low = Person::new(1, "Lee", "");
    low.priority = Some(0.2);
    let mut high = Person::new(2, "Lee", "");
    high.priority = Some(0.9);
    add(&index, &people, low);
    add(&index, &people, high);

    let ids: Vec<u64> = index
        .find_results("lee", 10, 1)
        .iter()
        .map(|h| h.record_id)
        .collect();
    assert_eq!(ids, vec![2, 1]);
}

#[test]
fn test_equal_scores_order_by_row() {
    let (index, people) = index();
    for id in [9, 3, 6] {
        add(&index, &people, Person::new(id, "Li", ""));
    }
    let ids: Vec<u64> = index
        .find_results("li", 10, 1)
        .iter()
        .map(|h| h.record_id)
        .collect();
    assert_eq!(ids, vec![3, 6, 9]);
}

// === Pages and models ===

#[test]
fn test_search_page_and_models() {
    let (index, people) = index();
    for id in 1..=7 {
        add(&index, &people, Person::new(id, "Anne", ""));
    }

    let page = index.search("anne", 3, 3);
    assert_eq!(page.total, 7);
    assert_eq!(page.total, index.count_results("anne"));
    assert_eq!(page.hits.len(), 1);
    assert_eq!(page.hits[0].record_id, 7);

    let first = index.search("anne", 3, 1);
    let records = index.models(&first.hits).unwrap();
    let ids: Vec<u64> = records.iter().map(|r| r.record_id()).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    assert!(records.iter().all(|r| r.type_name() == "Person"));
}

#[test]
fn test_models_skips_vanished_records() {
    let (index, people) = index();
    add(&index, &people, Person::new(1, "Bob", ""));
    add(&index, &people, Person::new(2, "Bob", ""));
    let hits = index.find_results("bob", 10, 1);

    people.0.lock().remove(&1);
    let records = index.models(&hits).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].record_id(), 2);
}

// === Indexing switch ===

#[test]
fn test_bulk_load_then_sync() {
    let (index, people) = index();
    index.without_indexing(|| {
        for id in 1..=5 {
            add(&index, &people, Person::new(id, "Robert Smith", ""));
        }
    });
    assert!(index.is_indexing_enabled());
    assert_eq!(index.count_results("robert"), 0);

    let report = index.sync_model(PEOPLE).unwrap();
    assert_eq!(report.inserted, 10);
    assert_eq!(index.count_results("robert"), 5);
}

// === Explain ===

#[test]
fn test_explain_reports_fuzzy_reach() {
    let (index, people) = index();
    add(&index, &people, Person::new(1, "Smith", ""));

    let explanation = index.explain("smyth");
    assert_eq!(explanation.terms, vec!["smyth"]);
    let exact = explanation
        .matchers
        .iter()
        .find(|m| m.match_type == MatchType::Exact)
        .unwrap();
    assert!(exact.matches.get("smyth").map_or(true, |w| w.is_empty()));
    let reached = explanation
        .matchers
        .iter()
        .any(|m| m.matches.get("smyth").map_or(false, |w| w.iter().any(|x| x == "smith")));
    assert!(reached);
}
