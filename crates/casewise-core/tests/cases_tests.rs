use casewise_core::cases::{CaseSource, SolutionStep, DATA_ANALYSIS};
use casewise_core::{Case, CaseFilter, CaseStore, Difficulty};
use std::collections::HashSet;
use std::io::Write;

const PACKAGED_CASES: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../data/cases.json");

fn store_from_file(json: &str) -> (tempfile::NamedTempFile, CaseStore) {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(json.as_bytes()).unwrap();
    let store = CaseStore::load(file.path());
    (file, store)
}

#[test]
fn test_well_formed_file() {
    let (file, store) = store_from_file(
        r#"[
            {"id": "A1", "title": "First", "category": "Strategy", "difficulty": "low"},
            {"id": "A2", "title": "Second", "category": "HR", "difficulty": "high"}
        ]"#,
    );

    assert!(!store.is_placeholder());
    assert_eq!(store.source(), &CaseSource::File(file.path().to_path_buf()));
    assert_eq!(store.len(), 2);
    for case in store.list_all() {
        assert!(!case.id.is_empty());
        assert!(!case.title.is_empty());
    }
}

#[test]
fn test_packaged_cases_load() {
    let store = CaseStore::load(PACKAGED_CASES);
    assert!(!store.is_placeholder());
    assert!(store.len() >= 3);

    let legacy = store.get_by_id("C003").unwrap();
    let view = legacy.view();
    assert_eq!(view.heading, "Staged Investment Decision");
    assert_eq!(view.sections[1].title, DATA_ANALYSIS);
    assert!(matches!(view.solution[0], SolutionStep::Phase(_)));
}

#[test]
fn test_missing_file_yields_placeholder() {
    let dir = tempfile::tempdir().unwrap();
    let store = CaseStore::load(dir.path().join("nope.json"));

    assert!(store.is_placeholder());
    assert_eq!(store.list_all(), &[Case::placeholder()]);
    assert_eq!(store.list_all()[0].difficulty, Difficulty::Medium);
}

#[test]
fn test_malformed_file_yields_placeholder() {
    let (_file, store) = store_from_file("{ this is not json");
    assert!(store.is_placeholder());
    assert_eq!(store.len(), 1);
    assert_eq!(store.list_all()[0].id, "C001");
}

#[test]
fn test_get_by_id_round_trip() {
    let store = CaseStore::load(PACKAGED_CASES);
    for case in store.list_all() {
        assert_eq!(store.get_by_id(&case.id), Some(case));
    }
    assert_eq!(store.get_by_id("does-not-exist"), None);
}

#[test]
fn test_category_union_reconstructs_store() {
    let store = CaseStore::from_json_str(
        r#"[
            {"id": "1", "category": "Strategy"},
            {"id": "2", "category": "HR"},
            {"id": "3"},
            {"id": "4", "category": "Strategy"},
            {"id": "5", "category": "Finance"}
        ]"#,
    );

    let mut seen = Vec::new();
    for category in store.categories() {
        let filter = CaseFilter::Category(category.to_string());
        let matched = store.filter_by(&filter);
        assert!(matched.iter().all(|c| c.category == category));
        seen.extend(matched.into_iter().map(|c| c.id.clone()));
    }

    let unique: HashSet<_> = seen.iter().collect();
    assert_eq!(unique.len(), seen.len(), "a case appeared under two categories");
    assert_eq!(seen.len(), store.len());
}

#[test]
fn test_filter_by_difficulty_keeps_order() {
    let store = CaseStore::from_json_str(
        r#"[
            {"id": "C1", "title": "One", "difficulty": "medium"},
            {"id": "C2", "title": "Two", "difficulty": "high"},
            {"id": "C3", "title": "Three", "difficulty": "中等"}
        ]"#,
    );

    let medium: Vec<&str> = store
        .filter_by(&CaseFilter::Difficulty(Difficulty::Medium))
        .iter()
        .map(|c| c.id.as_str())
        .collect();
    assert_eq!(medium, vec!["C1", "C3"]);
}

#[test]
fn test_records_without_id_are_skipped() {
    let store = CaseStore::from_json_str(r#"[{"title": "No id"}, {"id": "X", "title": "Kept"}]"#);
    assert!(!store.is_placeholder());
    assert_eq!(store.len(), 1);
    assert_eq!(store.list_all()[0].id, "X");
}
