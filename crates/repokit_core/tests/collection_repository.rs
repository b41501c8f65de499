use indexmap::IndexSet;
use repokit_core::{
    CollectionRepository, Filter, FilteredRepository, PaginatedRepository, PaginationData,
    Repository,
};
use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};

fn seeded_strings() -> CollectionRepository<String> {
    let mut repo = CollectionRepository::new();
    for value in ["a", "b", "c"] {
        repo.add(&mut value.to_string()).unwrap();
    }
    repo
}

fn equals(expected: &str) -> Filter<'_, String> {
    Filter::predicate(move |value: &String| value == expected)
}

#[test]
fn get_collection_returns_matching_entities() {
    let repo = seeded_strings();

    assert_eq!(repo.get_collection(&equals("b")).unwrap(), vec!["b"]);
    assert!(repo.get_collection(&equals("z")).unwrap().is_empty());
}

#[test]
fn get_entity_returns_first_match_or_none() {
    let repo = seeded_strings();

    assert_eq!(repo.get_entity(&equals("b")).unwrap().as_deref(), Some("b"));
    assert_eq!(repo.get_entity(&equals("z")).unwrap(), None);
    assert_eq!(repo.get_entity(&Filter::all()).unwrap().as_deref(), Some("a"));
}

#[test]
fn get_entity_agrees_with_get_collection() {
    let repo = seeded_strings();

    for probe in ["a", "b", "c", "z"] {
        let collection = repo.get_collection(&equals(probe)).unwrap();
        let entity = repo.get_entity(&equals(probe)).unwrap();
        assert_eq!(entity, collection.first().cloned());
    }
}

#[test]
fn update_existing_keeps_size() {
    let mut repo = seeded_strings();

    repo.update(&mut "c".to_string()).unwrap();
    let all = repo.get_all().unwrap();
    assert_eq!(all.len(), 3);
    assert!(all.contains(&"c".to_string()));
}

#[test]
fn update_missing_does_not_insert() {
    let mut repo = seeded_strings();

    repo.update(&mut "d".to_string()).unwrap();
    let all = repo.get_all().unwrap();
    assert_eq!(all.len(), 3);
    assert!(!all.contains(&"d".to_string()));
}

#[test]
fn remove_is_idempotent() {
    let mut repo = seeded_strings();

    repo.remove(&"b".to_string()).unwrap();
    repo.remove(&"b".to_string()).unwrap();
    assert_eq!(repo.get_all().unwrap(), vec!["a", "c"]);
}

#[test]
fn returned_collections_are_independent() {
    let repo = seeded_strings();

    let mut all = repo.get_all().unwrap();
    all.clear();
    let mut filtered = repo.get_collection(&Filter::all()).unwrap();
    filtered.push("x".to_string());

    assert_eq!(repo.get_all().unwrap(), vec!["a", "b", "c"]);
    assert_eq!(repo.get_collection(&Filter::all()).unwrap().len(), 3);
}

#[test]
fn default_store_keeps_duplicates_in_insertion_order() {
    let mut repo = CollectionRepository::new();
    for value in [3, 1, 3, 2] {
        repo.add(&mut { value }).unwrap();
    }

    assert_eq!(repo.get_all().unwrap(), vec![3, 1, 3, 2]);

    repo.remove(&3).unwrap();
    assert_eq!(repo.get_all().unwrap(), vec![1, 3, 2]);
}

#[test]
fn set_stores_keep_each_entity_once() {
    let mut ordered = CollectionRepository::with_store(IndexSet::new());
    let mut sorted = CollectionRepository::with_store(BTreeSet::new());
    for value in [3, 1, 3, 2] {
        ordered.add(&mut { value }).unwrap();
        sorted.add(&mut { value }).unwrap();
    }

    assert_eq!(ordered.get_all().unwrap(), vec![3, 1, 2]);
    assert_eq!(sorted.get_all().unwrap(), vec![1, 2, 3]);
}

/// Equal by name only; `revision` is payload that `update` must carry over.
#[derive(Debug, Clone)]
struct Named {
    name: &'static str,
    revision: u32,
}

impl PartialEq for Named {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Named {}

impl Hash for Named {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

fn named(name: &'static str, revision: u32) -> Named {
    Named { name, revision }
}

#[test]
fn update_replaces_equal_entity_with_new_value() {
    let mut repo = CollectionRepository::with_store(IndexSet::new());
    for name in ["a", "b", "c"] {
        repo.add(&mut named(name, 0)).unwrap();
    }

    repo.update(&mut named("a", 1)).unwrap();
    repo.update(&mut named("d", 1)).unwrap();

    let all = repo.get_all().unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[0].name, "a");
    assert_eq!(all[0].revision, 1);
    assert!(!all.contains(&named("d", 1)));
}

#[test]
fn upsert_adds_then_replaces() {
    let mut repo = CollectionRepository::new();

    repo.upsert(&mut named("a", 0)).unwrap();
    repo.upsert(&mut named("a", 2)).unwrap();

    let all = repo.get_all().unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].revision, 2);
}

#[test]
fn cleanup_through_get_collection_empties_repository() {
    let mut repo = seeded_strings();

    for entity in repo.get_collection(&Filter::all()).unwrap() {
        repo.remove(&entity).unwrap();
    }
    assert!(repo.is_empty());
}

#[test]
fn pagination_slices_in_source_order() {
    let mut repo = CollectionRepository::new();
    for value in 0..10 {
        repo.add(&mut { value }).unwrap();
    }

    let second = PaginationData::new(2, 5).unwrap();
    assert_eq!(repo.get_all_paged(&second).unwrap(), vec![5, 6, 7, 8, 9]);

    let beyond = PaginationData::new(3, 5).unwrap();
    assert!(repo.get_all_paged(&beyond).unwrap().is_empty());

    let last = PaginationData::new(4, 3).unwrap();
    assert_eq!(repo.get_all_paged(&last).unwrap(), vec![9]);
}

#[test]
fn filtered_pagination_applies_filter_before_window() {
    let mut repo = CollectionRepository::new();
    for value in 0..20 {
        repo.add(&mut { value }).unwrap();
    }

    let even = Filter::predicate(|value: &i32| value % 2 == 0);
    let page = repo
        .get_collection_paged(&even, &PaginationData::new(2, 3).unwrap())
        .unwrap();
    assert_eq!(page, vec![6, 8, 10]);
}

#[test]
fn filtered_page_beyond_matches_is_empty() {
    let mut repo = CollectionRepository::new();
    for value in 0..20 {
        repo.add(&mut { value }).unwrap();
    }

    let even = Filter::predicate(|value: &i32| value % 2 == 0);
    let page = repo
        .get_collection_paged(&even, &PaginationData::new(3, 5).unwrap())
        .unwrap();
    assert!(page.is_empty());
}
