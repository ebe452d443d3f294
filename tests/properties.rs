use std::collections::HashSet;
use std::rc::Rc;

use chrono::NaiveDate;
use personal_library::seed::SeedSource;
use personal_library::{BookDraft, LibraryStore, MemoryStore, SortDirection, SortField};
use proptest::prelude::*;
use serde_json::Value;

struct NoSeed;

impl SeedSource for NoSeed {
    fn fetch(&self) -> Result<Vec<Value>, String> {
        Ok(Vec::new())
    }

    fn describe(&self) -> String {
        "none".to_string()
    }
}

fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (1800i32..2030, 1u32..=12, 1u32..=28)
        .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

fn arb_draft() -> impl Strategy<Value = BookDraft> {
    (
        "[A-Za-z][A-Za-z ]{0,12}",
        "[A-Za-z][A-Za-z .]{0,12}",
        0u32..3000,
        arb_date(),
        arb_date(),
        any::<bool>(),
    )
        .prop_map(|(title, author, pages, published, acquired, status)| BookDraft {
            title: title.trim().to_string(),
            author: author.trim().to_string(),
            pages,
            published,
            acquired,
            status,
        })
}

fn arb_field() -> impl Strategy<Value = SortField> {
    prop::sample::select(SortField::ALL.to_vec())
}

fn store_with(drafts: Vec<BookDraft>) -> LibraryStore {
    let mut store = LibraryStore::new(Rc::new(MemoryStore::new()), Box::new(NoSeed));
    store.initialize().unwrap();
    for draft in drafts {
        store.add_book(draft);
    }
    store
}

fn ids(store: &LibraryStore) -> Vec<String> {
    store.books().iter().map(|book| book.id.clone()).collect()
}

proptest! {
    #[test]
    fn descending_is_exact_reverse_of_ascending(
        drafts in prop::collection::vec(arb_draft(), 0..25),
        field in arb_field(),
    ) {
        let mut store = store_with(drafts);
        let original: HashSet<String> = ids(&store).into_iter().collect();

        store.sort_by(field, SortDirection::Ascending);
        let ascending = ids(&store);
        store.sort_by(field, SortDirection::Ascending);
        prop_assert_eq!(&ids(&store), &ascending);

        store.sort_by(field, SortDirection::Descending);
        let mut descending = ids(&store);
        descending.reverse();
        prop_assert_eq!(&descending, &ascending);

        let sorted: HashSet<String> = ascending.into_iter().collect();
        prop_assert_eq!(sorted, original);
    }

    #[test]
    fn add_assigns_unique_ids(drafts in prop::collection::vec(arb_draft(), 1..25)) {
        let count = drafts.len();
        let store = store_with(drafts);
        let unique: HashSet<String> = ids(&store).into_iter().collect();
        prop_assert_eq!(unique.len(), count);
        prop_assert_eq!(store.statistics().total, count);
    }

    #[test]
    fn statistics_partition_the_collection(
        drafts in prop::collection::vec(arb_draft(), 0..25),
        trash in prop::collection::vec(any::<bool>(), 25),
    ) {
        let mut store = store_with(drafts);
        let doomed: Vec<String> = ids(&store)
            .into_iter()
            .zip(trash)
            .filter_map(|(id, delete)| delete.then_some(id))
            .collect();
        store.delete_many(&doomed);

        let stats = store.statistics();
        prop_assert_eq!(stats.total, stats.read + stats.unread);
        prop_assert_eq!(stats.total + stats.trash, store.len());
        prop_assert_eq!(stats.trash, doomed.len());
    }

    #[test]
    fn delete_then_restore_round_trips(
        drafts in prop::collection::vec(arb_draft(), 1..10),
        pick in any::<prop::sample::Index>(),
    ) {
        let mut store = store_with(drafts);
        let id = pick.get(store.books()).id.clone();
        let before = store.get(&id).unwrap().clone();

        store.delete_book(&id).unwrap();
        store.restore_book(&id).unwrap();
        prop_assert_eq!(store.get(&id).unwrap(), &before);

        store.toggle_status(&id).unwrap();
        store.toggle_status(&id).unwrap();
        prop_assert_eq!(store.get(&id).unwrap().status, before.status);
    }

    #[test]
    fn erase_is_idempotent(
        drafts in prop::collection::vec(arb_draft(), 1..10),
        pick in any::<prop::sample::Index>(),
    ) {
        let mut store = store_with(drafts);
        let id = pick.get(store.books()).id.clone();
        let len = store.len();

        prop_assert!(store.erase_book(&id));
        prop_assert!(store.get(&id).is_none());
        prop_assert!(!store.erase_book(&id));
        prop_assert_eq!(store.len(), len - 1);
        prop_assert!(store.delete_book(&id).is_err());
    }
}
