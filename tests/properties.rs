//! Property tests for the query engine and the store.

use proptest::prelude::*;
use std::collections::HashSet;
use tempfile::TempDir;
use toy_catalog::query::{count, query, Page};
use toy_catalog::{
    LabelMatch, SortBy, SortField, SortOrder, StockFilter, StoreConfig, Timestamp, Toy, ToyDraft,
    ToyFilter, ToyId, ToyPatch, ToyStore,
};

const NAMES: &[&str] = &["Robot", "ball", "Ballerina", "kite", "Kit", "Yo-yo", "robot dog"];
const LABELS: &[&str] = &["tech", "kids", "sport", "outdoor"];

fn arb_toy() -> impl Strategy<Value = (usize, u32, bool, Vec<usize>, i64)> {
    (
        0..NAMES.len(),
        0u32..50,
        any::<bool>(),
        prop::collection::vec(0..LABELS.len(), 0..3),
        0i64..20,
    )
}

fn build(raw: Vec<(usize, u32, bool, Vec<usize>, i64)>) -> Vec<Toy> {
    raw.into_iter()
        .enumerate()
        .map(|(i, (name, price, in_stock, labels, created))| Toy {
            id: ToyId(format!("t{}", i)),
            name: NAMES[name].to_string(),
            price: price as f64,
            in_stock,
            labels: labels.into_iter().map(|l| LABELS[l].to_string()).collect(),
            created_at: Timestamp(created),
            owner: None,
            messages: vec![],
        })
        .collect()
}

fn arb_filter() -> impl Strategy<Value = ToyFilter> {
    (
        prop::sample::select(vec!["", "rob", "BALL", "kit", "^k"]),
        prop::sample::select(vec![StockFilter::All, StockFilter::InStock, StockFilter::OutOfStock]),
        prop::collection::vec(0..LABELS.len(), 0..3),
        any::<bool>(),
    )
        .prop_map(|(txt, stock, labels, any)| {
            ToyFilter::new()
                .text(txt)
                .stock(stock)
                .labels(labels.into_iter().map(|l| LABELS[l]))
                .label_match(if any { LabelMatch::Any } else { LabelMatch::All })
        })
}

fn arb_sort() -> impl Strategy<Value = SortBy> {
    (
        prop::sample::select(vec![SortField::Name, SortField::Price, SortField::CreatedAt]),
        any::<bool>(),
    )
        .prop_map(|(field, desc)| {
            SortBy::new(field, if desc { SortOrder::Desc } else { SortOrder::Asc })
        })
}

fn id_set(toys: &[Toy]) -> HashSet<ToyId> {
    toys.iter().map(|t| t.id.clone()).collect()
}

proptest! {
    #[test]
    fn filters_compose_as_intersection(
        raw in prop::collection::vec(arb_toy(), 0..30),
        filter in arb_filter(),
    ) {
        let toys = build(raw);
        let sort = SortBy::default();

        let combined = id_set(&query(&toys, &filter, &sort, None));

        let by_text = id_set(&query(&toys, &ToyFilter::new().text(filter.txt.clone()), &sort, None));
        let by_stock = id_set(&query(&toys, &ToyFilter::new().stock(filter.stock), &sort, None));
        let by_labels = id_set(&query(
            &toys,
            &ToyFilter::new().labels(filter.labels.clone()).label_match(filter.label_match),
            &sort,
            None,
        ));

        let expected: HashSet<ToyId> = by_text
            .intersection(&by_stock)
            .cloned()
            .collect::<HashSet<_>>()
            .intersection(&by_labels)
            .cloned()
            .collect();

        prop_assert_eq!(combined.len(), count(&toys, &filter));
        prop_assert_eq!(combined, expected);
    }

    #[test]
    fn pages_concatenate_to_full_result(
        raw in prop::collection::vec(arb_toy(), 0..40),
        filter in arb_filter(),
        sort in arb_sort(),
        size in 1usize..7,
    ) {
        let toys = build(raw);
        let full = query(&toys, &filter, &sort, None);

        let mut stitched = Vec::new();
        let mut index = 0;
        loop {
            let page = query(&toys, &filter, &sort, Some(Page::new(index, size)));
            if page.is_empty() {
                break;
            }
            prop_assert!(page.len() <= size);
            stitched.extend(page);
            index += 1;
        }

        prop_assert_eq!(stitched, full);
    }

    #[test]
    fn sort_is_ordered_and_stable(
        raw in prop::collection::vec(arb_toy(), 0..30),
        sort in arb_sort(),
    ) {
        let toys = build(raw);
        let position = |id: &ToyId| toys.iter().position(|t| &t.id == id).unwrap();
        let sorted = query(&toys, &ToyFilter::default(), &sort, None);

        prop_assert_eq!(sorted.len(), toys.len());
        for pair in sorted.windows(2) {
            let ord = sort.compare(&pair[0], &pair[1]);
            prop_assert!(ord != std::cmp::Ordering::Greater);
            if ord == std::cmp::Ordering::Equal {
                prop_assert!(position(&pair[0].id) < position(&pair[1].id));
            }
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn created_ids_are_unique(names in prop::collection::vec("[a-z]{1,8}", 1..40)) {
        let dir = TempDir::new().unwrap();
        let store = ToyStore::open(StoreConfig {
            id_length: 3,
            ..StoreConfig::at(dir.path().join("toy.json"))
        })
        .unwrap();

        for name in &names {
            store.create(ToyDraft::new(name.clone(), 1.0), None).unwrap();
        }

        let snapshot = store.snapshot();
        prop_assert_eq!(id_set(&snapshot).len(), names.len());
    }

    #[test]
    fn update_preserves_created_at(
        name in prop::option::of("[A-Za-z]{1,10}"),
        price in prop::option::of(0.0f64..1000.0),
        in_stock in prop::option::of(any::<bool>()),
    ) {
        let dir = TempDir::new().unwrap();
        let store = ToyStore::open(StoreConfig::at(dir.path().join("toy.json"))).unwrap();
        let toy = store.create(ToyDraft::new("Robot", 10.0), None).unwrap();

        let patch = ToyPatch {
            id: toy.id.clone(),
            name,
            price,
            in_stock,
            labels: None,
        };
        if patch.is_empty() {
            return Ok(());
        }

        let updated = store.update(patch).unwrap();
        prop_assert_eq!(updated.created_at, toy.created_at);
        prop_assert_eq!(store.get(&toy.id).unwrap().created_at, toy.created_at);
    }
}
