//! Snapshot synchronization tests.

use std::sync::Arc;

use horizon_feed::{
    Color, ColorGenerator, DiffableDataSource, FeedError, IdentifierScope, IndexPath, ListSynchronizer,
    Snapshot,
};
use parking_lot::Mutex;

fn single(items: &[&'static str]) -> Snapshot<&'static str, &'static str> {
    Snapshot::from_sections([("main", items.to_vec())])
}

#[test]
fn test_apply_then_read_back_preserves_order() {
    let sync = ListSynchronizer::new();
    let snapshot = Snapshot::from_sections([
        ("top", vec!["a", "b"]),
        ("middle", vec![]),
        ("bottom", vec!["c"]),
    ]);

    sync.apply(snapshot.clone(), false).unwrap();

    let retained = sync.snapshot();
    assert_eq!(retained, snapshot);
    assert_eq!(retained.section_identifiers(), vec!["top", "middle", "bottom"]);
    assert_eq!(retained.item_identifiers(), vec!["a", "b", "c"]);
}

#[test]
fn test_reapplying_same_snapshot_is_empty() {
    let sync = ListSynchronizer::new();
    let colors = ColorGenerator::seeded(3).generate(201);
    let snapshot = Snapshot::from_sections([(0u8, colors)]);

    let first = sync.apply(snapshot.clone(), false).unwrap();
    assert_eq!(first.inserted.len(), 201);

    let second = sync.apply(snapshot, true).unwrap();
    assert!(second.is_empty());
}

#[test]
fn test_swap_yields_two_moves() {
    let sync = ListSynchronizer::new();
    sync.apply(single(&["a", "b", "c", "d", "e"]), false).unwrap();

    let diff = sync.apply(single(&["a", "d", "c", "b", "e"]), true).unwrap();

    assert!(diff.inserted.is_empty());
    assert!(diff.removed.is_empty());
    assert_eq!(diff.moved.len(), 2);
    let mut moved = diff.moved_items();
    moved.sort();
    assert_eq!(moved, vec![&"b", &"d"]);
}

#[test]
fn test_add_one_remove_one() {
    let sync = ListSynchronizer::new();
    sync.apply(single(&["a", "b", "c"]), false).unwrap();

    let diff = sync.apply(single(&["a", "c", "d"]), true).unwrap();

    assert_eq!(diff.inserted_items(), vec![&"d"]);
    assert_eq!(diff.inserted[0].index_path, IndexPath::new(0, 2));
    assert_eq!(diff.removed_items(), vec![&"b"]);
    assert_eq!(diff.removed[0].index_path, IndexPath::new(0, 1));
    assert!(diff.moved.is_empty());
}

#[test]
fn test_rotation_reports_moves_only() {
    let sync = ListSynchronizer::new();
    sync.apply(single(&["A", "B", "C"]), false).unwrap();

    let diff = sync.apply(single(&["C", "A", "B"]), true).unwrap();

    assert!(diff.inserted.is_empty());
    assert!(diff.removed.is_empty());
    // Every item changes ordinal among the retained items.
    assert_eq!(diff.moved.len(), 3);

    let minimal: Vec<_> = diff.minimal_moves().iter().map(|m| m.item).collect();
    assert_eq!(minimal, vec!["C"]);
}

#[test]
fn test_duplicate_rejected_before_mutation() {
    let sync = ListSynchronizer::new();
    sync.apply(single(&["a", "b"]), false).unwrap();

    let notifications = Arc::new(Mutex::new(0));
    let counter = notifications.clone();
    sync.signals().did_apply.connect(move |_| *counter.lock() += 1);

    let err = sync.apply(single(&["x", "y", "x"]), true).unwrap_err();
    match err {
        FeedError::DuplicateIdentifier { scope, identifier } => {
            assert_eq!(scope, IdentifierScope::Item);
            assert_eq!(identifier, "\"x\"");
        }
        other => panic!("unexpected error: {other}"),
    }

    assert_eq!(sync.snapshot(), single(&["a", "b"]));
    assert_eq!(sync.generation(), 1);
    assert_eq!(*notifications.lock(), 0);
}

#[test]
fn test_signed_zero_colors_are_duplicates() {
    let sync: ListSynchronizer<u8, Color> = ListSynchronizer::new();
    let snapshot = Snapshot::from_sections([(
        0,
        vec![Color::from_rgb(0.0, 0.5, 0.5), Color::from_rgb(-0.0, 0.5, 0.5)],
    )]);

    let err = sync.apply(snapshot, false).unwrap_err();
    assert!(err.is_duplicate_identifier());
    assert_eq!(sync.generation(), 0);
}

#[test]
fn test_nan_color_snapshot_reapplies_as_empty_diff() {
    let sync: ListSynchronizer<u8, Color> = ListSynchronizer::new();
    let snapshot = Snapshot::from_sections([(
        0,
        vec![Color::from_rgb(f32::NAN, 0.1, 0.2), Color::from_rgb(0.3, 0.4, 0.5)],
    )]);

    sync.apply(snapshot.clone(), false).unwrap();
    let diff = sync.apply(snapshot, true).unwrap();
    assert!(diff.is_empty(), "unexpected changes: {:?}", diff.summary());
}

#[test]
fn test_duplicate_section_rejected() {
    let sync: ListSynchronizer<&str, u32> = ListSynchronizer::new();
    let snapshot = Snapshot::from_sections([("s", vec![1]), ("s", vec![2])]);

    let err = sync.apply(snapshot, false).unwrap_err();
    assert!(matches!(
        err,
        FeedError::DuplicateIdentifier {
            scope: IdentifierScope::Section,
            ..
        }
    ));
    assert!(sync.snapshot().is_empty());
}

#[test]
fn test_one_notification_per_apply() {
    let sync = ListSynchronizer::new();
    let log = Arc::new(Mutex::new(Vec::new()));

    let will = log.clone();
    sync.signals()
        .will_apply
        .connect(move |generation| will.lock().push(format!("will {generation}")));
    let did = log.clone();
    sync.signals().did_apply.connect(move |update| {
        did.lock()
            .push(format!("did {} animate={}", update.generation, update.animate))
    });

    sync.apply(single(&["a"]), false).unwrap();
    sync.apply(single(&["b"]), true).unwrap();

    assert_eq!(
        *log.lock(),
        vec!["will 1", "did 1 animate=false", "will 2", "did 2 animate=true"]
    );
}

#[test]
fn test_empty_snapshot_applies() {
    let sync: ListSynchronizer<u8, u8> = ListSynchronizer::new();
    let diff = sync.apply(Snapshot::new(), false).unwrap();
    assert!(diff.is_empty());
    assert_eq!(sync.generation(), 1);

    sync.apply(Snapshot::from_sections([(0, vec![1, 2])]), false).unwrap();
    let diff = sync.apply(Snapshot::new(), true).unwrap();
    assert_eq!(diff.removed.len(), 2);
    assert_eq!(diff.removed_sections.len(), 1);
}

#[test]
fn test_items_moving_between_sections() {
    let sync = ListSynchronizer::new();
    sync.apply(
        Snapshot::from_sections([("inbox", vec![1, 2, 3]), ("archive", vec![4])]),
        false,
    )
    .unwrap();

    let mut next = sync.snapshot();
    next.move_item_after(&2, &4).unwrap();
    let diff = sync.apply(next, true).unwrap();

    assert_eq!(diff.moved.len(), 1);
    assert_eq!(diff.moved[0].item, 2);
    assert_eq!(diff.moved[0].from, IndexPath::new(0, 1));
    assert_eq!(diff.moved[0].to, IndexPath::new(1, 1));
    assert!(diff.moved[0].section_changed);
}

#[test]
fn test_data_source_reflects_latest_apply() {
    let source = DiffableDataSource::new(|path: &IndexPath, item: &u32| (*path, *item));
    source
        .apply(Snapshot::from_sections([("main", vec![10, 20, 30])]), false)
        .unwrap();

    let mut next = source.snapshot();
    next.delete_items(&[10]);
    source.apply(next, true).unwrap();

    assert_eq!(source.number_of_items_in_section(0), 2);
    assert_eq!(source.cell_for(IndexPath::new(0, 0)).unwrap(), (IndexPath::new(0, 0), 20));
    assert_eq!(source.index_path(&30), Some(IndexPath::new(0, 1)));
    assert_eq!(source.item_identifier(IndexPath::new(0, 2)), None);
}

#[test]
fn test_concurrent_applies_get_distinct_generations() {
    let sync: Arc<ListSynchronizer<u8, u32>> = Arc::new(ListSynchronizer::new());
    let log = Arc::new(Mutex::new(Vec::new()));

    let will = log.clone();
    sync.signals()
        .will_apply
        .connect(move |&generation| will.lock().push(("will", generation)));
    let did = log.clone();
    sync.signals()
        .did_apply
        .connect(move |update| did.lock().push(("did", update.generation)));

    let writers: Vec<_> = (0..4u32)
        .map(|writer| {
            let sync = sync.clone();
            std::thread::spawn(move || {
                for round in 0..25 {
                    let items = vec![writer * 100 + round, 1000 + writer];
                    sync.apply(Snapshot::from_sections([(0, items)]), false).unwrap();
                }
            })
        })
        .collect();
    for writer in writers {
        writer.join().unwrap();
    }

    assert_eq!(sync.generation(), 100);
    let log = log.lock();
    assert_eq!(log.len(), 200);
    for (pair, expected) in log.chunks(2).zip(1u64..) {
        assert_eq!(pair, [("will", expected), ("did", expected)]);
    }
}

#[test]
fn test_concurrent_readers_during_applies() {
    let sync = Arc::new(ListSynchronizer::new());
    sync.apply(single(&["a", "b", "c"]), false).unwrap();

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let sync = sync.clone();
            std::thread::spawn(move || {
                for _ in 0..100 {
                    let snapshot = sync.snapshot();
                    assert!(snapshot.validate().is_ok());
                    assert_eq!(snapshot.number_of_items(), 3);
                }
            })
        })
        .collect();

    for _ in 0..50 {
        sync.apply(single(&["c", "b", "a"]), true).unwrap();
        sync.apply(single(&["a", "b", "c"]), true).unwrap();
    }

    for reader in readers {
        reader.join().unwrap();
    }
    assert_eq!(sync.generation(), 101);
}
