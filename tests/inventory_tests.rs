// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

mod common;

use common::{record, setup};
use rusqlite::Connection;
use treasury::inventory::{self, InventoryPatch, NewInventoryItem, ReduceOutcome};
use treasury::links;
use treasury::models::{EntityKind, EntityRef, InventoryItem, InventoryStatus, TransactionKind, TransactionStatus};
use treasury::TreasuryError;

fn item(conn: &Connection, name: &str, quantity: i64, manual_count: i64) -> InventoryItem {
    inventory::create_item(
        conn,
        NewInventoryItem {
            name: name.into(),
            location: Some("Club room".into()),
            quantity,
            manual_count,
            ..Default::default()
        },
    )
    .unwrap()
}

#[test]
fn picker_lists_only_items_with_unaccounted_units() {
    let mut conn = setup();
    let t = record(&mut conn, TransactionKind::Expense, "120", TransactionStatus::Complete);
    let chairs = item(&conn, "Chairs", 10, 2);
    let kettle = item(&conn, "Kettle", 1, 0);
    let legacy = item(&conn, "Old projector", 1, 1);
    let gone = item(&conn, "Broken grill", 2, 0);
    inventory::soft_delete_item(&conn, gone.id, "broken", None).unwrap();

    inventory::link_item(&mut conn, chairs.id, t.id, 5).unwrap();
    inventory::link_item(&mut conn, kettle.id, t.id, 1).unwrap();

    let picker = inventory::get_items_for_picker(&conn).unwrap();
    assert_eq!(picker.len(), 1);
    assert_eq!(picker[0].item.id, chairs.id);
    assert_eq!(picker[0].available, 3);
    assert!(picker.iter().all(|p| p.item.id != legacy.id));
}

#[test]
fn linking_more_than_available_fails() {
    let mut conn = setup();
    let t1 = record(&mut conn, TransactionKind::Expense, "50", TransactionStatus::Complete);
    let t2 = record(&mut conn, TransactionKind::Expense, "50", TransactionStatus::Complete);
    let mugs = item(&conn, "Mugs", 6, 1);

    inventory::link_item(&mut conn, mugs.id, t1.id, 3).unwrap();
    let err = inventory::link_item(&mut conn, mugs.id, t2.id, 3).unwrap_err();
    match err {
        TreasuryError::InsufficientQuantity {
            item_id,
            available,
            requested,
        } => {
            assert_eq!(item_id, mugs.id);
            assert_eq!(available, 2);
            assert_eq!(requested, 3);
        }
        other => panic!("unexpected error {other}"),
    }

    // a second link on the same pair tops the first one up
    let topped = inventory::link_item(&mut conn, mugs.id, t1.id, 2).unwrap();
    assert_eq!(topped.quantity, 5);
    assert_eq!(inventory::get_item_links(&conn, mugs.id).unwrap().len(), 1);

    let err = inventory::link_item(&mut conn, mugs.id, t1.id, 0).unwrap_err();
    assert!(matches!(err, TreasuryError::InvalidData(_)));
}

#[test]
fn removed_and_legacy_items_cannot_be_linked() {
    let mut conn = setup();
    let t = record(&mut conn, TransactionKind::Expense, "9", TransactionStatus::Complete);
    let lamp = item(&conn, "Lamp", 2, 0);
    let removed = inventory::soft_delete_item(&conn, lamp.id, "lost", Some("after the summer party"))
        .unwrap()
        .unwrap();
    assert_eq!(removed.status, InventoryStatus::Removed);
    assert_eq!(removed.removal_reason.as_deref(), Some("lost"));
    assert_eq!(removed.removal_notes.as_deref(), Some("after the summer party"));
    assert!(removed.removed_at.is_some());
    assert!(inventory::get_item(&conn, lamp.id).unwrap().is_some());

    let err = inventory::link_item(&mut conn, lamp.id, t.id, 1).unwrap_err();
    assert!(matches!(err, TreasuryError::InactiveItem(id) if id == lamp.id));

    let drill = item(&conn, "Drill", 1, 0);
    let legacy = inventory::mark_as_legacy(&conn, drill.id, Some(1)).unwrap().unwrap();
    assert_eq!(legacy.status, InventoryStatus::Legacy);
    assert_eq!(legacy.manual_count, 1);
    assert!(matches!(
        inventory::link_item(&mut conn, drill.id, t.id, 1).unwrap_err(),
        TreasuryError::InactiveItem(_)
    ));
    assert!(inventory::get_active_items(&conn).unwrap().is_empty());
    assert!(inventory::mark_as_legacy(&conn, 404, None).unwrap().is_none());
}

#[test]
fn reducing_decrements_then_removes_the_link() {
    let mut conn = setup();
    let t = record(&mut conn, TransactionKind::Expense, "80", TransactionStatus::Complete);
    let tables = item(&conn, "Tables", 8, 0);
    inventory::link_item(&mut conn, tables.id, t.id, 5).unwrap();

    let partial = inventory::reduce_from_transaction(&mut conn, tables.id, t.id, 2)
        .unwrap()
        .unwrap();
    assert_eq!(
        partial,
        ReduceOutcome {
            link_removed: false,
            link_quantity: 3,
            item_quantity: 6,
        }
    );

    let full = inventory::reduce_from_transaction(&mut conn, tables.id, t.id, 3)
        .unwrap()
        .unwrap();
    assert!(full.link_removed);
    assert_eq!(full.link_quantity, 0);
    assert_eq!(full.item_quantity, 3);
    assert!(inventory::get_item_links(&conn, tables.id).unwrap().is_empty());

    assert!(inventory::reduce_from_transaction(&mut conn, tables.id, t.id, 1)
        .unwrap()
        .is_none());
}

#[test]
fn reducing_never_takes_quantity_below_zero() {
    let mut conn = setup();
    let t = record(&mut conn, TransactionKind::Expense, "30", TransactionStatus::Complete);
    let rake = item(&conn, "Rake", 2, 0);
    inventory::link_item(&mut conn, rake.id, t.id, 2).unwrap();
    // a count that drifted below the linked units
    conn.execute("UPDATE inventory_items SET quantity=1 WHERE id=?1", [rake.id])
        .unwrap();

    let outcome = inventory::reduce_from_transaction(&mut conn, rake.id, t.id, 5)
        .unwrap()
        .unwrap();
    assert!(outcome.link_removed);
    assert_eq!(outcome.item_quantity, 0);
    assert_eq!(inventory::get_item(&conn, rake.id).unwrap().unwrap().quantity, 0);
}

#[test]
fn hard_delete_drops_links() {
    let mut conn = setup();
    let t = record(&mut conn, TransactionKind::Expense, "15", TransactionStatus::Complete);
    let ladder = item(&conn, "Ladder", 1, 0);
    inventory::link_item(&mut conn, ladder.id, t.id, 1).unwrap();
    links::link_entities(
        &conn,
        EntityRef::new(EntityKind::InventoryItem, ladder.id),
        EntityRef::new(EntityKind::Transaction, t.id),
    )
    .unwrap();

    assert!(inventory::delete_item(&mut conn, ladder.id).unwrap());
    assert!(inventory::get_item(&conn, ladder.id).unwrap().is_none());
    assert!(inventory::get_item_links(&conn, ladder.id).unwrap().is_empty());
    let related =
        links::related_entities(&conn, EntityRef::new(EntityKind::Transaction, t.id), None).unwrap();
    assert!(related.is_empty());
    assert!(!inventory::delete_item(&mut conn, ladder.id).unwrap());
}

#[test]
fn negative_counts_are_rejected() {
    let conn = setup();
    let err = inventory::create_item(
        &conn,
        NewInventoryItem {
            name: "Ghost".into(),
            quantity: -1,
            ..Default::default()
        },
    )
    .unwrap_err();
    assert!(matches!(err, TreasuryError::InvalidData(_)));
}

#[test]
fn quantity_must_cover_linked_and_manual_units() {
    let mut conn = setup();
    let t = record(&mut conn, TransactionKind::Expense, "40", TransactionStatus::Complete);
    let benches = item(&conn, "Benches", 5, 1);
    inventory::link_item(&mut conn, benches.id, t.id, 3).unwrap();

    let err = inventory::update_item(
        &mut conn,
        benches.id,
        InventoryPatch {
            quantity: Some(3),
            ..Default::default()
        },
    )
    .unwrap_err();
    match err {
        TreasuryError::InsufficientQuantity {
            item_id,
            available,
            requested,
        } => {
            assert_eq!(item_id, benches.id);
            assert_eq!(available, 3);
            assert_eq!(requested, 4);
        }
        other => panic!("unexpected error {other}"),
    }
    let err = inventory::update_item(
        &mut conn,
        benches.id,
        InventoryPatch {
            manual_count: Some(3),
            ..Default::default()
        },
    )
    .unwrap_err();
    assert!(matches!(err, TreasuryError::InsufficientQuantity { .. }));
    assert_eq!(inventory::get_item(&conn, benches.id).unwrap().unwrap().quantity, 5);

    let updated = inventory::update_item(
        &mut conn,
        benches.id,
        InventoryPatch {
            quantity: Some(4),
            location: Some("Yard".into()),
            ..Default::default()
        },
    )
    .unwrap()
    .unwrap();
    assert_eq!(updated.quantity, 4);
    assert_eq!(updated.location.as_deref(), Some("Yard"));
    assert!(inventory::update_item(&mut conn, 404, InventoryPatch::default())
        .unwrap()
        .is_none());
}
