// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

mod common;

use common::{dec, day, expense_for_purchase, record, setup, submit_purchase};
use treasury::budgets::{self, NewBudget};
use treasury::commands::doctor;
use treasury::config;
use treasury::inventory::{self, NewInventoryItem};
use treasury::ledger::{self, NewTransaction};
use treasury::models::{TransactionKind, TransactionStatus};

fn kinds(conn: &rusqlite::Connection) -> Vec<&'static str> {
    doctor::find_issues(conn)
        .unwrap()
        .into_iter()
        .map(|i| i.kind)
        .collect()
}

#[test]
fn clean_books_report_nothing() {
    let mut conn = setup();
    let p = submit_purchase(&conn, "10", "aino");
    expense_for_purchase(&mut conn, p, "10");
    record(&mut conn, TransactionKind::Income, "100", TransactionStatus::Complete);
    assert!(doctor::find_issues(&conn).unwrap().is_empty());
}

#[test]
fn detects_orphaned_junction_rows() {
    let conn = setup();
    conn.execute_batch(
        "PRAGMA foreign_keys = OFF;
         INSERT INTO budget_transactions(budget_id, transaction_id, amount, created_at)
             VALUES (7, 8, '5', '2025-01-01 00:00:00+00:00');
         INSERT INTO inventory_item_transactions(item_id, transaction_id, quantity)
             VALUES (3, 4, 1);
         PRAGMA foreign_keys = ON;",
    )
    .unwrap();
    let found = kinds(&conn);
    assert!(found.contains(&"orphan_budget_link"));
    assert!(found.contains(&"orphan_inventory_link"));
}

#[test]
fn detects_allocation_year_and_count_problems() {
    let mut conn = setup();
    config::set_setting(&conn, config::ALLOCATION_POLICY_KEY, "flag").unwrap();
    let budget = budgets::create_budget(
        &conn,
        NewBudget {
            name: "Garden".into(),
            description: None,
            amount: dec("50"),
            year: 2025,
            created_by: None,
        },
    )
    .unwrap();
    let last_year = ledger::create_transaction(
        &mut conn,
        NewTransaction::new(TransactionKind::Expense, dec("60"), "seeds", day(2024, 11, 5)),
    )
    .unwrap();
    budgets::link_transaction(&mut conn, last_year.id, budget.id, dec("60")).unwrap();

    let t = record(&mut conn, TransactionKind::Expense, "20", TransactionStatus::Complete);
    let hoses = inventory::create_item(
        &conn,
        NewInventoryItem {
            name: "Hose".into(),
            quantity: 3,
            ..Default::default()
        },
    )
    .unwrap();
    inventory::link_item(&mut conn, hoses.id, t.id, 3).unwrap();
    // written around the library, which refuses to undercut linked units
    conn.execute("UPDATE inventory_items SET quantity=1 WHERE id=?1", [hoses.id])
        .unwrap();

    let found = kinds(&conn);
    assert!(found.contains(&"over_allocated_budget"));
    assert!(found.contains(&"cross_year_budget_link"));
    assert!(found.contains(&"inventory_overcounted"));
}

#[test]
fn detects_purchase_status_drift() {
    let mut conn = setup();
    let p = submit_purchase(&conn, "25", "veikko");
    expense_for_purchase(&mut conn, p, "25");
    conn.execute("UPDATE purchases SET status='rejected' WHERE id=?1", [p])
        .unwrap();
    assert_eq!(kinds(&conn), vec!["purchase_status_drift"]);
}
