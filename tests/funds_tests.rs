// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

mod common;

use common::{dec, expense_for_purchase, record, setup, submit_purchase};
use treasury::budgets::{self, NewBudget};
use treasury::funds;
use treasury::ledger::{self, TransactionPatch};
use treasury::models::{ReimbursementStatus, TransactionKind, TransactionStatus};

fn budget(conn: &rusqlite::Connection, amount: &str, year: i32) -> i64 {
    budgets::create_budget(
        conn,
        NewBudget {
            name: "Reservation".into(),
            description: None,
            amount: dec(amount),
            year,
            created_by: None,
        },
    )
    .unwrap()
    .id
}

#[test]
fn budget_linked_expenses_are_counted_once() {
    let mut conn = setup();
    record(&mut conn, TransactionKind::Income, "1000", TransactionStatus::Complete);
    let linked = record(&mut conn, TransactionKind::Expense, "200", TransactionStatus::Complete);
    record(&mut conn, TransactionKind::Expense, "100", TransactionStatus::Complete);
    let b = budget(&conn, "300", 2025);
    budgets::link_transaction(&mut conn, linked.id, b, dec("200")).unwrap();

    let breakdown = funds::funds_breakdown(&conn, 2025).unwrap();
    assert_eq!(breakdown.income, dec("1000"));
    assert_eq!(breakdown.expenses, dec("100"));
    assert_eq!(breakdown.budget_linked_expenses, dec("200"));
    assert_eq!(breakdown.balance, dec("900"));
    assert_eq!(breakdown.total_reserved, dec("100"));
    assert_eq!(funds::available_funds(&conn, 2025).unwrap(), dec("800"));
}

#[test]
fn closing_a_budget_releases_its_headroom() {
    let mut conn = setup();
    record(&mut conn, TransactionKind::Income, "1000", TransactionStatus::Complete);
    let spent = record(&mut conn, TransactionKind::Expense, "100", TransactionStatus::Complete);
    let b = budget(&conn, "300", 2025);
    budgets::link_transaction(&mut conn, spent.id, b, dec("100")).unwrap();

    let before = funds::funds_breakdown(&conn, 2025).unwrap();
    assert_eq!(before.total_reserved, dec("200"));
    assert_eq!(before.available, dec("800"));

    budgets::close_budget(&conn, b).unwrap();
    let after = funds::funds_breakdown(&conn, 2025).unwrap();
    assert!(after.total_reserved.is_zero());
    assert_eq!(after.available - before.available, dec("200"));
}

#[test]
fn unsettled_reimbursements_stay_out_of_the_balance() {
    let mut conn = setup();
    record(&mut conn, TransactionKind::Income, "500", TransactionStatus::Complete);
    let requested = submit_purchase(&conn, "40", "aino");
    expense_for_purchase(&mut conn, requested, "40");
    let declined = record(&mut conn, TransactionKind::Expense, "60", TransactionStatus::Declined);
    ledger::update_transaction(
        &mut conn,
        declined.id,
        TransactionPatch {
            reimbursement_status: Some(ReimbursementStatus::Declined),
            ..Default::default()
        },
    )
    .unwrap();
    let approved = record(&mut conn, TransactionKind::Expense, "25", TransactionStatus::Complete);
    ledger::update_transaction(
        &mut conn,
        approved.id,
        TransactionPatch {
            reimbursement_status: Some(ReimbursementStatus::Approved),
            ..Default::default()
        },
    )
    .unwrap();

    let b = funds::funds_breakdown(&conn, 2025).unwrap();
    assert_eq!(b.expenses, dec("25"));
    assert_eq!(b.available, dec("475"));
    assert_eq!(b.pending_reimbursements, dec("40"));
}

#[test]
fn overspent_budget_reserves_nothing() {
    let mut conn = setup();
    record(&mut conn, TransactionKind::Income, "50", TransactionStatus::Complete);
    let t = record(&mut conn, TransactionKind::Expense, "90", TransactionStatus::Complete);
    treasury::config::set_setting(&conn, treasury::config::ALLOCATION_POLICY_KEY, "flag").unwrap();
    let b = budget(&conn, "80", 2025);
    budgets::link_transaction(&mut conn, t.id, b, dec("90")).unwrap();

    let breakdown = funds::funds_breakdown(&conn, 2025).unwrap();
    assert!(breakdown.total_reserved.is_zero());
    assert_eq!(breakdown.available, dec("50"));
}

#[test]
fn other_years_do_not_leak_in() {
    let mut conn = setup();
    record(&mut conn, TransactionKind::Income, "100", TransactionStatus::Complete);
    budget(&conn, "40", 2024);
    assert_eq!(funds::available_funds(&conn, 2025).unwrap(), dec("100"));
    assert_eq!(funds::available_funds(&conn, 2024).unwrap(), dec("-40"));
}

#[test]
fn small_amounts_sum_exactly() {
    let mut conn = setup();
    for _ in 0..10 {
        record(&mut conn, TransactionKind::Income, "0.10", TransactionStatus::Complete);
    }
    record(&mut conn, TransactionKind::Expense, "0.30", TransactionStatus::Complete);
    assert_eq!(funds::available_funds(&conn, 2025).unwrap(), dec("0.70"));
}
