// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

#![allow(dead_code)]

use chrono::NaiveDate;
use rusqlite::Connection;
use rust_decimal::Decimal;
use std::str::FromStr;
use treasury::db;
use treasury::ledger::{self, NewTransaction};
use treasury::models::{Transaction, TransactionKind, TransactionStatus};
use treasury::reimbursement::{self, NewPurchase};

pub fn setup() -> Connection {
    db::open_in_memory().unwrap()
}

pub fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn record(
    conn: &mut Connection,
    kind: TransactionKind,
    amount: &str,
    status: TransactionStatus,
) -> Transaction {
    let input = NewTransaction {
        status: Some(status),
        ..NewTransaction::new(kind, dec(amount), "test entry", day(2025, 3, 1))
    };
    ledger::create_transaction(conn, input).unwrap()
}

pub fn submit_purchase(conn: &Connection, amount: &str, owner: &str) -> i64 {
    reimbursement::create_purchase(
        conn,
        NewPurchase {
            amount: dec(amount),
            purchaser_name: "Aino Virtanen".into(),
            bank_account: "FI21 1234 5600 0007 85".into(),
            minutes_ref: "minutes/2025-03".into(),
            description: Some("Paint for the laundry room".into()),
            year: 2025,
            created_by: owner.into(),
        },
    )
    .unwrap()
    .id
}

pub fn expense_for_purchase(conn: &mut Connection, purchase_id: i64, amount: &str) -> Transaction {
    let input = NewTransaction {
        purchase_id: Some(purchase_id),
        ..NewTransaction::new(
            TransactionKind::Expense,
            dec(amount),
            "reimbursement",
            day(2025, 3, 2),
        )
    };
    ledger::create_transaction(conn, input).unwrap()
}
