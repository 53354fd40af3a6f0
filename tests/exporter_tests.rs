// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

mod common;

use common::{expense_for_purchase, record, setup, submit_purchase};
use serde_json::json;
use tempfile::tempdir;
use treasury::commands::{exporter, transactions};
use treasury::models::{TransactionKind, TransactionStatus};
use treasury::{cli, ledger};

#[test]
fn export_transactions_writes_year_as_json() {
    let mut conn = setup();
    let p = submit_purchase(&conn, "12.50", "aino");
    let t = expense_for_purchase(&mut conn, p, "12.50");

    let dir = tempdir().unwrap();
    let out_path = dir.path().join("export.json");
    let out_str = out_path.to_string_lossy().to_string();

    let matches = cli::build_cli().get_matches_from([
        "treasury",
        "export",
        "transactions",
        "--year",
        "2025",
        "--format",
        "json",
        "--out",
        &out_str,
    ]);
    if let Some(("export", export_m)) = matches.subcommand() {
        exporter::handle(&conn, export_m).unwrap();
    } else {
        panic!("no export subcommand");
    }

    let contents = std::fs::read_to_string(&out_path).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(
        parsed,
        json!([
            {
                "id": t.id,
                "date": "2025-03-02",
                "kind": "expense",
                "amount": "12.50",
                "description": "reimbursement",
                "category": null,
                "status": "pending",
                "reimbursement_status": "requested",
                "purchase_id": p
            }
        ])
    );
}

#[test]
fn export_transactions_writes_csv_by_default() {
    let mut conn = setup();
    record(&mut conn, TransactionKind::Income, "300", TransactionStatus::Complete);

    let dir = tempdir().unwrap();
    let out_path = dir.path().join("export.csv");
    let out_str = out_path.to_string_lossy().to_string();

    let matches = cli::build_cli().get_matches_from([
        "treasury",
        "export",
        "transactions",
        "--year",
        "2025",
        "--out",
        &out_str,
    ]);
    if let Some(("export", export_m)) = matches.subcommand() {
        exporter::handle(&conn, export_m).unwrap();
    } else {
        panic!("no export subcommand");
    }

    let mut rdr = csv::Reader::from_path(&out_path).unwrap();
    let headers = rdr.headers().unwrap().clone();
    assert_eq!(&headers[3], "amount");
    let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 1);
    assert_eq!(&rows[0][2], "income");
    assert_eq!(&rows[0][3], "300");
}

#[test]
fn export_transactions_rejects_unknown_format() {
    let conn = setup();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("export.unknown");
    let out_str = out_path.to_string_lossy().to_string();

    let matches = cli::build_cli().get_matches_from([
        "treasury",
        "export",
        "transactions",
        "--year",
        "2025",
        "--format",
        "xml",
        "--out",
        &out_str,
    ]);
    if let Some(("export", export_m)) = matches.subcommand() {
        assert!(exporter::handle(&conn, export_m).is_err());
    } else {
        panic!("no export subcommand");
    }
    assert!(!out_path.exists());
}

#[test]
fn tx_add_trims_and_books_by_date_year() {
    let mut conn = setup();
    let matches = cli::build_cli().get_matches_from([
        "treasury",
        "--user",
        "veikko",
        "tx",
        "add",
        "--kind",
        "Expense",
        "--amount",
        " 19.90 ",
        "--description",
        "  Light bulbs  ",
        "--date",
        "2024-12-30",
    ]);
    if let Some(("tx", tx_m)) = matches.subcommand() {
        transactions::handle(&mut conn, tx_m).unwrap();
    } else {
        panic!("no tx subcommand");
    }

    let booked = ledger::get_transactions_by_year(&conn, 2024).unwrap();
    assert_eq!(booked.len(), 1);
    assert_eq!(booked[0].description, "Light bulbs");
    assert_eq!(booked[0].amount.to_string(), "19.90");
    assert_eq!(booked[0].kind, TransactionKind::Expense);
    assert_eq!(booked[0].created_by.as_deref(), Some("veikko"));
}
