// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::acting_user;
use crate::ledger::{self, NewTransaction, TransactionFilter, TransactionPatch};
use crate::models::{Transaction, TransactionKind};
use crate::utils::{
    maybe_print_json, optional_arg, parse_arg, parse_date, parse_decimal, parse_opt_arg,
    pretty_table, required_arg,
};
use anyhow::{Context, Result, bail};
use chrono::Datelike;
use rusqlite::Connection;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("update", sub)) => update(conn, sub)?,
        Some(("rm", sub)) => rm(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let kind: TransactionKind = parse_arg(sub, "kind")?;
    let amount = parse_decimal(required_arg(sub, "amount")?)?;
    let description = required_arg(sub, "description")?.to_string();
    let date = parse_date(required_arg(sub, "date")?)?;
    let year = sub.get_one::<i32>("year").copied().unwrap_or(date.year());

    let input = NewTransaction {
        year,
        category: optional_arg(sub, "category"),
        status: parse_opt_arg(sub, "status")?,
        purchase_id: parse_opt_arg(sub, "purchase")?,
        created_by: Some(acting_user(sub)),
        ..NewTransaction::new(kind, amount, description, date)
    };
    let t = ledger::create_transaction(conn, input).context("Failed to record transaction")?;
    println!(
        "Recorded {} #{} of {} on {} ({})",
        t.kind, t.id, t.amount, t.date, t.status
    );
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let filter = TransactionFilter {
        year: sub.get_one::<i32>("year").copied(),
        status: parse_opt_arg(sub, "status")?,
        category: optional_arg(sub, "category"),
        kind: parse_opt_arg(sub, "kind")?,
    };
    let data = ledger::list_transactions(conn, &filter)?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        println!(
            "{}",
            pretty_table(
                &["ID", "Date", "Kind", "Amount", "Description", "Category", "Status", "Reimb.", "Purchase"],
                table_rows(&data),
            )
        );
    }
    Ok(())
}

pub fn table_rows(data: &[Transaction]) -> Vec<Vec<String>> {
    data.iter()
        .map(|t| {
            vec![
                t.id.to_string(),
                t.date.to_string(),
                t.kind.to_string(),
                format!("{:.2}", t.amount),
                t.description.clone(),
                t.category.clone().unwrap_or_default(),
                t.status.to_string(),
                t.reimbursement_status
                    .map(|s| s.to_string())
                    .unwrap_or_default(),
                t.purchase_id.map(|p| p.to_string()).unwrap_or_default(),
            ]
        })
        .collect()
}

fn update(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id: i64 = parse_arg(sub, "id")?;
    let patch = TransactionPatch {
        year: sub.get_one::<i32>("year").copied(),
        amount: optional_arg(sub, "amount")
            .map(|s| parse_decimal(&s))
            .transpose()?,
        description: optional_arg(sub, "description"),
        category: optional_arg(sub, "category"),
        date: optional_arg(sub, "date").map(|s| parse_date(&s)).transpose()?,
        status: parse_opt_arg(sub, "status")?,
        reimbursement_status: parse_opt_arg(sub, "reimbursement")?,
    };
    match ledger::update_transaction(conn, id, patch)? {
        Some(t) => println!("Updated transaction #{} ({} {})", t.id, t.status, t.amount),
        None => bail!("Transaction {} not found", id),
    }
    Ok(())
}

fn rm(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id: i64 = parse_arg(sub, "id")?;
    if ledger::delete_transaction(conn, id)? {
        println!("Removed transaction #{}", id);
    } else {
        println!("Transaction {} not found", id);
    }
    Ok(())
}
