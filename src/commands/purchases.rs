// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::acting_user;
use crate::messages::MessageNotifier;
use crate::models::PurchaseStatus;
use crate::reimbursement::{self, NewPurchase};
use crate::utils::{
    maybe_print_json, optional_arg, parse_arg, parse_decimal, pretty_table, required_arg,
};
use anyhow::{Context, Result, bail};
use rusqlite::Connection;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("status", sub)) => status(conn, sub)?,
        Some(("sync", sub)) => sync(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let year = *sub
        .get_one::<i32>("year")
        .context("Missing required argument --year")?;
    let input = NewPurchase {
        amount: parse_decimal(required_arg(sub, "amount")?)?,
        purchaser_name: required_arg(sub, "purchaser")?.to_string(),
        bank_account: required_arg(sub, "bank-account")?.to_string(),
        minutes_ref: required_arg(sub, "minutes")?.to_string(),
        description: optional_arg(sub, "description"),
        year,
        created_by: acting_user(sub),
    };
    let p = reimbursement::create_purchase(conn, input)?;
    println!(
        "Submitted reimbursement request #{} for {} ({})",
        p.id, p.amount, p.purchaser_name
    );
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let data = match sub.get_one::<i32>("year") {
        Some(year) => reimbursement::get_purchases_by_year(conn, *year)?,
        None => reimbursement::get_all_purchases(conn)?,
    };
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows = data
            .iter()
            .map(|p| {
                vec![
                    p.id.to_string(),
                    p.year.to_string(),
                    p.purchaser_name.clone(),
                    format!("{:.2}", p.amount),
                    p.minutes_ref.clone(),
                    p.status.to_string(),
                    p.created_by.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["ID", "Year", "Purchaser", "Amount", "Minutes", "Status", "Owner"],
                rows
            )
        );
    }
    Ok(())
}

fn status(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id: i64 = parse_arg(sub, "id")?;
    let to: PurchaseStatus = parse_arg(sub, "to")?;
    match reimbursement::update_purchase_status(conn, id, to, &MessageNotifier)? {
        Some(p) => println!("Purchase #{} is now {}", p.id, p.status),
        None => bail!("Purchase {} not found", id),
    }
    Ok(())
}

fn sync(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let report = reimbursement::sync_transaction_statuses(conn)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &report)? {
        println!(
            "Checked {} purchases: {} transactions corrected, {} without a transaction",
            report.checked, report.updated, report.without_transaction
        );
    }
    Ok(())
}
