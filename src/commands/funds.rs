// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config;
use crate::funds;
use crate::utils::{fmt_money, maybe_print_json, pretty_table};
use anyhow::{Context, Result};
use rusqlite::Connection;

pub fn handle(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let year = *sub
        .get_one::<i32>("year")
        .context("Missing required argument --year")?;
    let b = funds::funds_breakdown(conn, year)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &b)? {
        return Ok(());
    }
    let ccy = config::currency(conn)?;
    let rows = vec![
        vec!["Income".to_string(), fmt_money(&b.income, &ccy)],
        vec!["Expenses (unbudgeted)".to_string(), fmt_money(&b.expenses, &ccy)],
        vec!["Balance".to_string(), fmt_money(&b.balance, &ccy)],
        vec!["Reserved in open budgets".to_string(), fmt_money(&b.total_reserved, &ccy)],
        vec!["Available".to_string(), fmt_money(&b.available, &ccy)],
    ];
    let year_label = year.to_string();
    println!("{}", pretty_table(&[year_label.as_str(), "Amount"], rows));
    if !b.pending_reimbursements.is_zero() {
        println!(
            "Note: {} in reimbursement requests await a decision and are not counted.",
            fmt_money(&b.pending_reimbursements, &ccy)
        );
    }
    Ok(())
}
