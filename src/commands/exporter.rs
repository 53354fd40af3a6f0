// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::ledger;
use crate::utils::required_arg;
use anyhow::{Context, Result, bail};
use rusqlite::Connection;
use serde_json::json;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => export_transactions(conn, sub),
        _ => Ok(()),
    }
}

fn export_transactions(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let year = *sub
        .get_one::<i32>("year")
        .context("Missing required argument --year")?;
    let fmt = sub
        .get_one::<String>("format")
        .map(|s| s.trim().to_lowercase())
        .unwrap_or_else(|| "csv".to_string());
    let out = required_arg(sub, "out")?;

    let mut rows = ledger::get_transactions_by_year(conn, year)?;
    rows.sort_by_key(|t| (t.date, t.id));

    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)
                .with_context(|| format!("Failed to create {}", out))?;
            wtr.write_record([
                "id",
                "date",
                "kind",
                "amount",
                "description",
                "category",
                "status",
                "reimbursement_status",
                "purchase_id",
            ])?;
            for t in &rows {
                wtr.write_record([
                    t.id.to_string(),
                    t.date.to_string(),
                    t.kind.to_string(),
                    t.amount.to_string(),
                    t.description.clone(),
                    t.category.clone().unwrap_or_default(),
                    t.status.to_string(),
                    t.reimbursement_status
                        .map(|s| s.to_string())
                        .unwrap_or_default(),
                    t.purchase_id.map(|p| p.to_string()).unwrap_or_default(),
                ])?;
            }
            wtr.flush()?;
        }
        "json" => {
            // amounts stay strings so no reader parses them as floats
            let items: Vec<_> = rows
                .iter()
                .map(|t| {
                    json!({
                        "id": t.id, "date": t.date.to_string(), "kind": t.kind, "amount": t.amount.to_string(),
                        "description": t.description, "category": t.category, "status": t.status,
                        "reimbursement_status": t.reimbursement_status, "purchase_id": t.purchase_id
                    })
                })
                .collect();
            std::fs::write(out, serde_json::to_string_pretty(&items)?)
                .with_context(|| format!("Failed to write {}", out))?;
        }
        other => bail!("Unknown format: {} (use csv|json)", other),
    }
    println!("Exported {} transactions for {} to {}", rows.len(), year, out);
    Ok(())
}
