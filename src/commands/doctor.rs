// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::budgets;
use crate::inventory;
use crate::reimbursement;
use crate::utils::{maybe_print_json, pretty_table};
use anyhow::Result;
use rusqlite::{Connection, OptionalExtension};
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub kind: &'static str,
    pub detail: String,
}

impl Issue {
    fn new(kind: &'static str, detail: String) -> Self {
        Self { kind, detail }
    }
}

pub fn handle(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let issues = find_issues(conn)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &issues)? {
        return Ok(());
    }
    if issues.is_empty() {
        println!("doctor: no issues found");
    } else {
        let rows = issues
            .into_iter()
            .map(|i| vec![i.kind.to_string(), i.detail])
            .collect();
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}

pub fn find_issues(conn: &Connection) -> Result<Vec<Issue>> {
    let mut issues = Vec::new();

    // 1) Junction rows pointing at missing records
    let mut stmt = conn.prepare(
        "SELECT bt.budget_id, bt.transaction_id FROM budget_transactions bt
         LEFT JOIN transactions t ON t.id = bt.transaction_id
         LEFT JOIN fund_budgets b ON b.id = bt.budget_id
         WHERE t.id IS NULL OR b.id IS NULL",
    )?;
    let mut cur = stmt.query([])?;
    while let Some(r) = cur.next()? {
        let (b, t): (i64, i64) = (r.get(0)?, r.get(1)?);
        issues.push(Issue::new(
            "orphan_budget_link",
            format!("budget {} / transaction {}", b, t),
        ));
    }
    let mut stmt = conn.prepare(
        "SELECT l.item_id, l.transaction_id FROM inventory_item_transactions l
         LEFT JOIN transactions t ON t.id = l.transaction_id
         LEFT JOIN inventory_items i ON i.id = l.item_id
         WHERE t.id IS NULL OR i.id IS NULL",
    )?;
    let mut cur = stmt.query([])?;
    while let Some(r) = cur.next()? {
        let (i, t): (i64, i64) = (r.get(0)?, r.get(1)?);
        issues.push(Issue::new(
            "orphan_inventory_link",
            format!("item {} / transaction {}", i, t),
        ));
    }

    // 2) Budgets whose links exceed the ceiling, and links across book years
    let mut year_stmt = conn.prepare("SELECT DISTINCT year FROM fund_budgets ORDER BY year")?;
    let years: Vec<i32> = year_stmt
        .query_map([], |r| r.get(0))?
        .collect::<rusqlite::Result<_>>()?;
    for year in years {
        for budget in budgets::get_budgets_by_year(conn, year)? {
            let links = budgets::get_budget_links(conn, budget.id)?;
            let allocated: Decimal = links.iter().map(|l| l.amount).sum();
            if allocated > budget.amount {
                issues.push(Issue::new(
                    "over_allocated_budget",
                    format!(
                        "budget {} '{}': {} allocated of {}",
                        budget.id, budget.name, allocated, budget.amount
                    ),
                ));
            }
            for link in links {
                let tx_year: Option<i32> = conn
                    .query_row(
                        "SELECT year FROM transactions WHERE id=?1",
                        [link.transaction_id],
                        |r| r.get(0),
                    )
                    .optional()?;
                if tx_year.is_some_and(|y| y != budget.year) {
                    issues.push(Issue::new(
                        "cross_year_budget_link",
                        format!(
                            "transaction {} is booked outside budget {}'s year {}",
                            link.transaction_id, budget.id, budget.year
                        ),
                    ));
                }
            }
        }
    }

    // 3) Items with more units accounted for than acquired
    for item in inventory::get_active_items(conn)? {
        let available = inventory::available_quantity(conn, &item)?;
        if available < 0 {
            issues.push(Issue::new(
                "inventory_overcounted",
                format!("item {} '{}': available {}", item.id, item.name, available),
            ));
        }
    }

    // 4) Transactions out of step with their purchase
    for purchase in reimbursement::get_all_purchases(conn)? {
        let Some(t) = crate::ledger::get_transaction_by_purchase_id(conn, purchase.id)? else {
            continue;
        };
        let (status, rs) = reimbursement::transaction_fields(purchase.status);
        if t.status != status || t.reimbursement_status != Some(rs) {
            issues.push(Issue::new(
                "purchase_status_drift",
                format!(
                    "purchase {} is {} but transaction {} is {}/{}",
                    purchase.id,
                    purchase.status,
                    t.id,
                    t.status,
                    t.reimbursement_status
                        .map(|s| s.to_string())
                        .unwrap_or_else(|| "none".into())
                ),
            ));
        }
    }

    Ok(issues)
}
