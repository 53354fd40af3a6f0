// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Available-funds calculation for a year.
//!
//! Expenses linked to any budget of the year are left out of the raw
//! balance; they come back only through each open budget's unused headroom,
//! so money spent against a budget reduces availability exactly once.
//!
//! The figures are read with separate statements and are not isolated from
//! concurrent writers; a dashboard may observe a transaction mid-update.

use crate::budgets;
use crate::error::Result;
use crate::ledger;
use crate::models::{ReimbursementStatus, TransactionKind};
use rusqlite::{params, Connection};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashSet;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FundsBreakdown {
    pub year: i32,
    /// Settled income.
    pub income: Decimal,
    /// Settled expenses that are not linked to a budget.
    pub expenses: Decimal,
    /// Settled expenses left out because a budget accounts for them.
    pub budget_linked_expenses: Decimal,
    pub balance: Decimal,
    /// Unused headroom of open budgets.
    pub total_reserved: Decimal,
    pub available: Decimal,
    /// Expenses awaiting a reimbursement decision; informational only.
    pub pending_reimbursements: Decimal,
}

fn budget_linked_transaction_ids(conn: &Connection, year: i32) -> Result<HashSet<i64>> {
    let mut stmt = conn.prepare(
        "SELECT DISTINCT bt.transaction_id FROM budget_transactions bt
         JOIN fund_budgets b ON b.id = bt.budget_id
         WHERE b.year=?1",
    )?;
    let rows = stmt.query_map(params![year], |r| r.get::<_, i64>(0))?;
    let mut ids = HashSet::new();
    for row in rows {
        ids.insert(row?);
    }
    Ok(ids)
}

pub fn funds_breakdown(conn: &Connection, year: i32) -> Result<FundsBreakdown> {
    let transactions = ledger::get_transactions_by_year(conn, year)?;
    let linked = budget_linked_transaction_ids(conn, year)?;

    let mut out = FundsBreakdown {
        year,
        ..Default::default()
    };
    for t in &transactions {
        if !t.is_settled() {
            if t.kind == TransactionKind::Expense
                && t.reimbursement_status == Some(ReimbursementStatus::Requested)
            {
                out.pending_reimbursements += t.amount;
            }
            continue;
        }
        match t.kind {
            TransactionKind::Income => out.income += t.amount,
            TransactionKind::Expense if linked.contains(&t.id) => {
                out.budget_linked_expenses += t.amount
            }
            TransactionKind::Expense => out.expenses += t.amount,
        }
    }
    out.balance = out.income - out.expenses;

    for budget in budgets::get_open_budgets_by_year(conn, year)? {
        let used = budgets::used_amount(conn, budget.id)?;
        out.total_reserved += (budget.amount - used).max(Decimal::ZERO);
    }
    out.available = out.balance - out.total_reserved;
    Ok(out)
}

/// Money free to commit in `year`: settled balance minus open reservations.
pub fn available_funds(conn: &Connection, year: i32) -> Result<Decimal> {
    Ok(funds_breakdown(conn, year)?.available)
}
