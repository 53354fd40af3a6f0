// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Fund budgets (reservations) and their partial-amount transaction links.
//!
//! Used and reserved figures are always summed from the link rows at read
//! time, because transaction status changes independently of the link.

use crate::config::{self, AllocationPolicy};
use crate::error::{Result, TreasuryError};
use crate::ledger;
use crate::models::{BudgetStatus, BudgetTransaction, FundBudget, TransactionStatus};
use crate::utils::{decimal_column, now};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row, ToSql, TransactionBehavior};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, warn};

const COLUMNS: &str =
    "id, name, description, amount, year, status, created_by, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct NewBudget {
    pub name: String,
    pub description: Option<String>,
    pub amount: Decimal,
    pub year: i32,
    pub created_by: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct BudgetPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub amount: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BudgetSummary {
    pub budget: FundBudget,
    /// Sum of every link amount regardless of transaction status.
    pub allocated: Decimal,
    pub used: Decimal,
    pub reserved: Decimal,
    /// `max(0, amount - used)`.
    pub remaining: Decimal,
    pub over_allocated: bool,
}

fn map_budget(r: &Row<'_>) -> rusqlite::Result<FundBudget> {
    Ok(FundBudget {
        id: r.get(0)?,
        name: r.get(1)?,
        description: r.get(2)?,
        amount: decimal_column(r, 3)?,
        year: r.get(4)?,
        status: r.get(5)?,
        created_by: r.get(6)?,
        created_at: r.get(7)?,
        updated_at: r.get(8)?,
    })
}

fn map_link(r: &Row<'_>) -> rusqlite::Result<BudgetTransaction> {
    Ok(BudgetTransaction {
        budget_id: r.get(0)?,
        transaction_id: r.get(1)?,
        amount: decimal_column(r, 2)?,
        created_at: r.get(3)?,
    })
}

fn check_ceiling(amount: Decimal) -> Result<()> {
    if amount < Decimal::ZERO {
        return Err(TreasuryError::InvalidAmount(format!(
            "budget amount must not be negative, got {}",
            amount
        )));
    }
    Ok(())
}

pub fn create_budget(conn: &Connection, input: NewBudget) -> Result<FundBudget> {
    check_ceiling(input.amount)?;
    let ts = now();
    conn.execute(
        "INSERT INTO fund_budgets(name, description, amount, year, status, created_by, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
        params![
            input.name.trim(),
            input.description,
            input.amount.to_string(),
            input.year,
            BudgetStatus::Open,
            input.created_by,
            ts,
        ],
    )?;
    let id = conn.last_insert_rowid();
    info!(budget_id = id, amount = %input.amount, year = input.year, "budget created");
    get_budget(conn, id)?.ok_or_else(|| TreasuryError::not_found("budget", id))
}

/// Patches a budget. Lowering the amount below what is already linked is
/// subject to the allocation policy, as in [`link_transaction`].
pub fn update_budget(
    conn: &mut Connection,
    id: i64,
    patch: BudgetPatch,
) -> Result<Option<FundBudget>> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let mut sets: Vec<&str> = vec!["updated_at=?"];
    let mut values: Vec<Box<dyn ToSql>> = vec![Box::new(now())];
    if let Some(name) = patch.name {
        sets.push("name=?");
        values.push(Box::new(name.trim().to_string()));
    }
    if let Some(description) = patch.description {
        sets.push("description=?");
        values.push(Box::new(description));
    }
    if let Some(amount) = patch.amount {
        check_ceiling(amount)?;
        let allocated = allocated_amount(&tx, id)?;
        if allocated > amount {
            enforce_ceiling(&tx, id, None, amount, allocated)?;
        }
        sets.push("amount=?");
        values.push(Box::new(amount.to_string()));
    }
    values.push(Box::new(id));
    let sql = format!("UPDATE fund_budgets SET {} WHERE id=?", sets.join(", "));
    let refs: Vec<&dyn ToSql> = values.iter().map(|v| v.as_ref()).collect();
    if tx.execute(&sql, refs.as_slice())? == 0 {
        return Ok(None);
    }
    let updated = get_budget(&tx, id)?;
    tx.commit()?;
    Ok(updated)
}

fn set_status(conn: &Connection, id: i64, status: BudgetStatus) -> Result<Option<FundBudget>> {
    let changed = conn.execute(
        "UPDATE fund_budgets SET status=?1, updated_at=?2 WHERE id=?3",
        params![status, now(), id],
    )?;
    if changed == 0 {
        return Ok(None);
    }
    info!(budget_id = id, status = %status, "budget status changed");
    get_budget(conn, id)
}

/// Closes a budget, releasing its unused headroom back to the general balance.
pub fn close_budget(conn: &Connection, id: i64) -> Result<Option<FundBudget>> {
    set_status(conn, id, BudgetStatus::Closed)
}

pub fn reopen_budget(conn: &Connection, id: i64) -> Result<Option<FundBudget>> {
    set_status(conn, id, BudgetStatus::Open)
}

/// Deletes a budget that has no transaction links.
///
/// Returns `false` when links exist or the budget is absent.
pub fn delete_budget(conn: &mut Connection, id: i64) -> Result<bool> {
    let tx = conn.transaction()?;
    let links: i64 = tx.query_row(
        "SELECT COUNT(*) FROM budget_transactions WHERE budget_id=?1",
        params![id],
        |r| r.get(0),
    )?;
    if links > 0 {
        info!(budget_id = id, links, "budget has linked transactions, not deleting");
        return Ok(false);
    }
    let deleted = tx.execute("DELETE FROM fund_budgets WHERE id=?1", params![id])?;
    tx.commit()?;
    Ok(deleted > 0)
}

pub fn get_budget(conn: &Connection, id: i64) -> Result<Option<FundBudget>> {
    let sql = format!("SELECT {} FROM fund_budgets WHERE id=?1", COLUMNS);
    Ok(conn.query_row(&sql, params![id], map_budget).optional()?)
}

fn query_budgets(conn: &Connection, year: i32, status: Option<BudgetStatus>) -> Result<Vec<FundBudget>> {
    let sql = format!(
        "SELECT {} FROM fund_budgets WHERE year=?1 AND (?2 IS NULL OR status=?2) ORDER BY name, id",
        COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![year, status], map_budget)?;
    let mut data = Vec::new();
    for row in rows {
        data.push(row?);
    }
    Ok(data)
}

pub fn get_budgets_by_year(conn: &Connection, year: i32) -> Result<Vec<FundBudget>> {
    query_budgets(conn, year, None)
}

pub fn get_open_budgets_by_year(conn: &Connection, year: i32) -> Result<Vec<FundBudget>> {
    query_budgets(conn, year, Some(BudgetStatus::Open))
}

/// Applies the allocation policy to a budget whose links would total
/// `requested` against a ceiling of `ceiling`.
fn enforce_ceiling(
    conn: &Connection,
    budget_id: i64,
    transaction_id: Option<i64>,
    ceiling: Decimal,
    requested: Decimal,
) -> Result<()> {
    match config::allocation_policy(conn)? {
        AllocationPolicy::Reject => Err(TreasuryError::OverAllocated {
            budget_id,
            ceiling,
            requested,
        }),
        AllocationPolicy::Flag => {
            warn!(
                budget_id,
                transaction_id = ?transaction_id,
                ceiling = %ceiling,
                requested = %requested,
                "budget over-allocated"
            );
            Ok(())
        }
    }
}

fn allocated_amount(conn: &Connection, budget_id: i64) -> Result<Decimal> {
    let mut total = Decimal::ZERO;
    for link in get_budget_links(conn, budget_id)? {
        total += link.amount;
    }
    Ok(total)
}

/// Draws `amount` of a transaction from a budget.
///
/// The amount may be less than the transaction's full amount. The budget
/// must be open and the pair must not already be linked. Whether the
/// budget's ceiling may be exceeded is governed by the
/// `budget.allocation_policy` setting; the check and the insert share one
/// database transaction.
pub fn link_transaction(
    conn: &mut Connection,
    transaction_id: i64,
    budget_id: i64,
    amount: Decimal,
) -> Result<BudgetTransaction> {
    if amount <= Decimal::ZERO {
        return Err(TreasuryError::InvalidAmount(format!(
            "allocation must be positive, got {}",
            amount
        )));
    }
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let budget = get_budget(&tx, budget_id)?
        .ok_or_else(|| TreasuryError::not_found("budget", budget_id))?;
    if budget.status == BudgetStatus::Closed {
        return Err(TreasuryError::BudgetClosed(budget_id));
    }
    let transaction = ledger::get_transaction(&tx, transaction_id)?
        .ok_or_else(|| TreasuryError::not_found("transaction", transaction_id))?;
    if amount > transaction.amount {
        return Err(TreasuryError::InvalidAmount(format!(
            "allocation {} exceeds transaction amount {}",
            amount, transaction.amount
        )));
    }

    let requested = allocated_amount(&tx, budget_id)? + amount;
    if requested > budget.amount {
        enforce_ceiling(&tx, budget_id, Some(transaction_id), budget.amount, requested)?;
    }

    let inserted = tx.execute(
        "INSERT INTO budget_transactions(budget_id, transaction_id, amount, created_at)
         VALUES (?1, ?2, ?3, ?4)",
        params![budget_id, transaction_id, amount.to_string(), now()],
    );
    if let Err(err) = inserted {
        return Err(match err.sqlite_error_code() {
            Some(ErrorCode::ConstraintViolation) => TreasuryError::Conflict(format!(
                "transaction {} is already linked to budget {}",
                transaction_id, budget_id
            )),
            _ => err.into(),
        });
    }
    let link = tx
        .query_row(
            "SELECT budget_id, transaction_id, amount, created_at FROM budget_transactions
             WHERE budget_id=?1 AND transaction_id=?2",
            params![budget_id, transaction_id],
            map_link,
        )?;
    tx.commit()?;
    info!(budget_id, transaction_id, amount = %amount, "transaction linked to budget");
    Ok(link)
}

pub fn unlink_transaction(conn: &Connection, transaction_id: i64, budget_id: i64) -> Result<bool> {
    let removed = conn.execute(
        "DELETE FROM budget_transactions WHERE budget_id=?1 AND transaction_id=?2",
        params![budget_id, transaction_id],
    )?;
    if removed > 0 {
        info!(budget_id, transaction_id, "transaction unlinked from budget");
    }
    Ok(removed > 0)
}

pub fn get_budget_links(conn: &Connection, budget_id: i64) -> Result<Vec<BudgetTransaction>> {
    let mut stmt = conn.prepare(
        "SELECT budget_id, transaction_id, amount, created_at FROM budget_transactions
         WHERE budget_id=?1 ORDER BY created_at, transaction_id",
    )?;
    let rows = stmt.query_map(params![budget_id], map_link)?;
    let mut data = Vec::new();
    for row in rows {
        data.push(row?);
    }
    Ok(data)
}

fn sum_links_with_status(
    conn: &Connection,
    budget_id: i64,
    status: TransactionStatus,
) -> Result<Decimal> {
    let mut stmt = conn.prepare_cached(
        "SELECT bt.amount FROM budget_transactions bt
         JOIN transactions t ON t.id = bt.transaction_id
         WHERE bt.budget_id=?1 AND t.status=?2",
    )?;
    let mut rows = stmt.query(params![budget_id, status])?;
    let mut total = Decimal::ZERO;
    while let Some(row) = rows.next()? {
        total += decimal_column(row, 0)?;
    }
    Ok(total)
}

/// Money already spent against the budget (linked transactions that are complete).
pub fn used_amount(conn: &Connection, budget_id: i64) -> Result<Decimal> {
    sum_links_with_status(conn, budget_id, TransactionStatus::Complete)
}

/// Money earmarked by linked transactions that are still pending.
pub fn reserved_amount(conn: &Connection, budget_id: i64) -> Result<Decimal> {
    sum_links_with_status(conn, budget_id, TransactionStatus::Pending)
}

pub fn budget_summary(conn: &Connection, budget_id: i64) -> Result<Option<BudgetSummary>> {
    let Some(budget) = get_budget(conn, budget_id)? else {
        return Ok(None);
    };
    let allocated = allocated_amount(conn, budget_id)?;
    let used = used_amount(conn, budget_id)?;
    let reserved = reserved_amount(conn, budget_id)?;
    let remaining = (budget.amount - used).max(Decimal::ZERO);
    Ok(Some(BudgetSummary {
        over_allocated: allocated > budget.amount,
        budget,
        allocated,
        used,
        reserved,
        remaining,
    }))
}
