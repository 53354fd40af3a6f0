// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Transaction ledger: the system of record for income and expense events.
//!
//! Budget and inventory linkage are separate, explicit operations; nothing
//! here cascades into them except deletion, which clears the junction rows
//! of the deleted transaction in the same database transaction.

use crate::error::{Result, TreasuryError};
use crate::links;
use crate::models::{
    EntityKind, EntityRef, ReimbursementStatus, Transaction, TransactionKind, TransactionStatus,
};
use crate::reimbursement;
use crate::utils::{decimal_column, now};
use chrono::NaiveDate;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row, ToSql, TransactionBehavior};
use rust_decimal::Decimal;
use tracing::{debug, info};

const COLUMNS: &str = "id, year, kind, amount, description, category, date, status, \
                       reimbursement_status, purchase_id, created_by, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub year: i32,
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub description: String,
    pub category: Option<String>,
    pub date: NaiveDate,
    /// Ignored when `purchase_id` is set; derived from the purchase instead.
    pub status: Option<TransactionStatus>,
    pub reimbursement_status: Option<ReimbursementStatus>,
    pub purchase_id: Option<i64>,
    pub created_by: Option<String>,
}

impl NewTransaction {
    pub fn new(
        kind: TransactionKind,
        amount: Decimal,
        description: impl Into<String>,
        date: NaiveDate,
    ) -> Self {
        use chrono::Datelike;
        Self {
            year: date.year(),
            kind,
            amount,
            description: description.into(),
            category: None,
            date,
            status: None,
            reimbursement_status: None,
            purchase_id: None,
            created_by: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TransactionPatch {
    pub year: Option<i32>,
    pub amount: Option<Decimal>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub date: Option<NaiveDate>,
    pub status: Option<TransactionStatus>,
    pub reimbursement_status: Option<ReimbursementStatus>,
}

#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub year: Option<i32>,
    pub status: Option<TransactionStatus>,
    pub category: Option<String>,
    pub kind: Option<TransactionKind>,
}

pub(crate) fn map_transaction(r: &Row<'_>) -> rusqlite::Result<Transaction> {
    Ok(Transaction {
        id: r.get(0)?,
        year: r.get(1)?,
        kind: r.get(2)?,
        amount: decimal_column(r, 3)?,
        description: r.get(4)?,
        category: r.get(5)?,
        date: r.get(6)?,
        status: r.get(7)?,
        reimbursement_status: r.get(8)?,
        purchase_id: r.get(9)?,
        created_by: r.get(10)?,
        created_at: r.get(11)?,
        updated_at: r.get(12)?,
    })
}

fn check_amount(amount: Decimal) -> Result<()> {
    if amount < Decimal::ZERO {
        return Err(TreasuryError::InvalidAmount(format!(
            "transaction amount must not be negative, got {}",
            amount
        )));
    }
    Ok(())
}

/// Largest amount any budget draws from the transaction, if it is linked at all.
fn largest_budget_draw(conn: &Connection, transaction_id: i64) -> Result<Option<Decimal>> {
    let mut stmt =
        conn.prepare_cached("SELECT amount FROM budget_transactions WHERE transaction_id=?1")?;
    let mut rows = stmt.query(params![transaction_id])?;
    let mut largest: Option<Decimal> = None;
    while let Some(row) = rows.next()? {
        let amount = decimal_column(row, 0)?;
        largest = Some(largest.map_or(amount, |m| m.max(amount)));
    }
    Ok(largest)
}

fn purchase_conflict(purchase_id: i64) -> TreasuryError {
    TreasuryError::Conflict(format!(
        "purchase {} is already linked to another transaction",
        purchase_id
    ))
}

/// Records a new transaction.
///
/// A transaction carrying a `purchase_id` takes its status fields from the
/// purchase; a purchase already referenced by another transaction is a
/// [`TreasuryError::Conflict`]. Only expenses may settle a purchase.
pub fn create_transaction(conn: &mut Connection, input: NewTransaction) -> Result<Transaction> {
    check_amount(input.amount)?;
    if input.purchase_id.is_some() && input.kind != TransactionKind::Expense {
        return Err(TreasuryError::InvalidData(format!(
            "a reimbursed purchase must be booked as an expense, got {}",
            input.kind
        )));
    }
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let (status, reimbursement_status) = match input.purchase_id {
        Some(purchase_id) => {
            let purchase = reimbursement::get_purchase(&tx, purchase_id)?
                .ok_or_else(|| TreasuryError::not_found("purchase", purchase_id))?;
            if get_transaction_by_purchase_id(&tx, purchase_id)?.is_some() {
                return Err(purchase_conflict(purchase_id));
            }
            let (s, rs) = reimbursement::transaction_fields(purchase.status);
            (s, Some(rs))
        }
        None => (
            input.status.unwrap_or(TransactionStatus::Pending),
            Some(
                input
                    .reimbursement_status
                    .unwrap_or(ReimbursementStatus::NotRequested),
            ),
        ),
    };

    let ts = now();
    let inserted = tx.execute(
        "INSERT INTO transactions(year, kind, amount, description, category, date, status,
                                  reimbursement_status, purchase_id, created_by, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?11)",
        params![
            input.year,
            input.kind,
            input.amount.to_string(),
            input.description.trim(),
            input.category,
            input.date,
            status,
            reimbursement_status,
            input.purchase_id,
            input.created_by,
            ts,
        ],
    );
    if let Err(err) = inserted {
        return Err(match (err.sqlite_error_code(), input.purchase_id) {
            (Some(ErrorCode::ConstraintViolation), Some(pid)) => purchase_conflict(pid),
            _ => err.into(),
        });
    }
    let id = tx.last_insert_rowid();
    let created = get_transaction(&tx, id)?.ok_or_else(|| TreasuryError::not_found("transaction", id))?;
    tx.commit()?;

    info!(
        transaction_id = id,
        kind = %created.kind,
        amount = %created.amount,
        purchase_id = ?created.purchase_id,
        "transaction recorded"
    );
    Ok(created)
}

/// Applies a partial update; `updated_at` is always stamped.
///
/// The amount cannot drop below what a budget already draws from the
/// transaction.
pub fn update_transaction(
    conn: &mut Connection,
    id: i64,
    patch: TransactionPatch,
) -> Result<Option<Transaction>> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let mut sets: Vec<&str> = vec!["updated_at=?"];
    let mut values: Vec<Box<dyn ToSql>> = vec![Box::new(now())];

    if let Some(year) = patch.year {
        sets.push("year=?");
        values.push(Box::new(year));
    }
    if let Some(amount) = patch.amount {
        check_amount(amount)?;
        if let Some(drawn) = largest_budget_draw(&tx, id)? {
            if amount < drawn {
                return Err(TreasuryError::InvalidAmount(format!(
                    "transaction {} has {} drawn from a budget, cannot lower it to {}",
                    id, drawn, amount
                )));
            }
        }
        sets.push("amount=?");
        values.push(Box::new(amount.to_string()));
    }
    if let Some(description) = patch.description {
        sets.push("description=?");
        values.push(Box::new(description.trim().to_string()));
    }
    if let Some(category) = patch.category {
        sets.push("category=?");
        values.push(Box::new(category));
    }
    if let Some(date) = patch.date {
        sets.push("date=?");
        values.push(Box::new(date));
    }
    if let Some(status) = patch.status {
        sets.push("status=?");
        values.push(Box::new(status));
    }
    if let Some(rs) = patch.reimbursement_status {
        sets.push("reimbursement_status=?");
        values.push(Box::new(rs));
    }
    values.push(Box::new(id));

    let sql = format!("UPDATE transactions SET {} WHERE id=?", sets.join(", "));
    let refs: Vec<&dyn ToSql> = values.iter().map(|v| v.as_ref()).collect();
    let changed = tx.execute(&sql, refs.as_slice())?;
    if changed == 0 {
        return Ok(None);
    }
    let updated = get_transaction(&tx, id)?;
    tx.commit()?;
    debug!(transaction_id = id, fields = sets.len() - 1, "transaction updated");
    Ok(updated)
}

/// Deletes a transaction together with its budget, inventory and entity links.
pub fn delete_transaction(conn: &mut Connection, id: i64) -> Result<bool> {
    let tx = conn.transaction()?;
    let budget_links = tx.execute(
        "DELETE FROM budget_transactions WHERE transaction_id=?1",
        params![id],
    )?;
    let item_links = tx.execute(
        "DELETE FROM inventory_item_transactions WHERE transaction_id=?1",
        params![id],
    )?;
    let entity_links =
        links::remove_entity_links(&tx, EntityRef::new(EntityKind::Transaction, id))?;
    let deleted = tx.execute("DELETE FROM transactions WHERE id=?1", params![id])?;
    if deleted == 0 {
        // nothing to delete; leave any stray rows for the doctor to report
        return Ok(false);
    }
    tx.commit()?;
    info!(
        transaction_id = id,
        budget_links, item_links, entity_links, "transaction deleted"
    );
    Ok(true)
}

pub fn get_transaction(conn: &Connection, id: i64) -> Result<Option<Transaction>> {
    let sql = format!("SELECT {} FROM transactions WHERE id=?1", COLUMNS);
    let t = conn
        .query_row(&sql, params![id], map_transaction)
        .optional()?;
    Ok(t)
}

pub fn get_transaction_by_purchase_id(
    conn: &Connection,
    purchase_id: i64,
) -> Result<Option<Transaction>> {
    let sql = format!("SELECT {} FROM transactions WHERE purchase_id=?1", COLUMNS);
    let t = conn
        .query_row(&sql, params![purchase_id], map_transaction)
        .optional()?;
    Ok(t)
}

pub fn get_transactions_by_year(conn: &Connection, year: i32) -> Result<Vec<Transaction>> {
    list_transactions(
        conn,
        &TransactionFilter {
            year: Some(year),
            ..Default::default()
        },
    )
}

pub fn list_transactions(conn: &Connection, filter: &TransactionFilter) -> Result<Vec<Transaction>> {
    let mut sql = format!("SELECT {} FROM transactions WHERE 1=1", COLUMNS);
    let mut values: Vec<Box<dyn ToSql>> = Vec::new();

    if let Some(year) = filter.year {
        sql.push_str(" AND year=?");
        values.push(Box::new(year));
    }
    if let Some(status) = filter.status {
        sql.push_str(" AND status=?");
        values.push(Box::new(status));
    }
    if let Some(ref category) = filter.category {
        sql.push_str(" AND category=?");
        values.push(Box::new(category.clone()));
    }
    if let Some(kind) = filter.kind {
        sql.push_str(" AND kind=?");
        values.push(Box::new(kind));
    }
    sql.push_str(" ORDER BY date DESC, id DESC");

    let refs: Vec<&dyn ToSql> = values.iter().map(|v| v.as_ref()).collect();
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(refs.as_slice(), map_transaction)?;
    let mut data = Vec::new();
    for row in rows {
        data.push(row?);
    }
    Ok(data)
}
