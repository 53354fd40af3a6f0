// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Purchase reimbursement workflow.
//!
//! A purchase moves `pending -> approved -> reimbursed` or
//! `pending -> rejected`. Every status change is mirrored onto the linked
//! transaction; [`sync_transaction_statuses`] repairs drift between the two.

use crate::error::{Result, TreasuryError};
use crate::messages::Notifier;
use crate::models::{Purchase, PurchaseStatus, ReimbursementStatus, TransactionStatus};
use crate::utils::{decimal_column, now};
use rusqlite::{params, Connection, OptionalExtension, Row};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, warn};

const COLUMNS: &str = "id, amount, purchaser_name, bank_account, minutes_ref, description, \
                       status, year, created_by, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct NewPurchase {
    pub amount: Decimal,
    pub purchaser_name: String,
    pub bank_account: String,
    pub minutes_ref: String,
    pub description: Option<String>,
    pub year: i32,
    pub created_by: String,
}

/// Outcome of a reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub checked: usize,
    pub updated: usize,
    pub without_transaction: usize,
}

/// Transaction `(status, reimbursement_status)` implied by a purchase status.
pub fn transaction_fields(status: PurchaseStatus) -> (TransactionStatus, ReimbursementStatus) {
    match status {
        PurchaseStatus::Pending => (TransactionStatus::Pending, ReimbursementStatus::Requested),
        PurchaseStatus::Approved | PurchaseStatus::Reimbursed => {
            (TransactionStatus::Complete, ReimbursementStatus::Approved)
        }
        PurchaseStatus::Rejected => (TransactionStatus::Declined, ReimbursementStatus::Declined),
    }
}

pub fn can_transition(from: PurchaseStatus, to: PurchaseStatus) -> bool {
    use PurchaseStatus::*;
    matches!(
        (from, to),
        (Pending, Approved) | (Pending, Rejected) | (Approved, Reimbursed)
    )
}

fn map_purchase(r: &Row<'_>) -> rusqlite::Result<Purchase> {
    Ok(Purchase {
        id: r.get(0)?,
        amount: decimal_column(r, 1)?,
        purchaser_name: r.get(2)?,
        bank_account: r.get(3)?,
        minutes_ref: r.get(4)?,
        description: r.get(5)?,
        status: r.get(6)?,
        year: r.get(7)?,
        created_by: r.get(8)?,
        created_at: r.get(9)?,
        updated_at: r.get(10)?,
    })
}

pub fn create_purchase(conn: &Connection, input: NewPurchase) -> Result<Purchase> {
    if input.amount <= Decimal::ZERO {
        return Err(TreasuryError::InvalidAmount(format!(
            "purchase amount must be positive, got {}",
            input.amount
        )));
    }
    let minutes_ref = input.minutes_ref.trim();
    if minutes_ref.is_empty() {
        return Err(TreasuryError::InvalidData(
            "a purchase requires a meeting minutes reference".into(),
        ));
    }
    let ts = now();
    conn.execute(
        "INSERT INTO purchases(amount, purchaser_name, bank_account, minutes_ref, description,
                               status, year, created_by, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)",
        params![
            input.amount.to_string(),
            input.purchaser_name.trim(),
            input.bank_account.trim(),
            minutes_ref,
            input.description,
            PurchaseStatus::Pending,
            input.year,
            input.created_by.trim(),
            ts,
        ],
    )?;
    let id = conn.last_insert_rowid();
    info!(purchase_id = id, amount = %input.amount, "purchase submitted");
    get_purchase(conn, id)?.ok_or_else(|| TreasuryError::not_found("purchase", id))
}

pub fn get_purchase(conn: &Connection, id: i64) -> Result<Option<Purchase>> {
    let sql = format!("SELECT {} FROM purchases WHERE id=?1", COLUMNS);
    Ok(conn.query_row(&sql, params![id], map_purchase).optional()?)
}

pub fn get_all_purchases(conn: &Connection) -> Result<Vec<Purchase>> {
    let sql = format!("SELECT {} FROM purchases ORDER BY id", COLUMNS);
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], map_purchase)?;
    let mut data = Vec::new();
    for row in rows {
        data.push(row?);
    }
    Ok(data)
}

pub fn get_purchases_by_year(conn: &Connection, year: i32) -> Result<Vec<Purchase>> {
    let sql = format!("SELECT {} FROM purchases WHERE year=?1 ORDER BY id", COLUMNS);
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![year], map_purchase)?;
    let mut data = Vec::new();
    for row in rows {
        data.push(row?);
    }
    Ok(data)
}

/// Writes the mapped status fields onto the purchase's transaction, if any.
/// Returns whether a row changed.
fn mirror_onto_transaction(conn: &Connection, purchase: &Purchase) -> Result<bool> {
    let (status, rs) = transaction_fields(purchase.status);
    let changed = conn.execute(
        "UPDATE transactions SET status=?1, reimbursement_status=?2, updated_at=?3
         WHERE purchase_id=?4
           AND (status IS NOT ?1 OR reimbursement_status IS NOT ?2)",
        params![status, rs, now(), purchase.id],
    )?;
    Ok(changed > 0)
}

/// Moves a purchase to `status` and mirrors it onto the linked transaction.
///
/// Both writes commit together. Approval and rejection then notify the
/// purchase owner through `notifier`; a notification failure is logged and
/// does not undo the status change. Setting the current status is a no-op.
pub fn update_purchase_status(
    conn: &mut Connection,
    id: i64,
    status: PurchaseStatus,
    notifier: &dyn Notifier,
) -> Result<Option<Purchase>> {
    let tx = conn.transaction()?;
    let Some(current) = get_purchase(&tx, id)? else {
        return Ok(None);
    };
    if current.status == status {
        return Ok(Some(current));
    }
    if !can_transition(current.status, status) {
        return Err(TreasuryError::InvalidTransition {
            from: current.status.to_string(),
            to: status.to_string(),
        });
    }
    tx.execute(
        "UPDATE purchases SET status=?1, updated_at=?2 WHERE id=?3",
        params![status, now(), id],
    )?;
    let updated = get_purchase(&tx, id)?.ok_or_else(|| TreasuryError::not_found("purchase", id))?;
    let mirrored = mirror_onto_transaction(&tx, &updated)?;
    tx.commit()?;

    info!(
        purchase_id = id,
        from = %current.status,
        to = %status,
        transaction_updated = mirrored,
        "purchase status changed"
    );

    if matches!(status, PurchaseStatus::Approved | PurchaseStatus::Rejected) {
        if let Err(err) = notifier.purchase_resolved(conn, &updated) {
            warn!(purchase_id = id, error = %err, "failed to notify purchase owner");
        }
    }
    Ok(Some(updated))
}

/// Re-applies the purchase-to-transaction status mapping for every purchase.
///
/// Purchases without a transaction are counted and skipped. Safe to re-run:
/// a second pass reports no updates.
pub fn sync_transaction_statuses(conn: &mut Connection) -> Result<SyncReport> {
    let tx = conn.transaction()?;
    let mut report = SyncReport::default();
    for purchase in get_all_purchases(&tx)? {
        report.checked += 1;
        let linked: Option<i64> = tx
            .query_row(
                "SELECT id FROM transactions WHERE purchase_id=?1",
                params![purchase.id],
                |r| r.get(0),
            )
            .optional()?;
        let Some(transaction_id) = linked else {
            info!(purchase_id = purchase.id, "purchase has no linked transaction, skipping");
            report.without_transaction += 1;
            continue;
        };
        if mirror_onto_transaction(&tx, &purchase)? {
            info!(
                purchase_id = purchase.id,
                transaction_id,
                status = %purchase.status,
                "corrected transaction status drift"
            );
            report.updated += 1;
        }
    }
    tx.commit()?;
    Ok(report)
}
