// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::Result;
use crate::models::{Message, Purchase, PurchaseStatus};
use crate::utils::now;
use rusqlite::{params, Connection, Row};
use tracing::debug;

/// Outbound notification sink called when a reimbursement is decided.
///
/// Runs after the status change has committed, on the same connection.
pub trait Notifier {
    fn purchase_resolved(&self, conn: &Connection, purchase: &Purchase) -> Result<()>;
}

/// Stores decisions as [`Message`] rows addressed to the purchase creator.
pub struct MessageNotifier;

impl Notifier for MessageNotifier {
    fn purchase_resolved(&self, conn: &Connection, purchase: &Purchase) -> Result<()> {
        let verdict = match purchase.status {
            PurchaseStatus::Rejected => "rejected",
            _ => "approved",
        };
        let subject = format!("Reimbursement request #{} {}", purchase.id, verdict);
        let body = format!(
            "Your reimbursement request of {} for {} has been {}.",
            purchase.amount, purchase.purchaser_name, verdict
        );
        create_message(conn, &purchase.created_by, Some(purchase.id), &subject, &body)?;
        Ok(())
    }
}

fn map_message(r: &Row<'_>) -> rusqlite::Result<Message> {
    Ok(Message {
        id: r.get(0)?,
        recipient: r.get(1)?,
        purchase_id: r.get(2)?,
        subject: r.get(3)?,
        body: r.get(4)?,
        read: r.get(5)?,
        created_at: r.get(6)?,
    })
}

pub fn create_message(
    conn: &Connection,
    recipient: &str,
    purchase_id: Option<i64>,
    subject: &str,
    body: &str,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO messages(recipient, purchase_id, subject, body, read, created_at)
         VALUES (?1, ?2, ?3, ?4, 0, ?5)",
        params![recipient, purchase_id, subject, body, now()],
    )?;
    let id = conn.last_insert_rowid();
    debug!(message_id = id, recipient, purchase_id = ?purchase_id, "message created");
    Ok(id)
}

pub fn list_messages(conn: &Connection, recipient: &str, unread_only: bool) -> Result<Vec<Message>> {
    let mut stmt = conn.prepare(
        "SELECT id, recipient, purchase_id, subject, body, read, created_at
         FROM messages WHERE recipient=?1 AND (?2 = 0 OR read = 0)
         ORDER BY created_at DESC, id DESC",
    )?;
    let rows = stmt.query_map(params![recipient, unread_only], map_message)?;
    let mut data = Vec::new();
    for row in rows {
        data.push(row?);
    }
    Ok(data)
}

pub fn mark_read(conn: &Connection, id: i64) -> Result<bool> {
    let changed = conn.execute("UPDATE messages SET read=1 WHERE id=?1", params![id])?;
    Ok(changed > 0)
}
