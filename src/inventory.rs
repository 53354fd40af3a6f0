// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Inventory items and the transactions that acquired them.
//!
//! available = quantity - sum(linked quantities) - manual_count

use crate::error::{Result, TreasuryError};
use crate::ledger;
use crate::links;
use crate::models::{EntityKind, EntityRef, InventoryItem, InventoryItemTransaction, InventoryStatus};
use crate::utils::now;
use rusqlite::{params, Connection, OptionalExtension, Row, ToSql, TransactionBehavior};
use serde::Serialize;
use tracing::{debug, info};

const COLUMNS: &str = "id, name, location, category, description, quantity, manual_count, status, \
                       removal_reason, removal_notes, removed_at, created_at, updated_at";

#[derive(Debug, Clone, Default)]
pub struct NewInventoryItem {
    pub name: String,
    pub location: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub quantity: i64,
    pub manual_count: i64,
}

#[derive(Debug, Clone, Default)]
pub struct InventoryPatch {
    pub name: Option<String>,
    pub location: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub quantity: Option<i64>,
    pub manual_count: Option<i64>,
}

/// An item offered for linking, with its unaccounted units.
#[derive(Debug, Clone, Serialize)]
pub struct PickerItem {
    #[serde(flatten)]
    pub item: InventoryItem,
    pub available: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReduceOutcome {
    pub link_removed: bool,
    /// Quantity left on the link, zero when it was removed.
    pub link_quantity: i64,
    pub item_quantity: i64,
}

fn map_item(r: &Row<'_>) -> rusqlite::Result<InventoryItem> {
    Ok(InventoryItem {
        id: r.get(0)?,
        name: r.get(1)?,
        location: r.get(2)?,
        category: r.get(3)?,
        description: r.get(4)?,
        quantity: r.get(5)?,
        manual_count: r.get(6)?,
        status: r.get(7)?,
        removal_reason: r.get(8)?,
        removal_notes: r.get(9)?,
        removed_at: r.get(10)?,
        created_at: r.get(11)?,
        updated_at: r.get(12)?,
    })
}

fn map_link(r: &Row<'_>) -> rusqlite::Result<InventoryItemTransaction> {
    Ok(InventoryItemTransaction {
        item_id: r.get(0)?,
        transaction_id: r.get(1)?,
        quantity: r.get(2)?,
    })
}

fn check_count(field: &str, value: i64) -> Result<()> {
    if value < 0 {
        return Err(TreasuryError::InvalidData(format!(
            "{} must not be negative, got {}",
            field, value
        )));
    }
    Ok(())
}

pub fn create_item(conn: &Connection, input: NewInventoryItem) -> Result<InventoryItem> {
    check_count("quantity", input.quantity)?;
    check_count("manual_count", input.manual_count)?;
    let ts = now();
    conn.execute(
        "INSERT INTO inventory_items(name, location, category, description, quantity, manual_count,
                                     status, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
        params![
            input.name.trim(),
            input.location,
            input.category,
            input.description,
            input.quantity,
            input.manual_count,
            InventoryStatus::Active,
            ts,
        ],
    )?;
    let id = conn.last_insert_rowid();
    info!(item_id = id, quantity = input.quantity, "inventory item created");
    get_item(conn, id)?.ok_or_else(|| TreasuryError::not_found("inventory item", id))
}

/// Patches an item. The quantity must still cover the linked units plus
/// the manual count.
pub fn update_item(
    conn: &mut Connection,
    id: i64,
    patch: InventoryPatch,
) -> Result<Option<InventoryItem>> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let Some(current) = get_item(&tx, id)? else {
        return Ok(None);
    };
    if let Some(quantity) = patch.quantity {
        check_count("quantity", quantity)?;
    }
    if let Some(manual_count) = patch.manual_count {
        check_count("manual_count", manual_count)?;
    }
    if patch.quantity.is_some() || patch.manual_count.is_some() {
        let quantity = patch.quantity.unwrap_or(current.quantity);
        let accounted =
            linked_quantity(&tx, id)? + patch.manual_count.unwrap_or(current.manual_count);
        if quantity < accounted {
            return Err(TreasuryError::InsufficientQuantity {
                item_id: id,
                available: quantity,
                requested: accounted,
            });
        }
    }
    let mut sets: Vec<&str> = vec!["updated_at=?"];
    let mut values: Vec<Box<dyn ToSql>> = vec![Box::new(now())];
    if let Some(name) = patch.name {
        sets.push("name=?");
        values.push(Box::new(name.trim().to_string()));
    }
    if let Some(location) = patch.location {
        sets.push("location=?");
        values.push(Box::new(location));
    }
    if let Some(category) = patch.category {
        sets.push("category=?");
        values.push(Box::new(category));
    }
    if let Some(description) = patch.description {
        sets.push("description=?");
        values.push(Box::new(description));
    }
    if let Some(quantity) = patch.quantity {
        sets.push("quantity=?");
        values.push(Box::new(quantity));
    }
    if let Some(manual_count) = patch.manual_count {
        sets.push("manual_count=?");
        values.push(Box::new(manual_count));
    }
    values.push(Box::new(id));
    let sql = format!("UPDATE inventory_items SET {} WHERE id=?", sets.join(", "));
    let refs: Vec<&dyn ToSql> = values.iter().map(|v| v.as_ref()).collect();
    tx.execute(&sql, refs.as_slice())?;
    let updated = get_item(&tx, id)?;
    tx.commit()?;
    Ok(updated)
}

pub fn get_item(conn: &Connection, id: i64) -> Result<Option<InventoryItem>> {
    let sql = format!("SELECT {} FROM inventory_items WHERE id=?1", COLUMNS);
    Ok(conn.query_row(&sql, params![id], map_item).optional()?)
}

pub fn get_active_items(conn: &Connection) -> Result<Vec<InventoryItem>> {
    let sql = format!(
        "SELECT {} FROM inventory_items WHERE status=?1 ORDER BY name, id",
        COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![InventoryStatus::Active], map_item)?;
    let mut data = Vec::new();
    for row in rows {
        data.push(row?);
    }
    Ok(data)
}

fn linked_quantity(conn: &Connection, item_id: i64) -> Result<i64> {
    let q: i64 = conn.query_row(
        "SELECT COALESCE(SUM(quantity), 0) FROM inventory_item_transactions WHERE item_id=?1",
        params![item_id],
        |r| r.get(0),
    )?;
    Ok(q)
}

/// Units of an item not yet accounted for by a transaction link or the manual count.
pub fn available_quantity(conn: &Connection, item: &InventoryItem) -> Result<i64> {
    Ok(item.quantity - linked_quantity(conn, item.id)? - item.manual_count)
}

/// Active items that still have unaccounted units.
pub fn get_items_for_picker(conn: &Connection) -> Result<Vec<PickerItem>> {
    let mut data = Vec::new();
    for item in get_active_items(conn)? {
        let available = available_quantity(conn, &item)?;
        if available > 0 {
            data.push(PickerItem { item, available });
        }
    }
    Ok(data)
}

/// Records that `quantity` units of an item came with a transaction.
///
/// An existing link for the same pair is topped up.
pub fn link_item(
    conn: &mut Connection,
    item_id: i64,
    transaction_id: i64,
    quantity: i64,
) -> Result<InventoryItemTransaction> {
    if quantity <= 0 {
        return Err(TreasuryError::InvalidData(format!(
            "linked quantity must be positive, got {}",
            quantity
        )));
    }
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let item = get_item(&tx, item_id)?
        .ok_or_else(|| TreasuryError::not_found("inventory item", item_id))?;
    if item.status != InventoryStatus::Active {
        return Err(TreasuryError::InactiveItem(item_id));
    }
    if ledger::get_transaction(&tx, transaction_id)?.is_none() {
        return Err(TreasuryError::not_found("transaction", transaction_id));
    }
    let available = available_quantity(&tx, &item)?;
    if quantity > available {
        return Err(TreasuryError::InsufficientQuantity {
            item_id,
            available,
            requested: quantity,
        });
    }
    tx.execute(
        "INSERT INTO inventory_item_transactions(item_id, transaction_id, quantity)
         VALUES (?1, ?2, ?3)
         ON CONFLICT(item_id, transaction_id) DO UPDATE SET quantity = quantity + excluded.quantity",
        params![item_id, transaction_id, quantity],
    )?;
    let link = tx.query_row(
        "SELECT item_id, transaction_id, quantity FROM inventory_item_transactions
         WHERE item_id=?1 AND transaction_id=?2",
        params![item_id, transaction_id],
        map_link,
    )?;
    tx.commit()?;
    info!(item_id, transaction_id, quantity, "inventory item linked to transaction");
    Ok(link)
}

pub fn unlink_item(conn: &Connection, item_id: i64, transaction_id: i64) -> Result<bool> {
    let removed = conn.execute(
        "DELETE FROM inventory_item_transactions WHERE item_id=?1 AND transaction_id=?2",
        params![item_id, transaction_id],
    )?;
    Ok(removed > 0)
}

pub fn get_item_links(conn: &Connection, item_id: i64) -> Result<Vec<InventoryItemTransaction>> {
    let mut stmt = conn.prepare(
        "SELECT item_id, transaction_id, quantity FROM inventory_item_transactions
         WHERE item_id=?1 ORDER BY transaction_id",
    )?;
    let rows = stmt.query_map(params![item_id], map_link)?;
    let mut data = Vec::new();
    for row in rows {
        data.push(row?);
    }
    Ok(data)
}

/// Returns or corrects part of a prior acquisition.
///
/// Removing at least the linked quantity deletes the link, otherwise the
/// link is decremented. The item's total quantity drops by `amount`,
/// floored at zero. `None` when the pair is not linked.
pub fn reduce_from_transaction(
    conn: &mut Connection,
    item_id: i64,
    transaction_id: i64,
    amount: i64,
) -> Result<Option<ReduceOutcome>> {
    if amount <= 0 {
        return Err(TreasuryError::InvalidData(format!(
            "amount to remove must be positive, got {}",
            amount
        )));
    }
    let tx = conn.transaction()?;
    let link = tx
        .query_row(
            "SELECT item_id, transaction_id, quantity FROM inventory_item_transactions
             WHERE item_id=?1 AND transaction_id=?2",
            params![item_id, transaction_id],
            map_link,
        )
        .optional()?;
    let Some(link) = link else {
        return Ok(None);
    };

    let (link_removed, link_quantity) = if amount >= link.quantity {
        tx.execute(
            "DELETE FROM inventory_item_transactions WHERE item_id=?1 AND transaction_id=?2",
            params![item_id, transaction_id],
        )?;
        (true, 0)
    } else {
        let left = link.quantity - amount;
        tx.execute(
            "UPDATE inventory_item_transactions SET quantity=?1 WHERE item_id=?2 AND transaction_id=?3",
            params![left, item_id, transaction_id],
        )?;
        (false, left)
    };

    let item = get_item(&tx, item_id)?
        .ok_or_else(|| TreasuryError::not_found("inventory item", item_id))?;
    let item_quantity = (item.quantity - amount).max(0);
    tx.execute(
        "UPDATE inventory_items SET quantity=?1, updated_at=?2 WHERE id=?3",
        params![item_quantity, now(), item_id],
    )?;
    tx.commit()?;

    info!(item_id, transaction_id, amount, link_removed, item_quantity, "inventory reduced");
    Ok(Some(ReduceOutcome {
        link_removed,
        link_quantity,
        item_quantity,
    }))
}

/// Marks an item as removed, keeping it for history.
pub fn soft_delete_item(
    conn: &Connection,
    id: i64,
    reason: &str,
    notes: Option<&str>,
) -> Result<Option<InventoryItem>> {
    let ts = now();
    let changed = conn.execute(
        "UPDATE inventory_items
         SET status=?1, removal_reason=?2, removal_notes=?3, removed_at=?4, updated_at=?4
         WHERE id=?5",
        params![InventoryStatus::Removed, reason.trim(), notes, ts, id],
    )?;
    if changed == 0 {
        return Ok(None);
    }
    info!(item_id = id, reason, "inventory item removed");
    get_item(conn, id)
}

/// Marks pre-ledger stock whose acquiring transaction was never recorded.
pub fn mark_as_legacy(
    conn: &Connection,
    id: i64,
    manual_count: Option<i64>,
) -> Result<Option<InventoryItem>> {
    if let Some(count) = manual_count {
        check_count("manual_count", count)?;
    }
    let changed = conn.execute(
        "UPDATE inventory_items
         SET status=?1, manual_count=COALESCE(?2, manual_count), updated_at=?3
         WHERE id=?4",
        params![InventoryStatus::Legacy, manual_count, now(), id],
    )?;
    if changed == 0 {
        return Ok(None);
    }
    info!(item_id = id, manual_count = ?manual_count, "inventory item marked legacy");
    get_item(conn, id)
}

/// Hard-deletes an item after detaching it from transactions and purchases.
pub fn delete_item(conn: &mut Connection, id: i64) -> Result<bool> {
    let tx = conn.transaction()?;
    let item_links = tx.execute(
        "DELETE FROM inventory_item_transactions WHERE item_id=?1",
        params![id],
    )?;
    let entity_links = links::remove_entity_links(&tx, EntityRef::new(EntityKind::InventoryItem, id))?;
    let deleted = tx.execute("DELETE FROM inventory_items WHERE id=?1", params![id])?;
    if deleted == 0 {
        return Ok(false);
    }
    tx.commit()?;
    debug!(item_id = id, item_links, entity_links, "inventory item deleted");
    Ok(true)
}
