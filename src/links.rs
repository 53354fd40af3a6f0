// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Generic relationships between entities, addressed by `(kind, id)`.

use crate::error::{Result, TreasuryError};
use crate::models::{EntityKind, EntityRef};
use crate::utils::now;
use rusqlite::{params, Connection};
use tracing::debug;

/// Relates two entities. Linking an already related pair is a no-op.
pub fn link_entities(conn: &Connection, from: EntityRef, to: EntityRef) -> Result<bool> {
    if from == to {
        return Err(TreasuryError::InvalidData(format!(
            "cannot link {} to itself",
            from
        )));
    }
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO entity_links(from_kind, from_id, to_kind, to_id, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![from.kind, from.id, to.kind, to.id, now()],
    )?;
    debug!(%from, %to, inserted, "entity link");
    Ok(inserted > 0)
}

/// Removes the relationship in either direction.
pub fn unlink_entities(conn: &Connection, a: EntityRef, b: EntityRef) -> Result<bool> {
    let removed = conn.execute(
        "DELETE FROM entity_links
         WHERE (from_kind=?1 AND from_id=?2 AND to_kind=?3 AND to_id=?4)
            OR (from_kind=?3 AND from_id=?4 AND to_kind=?1 AND to_id=?2)",
        params![a.kind, a.id, b.kind, b.id],
    )?;
    Ok(removed > 0)
}

/// Entities related to `entity` in either direction, optionally of one kind.
pub fn related_entities(
    conn: &Connection,
    entity: EntityRef,
    kind: Option<EntityKind>,
) -> Result<Vec<EntityRef>> {
    let mut stmt = conn.prepare(
        "SELECT to_kind, to_id FROM entity_links WHERE from_kind=?1 AND from_id=?2
         UNION
         SELECT from_kind, from_id FROM entity_links WHERE to_kind=?1 AND to_id=?2
         ORDER BY 1, 2",
    )?;
    let rows = stmt.query_map(params![entity.kind, entity.id], |r| {
        Ok(EntityRef::new(r.get(0)?, r.get(1)?))
    })?;
    let mut data = Vec::new();
    for row in rows {
        let other = row?;
        if kind.is_none_or(|k| k == other.kind) {
            data.push(other);
        }
    }
    Ok(data)
}

/// Drops every relationship touching `entity`; returns how many were removed.
pub fn remove_entity_links(conn: &Connection, entity: EntityRef) -> Result<usize> {
    let removed = conn.execute(
        "DELETE FROM entity_links
         WHERE (from_kind=?1 AND from_id=?2) OR (to_kind=?1 AND to_id=?2)",
        params![entity.kind, entity.id],
    )?;
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    #[test]
    fn links_are_found_from_both_ends() {
        let conn = db::open_in_memory().unwrap();
        let purchase = EntityRef::new(EntityKind::Purchase, 4);
        let item = EntityRef::new(EntityKind::InventoryItem, 9);
        let minute = EntityRef::new(EntityKind::Minute, 2);

        assert!(link_entities(&conn, purchase, item).unwrap());
        assert!(!link_entities(&conn, purchase, item).unwrap());
        link_entities(&conn, minute, purchase).unwrap();

        assert_eq!(related_entities(&conn, item, None).unwrap(), vec![purchase]);
        assert_eq!(
            related_entities(&conn, purchase, Some(EntityKind::Minute)).unwrap(),
            vec![minute]
        );
        assert_eq!(related_entities(&conn, purchase, None).unwrap().len(), 2);

        assert!(unlink_entities(&conn, item, purchase).unwrap());
        assert!(related_entities(&conn, item, None).unwrap().is_empty());
        assert_eq!(remove_entity_links(&conn, purchase).unwrap(), 1);
    }

    #[test]
    fn self_links_are_rejected() {
        let conn = db::open_in_memory().unwrap();
        let t = EntityRef::new(EntityKind::Transaction, 1);
        assert!(link_entities(&conn, t, t).is_err());
    }
}
