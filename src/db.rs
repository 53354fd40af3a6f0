// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::Connection;
use std::fs;
use std::path::{Path, PathBuf};

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("org.tenantcommittee", "Treasury", "treasury"));

pub fn db_path() -> Result<PathBuf> {
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("treasury.sqlite"))
}

/// Opens the database at `path`, or the platform data dir when `None`.
pub fn open_or_init(path: Option<&Path>) -> Result<Connection> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => db_path()?,
    };
    let conn =
        Connection::open(&path).with_context(|| format!("Open DB at {}", path.display()))?;
    init_schema(&conn).with_context(|| format!("Initialise schema at {}", path.display()))?;
    Ok(conn)
}

pub fn open_in_memory() -> rusqlite::Result<Connection> {
    let conn = Connection::open_in_memory()?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS settings(
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS purchases(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        amount TEXT NOT NULL,
        purchaser_name TEXT NOT NULL,
        bank_account TEXT NOT NULL,
        minutes_ref TEXT NOT NULL,
        description TEXT,
        status TEXT NOT NULL DEFAULT 'pending'
            CHECK(status IN ('pending','approved','reimbursed','rejected')),
        year INTEGER NOT NULL,
        created_by TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_purchases_year ON purchases(year);

    CREATE TABLE IF NOT EXISTS transactions(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        year INTEGER NOT NULL,
        kind TEXT NOT NULL CHECK(kind IN ('income','expense')),
        amount TEXT NOT NULL,
        description TEXT NOT NULL,
        category TEXT,
        date TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'pending'
            CHECK(status IN ('pending','complete','paused','declined')),
        reimbursement_status TEXT DEFAULT 'not_requested'
            CHECK(reimbursement_status IS NULL
                  OR reimbursement_status IN ('not_requested','requested','approved','declined')),
        purchase_id INTEGER,
        created_by TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        FOREIGN KEY(purchase_id) REFERENCES purchases(id) ON DELETE SET NULL
    );
    CREATE INDEX IF NOT EXISTS idx_transactions_year ON transactions(year);
    -- one transaction per purchase
    CREATE UNIQUE INDEX IF NOT EXISTS idx_transactions_purchase
        ON transactions(purchase_id) WHERE purchase_id IS NOT NULL;

    CREATE TABLE IF NOT EXISTS fund_budgets(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        description TEXT,
        amount TEXT NOT NULL,
        year INTEGER NOT NULL,
        status TEXT NOT NULL DEFAULT 'open' CHECK(status IN ('open','closed')),
        created_by TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_fund_budgets_year ON fund_budgets(year);

    CREATE TABLE IF NOT EXISTS budget_transactions(
        budget_id INTEGER NOT NULL,
        transaction_id INTEGER NOT NULL,
        amount TEXT NOT NULL,
        created_at TEXT NOT NULL,
        PRIMARY KEY(budget_id, transaction_id),
        FOREIGN KEY(budget_id) REFERENCES fund_budgets(id),
        FOREIGN KEY(transaction_id) REFERENCES transactions(id)
    );
    CREATE INDEX IF NOT EXISTS idx_budget_transactions_tx ON budget_transactions(transaction_id);

    CREATE TABLE IF NOT EXISTS inventory_items(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        location TEXT,
        category TEXT,
        description TEXT,
        quantity INTEGER NOT NULL DEFAULT 0 CHECK(quantity >= 0),
        manual_count INTEGER NOT NULL DEFAULT 0 CHECK(manual_count >= 0),
        status TEXT NOT NULL DEFAULT 'active' CHECK(status IN ('active','removed','legacy')),
        removal_reason TEXT,
        removal_notes TEXT,
        removed_at TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS inventory_item_transactions(
        item_id INTEGER NOT NULL,
        transaction_id INTEGER NOT NULL,
        quantity INTEGER NOT NULL CHECK(quantity > 0),
        PRIMARY KEY(item_id, transaction_id),
        FOREIGN KEY(item_id) REFERENCES inventory_items(id),
        FOREIGN KEY(transaction_id) REFERENCES transactions(id)
    );
    CREATE INDEX IF NOT EXISTS idx_inventory_links_tx ON inventory_item_transactions(transaction_id);

    CREATE TABLE IF NOT EXISTS messages(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        recipient TEXT NOT NULL,
        purchase_id INTEGER,
        subject TEXT NOT NULL,
        body TEXT NOT NULL,
        read INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL,
        FOREIGN KEY(purchase_id) REFERENCES purchases(id) ON DELETE SET NULL
    );
    CREATE INDEX IF NOT EXISTS idx_messages_recipient ON messages(recipient);

    CREATE TABLE IF NOT EXISTS entity_links(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        from_kind TEXT NOT NULL,
        from_id INTEGER NOT NULL,
        to_kind TEXT NOT NULL,
        to_id INTEGER NOT NULL,
        created_at TEXT NOT NULL,
        UNIQUE(from_kind, from_id, to_kind, to_id)
    );
    CREATE INDEX IF NOT EXISTS idx_entity_links_to ON entity_links(to_kind, to_id);
    "#,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_is_idempotent() {
        let conn = open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        let n: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='budget_transactions'",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(n, 1);
    }

    #[test]
    fn open_or_init_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("books.sqlite");
        open_or_init(Some(&path)).unwrap();
        assert!(path.exists());
    }
}
