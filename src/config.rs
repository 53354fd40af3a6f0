// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Settings persisted in the `settings` key/value table.

use crate::error::{Result, TreasuryError};
use rusqlite::{params, Connection, OptionalExtension};
use std::fmt;
use std::str::FromStr;

pub const CURRENCY_KEY: &str = "currency";
pub const ALLOCATION_POLICY_KEY: &str = "budget.allocation_policy";

pub const KNOWN_KEYS: &[&str] = &[CURRENCY_KEY, ALLOCATION_POLICY_KEY];

const DEFAULT_CURRENCY: &str = "EUR";

/// What to do when budget links would exceed the budget ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AllocationPolicy {
    #[default]
    Reject,
    Flag,
}

impl fmt::Display for AllocationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reject => f.write_str("reject"),
            Self::Flag => f.write_str("flag"),
        }
    }
}

impl FromStr for AllocationPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "reject" => Ok(Self::Reject),
            "flag" => Ok(Self::Flag),
            other => Err(format!("unknown allocation policy '{}' (use reject|flag)", other)),
        }
    }
}

pub fn get_setting(conn: &Connection, key: &str) -> Result<Option<String>> {
    let v = conn
        .query_row(
            "SELECT value FROM settings WHERE key=?1",
            params![key],
            |r| r.get(0),
        )
        .optional()?;
    Ok(v)
}

/// Stores a setting after validating known keys.
pub fn set_setting(conn: &Connection, key: &str, value: &str) -> Result<()> {
    let value = value.trim();
    match key {
        CURRENCY_KEY => {
            if value.is_empty() {
                return Err(TreasuryError::InvalidData("currency must not be empty".into()));
            }
        }
        ALLOCATION_POLICY_KEY => {
            value
                .parse::<AllocationPolicy>()
                .map_err(TreasuryError::InvalidData)?;
        }
        other => {
            return Err(TreasuryError::InvalidData(format!(
                "unknown setting '{}' (known: {})",
                other,
                KNOWN_KEYS.join(", ")
            )));
        }
    }
    conn.execute(
        "INSERT INTO settings(key, value) VALUES(?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![key, value],
    )?;
    Ok(())
}

pub fn currency(conn: &Connection) -> Result<String> {
    Ok(get_setting(conn, CURRENCY_KEY)?
        .map(|c| c.to_uppercase())
        .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()))
}

pub fn allocation_policy(conn: &Connection) -> Result<AllocationPolicy> {
    match get_setting(conn, ALLOCATION_POLICY_KEY)? {
        Some(raw) => raw.parse().map_err(TreasuryError::InvalidData),
        None => Ok(AllocationPolicy::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    #[test]
    fn defaults_apply_when_unset() {
        let conn = db::open_in_memory().unwrap();
        assert_eq!(currency(&conn).unwrap(), "EUR");
        assert_eq!(allocation_policy(&conn).unwrap(), AllocationPolicy::Reject);
    }

    #[test]
    fn set_setting_validates_known_keys() {
        let conn = db::open_in_memory().unwrap();
        set_setting(&conn, ALLOCATION_POLICY_KEY, " Flag ").unwrap();
        assert_eq!(allocation_policy(&conn).unwrap(), AllocationPolicy::Flag);
        assert!(set_setting(&conn, ALLOCATION_POLICY_KEY, "maybe").is_err());
        assert!(set_setting(&conn, "base_currency", "USD").is_err());
    }
}
