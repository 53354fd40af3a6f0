// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Declares a closed enumeration persisted as a lowercase TEXT column.
macro_rules! text_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($text => Ok($name::$variant),)+
                    other => Err(format!(
                        "unknown {} '{}'",
                        stringify!($name),
                        other
                    )),
                }
            }
        }

        impl ToSql for $name {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.as_str()))
            }
        }

        impl FromSql for $name {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                let s = value.as_str()?;
                s.parse()
                    .map_err(|e: String| FromSqlError::Other(e.into()))
            }
        }
    };
}

text_enum!(
    TransactionKind {
        Income => "income",
        Expense => "expense",
    }
);

text_enum!(
    TransactionStatus {
        Pending => "pending",
        Complete => "complete",
        Paused => "paused",
        Declined => "declined",
    }
);

text_enum!(
    ReimbursementStatus {
        NotRequested => "not_requested",
        Requested => "requested",
        Approved => "approved",
        Declined => "declined",
    }
);

text_enum!(
    PurchaseStatus {
        Pending => "pending",
        Approved => "approved",
        Reimbursed => "reimbursed",
        Rejected => "rejected",
    }
);

text_enum!(
    BudgetStatus {
        Open => "open",
        Closed => "closed",
    }
);

text_enum!(
    InventoryStatus {
        Active => "active",
        Removed => "removed",
        Legacy => "legacy",
    }
);

text_enum!(
    /// Entity kinds that may take part in a generic relationship.
    EntityKind {
        Transaction => "transaction",
        Purchase => "purchase",
        Budget => "budget",
        InventoryItem => "inventory_item",
        Minute => "minute",
        Receipt => "receipt",
    }
);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub year: i32,
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub description: String,
    pub category: Option<String>,
    pub date: NaiveDate,
    pub status: TransactionStatus,
    pub reimbursement_status: Option<ReimbursementStatus>,
    pub purchase_id: Option<i64>,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    /// Whether the transaction counts toward the settled balance.
    pub fn is_settled(&self) -> bool {
        matches!(
            self.reimbursement_status,
            None | Some(ReimbursementStatus::NotRequested) | Some(ReimbursementStatus::Approved)
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Purchase {
    pub id: i64,
    pub amount: Decimal,
    pub purchaser_name: String,
    pub bank_account: String,
    pub minutes_ref: String,
    pub description: Option<String>,
    pub status: PurchaseStatus,
    pub year: i32,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FundBudget {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub amount: Decimal, // reserved ceiling
    pub year: i32,
    pub status: BudgetStatus,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetTransaction {
    pub budget_id: i64,
    pub transaction_id: i64,
    pub amount: Decimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: i64,
    pub name: String,
    pub location: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub quantity: i64,
    pub manual_count: i64,
    pub status: InventoryStatus,
    pub removal_reason: Option<String>,
    pub removal_notes: Option<String>,
    pub removed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryItemTransaction {
    pub item_id: i64,
    pub transaction_id: i64,
    pub quantity: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub recipient: String,
    pub purchase_id: Option<i64>,
    pub subject: String,
    pub body: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    pub kind: EntityKind,
    pub id: i64,
}

impl EntityRef {
    pub fn new(kind: EntityKind, id: i64) -> Self {
        Self { kind, id }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

impl FromStr for EntityRef {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, id) = s
            .trim()
            .split_once(':')
            .ok_or_else(|| format!("expected KIND:ID, got '{}'", s))?;
        let id = id
            .trim()
            .parse::<i64>()
            .map_err(|e| format!("invalid id in '{}': {}", s, e))?;
        Ok(Self::new(kind.parse()?, id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enum_text_is_case_insensitive() {
        assert_eq!(
            " Not_Requested ".parse::<ReimbursementStatus>().unwrap(),
            ReimbursementStatus::NotRequested
        );
        assert!("settled".parse::<TransactionStatus>().is_err());
    }

    #[test]
    fn entity_ref_parses_kind_and_id() {
        let r: EntityRef = "inventory_item:12".parse().unwrap();
        assert_eq!(r, EntityRef::new(EntityKind::InventoryItem, 12));
        assert_eq!(r.to_string(), "inventory_item:12");
        assert!("purchase".parse::<EntityRef>().is_err());
    }
}
