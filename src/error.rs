// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rust_decimal::Decimal;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, TreasuryError>;

#[derive(Error, Debug)]
pub enum TreasuryError {
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid status transition {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Budget {budget_id} would be over-allocated: ceiling {ceiling}, requested total {requested}")]
    OverAllocated {
        budget_id: i64,
        ceiling: Decimal,
        requested: Decimal,
    },

    #[error("Budget {0} is closed")]
    BudgetClosed(i64),

    #[error("Inventory item {item_id} has {available} units available, {requested} requested")]
    InsufficientQuantity {
        item_id: i64,
        available: i64,
        requested: i64,
    },

    #[error("Inventory item {0} is not active")]
    InactiveItem(i64),

    #[error("Invalid stored data: {0}")]
    InvalidData(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

impl TreasuryError {
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        Self::NotFound { entity, id }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}
