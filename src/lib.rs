// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod budgets;
pub mod cli;
pub mod commands;
pub mod config;
pub mod db;
pub mod error;
pub mod funds;
pub mod inventory;
pub mod ledger;
pub mod links;
pub mod messages;
pub mod models;
pub mod reimbursement;
pub mod utils;

pub use error::{Result, TreasuryError};
