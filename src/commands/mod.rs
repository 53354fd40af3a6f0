// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod budgets;
pub mod doctor;
pub mod exporter;
pub mod funds;
pub mod inventory;
pub mod messages;
pub mod purchases;
pub mod relations;
pub mod settings;
pub mod transactions;

/// Acting user taken from the global `--user` flag.
pub(crate) fn acting_user(m: &clap::ArgMatches) -> String {
    m.get_one::<String>("user")
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "treasurer".to_string())
}
