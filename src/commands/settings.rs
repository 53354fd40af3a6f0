// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::{self, KNOWN_KEYS};
use crate::utils::{pretty_table, required_arg};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("get", sub)) => {
            let keys: Vec<&str> = match sub.get_one::<String>("key") {
                Some(k) => vec![k.trim()],
                None => KNOWN_KEYS.to_vec(),
            };
            let mut rows = Vec::new();
            for key in keys {
                let value = match key {
                    config::CURRENCY_KEY => config::currency(conn)?,
                    config::ALLOCATION_POLICY_KEY => config::allocation_policy(conn)?.to_string(),
                    other => config::get_setting(conn, other)?.unwrap_or_default(),
                };
                rows.push(vec![key.to_string(), value]);
            }
            println!("{}", pretty_table(&["Key", "Value"], rows));
        }
        Some(("set", sub)) => {
            let key = required_arg(sub, "key")?;
            let value = required_arg(sub, "value")?;
            config::set_setting(conn, key, value)?;
            println!("Set {} = {}", key, value);
        }
        _ => {}
    }
    Ok(())
}
