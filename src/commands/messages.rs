// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::acting_user;
use crate::messages;
use crate::utils::{maybe_print_json, parse_arg, pretty_table};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("list", sub)) => {
            let user = acting_user(sub);
            let data = messages::list_messages(conn, &user, sub.get_flag("unread"))?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
                let rows = data
                    .iter()
                    .map(|msg| {
                        vec![
                            msg.id.to_string(),
                            msg.created_at.format("%Y-%m-%d %H:%M").to_string(),
                            msg.subject.clone(),
                            if msg.read { String::new() } else { "new".into() },
                        ]
                    })
                    .collect();
                println!("{}", pretty_table(&["ID", "Received", "Subject", ""], rows));
            }
        }
        Some(("read", sub)) => {
            let id: i64 = parse_arg(sub, "id")?;
            if messages::mark_read(conn, id)? {
                println!("Marked message {} as read", id);
            } else {
                println!("Message {} not found", id);
            }
        }
        _ => {}
    }
    Ok(())
}
