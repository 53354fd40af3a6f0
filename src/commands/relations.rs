// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::links;
use crate::models::{EntityKind, EntityRef};
use crate::utils::{maybe_print_json, parse_arg, parse_opt_arg, pretty_table};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let from: EntityRef = parse_arg(sub, "from")?;
            let to: EntityRef = parse_arg(sub, "to")?;
            if links::link_entities(conn, from, to)? {
                println!("Linked {} -> {}", from, to);
            } else {
                println!("{} and {} were already linked", from, to);
            }
        }
        Some(("rm", sub)) => {
            let from: EntityRef = parse_arg(sub, "from")?;
            let to: EntityRef = parse_arg(sub, "to")?;
            if links::unlink_entities(conn, from, to)? {
                println!("Unlinked {} and {}", from, to);
            } else {
                println!("{} and {} are not linked", from, to);
            }
        }
        Some(("list", sub)) => {
            let entity: EntityRef = parse_arg(sub, "entity")?;
            let kind: Option<EntityKind> = parse_opt_arg(sub, "kind")?;
            let related = links::related_entities(conn, entity, kind)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &related)? {
                let rows = related
                    .iter()
                    .map(|r| vec![r.kind.to_string(), r.id.to_string()])
                    .collect();
                println!("{}", pretty_table(&["Kind", "ID"], rows));
            }
        }
        _ => {}
    }
    Ok(())
}
