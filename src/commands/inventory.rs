// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::inventory::{self, InventoryPatch, NewInventoryItem};
use crate::utils::{maybe_print_json, optional_arg, parse_arg, parse_opt_arg, pretty_table, required_arg};
use anyhow::{Result, bail};
use rusqlite::Connection;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let item = inventory::create_item(
                conn,
                NewInventoryItem {
                    name: required_arg(sub, "name")?.to_string(),
                    location: optional_arg(sub, "location"),
                    category: optional_arg(sub, "category"),
                    description: optional_arg(sub, "description"),
                    quantity: parse_arg(sub, "quantity")?,
                    manual_count: parse_opt_arg(sub, "manual-count")?.unwrap_or(0),
                },
            )?;
            println!("Added item #{} '{}' x{}", item.id, item.name, item.quantity);
        }
        Some(("update", sub)) => {
            let id: i64 = parse_arg(sub, "id")?;
            let patch = InventoryPatch {
                name: optional_arg(sub, "name"),
                location: optional_arg(sub, "location"),
                category: optional_arg(sub, "category"),
                description: optional_arg(sub, "description"),
                quantity: parse_opt_arg(sub, "quantity")?,
                manual_count: parse_opt_arg(sub, "manual-count")?,
            };
            match inventory::update_item(conn, id, patch)? {
                Some(item) => println!("Updated item #{} '{}'", item.id, item.name),
                None => bail!("Inventory item {} not found", id),
            }
        }
        Some(("list", sub)) => list(conn, sub)?,
        Some(("picker", sub)) => picker(conn, sub)?,
        Some(("link", sub)) => {
            let item_id: i64 = parse_arg(sub, "item")?;
            let tx_id: i64 = parse_arg(sub, "tx")?;
            let quantity: i64 = parse_arg(sub, "quantity")?;
            let link = inventory::link_item(conn, item_id, tx_id, quantity)?;
            println!(
                "Item #{} now has {} units on transaction #{}",
                link.item_id, link.quantity, link.transaction_id
            );
        }
        Some(("unlink", sub)) => {
            let item_id: i64 = parse_arg(sub, "item")?;
            let tx_id: i64 = parse_arg(sub, "tx")?;
            if inventory::unlink_item(conn, item_id, tx_id)? {
                println!("Unlinked item #{} from transaction #{}", item_id, tx_id);
            } else {
                println!("Item #{} is not linked to transaction #{}", item_id, tx_id);
            }
        }
        Some(("reduce", sub)) => {
            let item_id: i64 = parse_arg(sub, "item")?;
            let tx_id: i64 = parse_arg(sub, "tx")?;
            let amount: i64 = parse_arg(sub, "amount")?;
            match inventory::reduce_from_transaction(conn, item_id, tx_id, amount)? {
                Some(out) if out.link_removed => println!(
                    "Removed link; item #{} quantity is now {}",
                    item_id, out.item_quantity
                ),
                Some(out) => println!(
                    "Link now holds {} units; item #{} quantity is now {}",
                    out.link_quantity, item_id, out.item_quantity
                ),
                None => bail!("Item {} is not linked to transaction {}", item_id, tx_id),
            }
        }
        Some(("remove", sub)) => {
            let id: i64 = parse_arg(sub, "id")?;
            let reason = required_arg(sub, "reason")?;
            let notes = optional_arg(sub, "notes");
            match inventory::soft_delete_item(conn, id, reason, notes.as_deref())? {
                Some(item) => println!("Item #{} '{}' marked as removed", item.id, item.name),
                None => bail!("Inventory item {} not found", id),
            }
        }
        Some(("legacy", sub)) => {
            let id: i64 = parse_arg(sub, "id")?;
            let manual_count = parse_opt_arg(sub, "manual-count")?;
            match inventory::mark_as_legacy(conn, id, manual_count)? {
                Some(item) => println!(
                    "Item #{} '{}' marked as legacy ({} untracked units)",
                    item.id, item.name, item.manual_count
                ),
                None => bail!("Inventory item {} not found", id),
            }
        }
        Some(("rm", sub)) => {
            let id: i64 = parse_arg(sub, "id")?;
            if inventory::delete_item(conn, id)? {
                println!("Deleted item #{}", id);
            } else {
                println!("Inventory item {} not found", id);
            }
        }
        Some(("links", sub)) => {
            let item_id: i64 = parse_arg(sub, "item")?;
            let links = inventory::get_item_links(conn, item_id)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &links)? {
                let rows = links
                    .iter()
                    .map(|l| vec![l.transaction_id.to_string(), l.quantity.to_string()])
                    .collect();
                println!("{}", pretty_table(&["Transaction", "Quantity"], rows));
            }
        }
        _ => {}
    }
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let items = inventory::get_active_items(conn)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &items)? {
        let rows = items
            .iter()
            .map(|i| {
                vec![
                    i.id.to_string(),
                    i.name.clone(),
                    i.location.clone().unwrap_or_default(),
                    i.quantity.to_string(),
                    i.manual_count.to_string(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["ID", "Name", "Location", "Quantity", "Manual"], rows)
        );
    }
    Ok(())
}

fn picker(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let items = inventory::get_items_for_picker(conn)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &items)? {
        let rows = items
            .iter()
            .map(|p| vec![p.item.id.to_string(), p.item.name.clone(), p.available.to_string()])
            .collect();
        println!("{}", pretty_table(&["ID", "Name", "Available"], rows));
    }
    Ok(())
}
