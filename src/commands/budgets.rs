// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::budgets::{self, BudgetPatch, NewBudget};
use crate::commands::acting_user;
use crate::config;
use crate::utils::{
    fmt_money, maybe_print_json, optional_arg, parse_arg, parse_decimal, pretty_table,
    required_arg,
};
use anyhow::{Context, Result, bail};
use rusqlite::Connection;
use serde::Serialize;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("show", sub)) => show(conn, sub)?,
        Some(("update", sub)) => update(conn, sub)?,
        Some(("close", sub)) => {
            let id: i64 = parse_arg(sub, "id")?;
            match budgets::close_budget(conn, id)? {
                Some(b) => println!("Closed budget '{}'; unused headroom released", b.name),
                None => bail!("Budget {} not found", id),
            }
        }
        Some(("reopen", sub)) => {
            let id: i64 = parse_arg(sub, "id")?;
            match budgets::reopen_budget(conn, id)? {
                Some(b) => println!("Reopened budget '{}'", b.name),
                None => bail!("Budget {} not found", id),
            }
        }
        Some(("rm", sub)) => {
            let id: i64 = parse_arg(sub, "id")?;
            if budgets::delete_budget(conn, id)? {
                println!("Removed budget {}", id);
            } else {
                println!("Budget {} was not removed: it is missing or still has linked transactions", id);
            }
        }
        Some(("link", sub)) => {
            let budget_id: i64 = parse_arg(sub, "budget")?;
            let tx_id: i64 = parse_arg(sub, "tx")?;
            let amount = parse_decimal(required_arg(sub, "amount")?)?;
            let link = budgets::link_transaction(conn, tx_id, budget_id, amount)
                .with_context(|| format!("Failed to link transaction {} to budget {}", tx_id, budget_id))?;
            println!(
                "Linked transaction #{} to budget #{} for {}",
                link.transaction_id, link.budget_id, link.amount
            );
        }
        Some(("unlink", sub)) => {
            let budget_id: i64 = parse_arg(sub, "budget")?;
            let tx_id: i64 = parse_arg(sub, "tx")?;
            if budgets::unlink_transaction(conn, tx_id, budget_id)? {
                println!("Unlinked transaction #{} from budget #{}", tx_id, budget_id);
            } else {
                println!("Transaction #{} is not linked to budget #{}", tx_id, budget_id);
            }
        }
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let year = *sub
        .get_one::<i32>("year")
        .context("Missing required argument --year")?;
    let b = budgets::create_budget(
        conn,
        NewBudget {
            name: required_arg(sub, "name")?.to_string(),
            description: optional_arg(sub, "description"),
            amount: parse_decimal(required_arg(sub, "amount")?)?,
            year,
            created_by: Some(acting_user(sub)),
        },
    )?;
    println!(
        "Reserved {} for '{}' in {} (budget #{})",
        fmt_money(&b.amount, &config::currency(conn)?),
        b.name,
        b.year,
        b.id
    );
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let year = *sub
        .get_one::<i32>("year")
        .context("Missing required argument --year")?;
    let rows = if sub.get_flag("open") {
        budgets::get_open_budgets_by_year(conn, year)?
    } else {
        budgets::get_budgets_by_year(conn, year)?
    };
    let mut summaries = Vec::new();
    for b in rows {
        if let Some(s) = budgets::budget_summary(conn, b.id)? {
            summaries.push(s);
        }
    }
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &summaries)? {
        let data = summaries
            .iter()
            .map(|s| {
                vec![
                    s.budget.id.to_string(),
                    s.budget.name.clone(),
                    s.budget.status.to_string(),
                    format!("{:.2}", s.budget.amount),
                    format!("{:.2}", s.used),
                    format!("{:.2}", s.reserved),
                    format!("{:.2}", s.remaining),
                    if s.over_allocated { "yes".into() } else { String::new() },
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["ID", "Name", "Status", "Amount", "Used", "Reserved", "Remaining", "Over"],
                data
            )
        );
    }
    Ok(())
}

#[derive(Serialize)]
struct BudgetDetail {
    #[serde(flatten)]
    summary: budgets::BudgetSummary,
    links: Vec<crate::models::BudgetTransaction>,
}

fn show(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id: i64 = parse_arg(sub, "id")?;
    let Some(summary) = budgets::budget_summary(conn, id)? else {
        bail!("Budget {} not found", id);
    };
    let detail = BudgetDetail {
        links: budgets::get_budget_links(conn, id)?,
        summary,
    };
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &detail)? {
        let ccy = config::currency(conn)?;
        let s = &detail.summary;
        println!(
            "Budget #{} '{}' ({}, {})",
            s.budget.id, s.budget.name, s.budget.year, s.budget.status
        );
        println!(
            "{}",
            pretty_table(
                &["Ceiling", "Allocated", "Used", "Reserved", "Remaining"],
                vec![vec![
                    fmt_money(&s.budget.amount, &ccy),
                    fmt_money(&s.allocated, &ccy),
                    fmt_money(&s.used, &ccy),
                    fmt_money(&s.reserved, &ccy),
                    fmt_money(&s.remaining, &ccy),
                ]],
            )
        );
        if s.over_allocated {
            println!("warning: links exceed the budget ceiling");
        }
        let links = detail
            .links
            .iter()
            .map(|l| vec![l.transaction_id.to_string(), format!("{:.2}", l.amount)])
            .collect();
        println!("{}", pretty_table(&["Transaction", "Amount"], links));
    }
    Ok(())
}

fn update(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id: i64 = parse_arg(sub, "id")?;
    let patch = BudgetPatch {
        name: optional_arg(sub, "name"),
        description: optional_arg(sub, "description"),
        amount: optional_arg(sub, "amount")
            .map(|s| parse_decimal(&s))
            .transpose()?,
    };
    match budgets::update_budget(conn, id, patch)? {
        Some(b) => println!("Updated budget #{} '{}' ({})", b.id, b.name, b.amount),
        None => bail!("Budget {} not found", id),
    }
    Ok(())
}
