// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, crate_version, value_parser};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print as pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print as JSON lines"),
    )
}

fn opt(name: &'static str) -> Arg {
    Arg::new(name).long(name)
}

fn req(name: &'static str) -> Arg {
    Arg::new(name).long(name).required(true)
}

fn year_arg(required: bool) -> Arg {
    Arg::new("year")
        .long("year")
        .required(required)
        .value_parser(value_parser!(i32))
}

fn tx_cmd() -> Command {
    Command::new("tx")
        .about("Ledger transactions")
        .subcommand_required(true)
        .subcommand(
            Command::new("add")
                .about("Record an income or expense")
                .arg(req("kind").help("income|expense"))
                .arg(req("amount"))
                .arg(req("description"))
                .arg(req("date").help("YYYY-MM-DD"))
                .arg(year_arg(false).help("Book year; defaults to the date's year"))
                .arg(opt("category"))
                .arg(opt("status").help("pending|complete|paused|declined"))
                .arg(opt("purchase").help("Purchase id this transaction settles")),
        )
        .subcommand(json_flags(
            Command::new("list")
                .about("List transactions")
                .arg(year_arg(false))
                .arg(opt("status"))
                .arg(opt("category"))
                .arg(opt("kind")),
        ))
        .subcommand(
            Command::new("update")
                .about("Patch fields of a transaction")
                .arg(req("id"))
                .arg(opt("amount"))
                .arg(opt("description"))
                .arg(opt("category"))
                .arg(opt("date"))
                .arg(year_arg(false))
                .arg(opt("status"))
                .arg(opt("reimbursement").help("not_requested|requested|approved|declined")),
        )
        .subcommand(
            Command::new("rm")
                .about("Delete a transaction and its links")
                .arg(req("id")),
        )
}

fn purchase_cmd() -> Command {
    Command::new("purchase")
        .about("Reimbursement requests")
        .subcommand_required(true)
        .subcommand(
            Command::new("add")
                .about("Submit a reimbursement request")
                .arg(req("amount"))
                .arg(req("purchaser"))
                .arg(req("bank-account"))
                .arg(req("minutes").help("Meeting minutes reference"))
                .arg(year_arg(true))
                .arg(opt("description")),
        )
        .subcommand(json_flags(
            Command::new("list")
                .about("List reimbursement requests")
                .arg(year_arg(false)),
        ))
        .subcommand(
            Command::new("status")
                .about("Move a request to a new status")
                .arg(req("id"))
                .arg(req("to").help("approved|reimbursed|rejected")),
        )
        .subcommand(json_flags(
            Command::new("sync").about("Repair purchase/transaction status drift"),
        ))
}

fn budget_cmd() -> Command {
    Command::new("budget")
        .about("Fund budgets (reservations)")
        .subcommand_required(true)
        .subcommand(
            Command::new("add")
                .about("Reserve money for a purpose")
                .arg(req("name"))
                .arg(req("amount"))
                .arg(year_arg(true))
                .arg(opt("description")),
        )
        .subcommand(json_flags(
            Command::new("list")
                .about("List budgets of a year")
                .arg(year_arg(true))
                .arg(
                    Arg::new("open")
                        .long("open")
                        .action(ArgAction::SetTrue)
                        .help("Only open budgets"),
                ),
        ))
        .subcommand(json_flags(
            Command::new("show")
                .about("Budget figures and linked transactions")
                .arg(req("id")),
        ))
        .subcommand(
            Command::new("update")
                .arg(req("id"))
                .arg(opt("name"))
                .arg(opt("amount"))
                .arg(opt("description")),
        )
        .subcommand(Command::new("close").arg(req("id")))
        .subcommand(Command::new("reopen").arg(req("id")))
        .subcommand(Command::new("rm").arg(req("id")))
        .subcommand(
            Command::new("link")
                .about("Draw part of a transaction from a budget")
                .arg(req("budget"))
                .arg(req("tx"))
                .arg(req("amount")),
        )
        .subcommand(Command::new("unlink").arg(req("budget")).arg(req("tx")))
}

fn inventory_cmd() -> Command {
    Command::new("inventory")
        .about("Committee inventory")
        .subcommand_required(true)
        .subcommand(
            Command::new("add")
                .arg(req("name"))
                .arg(req("quantity"))
                .arg(opt("manual-count"))
                .arg(opt("location"))
                .arg(opt("category"))
                .arg(opt("description")),
        )
        .subcommand(
            Command::new("update")
                .arg(req("id"))
                .arg(opt("name"))
                .arg(opt("quantity"))
                .arg(opt("manual-count"))
                .arg(opt("location"))
                .arg(opt("category"))
                .arg(opt("description")),
        )
        .subcommand(json_flags(Command::new("list").about("Active items")))
        .subcommand(json_flags(
            Command::new("picker").about("Active items with unaccounted units"),
        ))
        .subcommand(
            Command::new("link")
                .arg(req("item"))
                .arg(req("tx"))
                .arg(req("quantity")),
        )
        .subcommand(Command::new("unlink").arg(req("item")).arg(req("tx")))
        .subcommand(
            Command::new("reduce")
                .about("Return or correct units of a prior acquisition")
                .arg(req("item"))
                .arg(req("tx"))
                .arg(req("amount")),
        )
        .subcommand(
            Command::new("remove")
                .about("Soft-delete an item")
                .arg(req("id"))
                .arg(req("reason"))
                .arg(opt("notes")),
        )
        .subcommand(
            Command::new("legacy")
                .about("Mark pre-ledger stock")
                .arg(req("id"))
                .arg(opt("manual-count")),
        )
        .subcommand(Command::new("rm").about("Delete an item and its links").arg(req("id")))
        .subcommand(json_flags(Command::new("links").arg(req("item"))))
}

fn link_cmd() -> Command {
    Command::new("link")
        .about("Relationships between entities (KIND:ID)")
        .subcommand_required(true)
        .subcommand(Command::new("add").arg(req("from")).arg(req("to")))
        .subcommand(Command::new("rm").arg(req("from")).arg(req("to")))
        .subcommand(json_flags(
            Command::new("list")
                .arg(req("entity"))
                .arg(opt("kind")),
        ))
}

pub fn build_cli() -> Command {
    Command::new("treasury")
        .version(crate_version!())
        .about("Tenant-committee treasury: ledger, reimbursements, reservations, inventory")
        .arg(
            Arg::new("db")
                .long("db")
                .global(true)
                .env("TREASURY_DB")
                .value_parser(value_parser!(std::path::PathBuf))
                .help("Database file (defaults to the platform data dir)"),
        )
        .arg(
            Arg::new("user")
                .long("user")
                .global(true)
                .env("TREASURY_USER")
                .default_value("treasurer")
                .help("Acting committee member"),
        )
        .subcommand(Command::new("init").about("Create the database"))
        .subcommand(tx_cmd())
        .subcommand(purchase_cmd())
        .subcommand(budget_cmd())
        .subcommand(inventory_cmd())
        .subcommand(link_cmd())
        .subcommand(json_flags(
            Command::new("funds")
                .about("Available funds for a year")
                .arg(year_arg(true)),
        ))
        .subcommand(
            Command::new("messages")
                .about("Notifications")
                .subcommand_required(true)
                .subcommand(json_flags(
                    Command::new("list").arg(
                        Arg::new("unread")
                            .long("unread")
                            .action(ArgAction::SetTrue),
                    ),
                ))
                .subcommand(Command::new("read").arg(req("id"))),
        )
        .subcommand(
            Command::new("config")
                .about("Settings")
                .subcommand_required(true)
                .subcommand(Command::new("get").arg(Arg::new("key")))
                .subcommand(
                    Command::new("set")
                        .arg(Arg::new("key").required(true))
                        .arg(Arg::new("value").required(true)),
                ),
        )
        .subcommand(
            Command::new("export")
                .about("Export data")
                .subcommand_required(true)
                .subcommand(
                    Command::new("transactions")
                        .arg(year_arg(true))
                        .arg(
                            Arg::new("format")
                                .long("format")
                                .default_value("csv")
                                .help("csv|json"),
                        )
                        .arg(req("out")),
                ),
        )
        .subcommand(json_flags(
            Command::new("doctor").about("Report integrity problems"),
        ))
}
