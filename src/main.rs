// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use treasury::{cli, commands, db};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_tracing();

    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let db_path = matches.get_one::<PathBuf>("db").cloned();
    let mut conn = db::open_or_init(db_path.as_deref())?;

    match matches.subcommand() {
        Some(("init", _)) => match db_path {
            Some(p) => println!("Database initialized at {}", p.display()),
            None => println!("Database initialized at {}", db::db_path()?.display()),
        },
        Some(("tx", sub)) => commands::transactions::handle(&mut conn, sub)?,
        Some(("purchase", sub)) => commands::purchases::handle(&mut conn, sub)?,
        Some(("budget", sub)) => commands::budgets::handle(&mut conn, sub)?,
        Some(("inventory", sub)) => commands::inventory::handle(&mut conn, sub)?,
        Some(("link", sub)) => commands::relations::handle(&conn, sub)?,
        Some(("funds", sub)) => commands::funds::handle(&conn, sub)?,
        Some(("messages", sub)) => commands::messages::handle(&conn, sub)?,
        Some(("config", sub)) => commands::settings::handle(&conn, sub)?,
        Some(("export", sub)) => commands::exporter::handle(&conn, sub)?,
        Some(("doctor", sub)) => commands::doctor::handle(&conn, sub)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
