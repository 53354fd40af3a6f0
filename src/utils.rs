// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use comfy_table::{presets::UTF8_FULL, Cell, Table};
use rusqlite::Row;
use rust_decimal::Decimal;
use std::str::FromStr;

pub fn now() -> DateTime<Utc> {
    Utc::now()
}

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

pub fn parse_decimal(s: &str) -> Result<Decimal> {
    s.trim()
        .parse::<Decimal>()
        .with_context(|| format!("Invalid decimal '{}'", s))
}

/// Reads a TEXT money column as an exact decimal.
pub fn decimal_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Decimal> {
    let raw: String = row.get(idx)?;
    Decimal::from_str(raw.trim()).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

pub fn fmt_money(d: &Decimal, ccy: &str) -> String {
    format!("{} {:.2}", ccy, d.round_dp(2))
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // If v is an array, stream each element; else stream single line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}

/// Fetches a required clap argument, trimmed.
pub fn required_arg<'a>(sub: &'a clap::ArgMatches, name: &str) -> Result<&'a str> {
    sub.get_one::<String>(name)
        .map(|s| s.trim())
        .with_context(|| format!("Missing required argument --{}", name))
}

pub fn optional_arg(sub: &clap::ArgMatches, name: &str) -> Option<String> {
    sub.get_one::<String>(name)
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}

pub fn parse_arg<T>(sub: &clap::ArgMatches, name: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = required_arg(sub, name)?;
    raw.parse::<T>()
        .map_err(|e| anyhow::anyhow!("Invalid --{} '{}': {}", name, raw, e))
}

pub fn parse_opt_arg<T>(sub: &clap::ArgMatches, name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match optional_arg(sub, name) {
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|e| anyhow::anyhow!("Invalid --{} '{}': {}", name, raw, e)),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimal_parsing_is_exact() {
        let total: Decimal = ["0.1", "0.1", "0.1"]
            .iter()
            .map(|s| parse_decimal(s).unwrap())
            .sum();
        assert_eq!(total, Decimal::from_str("0.3").unwrap());
        assert!(parse_decimal("1,5").is_err());
    }

    #[test]
    fn money_is_rounded_for_display() {
        assert_eq!(fmt_money(&Decimal::from_str("12.345").unwrap(), "EUR"), "EUR 12.34");
        assert_eq!(fmt_money(&Decimal::from(7), "EUR"), "EUR 7.00");
    }
}
