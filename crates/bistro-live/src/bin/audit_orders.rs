//! # Order Audit Tool
//!
//! Recalculates exported orders and flags any whose stored totals disagree
//! with the calculator.
//!
//! ## Usage
//! ```bash
//! # Audit an export with the configured rates
//! cargo run -p bistro-live --bin audit-orders -- orders.json
//!
//! # Use a specific config file
//! cargo run -p bistro-live --bin audit-orders -- orders.json --config ./bistro.toml
//! ```
//!
//! ## Input
//! A JSON array of `{ "order": {...}, "items": [...] }`, as exported from the
//! `orders` and `order_items` tables.
//!
//! Exits with status 1 if any order mismatches.

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context};
use bistro_live::{audit_batch, init_tracing, BistroConfig, OrderWithItems};
use tracing::info;

fn print_usage() {
    println!("Bistro Order Audit");
    println!();
    println!("Usage: audit-orders <orders.json> [OPTIONS]");
    println!();
    println!("Options:");
    println!("  -c, --config <PATH>  Config file (default: platform config dir)");
    println!("  -h, --help           Show this help message");
}

fn main() -> anyhow::Result<ExitCode> {
    init_tracing();

    let args: Vec<String> = env::args().collect();

    let mut input: Option<PathBuf> = None;
    let mut config_path: Option<PathBuf> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => {
                let Some(path) = args.get(i + 1) else {
                    bail!("--config needs a path");
                };
                config_path = Some(PathBuf::from(path));
                i += 1;
            }
            "--help" | "-h" => {
                print_usage();
                return Ok(ExitCode::SUCCESS);
            }
            other if input.is_none() => input = Some(PathBuf::from(other)),
            other => bail!("unexpected argument: {}", other),
        }
        i += 1;
    }

    let Some(input) = input else {
        print_usage();
        return Ok(ExitCode::from(2));
    };

    let config = BistroConfig::load(config_path).context("loading configuration")?;
    info!(restaurant = %config.restaurant.name, "Configuration loaded");

    let contents = std::fs::read_to_string(&input)
        .with_context(|| format!("reading {}", input.display()))?;
    let batch: Vec<OrderWithItems> = serde_json::from_str(&contents)
        .with_context(|| format!("parsing {}", input.display()))?;

    let report = audit_batch(&batch, &config.pricing);
    print!("{}", report.render(&config));

    if report.is_clean() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
