//! # till-checkout
//!
//! Prices one basket from the command line and prints the order as JSON.
//!
//! ## Usage
//! ```bash
//! # Demo catalog, store-opening promotions
//! cargo run -p till-order --bin till-checkout -- --customer Ada atv atv atv vga
//!
//! # Custom catalog and config
//! cargo run -p till-order --bin till-checkout -- \
//!     --config ./till.toml --snapshot ./catalog.toml --customer Ada ipd ipd
//! ```
//!
//! ## Exit Codes
//! - `0` order priced
//! - `1` configuration, snapshot or I/O failure
//! - `2` bad request (usage, validation, unknown SKUs)

use chrono::Utc;
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use till_order::{OrderConfig, OrderError, OrderRequest, OrderService, StoreSnapshot};
use till_core::Money;
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Parsed command line.
#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    snapshot: Option<PathBuf>,
    customer: Option<String>,
    items: Vec<String>,
}

fn main() -> ExitCode {
    init_tracing();

    let args = match parse_args(env::args().skip(1)) {
        Ok(Some(args)) => args,
        Ok(None) => {
            print_help();
            return ExitCode::SUCCESS;
        }
        Err(message) => {
            eprintln!("error: {}", message);
            eprintln!("Run with --help for usage.");
            return ExitCode::from(2);
        }
    };

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Checkout failed");
            eprintln!("error: {}", e);
            if e.is_client_error() {
                ExitCode::from(2)
            } else {
                ExitCode::from(1)
            }
        }
    }
}

fn run(args: Args) -> Result<(), OrderError> {
    let config = OrderConfig::load(args.config)?;

    let snapshot_path = args.snapshot.or_else(|| config.checkout.snapshot_path.clone());
    let snapshot = match snapshot_path {
        Some(path) => StoreSnapshot::load(&path)?,
        None => StoreSnapshot::demo(),
    };

    let now = Utc::now();
    let service = OrderService::new(config, snapshot, now);
    let request = OrderRequest::new(args.customer.unwrap_or_default(), args.items);
    let order = service.create_order(request, now)?;

    println!("{}", serde_json::to_string_pretty(&order)?);
    eprintln!(
        "{}: total {} (saved {})",
        service.config().store.name,
        service.config().format_money(Money::from_cents(order.total_cents)),
        service
            .config()
            .format_money(Money::from_cents(order.total_discount_cents)),
    );
    Ok(())
}

/// Returns `Ok(None)` when help was requested.
fn parse_args(mut raw: impl Iterator<Item = String>) -> Result<Option<Args>, String> {
    let mut args = Args::default();

    while let Some(arg) = raw.next() {
        match arg.as_str() {
            "--config" | "-c" => {
                let path = raw.next().ok_or("--config needs a path")?;
                args.config = Some(PathBuf::from(path));
            }
            "--snapshot" | "-s" => {
                let path = raw.next().ok_or("--snapshot needs a path")?;
                args.snapshot = Some(PathBuf::from(path));
            }
            "--customer" | "-n" => {
                args.customer = Some(raw.next().ok_or("--customer needs a name")?);
            }
            "--help" | "-h" => return Ok(None),
            flag if flag.starts_with('-') => return Err(format!("unknown option '{}'", flag)),
            _ => args.items.push(arg),
        }
    }

    if args.customer.is_none() {
        return Err("--customer is required".to_string());
    }
    if args.items.is_empty() {
        return Err("at least one SKU is required".to_string());
    }

    Ok(Some(args))
}

fn print_help() {
    println!("Till checkout");
    println!();
    println!("Usage: till-checkout [OPTIONS] --customer <NAME> <SKU>...");
    println!();
    println!("Options:");
    println!("  -c, --config <PATH>     Config file (default: till.toml in the config dir)");
    println!("  -s, --snapshot <PATH>   Catalog snapshot TOML (default: demo catalog)");
    println!("  -n, --customer <NAME>   Customer name on the order");
    println!("  -h, --help              Show this help message");
}

/// Logs go to stderr so stdout stays pure JSON.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,till=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(list: &[&str]) -> Result<Option<Args>, String> {
        parse_args(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_parse_full_command() {
        let args = parse(&["--config", "a.toml", "-s", "b.toml", "--customer", "Ada", "atv", "vga"])
            .unwrap()
            .unwrap();
        assert_eq!(args.config, Some(PathBuf::from("a.toml")));
        assert_eq!(args.snapshot, Some(PathBuf::from("b.toml")));
        assert_eq!(args.customer.as_deref(), Some("Ada"));
        assert_eq!(args.items, ["atv", "vga"]);
    }

    #[test]
    fn test_help_short_circuits() {
        assert!(parse(&["--help"]).unwrap().is_none());
    }

    #[test]
    fn test_missing_pieces_are_errors() {
        assert!(parse(&["atv"]).is_err());
        assert!(parse(&["--customer", "Ada"]).is_err());
        assert!(parse(&["--customer"]).is_err());
        assert!(parse(&["--customer", "Ada", "--bogus", "atv"]).is_err());
    }
}
