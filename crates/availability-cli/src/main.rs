//! `slots` CLI: compute bookable slots and month-view disabled days from a JSON catalog.
//!
//! ## Usage
//!
//! ```sh
//! # Bookable slots for one day (dd-mm-yyyy, organization timezone)
//! slots --catalog catalog.json day dock-a 17-03-2026
//!
//! # Freeze "now" for reproducible output
//! slots --catalog catalog.json --now 2026-03-16T18:00:00Z day dock-a 17-03-2026
//!
//! # Disabled days of a month for a calendar widget
//! slots --catalog catalog.json month dock-a acme 2026-03 --pretty
//!
//! # Catalog from stdin, with rule evaluation logs
//! RUST_LOG=availability_engine=debug slots day dock-a 17-03-2026 < catalog.json
//! ```

use std::io::{self, Read};

use anyhow::{Context, Result};
use availability_engine::input::parse_instant;
use availability_engine::{AvailabilityService, Clock, FixedClock, InMemoryCatalog, SystemClock};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "slots", version, about = "Bookable slot computation for delivery types")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Catalog JSON file with deliveryTypes and bookings (reads from stdin if omitted)
    #[arg(short, long, global = true)]
    catalog: Option<String>,

    /// Current instant as RFC 3339 (defaults to the system clock)
    #[arg(long, global = true)]
    now: Option<String>,

    /// Pretty-print the JSON output
    #[arg(long, global = true)]
    pretty: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Bookable slots of one local day
    Day {
        /// Delivery type id
        delivery_type: String,
        /// Day as dd-mm-yyyy in the organization timezone
        date: String,
    },
    /// Disabled days of a month
    Month {
        /// Delivery type id
        delivery_type: String,
        /// Organization that owns the delivery type
        organization: String,
        /// Month as yyyy-mm
        month: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();

    let raw_catalog = read_input(cli.catalog.as_deref())?;
    let catalog = InMemoryCatalog::from_json(&raw_catalog).context("Failed to parse catalog JSON")?;

    let output = match cli.now.as_deref() {
        Some(raw) => run(&catalog, FixedClock(parse_instant(raw)?), cli.command, cli.pretty)?,
        None => run(&catalog, SystemClock, cli.command, cli.pretty)?,
    };

    println!("{}", output);
    Ok(())
}

fn run<C: Clock>(catalog: &InMemoryCatalog, clock: C, command: Commands, pretty: bool) -> Result<String> {
    tracing::debug!(now = %clock.now(), "catalog loaded");
    let service = AvailabilityService::new(catalog, catalog, clock);

    match command {
        Commands::Day { delivery_type, date } => {
            let day = service.daily_availability_for(&delivery_type, &date)?;
            to_json(&day, pretty)
        }
        Commands::Month {
            delivery_type,
            organization,
            month,
        } => {
            let days = service.disabled_days_for(&delivery_type, &organization, &month)?;
            to_json(&days, pretty)
        }
    }
}

fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(json)
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}
