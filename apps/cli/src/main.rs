#![deny(warnings)]

//! Headless CLI: run one simulation and print or export the results.

use anyhow::{Context, Result};
use clap::Parser;
use rust_decimal::Decimal;
use sim_core::{ResourceCounts, RunConfig};
use sim_events::EventCatalog;
use sim_runtime::Simulation;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "soda-sim", version, about = "Agent-based soda market simulator")]
struct Args {
    /// YAML run configuration; omitted fields take their defaults.
    #[arg(long)]
    config: Option<PathBuf>,
    /// YAML event catalog replacing the built-in one.
    #[arg(long)]
    events: Option<PathBuf>,
    #[arg(long, conflicts_with = "years")]
    months: Option<u32>,
    #[arg(long)]
    years: Option<u32>,
    #[arg(long)]
    growth_rate: Option<f64>,
    #[arg(long)]
    population: Option<u32>,
    #[arg(long)]
    farms: Option<u32>,
    #[arg(long)]
    waterpumps: Option<u32>,
    #[arg(long)]
    mines: Option<u32>,
    /// Unit price of finished goods.
    #[arg(long)]
    price: Option<Decimal>,
    #[arg(long)]
    event_probability: Option<f64>,
    #[arg(long)]
    seed: Option<u64>,
    /// Write the month records to this CSV file.
    #[arg(long)]
    csv: Option<PathBuf>,
    /// Only write the time, revenue and profit columns.
    #[arg(long, requires = "csv")]
    minimal_csv: bool,
    /// Write the whole report as JSON.
    #[arg(long)]
    json: Option<PathBuf>,
}

impl Args {
    fn run_config(&self) -> Result<RunConfig> {
        let mut cfg = match &self.config {
            Some(path) => RunConfig::from_file(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => RunConfig::default(),
        };
        if let Some(m) = self.months {
            cfg.months = m;
        }
        if let Some(y) = self.years {
            cfg.months = y.checked_mul(12).context("--years is too large")?;
        }
        if let Some(g) = self.growth_rate {
            cfg.growth_rate = g;
        }
        if let Some(n) = self.population {
            cfg.population_size = n;
        }
        let r = cfg.resources;
        cfg.resources = ResourceCounts::new(
            self.farms.unwrap_or(r.farms),
            self.waterpumps.unwrap_or(r.waterpumps),
            self.mines.unwrap_or(r.mines),
        );
        if let Some(p) = self.price {
            cfg.unit_price = p;
        }
        if let Some(p) = self.event_probability {
            cfg.event_probability = p;
        }
        if let Some(s) = self.seed {
            cfg.seed = s;
        }
        Ok(cfg)
    }

    fn catalog(&self) -> Result<EventCatalog> {
        match &self.events {
            Some(path) => EventCatalog::from_file(path)
                .with_context(|| format!("loading events {}", path.display())),
            None => EventCatalog::builtin().context("loading built-in events"),
        }
    }
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();
    let cfg = args.run_config()?;
    let catalog = args.catalog()?;
    info!(
        months = cfg.months,
        population = cfg.population_size,
        seed = cfg.seed,
        events = catalog.len(),
        "starting simulation"
    );

    let report = Simulation::new(cfg, catalog)
        .context("invalid run configuration")?
        .run();

    println!(
        "KPI | months: {} | revenue: ${} | profit: ${} | sold: {} | events fired: {}",
        report.months(),
        report.total_revenue(),
        report.final_profit(),
        report.total_sold(),
        report.event_log.len()
    );
    let stores: Vec<String> = report
        .final_store_sales
        .iter()
        .map(|s| format!("{}: {}", s.store, s.sales))
        .collect();
    println!("Final month by store | {}", stores.join(" | "));

    if let Some(path) = &args.csv {
        sim_export::export_csv(&report, path, args.minimal_csv)
            .with_context(|| format!("writing {}", path.display()))?;
    }
    if let Some(path) = &args.json {
        sim_export::export_json(&report, path)
            .with_context(|| format!("writing {}", path.display()))?;
    }
    Ok(())
}
