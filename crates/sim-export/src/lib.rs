#![deny(warnings)]

//! One-shot export of a finished run: CSV tables and a JSON dump.

use rust_decimal::Decimal;
use serde::Serialize;
use sim_core::{MonthRecord, SimReport, StoreId};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// One CSV row per simulated month.
#[derive(Debug, Serialize)]
struct MonthRow<'a> {
    time: &'a str,
    revenue: Decimal,
    profit: Decimal,
    monthly_profit: Decimal,
    production_cost: Decimal,
    resource_cost: Decimal,
    total_expense: Decimal,
    popularity: f64,
    storage: u64,
    produced: u64,
    sold: u64,
    event: Option<&'a str>,
    store_1: u64,
    store_2: u64,
    store_3: u64,
    store_4: u64,
    store_5: u64,
}

impl<'a> From<&'a MonthRecord> for MonthRow<'a> {
    fn from(r: &'a MonthRecord) -> Self {
        let mut stores = [0u64; 5];
        for s in &r.store_sales {
            stores[s.store.index()] = s.sales;
        }
        Self {
            time: &r.label,
            revenue: r.revenue,
            profit: r.profit,
            monthly_profit: r.monthly_profit,
            production_cost: r.production_cost,
            resource_cost: r.resource_cost,
            total_expense: r.total_expense,
            popularity: r.popularity,
            storage: r.storage,
            produced: r.produced,
            sold: r.sold,
            event: r.fired_event.as_deref(),
            store_1: stores[StoreId::Store1.index()],
            store_2: stores[StoreId::Store2.index()],
            store_3: stores[StoreId::Store3.index()],
            store_4: stores[StoreId::Store4.index()],
            store_5: stores[StoreId::Store5.index()],
        }
    }
}

#[derive(Debug, Serialize)]
struct MinimalRow<'a> {
    #[serde(rename = "Time")]
    time: &'a str,
    #[serde(rename = "Revenue")]
    revenue: Decimal,
    #[serde(rename = "Profit")]
    profit: Decimal,
}

/// Write every month record as a CSV row, header first.
pub fn write_csv<W: Write>(report: &SimReport, out: W) -> Result<(), ExportError> {
    let mut wtr = csv::Writer::from_writer(out);
    for r in &report.records {
        wtr.serialize(MonthRow::from(r))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write only the time, revenue and cumulative profit columns.
pub fn write_minimal_csv<W: Write>(report: &SimReport, out: W) -> Result<(), ExportError> {
    let mut wtr = csv::Writer::from_writer(out);
    for r in &report.records {
        wtr.serialize(MinimalRow {
            time: &r.label,
            revenue: r.revenue,
            profit: r.profit,
        })?;
    }
    wtr.flush()?;
    Ok(())
}

/// Pretty-printed JSON of the whole report.
pub fn write_json<W: Write>(report: &SimReport, out: W) -> Result<(), ExportError> {
    serde_json::to_writer_pretty(out, report)?;
    Ok(())
}

pub fn export_csv<P: AsRef<Path>>(
    report: &SimReport,
    path: P,
    minimal: bool,
) -> Result<(), ExportError> {
    let path = path.as_ref();
    let file = BufWriter::new(File::create(path)?);
    if minimal {
        write_minimal_csv(report, file)?;
    } else {
        write_csv(report, file)?;
    }
    info!(path = %path.display(), rows = report.months(), minimal, "csv written");
    Ok(())
}

pub fn export_json<P: AsRef<Path>>(report: &SimReport, path: P) -> Result<(), ExportError> {
    let path = path.as_ref();
    let mut file = BufWriter::new(File::create(path)?);
    write_json(report, &mut file)?;
    file.flush()?;
    info!(path = %path.display(), "json written");
    Ok(())
}
