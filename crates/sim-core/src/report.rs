//! Output records produced by a run.

use crate::calendar::MonthStamp;
use crate::events::FiredEvent;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The fixed set of retail locations consumers shop at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StoreId {
    #[serde(rename = "Store 1")]
    Store1,
    #[serde(rename = "Store 2")]
    Store2,
    #[serde(rename = "Store 3")]
    Store3,
    #[serde(rename = "Store 4")]
    Store4,
    #[serde(rename = "Store 5")]
    Store5,
}

impl StoreId {
    /// All stores in reporting order.
    pub const ALL: [StoreId; 5] = [
        StoreId::Store1,
        StoreId::Store2,
        StoreId::Store3,
        StoreId::Store4,
        StoreId::Store5,
    ];

    /// 0-based position in [`StoreId::ALL`].
    pub fn index(self) -> usize {
        match self {
            StoreId::Store1 => 0,
            StoreId::Store2 => 1,
            StoreId::Store3 => 2,
            StoreId::Store4 => 3,
            StoreId::Store5 => 4,
        }
    }

    pub fn from_index(i: usize) -> Option<Self> {
        Self::ALL.get(i).copied()
    }
}

impl fmt::Display for StoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Store {}", self.index() + 1)
    }
}

/// Units sold at one store during a month.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSales {
    pub store: StoreId,
    pub sales: u64,
}

impl StoreSales {
    /// One zero entry per store, in reporting order.
    pub fn zeroed() -> Vec<StoreSales> {
        StoreId::ALL
            .iter()
            .map(|&store| StoreSales { store, sales: 0 })
            .collect()
    }

    pub fn total(list: &[StoreSales]) -> u64 {
        list.iter().map(|s| s.sales).sum()
    }
}

/// Everything recorded for one simulated month.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MonthRecord {
    #[serde(flatten)]
    pub stamp: MonthStamp,
    pub label: String,
    pub revenue: Decimal,
    /// Cumulative profit up to and including this month.
    pub profit: Decimal,
    pub monthly_profit: Decimal,
    pub production_cost: Decimal,
    pub resource_cost: Decimal,
    pub total_expense: Decimal,
    /// Base popularity after this month's consumer boosts.
    pub popularity: f64,
    /// Finished goods left in storage at month end.
    pub storage: u64,
    pub produced: u64,
    pub sold: u64,
    /// Name of the event fired this month, if any.
    pub fired_event: Option<String>,
    pub store_sales: Vec<StoreSales>,
}

/// Column view of a run, one vector per tracked quantity.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct TimeSeries {
    pub labels: Vec<String>,
    pub revenue: Vec<Decimal>,
    pub profit: Vec<Decimal>,
    pub monthly_profit: Vec<Decimal>,
    pub production_cost: Vec<Decimal>,
    pub resource_cost: Vec<Decimal>,
    pub total_expense: Vec<Decimal>,
    pub popularity: Vec<f64>,
    pub storage: Vec<u64>,
    pub produced: Vec<u64>,
    pub sold: Vec<u64>,
    pub events: Vec<Option<String>>,
}

/// Result of a completed (or partially run) simulation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SimReport {
    pub records: Vec<MonthRecord>,
    /// Per-store breakdown of the last simulated month.
    pub final_store_sales: Vec<StoreSales>,
    pub event_log: Vec<FiredEvent>,
}

impl SimReport {
    pub fn months(&self) -> usize {
        self.records.len()
    }

    /// Cumulative profit at the end of the run.
    pub fn final_profit(&self) -> Decimal {
        self.records.last().map(|r| r.profit).unwrap_or(Decimal::ZERO)
    }

    pub fn total_revenue(&self) -> Decimal {
        self.records.iter().map(|r| r.revenue).sum()
    }

    pub fn total_sold(&self) -> u64 {
        self.records.iter().map(|r| r.sold).sum()
    }

    /// Parallel time-series view of the records.
    pub fn series(&self) -> TimeSeries {
        let mut ts = TimeSeries::default();
        for r in &self.records {
            ts.labels.push(r.label.clone());
            ts.revenue.push(r.revenue);
            ts.profit.push(r.profit);
            ts.monthly_profit.push(r.monthly_profit);
            ts.production_cost.push(r.production_cost);
            ts.resource_cost.push(r.resource_cost);
            ts.total_expense.push(r.total_expense);
            ts.popularity.push(r.popularity);
            ts.storage.push(r.storage);
            ts.produced.push(r.produced);
            ts.sold.push(r.sold);
            ts.events.push(r.fired_event.clone());
        }
        ts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(tick: u32, monthly: i64, cumulative: i64) -> MonthRecord {
        let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let stamp = MonthStamp::at(start, tick);
        MonthRecord {
            stamp,
            label: stamp.label(),
            revenue: Decimal::new(100, 0),
            profit: Decimal::new(cumulative, 0),
            monthly_profit: Decimal::new(monthly, 0),
            production_cost: Decimal::ZERO,
            resource_cost: Decimal::ZERO,
            total_expense: Decimal::ZERO,
            popularity: 1.0,
            storage: 0,
            produced: 10,
            sold: 10,
            fired_event: None,
            store_sales: StoreSales::zeroed(),
        }
    }

    #[test]
    fn store_names_serialize_with_space() {
        let s = serde_json::to_string(&StoreSales {
            store: StoreId::Store3,
            sales: 12,
        })
        .unwrap();
        assert_eq!(s, r#"{"store":"Store 3","sales":12}"#);
        assert_eq!(StoreId::Store5.to_string(), "Store 5");
        assert_eq!(StoreId::from_index(5), None);
    }

    #[test]
    fn series_mirrors_records() {
        let report = SimReport {
            records: vec![record(0, 5, 5), record(1, -2, 3)],
            final_store_sales: StoreSales::zeroed(),
            event_log: vec![],
        };
        let ts = report.series();
        assert_eq!(ts.labels, vec!["Year 1 Month 1", "Year 1 Month 2"]);
        assert_eq!(ts.profit, vec![Decimal::new(5, 0), Decimal::new(3, 0)]);
        assert_eq!(report.final_profit(), Decimal::new(3, 0));
        assert_eq!(report.total_revenue(), Decimal::new(200, 0));
        assert_eq!(report.total_sold(), 20);
    }

    #[test]
    fn record_json_roundtrip_keeps_flattened_stamp() {
        let r = record(14, 1, 1);
        let s = serde_json::to_string(&r).unwrap();
        assert!(s.contains("\"month_of_year\":3"));
        let back: MonthRecord = serde_json::from_str(&s).unwrap();
        assert_eq!(back, r);
    }
}
