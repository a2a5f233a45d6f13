//! Month bookkeeping and the seasonal popularity table.

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// Seasonal popularity base by calendar month, January first.
pub const SEASONAL_BASE: [f64; 12] = [
    0.75, 0.85, 0.90, 1.00, 1.20, 1.50, 1.50, 1.00, 0.95, 0.90, 0.85, 0.85,
];

/// Seasonal base factor for a calendar month in 1..=12. Anything else is 1.0.
pub fn seasonal_base(month: u32) -> f64 {
    match month {
        1..=12 => SEASONAL_BASE[(month - 1) as usize],
        _ => 1.0,
    }
}

/// Position of one simulated month within a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthStamp {
    /// 1-based month number within the run.
    pub index: u32,
    /// 1-based simulation year.
    pub year: u32,
    /// 1-based month within the simulation year.
    pub month_of_year: u32,
    /// Calendar month the tick covers (first day of the month).
    pub period: NaiveDate,
}

impl MonthStamp {
    /// Stamp for the tick with 0-based index `tick` of a run starting at `start`.
    pub fn at(start: NaiveDate, tick: u32) -> Self {
        let first = start.with_day(1).unwrap_or(start);
        let period = first.checked_add_months(Months::new(tick)).unwrap_or(first);
        Self {
            index: tick + 1,
            year: tick / 12 + 1,
            month_of_year: tick % 12 + 1,
            period,
        }
    }

    /// Calendar month used for the seasonal lookup.
    pub fn calendar_month(&self) -> u32 {
        self.period.month()
    }

    /// Human-readable time label, e.g. "Year 2 Month 3".
    pub fn label(&self) -> String {
        format!("Year {} Month {}", self.year, self.month_of_year)
    }
}
