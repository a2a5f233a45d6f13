#![deny(warnings)]

//! Core domain models and invariants for the soda market simulator.
//!
//! This crate defines the serializable types shared by every other crate:
//! run configuration with validation, the calendar and seasonal table, event
//! definitions, the injectable random stream, and the month-by-month output
//! records produced by a run.

pub mod calendar;
pub mod config;
pub mod events;
pub mod random;
pub mod report;

pub use calendar::{seasonal_base, MonthStamp, SEASONAL_BASE};
pub use config::{
    ConfigError, CostSheet, PopularityConfig, PopularityPolicy, ResourceCounts, RunConfig,
};
pub use events::{EventClass, EventDefinition, FiredEvent};
pub use random::{RandomSource, ScriptedSource, SeededSource};
pub use report::{MonthRecord, SimReport, StoreId, StoreSales, TimeSeries};
