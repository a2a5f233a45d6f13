#![deny(warnings)]

//! Economic models for the soda market simulator.
//!
//! - [`population`]: consumer agents and their monthly purchase decisions
//! - [`factory`]: raw-material facilities, recipe conversion and cost accounting
//! - [`market`]: popularity dynamics and the aggregate demand ceiling

pub mod factory;
pub mod market;
pub mod population;

pub use factory::{Factory, RawYield};
pub use market::{demand, PopularityModel};
pub use population::{ConsumerAgent, ConsumerPopulation, PurchaseOutcome};
