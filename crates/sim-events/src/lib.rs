#![deny(warnings)]

//! Random event layer: a catalog of named events, their activation and
//! expiry, cooldowns, and the modifiers they exert on the simulation.

pub mod catalog;
pub mod engine;

pub use catalog::{CatalogError, EventCatalog};
pub use engine::{ActiveEvent, EventEngine, MIN_PRODUCTION_MULTIPLIER};
