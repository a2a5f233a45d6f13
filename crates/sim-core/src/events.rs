//! Event catalog entries and the firing log record.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which part of the simulation an event perturbs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EventClass {
    /// Scales the popularity level consumers react to.
    Popularity,
    /// Scales factory output.
    Production,
    /// Scales units sold and revenue.
    Market,
}

impl fmt::Display for EventClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EventClass::Popularity => "popularity",
            EventClass::Production => "production",
            EventClass::Market => "market",
        };
        f.write_str(s)
    }
}

/// Immutable catalog entry describing one random event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDefinition {
    /// Unique name, used as the cooldown key.
    pub name: String,
    pub class: EventClass,
    /// Signed effect in percentage points.
    pub effect: i32,
    /// Months the event stays active once fired (> 0).
    pub duration_months: u32,
    /// Months the name stays unavailable after it fires and after it expires.
    #[serde(default)]
    pub cooldown_months: u32,
    #[serde(default)]
    pub description: String,
}

/// One entry of the firing log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiredEvent {
    pub definition: EventDefinition,
    /// 1-based month of the run in which the event fired.
    pub month: u32,
}
