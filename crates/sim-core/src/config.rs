//! Run configuration and its validation.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Errors raised for configurations rejected before a run starts.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// A run needs at least one month.
    #[error("months must be > 0")]
    NonPositiveMonths,
    /// Unit price must be strictly positive.
    #[error("unit_price must be > 0, got {0}")]
    NonPositivePrice(Decimal),
    /// Growth rate must be finite and non-negative.
    #[error("growth_rate must be a finite value >= 0, got {0}")]
    InvalidGrowthRate(f64),
    /// Trigger probability must lie within [0, 1].
    #[error("event_probability must be within [0,1], got {0}")]
    ProbabilityOutOfRange(f64),
    /// A popularity parameter is non-finite, negative or has inverted bounds.
    #[error("popularity.{field} is invalid: {value}")]
    InvalidPopularity { field: &'static str, value: f64 },
    /// Material costs and upkeep rates must be non-negative.
    #[error("costs.{0} must be >= 0")]
    NegativeCost(&'static str),
    /// Configuration text could not be parsed.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Configuration file could not be read.
    #[error("io error: {0}")]
    Io(String),
}

impl ConfigError {
    /// Name of the configuration field at fault, when the error concerns one.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            ConfigError::NonPositiveMonths => Some("months"),
            ConfigError::NonPositivePrice(_) => Some("unit_price"),
            ConfigError::InvalidGrowthRate(_) => Some("growth_rate"),
            ConfigError::ProbabilityOutOfRange(_) => Some("event_probability"),
            ConfigError::InvalidPopularity { field, .. } => Some(*field),
            ConfigError::NegativeCost(field) => Some(*field),
            ConfigError::Parse(_) | ConfigError::Io(_) => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e.to_string())
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(e: serde_yaml::Error) -> Self {
        ConfigError::Parse(e.to_string())
    }
}

/// Counts of raw-material facilities owned by the factory.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceCounts {
    /// Sugar cane farms.
    pub farms: u32,
    /// Water pumps.
    pub waterpumps: u32,
    /// Sand mines feeding glass production.
    pub mines: u32,
}

impl ResourceCounts {
    pub fn new(farms: u32, waterpumps: u32, mines: u32) -> Self {
        Self {
            farms,
            waterpumps,
            mines,
        }
    }
}

/// How base popularity is bounded from tick to tick.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PopularityPolicy {
    /// Unbounded above, floored at zero and reduced by `monthly` after every tick.
    Depreciating { monthly: f64 },
    /// Held within `[floor, ceiling]`.
    Clamped { floor: f64, ceiling: f64 },
}

impl Default for PopularityPolicy {
    fn default() -> Self {
        PopularityPolicy::Depreciating { monthly: 0.05 }
    }
}

/// Popularity starting point and dynamics.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopularityConfig {
    /// Base popularity at the start of the run.
    pub initial: f64,
    /// Bound policy applied during the seasonal update and at the end of a tick.
    pub policy: PopularityPolicy,
    /// External multiplier applied after every seasonal update.
    pub growth: f64,
}

impl Default for PopularityConfig {
    fn default() -> Self {
        Self {
            initial: 1.0,
            policy: PopularityPolicy::default(),
            growth: 1.0,
        }
    }
}

/// Raw-material unit costs and monthly facility upkeep.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostSheet {
    pub water_unit: Decimal,
    pub sugar_unit: Decimal,
    pub glass_unit: Decimal,
    pub farm_upkeep: Decimal,
    pub waterpump_upkeep: Decimal,
    pub mine_upkeep: Decimal,
}

impl Default for CostSheet {
    fn default() -> Self {
        Self {
            water_unit: Decimal::new(5, 2),
            sugar_unit: Decimal::new(25, 2),
            glass_unit: Decimal::new(50, 2),
            farm_upkeep: Decimal::new(12, 0),
            waterpump_upkeep: Decimal::new(8, 0),
            mine_upkeep: Decimal::new(15, 0),
        }
    }
}

fn default_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// Everything a single run needs. Omitted YAML fields take their defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Number of monthly ticks to simulate.
    pub months: u32,
    /// Increment added to the factory growth factor after every tick.
    pub growth_rate: f64,
    /// Number of consumer agents.
    pub population_size: u32,
    /// Raw-material facilities.
    pub resources: ResourceCounts,
    /// Price of one unit of finished goods.
    pub unit_price: Decimal,
    /// Per-tick probability that a new event fires.
    pub event_probability: f64,
    /// Seed for the deterministic random stream.
    pub seed: u64,
    /// First calendar month of the run.
    pub start_date: NaiveDate,
    pub popularity: PopularityConfig,
    pub costs: CostSheet,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            months: 60,
            growth_rate: 0.05,
            population_size: 100,
            resources: ResourceCounts::new(10, 10, 10),
            unit_price: Decimal::new(325, 2),
            event_probability: 0.15,
            seed: 42,
            start_date: default_start(),
            popularity: PopularityConfig::default(),
            costs: CostSheet::default(),
        }
    }
}

impl RunConfig {
    /// Parse and validate a YAML configuration.
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let cfg: RunConfig = serde_yaml::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read, parse and validate a YAML configuration file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    /// Reject configurations that cannot be simulated.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.months == 0 {
            return Err(ConfigError::NonPositiveMonths);
        }
        if self.unit_price <= Decimal::ZERO {
            return Err(ConfigError::NonPositivePrice(self.unit_price));
        }
        if !self.growth_rate.is_finite() || self.growth_rate < 0.0 {
            return Err(ConfigError::InvalidGrowthRate(self.growth_rate));
        }
        if !(0.0..=1.0).contains(&self.event_probability) {
            return Err(ConfigError::ProbabilityOutOfRange(self.event_probability));
        }
        validate_popularity(&self.popularity)?;
        validate_costs(&self.costs)
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidPopularity { field, value })
    }
}

fn validate_popularity(p: &PopularityConfig) -> Result<(), ConfigError> {
    non_negative("initial", p.initial)?;
    non_negative("growth", p.growth)?;
    match p.policy {
        PopularityPolicy::Depreciating { monthly } => non_negative("policy.monthly", monthly),
        PopularityPolicy::Clamped { floor, ceiling } => {
            non_negative("policy.floor", floor)?;
            non_negative("policy.ceiling", ceiling)?;
            if ceiling < floor {
                return Err(ConfigError::InvalidPopularity {
                    field: "policy.ceiling",
                    value: ceiling,
                });
            }
            Ok(())
        }
    }
}

fn validate_costs(c: &CostSheet) -> Result<(), ConfigError> {
    let fields = [
        ("water_unit", c.water_unit),
        ("sugar_unit", c.sugar_unit),
        ("glass_unit", c.glass_unit),
        ("farm_upkeep", c.farm_upkeep),
        ("waterpump_upkeep", c.waterpump_upkeep),
        ("mine_upkeep", c.mine_upkeep),
    ];
    for (name, value) in fields {
        if value < Decimal::ZERO {
            return Err(ConfigError::NegativeCost(name));
        }
    }
    Ok(())
}
