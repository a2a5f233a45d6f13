//! Event catalog loading and validation.

use serde::Deserialize;
use sim_core::EventDefinition;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Catalog shipped with the simulator.
pub const BUILTIN_EVENTS: &str = include_str!("../data/events.yaml");

#[derive(Debug, Error, PartialEq)]
pub enum CatalogError {
    #[error("io error: {0}")]
    Io(String),
    #[error("invalid catalog: {0}")]
    Parse(String),
    #[error("duplicate event name: {0}")]
    Duplicate(String),
    #[error("event {0} must last at least one month")]
    ZeroDuration(String),
    #[error("event names must not be blank")]
    BlankName,
}

impl From<std::io::Error> for CatalogError {
    fn from(e: std::io::Error) -> Self {
        CatalogError::Io(e.to_string())
    }
}

impl From<serde_yaml::Error> for CatalogError {
    fn from(e: serde_yaml::Error) -> Self {
        CatalogError::Parse(e.to_string())
    }
}

/// Ordered, read-only list of event definitions. Only validated catalogs
/// can be built outside this module.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct EventCatalog {
    #[serde(default)]
    version: u32,
    #[serde(default)]
    events: Vec<EventDefinition>,
}

impl EventCatalog {
    /// The embedded default catalog.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_yaml_str(BUILTIN_EVENTS)
    }

    pub fn from_definitions(events: Vec<EventDefinition>) -> Result<Self, CatalogError> {
        let catalog = Self { version: 1, events };
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, CatalogError> {
        let catalog: EventCatalog = serde_yaml::from_str(text)?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let text = fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    /// Definitions in catalog order.
    pub fn events(&self) -> &[EventDefinition] {
        &self.events
    }

    pub fn get(&self, name: &str) -> Option<&EventDefinition> {
        self.events.iter().find(|e| e.name == name)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    fn validate(&self) -> Result<(), CatalogError> {
        let mut seen = BTreeSet::new();
        for e in &self.events {
            if e.name.trim().is_empty() {
                return Err(CatalogError::BlankName);
            }
            if e.duration_months == 0 {
                return Err(CatalogError::ZeroDuration(e.name.clone()));
            }
            if !seen.insert(e.name.as_str()) {
                return Err(CatalogError::Duplicate(e.name.clone()));
            }
        }
        Ok(())
    }
}
