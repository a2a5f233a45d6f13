//! Popularity dynamics and aggregate demand.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use sim_core::{PopularityPolicy, RandomSource};

/// Range of the monthly random popularity drift, before seasonal scaling.
pub const DRIFT_RANGE: (f64, f64) = (-0.02, 0.03);
/// Inclusive range of the base draw used by [`demand`].
pub const DEMAND_RANGE: (i64, i64) = (2000, 3000);

/// Scalar brand popularity.
///
/// Under [`PopularityPolicy::Clamped`] the level drifts with the seasons and
/// stays inside its band. Under [`PopularityPolicy::Depreciating`] it moves
/// only through consumer gains and the fixed monthly depreciation.
#[derive(Clone, Debug, PartialEq)]
pub struct PopularityModel {
    popularity: f64,
    policy: PopularityPolicy,
}

impl PopularityModel {
    pub fn new(initial: f64, policy: PopularityPolicy) -> Self {
        let mut model = Self {
            popularity: initial,
            policy,
        };
        model.popularity = model.bounded(initial);
        model
    }

    pub fn popularity(&self) -> f64 {
        self.popularity
    }

    pub fn policy(&self) -> PopularityPolicy {
        self.policy
    }

    fn bounded(&self, p: f64) -> f64 {
        match self.policy {
            PopularityPolicy::Depreciating { .. } => p.max(0.0),
            PopularityPolicy::Clamped { floor, ceiling } => p.clamp(floor, ceiling),
        }
    }

    /// Apply one random drift scaled by `seasonal_base`, bound it, then
    /// multiply by `growth`.
    pub fn update_popularity<R: RandomSource + ?Sized>(
        &mut self,
        seasonal_base: f64,
        growth: f64,
        rng: &mut R,
    ) -> f64 {
        let delta = rng.uniform_range(DRIFT_RANGE.0, DRIFT_RANGE.1);
        self.popularity = self.bounded(self.popularity + delta * seasonal_base) * growth;
        self.popularity
    }

    /// Start-of-month update for the configured policy: the seasonal drift
    /// for `Clamped`, nothing (and no random draw) for `Depreciating`.
    pub fn seasonal_step<R: RandomSource + ?Sized>(
        &mut self,
        seasonal_base: f64,
        growth: f64,
        rng: &mut R,
    ) -> f64 {
        match self.policy {
            PopularityPolicy::Clamped { .. } => self.update_popularity(seasonal_base, growth, rng),
            PopularityPolicy::Depreciating { .. } => self.popularity,
        }
    }

    /// Popularity as seen by consumers under an event modifier; never negative.
    pub fn adjusted(&self, modifier: Decimal) -> f64 {
        let factor = (1.0 + modifier.to_f64().unwrap_or(0.0)).max(0.0);
        self.popularity * factor
    }

    /// Add consumer-driven popularity gains.
    pub fn apply_delta(&mut self, delta: f64) {
        self.popularity += delta;
    }

    /// End-of-month adjustment: depreciate, or clamp into the configured band.
    pub fn end_of_tick(&mut self) -> f64 {
        self.popularity = match self.policy {
            PopularityPolicy::Depreciating { monthly } => (self.popularity - monthly).max(0.0),
            PopularityPolicy::Clamped { floor, ceiling } => self.popularity.clamp(floor, ceiling),
        };
        self.popularity
    }
}

/// Aggregate demand ceiling: a base draw in [`DEMAND_RANGE`] scaled by
/// popularity and truncated.
pub fn demand<R: RandomSource + ?Sized>(popularity: f64, rng: &mut R) -> u64 {
    let base = rng.int_range(DEMAND_RANGE.0, DEMAND_RANGE.1) as f64;
    let q = base * popularity;
    if !q.is_finite() || q <= 0.0 {
        return 0;
    }
    q.floor() as u64
}
