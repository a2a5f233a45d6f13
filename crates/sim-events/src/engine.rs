//! Event activation, expiry and cooldown bookkeeping.
//!
//! Each definition cycles `Available -> Active -> Cooldown -> Available`.
//! Firing puts the name on cooldown straight away; when an activation expires
//! the name enters a fresh cooldown of the configured length. A name whose
//! cooldown is shorter than its duration may therefore fire again while an
//! earlier activation is still running.

use rust_decimal::Decimal;
use sim_core::{EventClass, EventDefinition, FiredEvent, RandomSource};
use std::collections::BTreeMap;
use tracing::info;

use crate::catalog::EventCatalog;

/// Lower bound of the production multiplier, so events never halt the plant.
pub const MIN_PRODUCTION_MULTIPLIER: Decimal = Decimal::from_parts(1, 0, 0, false, 1);

/// An event currently exerting its effect.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActiveEvent {
    pub definition: EventDefinition,
    pub months_remaining: u32,
}

/// Activates, expires and aggregates catalog events.
#[derive(Clone, Debug, Default)]
pub struct EventEngine {
    catalog: EventCatalog,
    active: Vec<ActiveEvent>,
    cooldowns: BTreeMap<String, u32>,
    log: Vec<FiredEvent>,
}

impl EventEngine {
    pub fn new(catalog: EventCatalog) -> Self {
        Self {
            catalog,
            ..Self::default()
        }
    }

    pub fn catalog(&self) -> &EventCatalog {
        &self.catalog
    }

    pub fn active(&self) -> &[ActiveEvent] {
        &self.active
    }

    /// Every firing so far, oldest first.
    pub fn log(&self) -> &[FiredEvent] {
        &self.log
    }

    pub fn cooldown_remaining(&self, name: &str) -> Option<u32> {
        self.cooldowns.get(name).copied()
    }

    pub fn is_cooling_down(&self, name: &str) -> bool {
        self.cooldowns.contains_key(name)
    }

    /// Definitions that may currently be selected, in catalog order.
    pub fn available(&self) -> Vec<&EventDefinition> {
        self.catalog
            .events()
            .iter()
            .filter(|e| !self.is_cooling_down(&e.name))
            .collect()
    }

    /// Advance one month. Returns the definitions whose activation expired.
    pub fn tick(&mut self) -> Vec<EventDefinition> {
        self.cooldowns.retain(|_, left| {
            *left -= 1;
            *left > 0
        });

        let mut expired = Vec::new();
        let mut still_active = Vec::with_capacity(self.active.len());
        for mut ev in self.active.drain(..) {
            ev.months_remaining = ev.months_remaining.saturating_sub(1);
            if ev.months_remaining == 0 {
                expired.push(ev.definition);
            } else {
                still_active.push(ev);
            }
        }
        self.active = still_active;

        for def in &expired {
            info!(event = %def.name, "event expired");
            if def.cooldown_months > 0 {
                self.cooldowns.insert(def.name.clone(), def.cooldown_months);
            }
        }
        expired
    }

    /// With probability `probability`, fire one uniformly chosen available
    /// event. `tick_index` is the 0-based month of the run; the log records
    /// the 1-based month.
    pub fn try_trigger<R: RandomSource + ?Sized>(
        &mut self,
        probability: f64,
        tick_index: u32,
        rng: &mut R,
    ) -> Option<EventDefinition> {
        if !rng.chance(probability) {
            return None;
        }
        let chosen = {
            let available = self.available();
            let idx = rng.pick_index(available.len())?;
            available[idx].clone()
        };
        self.fire(chosen.clone(), tick_index);
        Some(chosen)
    }

    /// Fire a named event regardless of chance. Returns `None` for unknown
    /// names and names on cooldown.
    pub fn activate(&mut self, name: &str, tick_index: u32) -> Option<EventDefinition> {
        if self.is_cooling_down(name) {
            return None;
        }
        let def = self.catalog.get(name)?.clone();
        self.fire(def.clone(), tick_index);
        Some(def)
    }

    fn fire(&mut self, def: EventDefinition, tick_index: u32) {
        info!(
            event = %def.name,
            class = %def.class,
            effect = def.effect,
            months = def.duration_months,
            month = tick_index + 1,
            "event fired"
        );
        if def.cooldown_months > 0 {
            self.cooldowns.insert(def.name.clone(), def.cooldown_months);
        }
        self.active.push(ActiveEvent {
            definition: def.clone(),
            months_remaining: def.duration_months,
        });
        self.log.push(FiredEvent {
            definition: def,
            month: tick_index + 1,
        });
    }

    /// Summed effect of active events of one class, as a fraction.
    pub fn modifier(&self, class: EventClass) -> Decimal {
        let pct: i64 = self
            .active
            .iter()
            .filter(|a| a.definition.class == class)
            .map(|a| i64::from(a.definition.effect))
            .sum();
        Decimal::new(pct, 2)
    }

    /// `1 + production modifier`, never below [`MIN_PRODUCTION_MULTIPLIER`].
    pub fn production_multiplier(&self) -> Decimal {
        (Decimal::ONE + self.modifier(EventClass::Production)).max(MIN_PRODUCTION_MULTIPLIER)
    }

    /// `1 + market modifier`, never below zero.
    pub fn market_multiplier(&self) -> Decimal {
        (Decimal::ONE + self.modifier(EventClass::Market)).max(Decimal::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use sim_core::{ScriptedSource, SeededSource};

    fn def(
        name: &str,
        class: EventClass,
        effect: i32,
        duration: u32,
        cooldown: u32,
    ) -> EventDefinition {
        EventDefinition {
            name: name.to_string(),
            class,
            effect,
            duration_months: duration,
            cooldown_months: cooldown,
            description: String::new(),
        }
    }

    fn engine(defs: Vec<EventDefinition>) -> EventEngine {
        EventEngine::new(EventCatalog::from_definitions(defs).unwrap())
    }

    #[test]
    fn min_multiplier_is_one_tenth() {
        assert_eq!(MIN_PRODUCTION_MULTIPLIER, Decimal::new(1, 1));
    }

    #[test]
    fn lifecycle_duration_then_cooldown() {
        let (d, c) = (3, 2);
        let mut eng = engine(vec![def("Boom", EventClass::Market, 10, d, c)]);
        eng.activate("Boom", 0).unwrap();
        assert_eq!(eng.active()[0].months_remaining, d);

        for k in 1..d {
            eng.tick();
            assert_eq!(eng.active()[0].months_remaining, d - k);
        }
        let expired = eng.tick();
        assert_eq!(expired.len(), 1);
        assert!(eng.active().is_empty());
        assert_eq!(eng.cooldown_remaining("Boom"), Some(c));

        for _ in 1..c {
            eng.tick();
            assert!(eng.is_cooling_down("Boom"));
        }
        eng.tick();
        assert!(!eng.is_cooling_down("Boom"));
        assert_eq!(eng.available().len(), 1);
    }

    #[test]
    fn zero_length_activation_expires_without_underflow() {
        let mut eng = EventEngine::default();
        eng.active.push(ActiveEvent {
            definition: def("Blip", EventClass::Market, 5, 0, 0),
            months_remaining: 0,
        });
        let expired = eng.tick();
        assert_eq!(expired.len(), 1);
        assert!(eng.active().is_empty());
    }

    #[test]
    fn long_cooldown_outlasts_activation() {
        let mut eng = engine(vec![def("Tax", EventClass::Market, -10, 2, 5)]);
        eng.activate("Tax", 4).unwrap();
        eng.tick();
        eng.tick();
        assert!(eng.active().is_empty());
        // the expiry restarts the cooldown at its full length
        assert_eq!(eng.cooldown_remaining("Tax"), Some(5));
        assert_eq!(eng.log()[0].month, 5);
    }

    #[test]
    fn zero_cooldown_allows_overlapping_activations() {
        let mut eng = engine(vec![def("Buzz", EventClass::Popularity, 5, 3, 0)]);
        let mut rng = ScriptedSource::constant(0.0);
        assert!(eng.try_trigger(1.0, 0, &mut rng).is_some());
        eng.tick();
        assert!(eng.try_trigger(1.0, 1, &mut rng).is_some());
        assert_eq!(eng.active().len(), 2);
        assert_eq!(eng.modifier(EventClass::Popularity), Decimal::new(10, 2));
    }

    #[test]
    fn cooling_events_never_selected() {
        let n = 6;
        let defs: Vec<_> = (0..n)
            .map(|i| def(&format!("E{i}"), EventClass::Market, 1, 1, 3))
            .collect();
        for free in 0..n {
            for step in 0..50 {
                let mut eng = engine(defs.clone());
                for i in (0..n).filter(|&i| i != free) {
                    eng.activate(&format!("E{i}"), 0).unwrap();
                }
                let u = step as f64 / 50.0;
                // first draw passes the chance check, second selects
                let mut rng = ScriptedSource::new(vec![0.0, u]);
                let fired = eng.try_trigger(1.0, 0, &mut rng).unwrap();
                assert_eq!(fired.name, format!("E{free}"));
            }
        }
    }

    #[test]
    fn nothing_fires_when_all_cooling() {
        let mut eng = engine(vec![def("A", EventClass::Market, 1, 1, 4)]);
        eng.activate("A", 0).unwrap();
        assert!(eng.activate("A", 0).is_none());
        assert!(eng.try_trigger(1.0, 0, &mut SeededSource::new(9)).is_none());
        assert_eq!(eng.log().len(), 1);
    }

    #[test]
    fn zero_probability_never_fires() {
        let mut eng = engine(vec![def("A", EventClass::Market, 1, 1, 0)]);
        let mut rng = SeededSource::new(5);
        for m in 0..200 {
            assert!(eng.try_trigger(0.0, m, &mut rng).is_none());
        }
    }

    #[test]
    fn modifiers_aggregate_by_class() {
        let mut eng = engine(vec![
            def("Up", EventClass::Production, 20, 2, 0),
            def("Down", EventClass::Production, -50, 2, 0),
            def("Crash", EventClass::Production, -80, 2, 0),
            def("Rush", EventClass::Market, 25, 1, 0),
            def("Slump", EventClass::Market, -150, 1, 0),
        ]);
        eng.activate("Up", 0);
        eng.activate("Down", 0);
        assert_eq!(eng.modifier(EventClass::Production), Decimal::new(-30, 2));
        assert_eq!(eng.production_multiplier(), Decimal::new(70, 2));
        eng.activate("Crash", 0);
        assert_eq!(eng.production_multiplier(), MIN_PRODUCTION_MULTIPLIER);

        eng.activate("Rush", 0);
        assert_eq!(eng.market_multiplier(), Decimal::new(125, 2));
        eng.activate("Slump", 0);
        assert_eq!(eng.market_multiplier(), Decimal::ZERO);
        assert_eq!(eng.modifier(EventClass::Popularity), Decimal::ZERO);
    }

    proptest! {
        #[test]
        fn active_months_always_positive(seed in any::<u64>(), p in 0.0f64..=1.0) {
            let mut eng = EventEngine::new(EventCatalog::builtin().unwrap());
            let mut rng = SeededSource::new(seed);
            for m in 0..120 {
                eng.tick();
                let fired = eng.try_trigger(p, m, &mut rng);
                if let Some(f) = fired {
                    prop_assert!(eng.is_cooling_down(&f.name) || f.cooldown_months == 0);
                }
                prop_assert!(eng.active().iter().all(|a| a.months_remaining > 0));
                prop_assert!(eng.production_multiplier() >= MIN_PRODUCTION_MULTIPLIER);
            }
        }
    }
}
