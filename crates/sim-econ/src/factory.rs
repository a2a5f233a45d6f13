//! Production facility: raw-material yields, recipe conversion and costs.
//!
//! Every water pump, farm and mine independently yields 30–60 raw units per
//! month. Farms produce sugar cane (two cane make one sugar) and mines produce
//! sand (three sand make one glass). Yields are scaled by a growth factor that
//! rises by the growth rate every month. They accumulate as stock and are
//! converted into finished goods at 3 water : 2 sugar : 1 glass per batch of
//! [`BATCH_UNITS`].

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use sim_core::{CostSheet, RandomSource, ResourceCounts};
use tracing::debug;

/// Inclusive raw yield per facility per month.
pub const FACILITY_YIELD: (i64, i64) = (30, 60);
pub const CANE_PER_SUGAR: u64 = 2;
pub const SAND_PER_GLASS: u64 = 3;
/// Raw materials consumed per batch.
pub const RECIPE_WATER: f64 = 3.0;
pub const RECIPE_SUGAR: f64 = 2.0;
pub const RECIPE_GLASS: f64 = 1.0;
/// Finished units per batch.
pub const BATCH_UNITS: u64 = 10;

/// Refined raw materials produced by the facilities in one month.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RawYield {
    pub water: u64,
    pub sugar: u64,
    pub glass: u64,
}

/// The soda factory and its supply facilities.
#[derive(Clone, Debug)]
pub struct Factory {
    resources: ResourceCounts,
    costs: CostSheet,
    growth_rate: f64,
    growth_factor: f64,
    water: f64,
    sugar: f64,
    glass: f64,
    inventory: u64,
}

impl Factory {
    pub fn new(resources: ResourceCounts, costs: CostSheet, growth_rate: f64) -> Self {
        Self {
            resources,
            costs,
            growth_rate,
            growth_factor: 1.0,
            water: 0.0,
            sugar: 0.0,
            glass: 0.0,
            inventory: 0,
        }
    }

    pub fn resources(&self) -> ResourceCounts {
        self.resources
    }

    pub fn growth_factor(&self) -> f64 {
        self.growth_factor
    }

    /// Current (water, sugar, glass) stock.
    pub fn stocks(&self) -> (f64, f64, f64) {
        (self.water, self.sugar, self.glass)
    }

    /// Finished goods in storage.
    pub fn inventory(&self) -> u64 {
        self.inventory
    }

    /// Sample this month's refined yields from every facility.
    pub fn draw_yield<R: RandomSource + ?Sized>(&self, rng: &mut R) -> RawYield {
        let mut sample = |count: u32| -> u64 {
            (0..count)
                .map(|_| rng.int_range(FACILITY_YIELD.0, FACILITY_YIELD.1) as u64)
                .sum()
        };
        let water = sample(self.resources.waterpumps);
        let cane = sample(self.resources.farms);
        let sand = sample(self.resources.mines);
        RawYield {
            water,
            sugar: cane / CANE_PER_SUGAR,
            glass: sand / SAND_PER_GLASS,
        }
    }

    /// Add a yield to stock, scaled by the current growth factor.
    pub fn replenish(&mut self, y: RawYield) {
        self.water += y.water as f64 * self.growth_factor;
        self.sugar += y.sugar as f64 * self.growth_factor;
        self.glass += y.glass as f64 * self.growth_factor;
    }

    /// Convert as many whole recipes as the stock allows and return the units made.
    ///
    /// Equivalent to consuming one recipe at a time while every stock still
    /// covers it.
    pub fn convert(&mut self) -> u64 {
        let batches = (self.water / RECIPE_WATER)
            .min(self.sugar / RECIPE_SUGAR)
            .min(self.glass / RECIPE_GLASS)
            .floor()
            .max(0.0);
        self.water = (self.water - batches * RECIPE_WATER).max(0.0);
        self.sugar = (self.sugar - batches * RECIPE_SUGAR).max(0.0);
        self.glass = (self.glass - batches * RECIPE_GLASS).max(0.0);
        batches as u64 * BATCH_UNITS
    }

    /// One month of production: draw yields, convert, and scale by the event
    /// multiplier. Output is truncated to whole units.
    pub fn produce<R: RandomSource + ?Sized>(&mut self, multiplier: Decimal, rng: &mut R) -> u64 {
        let y = self.draw_yield(rng);
        self.replenish(y);
        let base = self.convert();
        let scaled = (Decimal::from(base) * multiplier.max(Decimal::ZERO))
            .floor()
            .to_u64()
            .unwrap_or(0);
        debug!(?y, base, scaled, growth = self.growth_factor, "production");
        scaled
    }

    /// Raw-material cost of one recipe, which yields [`BATCH_UNITS`] units.
    pub fn recipe_cost(&self) -> Decimal {
        Decimal::from(3) * self.costs.water_unit
            + Decimal::from(2) * self.costs.sugar_unit
            + self.costs.glass_unit
    }

    /// Raw-material cost of one finished unit.
    pub fn unit_cost(&self) -> Decimal {
        self.recipe_cost() / Decimal::from(BATCH_UNITS)
    }

    /// Raw-material cost of `units` finished units.
    pub fn compute_cost(&self, units: u64) -> Decimal {
        Decimal::from(units) * self.unit_cost()
    }

    /// Fixed monthly upkeep of every facility.
    pub fn maintenance_cost(&self) -> Decimal {
        Decimal::from(self.resources.farms) * self.costs.farm_upkeep
            + Decimal::from(self.resources.waterpumps) * self.costs.waterpump_upkeep
            + Decimal::from(self.resources.mines) * self.costs.mine_upkeep
    }

    /// Grow productivity after a tick. Uncapped.
    pub fn advance_growth(&mut self) {
        self.growth_factor += self.growth_rate;
    }

    /// Move produced goods into storage and ship `sold` units out of it.
    ///
    /// Panics if more is shipped than is available; settlement caps sales first.
    pub fn ship(&mut self, produced: u64, sold: u64) -> u64 {
        let available = self.inventory + produced;
        assert!(
            sold <= available,
            "shipping {sold} units with only {available} available"
        );
        self.inventory = available - sold;
        self.inventory
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use sim_core::{ScriptedSource, SeededSource};

    fn factory(farms: u32, pumps: u32, mines: u32, growth_rate: f64) -> Factory {
        Factory::new(
            ResourceCounts::new(farms, pumps, mines),
            CostSheet::default(),
            growth_rate,
        )
    }

    #[test]
    fn no_facilities_produce_nothing() {
        let mut f = factory(0, 0, 0, 0.0);
        let mut rng = SeededSource::new(1);
        for _ in 0..12 {
            assert_eq!(f.produce(Decimal::ONE, &mut rng), 0);
            f.advance_growth();
        }
        assert_eq!(f.stocks(), (0.0, 0.0, 0.0));
        assert_eq!(f.maintenance_cost(), Decimal::ZERO);
    }

    #[test]
    fn scripted_yields_refine_cane_and_sand() {
        let f = factory(2, 1, 3, 0.0);
        // every facility yields the minimum, 30
        let y = f.draw_yield(&mut ScriptedSource::constant(0.0));
        assert_eq!(y, RawYield { water: 30, sugar: 30, glass: 30 });
    }

    #[test]
    fn conversion_uses_recipe_ratio() {
        let mut f = factory(0, 0, 0, 0.0);
        f.replenish(RawYield { water: 31, sugar: 30, glass: 4 });
        // glass limits to 4 batches
        assert_eq!(f.convert(), 40);
        assert_eq!(f.stocks(), (19.0, 22.0, 0.0));
        f.replenish(RawYield { water: 0, sugar: 0, glass: 100 });
        // water now limits: 19 / 3 = 6 batches
        assert_eq!(f.convert(), 60);
        assert_eq!(f.stocks(), (1.0, 10.0, 94.0));
    }

    #[test]
    fn growth_scales_yields() {
        let mut f = factory(0, 0, 0, 0.5);
        f.advance_growth();
        assert_eq!(f.growth_factor(), 1.5);
        f.replenish(RawYield { water: 10, sugar: 10, glass: 10 });
        assert_eq!(f.stocks(), (15.0, 15.0, 15.0));
    }

    #[test]
    fn multiplier_scales_and_truncates() {
        let mut f = factory(1, 1, 1, 0.0);
        // 30 water, 15 sugar, 10 glass -> min(10, 7.5, 10) = 7 batches
        let made = f.produce(Decimal::new(15, 2), &mut ScriptedSource::constant(0.0));
        assert_eq!(made, 10); // 70 * 0.15 = 10.5
    }

    #[test]
    fn costs_are_linear() {
        let f = factory(2, 3, 4, 0.0);
        assert_eq!(f.recipe_cost(), Decimal::new(115, 2));
        // one recipe makes a batch of ten
        assert_eq!(f.unit_cost(), Decimal::new(115, 3));
        assert_eq!(f.compute_cost(10), f.recipe_cost());
        assert_eq!(f.compute_cost(1000), Decimal::new(115, 0));
        assert_eq!(f.compute_cost(0), Decimal::ZERO);
        // 2 * 12 + 3 * 8 + 4 * 15
        assert_eq!(f.maintenance_cost(), Decimal::new(108, 0));
    }

    #[test]
    fn batch_cost_matches_materials_consumed() {
        let mut f = factory(1, 1, 1, 0.0);
        // 30 water, 15 sugar, 10 glass -> 7 batches, 70 units
        let made = f.produce(Decimal::ONE, &mut ScriptedSource::constant(0.0));
        assert_eq!(made, 70);
        let (w, s, g) = f.stocks();
        let used = Decimal::from(30 - w as i64) * f.costs.water_unit
            + Decimal::from(15 - s as i64) * f.costs.sugar_unit
            + Decimal::from(10 - g as i64) * f.costs.glass_unit;
        assert_eq!(f.compute_cost(made), used);
    }

    #[test]
    fn ship_tracks_inventory() {
        let mut f = factory(0, 0, 0, 0.0);
        assert_eq!(f.ship(100, 40), 60);
        assert_eq!(f.ship(0, 60), 0);
    }

    #[test]
    #[should_panic(expected = "shipping")]
    fn overshipping_is_a_bug() {
        let mut f = factory(0, 0, 0, 0.0);
        f.ship(5, 6);
    }

    proptest! {
        #[test]
        fn stocks_never_negative(
            seed in any::<u64>(),
            farms in 0u32..20,
            pumps in 0u32..20,
            mines in 0u32..20,
            growth in 0.0f64..0.5,
        ) {
            let mut f = factory(farms, pumps, mines, growth);
            let mut rng = SeededSource::new(seed);
            for _ in 0..24 {
                let _ = f.produce(Decimal::ONE, &mut rng);
                f.advance_growth();
                let (w, s, g) = f.stocks();
                prop_assert!(w >= 0.0 && s >= 0.0 && g >= 0.0);
                prop_assert!(w < RECIPE_WATER || s < RECIPE_SUGAR || g < RECIPE_GLASS);
            }
        }
    }
}
