#![deny(warnings)]

//! ECS runtime for the monthly simulation loop.
//!
//! All simulation state lives in `bevy_ecs` resources. One month is one run
//! of a chained, single-threaded schedule:
//! events -> market -> production -> settlement.

pub mod settlement;
mod systems;

use bevy_ecs::prelude::*;
use bevy_ecs::schedule::ExecutorKind;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sim_core::{
    ConfigError, MonthRecord, MonthStamp, RandomSource, RunConfig, SeededSource, SimReport,
    StoreSales,
};
use sim_econ::{ConsumerPopulation, Factory, PopularityModel};
use sim_events::{EventCatalog, EventEngine};
use tracing::info;

pub use systems::{event_phase, market_phase, production_phase, settlement_phase};

/// Validated configuration of the run.
#[derive(Resource, Clone, Debug)]
pub struct Settings(pub RunConfig);

/// Random stream shared by every system.
#[derive(Resource)]
pub struct SimRng(pub Box<dyn RandomSource + Send + Sync>);

impl SimRng {
    pub fn stream(&mut self) -> &mut (dyn RandomSource + Send + Sync) {
        self.0.as_mut()
    }
}

#[derive(Resource, Clone, Debug)]
pub struct Consumers(pub ConsumerPopulation);

#[derive(Resource, Clone, Debug)]
pub struct Plant(pub Factory);

#[derive(Resource, Clone, Debug)]
pub struct Popularity(pub PopularityModel);

#[derive(Resource, Clone, Debug)]
pub struct Events(pub EventEngine);

/// Month counter; `tick` is the number of months already simulated.
#[derive(Resource, Clone, Copy, Debug)]
pub struct Clock {
    pub tick: u32,
    pub total: u32,
    pub start: NaiveDate,
}

impl Clock {
    /// Stamp of the month about to be simulated.
    pub fn stamp(&self) -> MonthStamp {
        MonthStamp::at(self.start, self.tick)
    }

    pub fn is_complete(&self) -> bool {
        self.tick >= self.total
    }
}

/// Values handed from one phase to the next within a month.
#[derive(Resource, Clone, Debug)]
pub struct TickState {
    pub fired_event: Option<String>,
    pub popularity_modifier: Decimal,
    pub market_multiplier: Decimal,
    pub production_multiplier: Decimal,
    pub adjusted_popularity: f64,
    pub demand_units: u64,
    pub demand_revenue: Decimal,
    pub popularity_delta: f64,
    pub store_demand: Vec<StoreSales>,
    pub produced: u64,
}

impl Default for TickState {
    fn default() -> Self {
        Self {
            fired_event: None,
            popularity_modifier: Decimal::ZERO,
            market_multiplier: Decimal::ONE,
            production_multiplier: Decimal::ONE,
            adjusted_popularity: 0.0,
            demand_units: 0,
            demand_revenue: Decimal::ZERO,
            popularity_delta: 0.0,
            store_demand: StoreSales::zeroed(),
            produced: 0,
        }
    }
}

/// Running financial totals and the recorded months.
#[derive(Resource, Clone, Debug)]
pub struct Ledger {
    pub cumulative_profit: Decimal,
    pub records: Vec<MonthRecord>,
    pub final_store_sales: Vec<StoreSales>,
}

impl Default for Ledger {
    fn default() -> Self {
        Self {
            cumulative_profit: Decimal::ZERO,
            records: Vec::new(),
            final_store_sales: StoreSales::zeroed(),
        }
    }
}

/// Build a world for `config`, drawing the consumer population from `rng`.
pub fn init_world(
    config: RunConfig,
    catalog: EventCatalog,
    mut rng: Box<dyn RandomSource + Send + Sync>,
) -> Result<World, ConfigError> {
    config.validate()?;
    let population = ConsumerPopulation::generate(config.population_size, rng.as_mut());
    init_world_with(config, catalog, population, rng)
}

/// Build a world around an explicit consumer population.
pub fn init_world_with(
    config: RunConfig,
    catalog: EventCatalog,
    population: ConsumerPopulation,
    rng: Box<dyn RandomSource + Send + Sync>,
) -> Result<World, ConfigError> {
    config.validate()?;
    let mut world = World::new();
    world.insert_resource(Clock {
        tick: 0,
        total: config.months,
        start: config.start_date,
    });
    world.insert_resource(Consumers(population));
    world.insert_resource(Plant(Factory::new(
        config.resources,
        config.costs.clone(),
        config.growth_rate,
    )));
    world.insert_resource(Popularity(PopularityModel::new(
        config.popularity.initial,
        config.popularity.policy,
    )));
    world.insert_resource(Events(EventEngine::new(catalog)));
    world.insert_resource(SimRng(rng));
    world.insert_resource(TickState::default());
    world.insert_resource(Ledger::default());
    world.insert_resource(Settings(config));
    Ok(world)
}

/// The monthly schedule, forced onto the single-threaded executor.
pub fn build_schedule() -> Schedule {
    let mut schedule = Schedule::default();
    schedule.set_executor_kind(ExecutorKind::SingleThreaded);
    schedule.add_systems((event_phase, market_phase, production_phase, settlement_phase).chain());
    schedule
}

/// Simulate up to `months` further months, stopping early once the run is
/// complete. Returns the number of months simulated.
pub fn run_months_in_place(world: &mut World, months: u32) -> u32 {
    let mut schedule = build_schedule();
    let mut ran = 0;
    while ran < months && !world.resource::<Clock>().is_complete() {
        schedule.run(world);
        ran += 1;
    }
    if ran > 0 && world.resource::<Clock>().is_complete() {
        let ledger = world.resource::<Ledger>();
        info!(
            months = ledger.records.len(),
            profit = %ledger.cumulative_profit,
            "simulation complete"
        );
    }
    ran
}

/// Simulate up to `months` months and return the resulting report.
pub fn run_months(mut world: World, months: u32) -> SimReport {
    run_months_in_place(&mut world, months);
    report(&world)
}

/// Snapshot of everything recorded so far.
pub fn report(world: &World) -> SimReport {
    let ledger = world.resource::<Ledger>();
    SimReport {
        records: ledger.records.clone(),
        final_store_sales: ledger.final_store_sales.clone(),
        event_log: world.resource::<Events>().0.log().to_vec(),
    }
}

/// One configured run. Holds no state beyond its own world.
pub struct Simulation {
    world: World,
}

impl Simulation {
    /// Validate `config` and seed the random stream from `config.seed`.
    pub fn new(config: RunConfig, catalog: EventCatalog) -> Result<Self, ConfigError> {
        let rng = Box::new(SeededSource::new(config.seed));
        Self::with_source(config, catalog, rng)
    }

    /// Use a caller-supplied random stream.
    pub fn with_source(
        config: RunConfig,
        catalog: EventCatalog,
        rng: Box<dyn RandomSource + Send + Sync>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            world: init_world(config, catalog, rng)?,
        })
    }

    /// Use an explicit consumer population and random stream.
    pub fn with_population(
        config: RunConfig,
        catalog: EventCatalog,
        population: ConsumerPopulation,
        rng: Box<dyn RandomSource + Send + Sync>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            world: init_world_with(config, catalog, population, rng)?,
        })
    }

    /// Simulate up to `months` more months; see [`run_months_in_place`].
    pub fn step(&mut self, months: u32) -> u32 {
        run_months_in_place(&mut self.world, months)
    }

    /// Months simulated so far.
    pub fn elapsed(&self) -> u32 {
        self.world.resource::<Clock>().tick
    }

    pub fn is_complete(&self) -> bool {
        self.world.resource::<Clock>().is_complete()
    }

    pub fn consumers(&self) -> &ConsumerPopulation {
        &self.world.resource::<Consumers>().0
    }

    pub fn factory(&self) -> &Factory {
        &self.world.resource::<Plant>().0
    }

    pub fn events(&self) -> &EventEngine {
        &self.world.resource::<Events>().0
    }

    pub fn report(&self) -> SimReport {
        report(&self.world)
    }

    /// Simulate every remaining month and return the report.
    pub fn run(mut self) -> SimReport {
        let remaining = {
            let clock = self.world.resource::<Clock>();
            clock.total.saturating_sub(clock.tick)
        };
        self.step(remaining);
        self.report()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sim_core::ScriptedSource;

    fn quiet_config(months: u32) -> RunConfig {
        RunConfig {
            months,
            event_probability: 0.0,
            ..RunConfig::default()
        }
    }

    #[test]
    fn world_creates_with_all_resources() {
        let world = init_world(
            quiet_config(3),
            EventCatalog::default(),
            Box::new(SeededSource::new(1)),
        )
        .unwrap();
        assert_eq!(world.resource::<Clock>().tick, 0);
        assert_eq!(world.resource::<Consumers>().0.len(), 100);
        assert!(world.resource::<Ledger>().records.is_empty());
    }

    #[test]
    fn invalid_config_creates_nothing() {
        let cfg = RunConfig {
            months: 0,
            ..RunConfig::default()
        };
        let err = Simulation::new(cfg, EventCatalog::default()).err().unwrap();
        assert_eq!(err.field(), Some("months"));
    }

    #[test]
    fn run_stops_at_configured_months() {
        let mut world = init_world(
            quiet_config(4),
            EventCatalog::default(),
            Box::new(SeededSource::new(2)),
        )
        .unwrap();
        assert_eq!(run_months_in_place(&mut world, 10), 4);
        assert_eq!(run_months_in_place(&mut world, 10), 0);
        assert_eq!(report(&world).months(), 4);
    }

    #[test]
    fn scripted_stream_drives_a_run() {
        let sim = Simulation::with_source(
            quiet_config(2),
            EventCatalog::default(),
            Box::new(ScriptedSource::new(vec![0.3, 0.7, 0.1])),
        )
        .unwrap();
        let report = sim.run();
        assert_eq!(report.months(), 2);
        assert_eq!(report.final_store_sales.len(), 5);
    }
}
