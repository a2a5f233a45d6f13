//! Systems run once per simulated month, chained in a fixed order.

use bevy_ecs::prelude::*;
use rust_decimal::Decimal;
use sim_core::{seasonal_base, EventClass, MonthRecord};
use tracing::{debug, info};

use crate::settlement::{apply_market, settle};
use crate::{Clock, Consumers, Events, Ledger, Plant, Popularity, Settings, SimRng, TickState};

/// Expire and trigger events, then capture this month's modifiers.
pub fn event_phase(
    settings: Res<Settings>,
    clock: Res<Clock>,
    mut events: ResMut<Events>,
    mut rng: ResMut<SimRng>,
    mut tick: ResMut<TickState>,
) {
    *tick = TickState::default();
    events.0.tick();
    let fired = events
        .0
        .try_trigger(settings.0.event_probability, clock.tick, rng.stream());
    tick.fired_event = fired.map(|d| d.name);
    tick.popularity_modifier = events.0.modifier(EventClass::Popularity);
    tick.market_multiplier = events.0.market_multiplier();
    tick.production_multiplier = events.0.production_multiplier();
}

/// Popularity update for the configured policy and consumer purchase
/// decisions.
pub fn market_phase(
    settings: Res<Settings>,
    clock: Res<Clock>,
    mut popularity: ResMut<Popularity>,
    mut consumers: ResMut<Consumers>,
    mut rng: ResMut<SimRng>,
    mut tick: ResMut<TickState>,
) {
    let season = seasonal_base(clock.stamp().calendar_month());
    popularity
        .0
        .seasonal_step(season, settings.0.popularity.growth, rng.stream());
    let adjusted = popularity.0.adjusted(tick.popularity_modifier);
    let outcome = consumers
        .0
        .decide_purchases(adjusted, settings.0.unit_price, rng.stream());
    let (units, revenue) = apply_market(outcome.units, outcome.revenue, tick.market_multiplier);

    tick.adjusted_popularity = adjusted;
    tick.demand_units = units;
    tick.demand_revenue = revenue;
    tick.popularity_delta = outcome.popularity_delta;
    tick.store_demand = outcome.store_sales;
}

/// Factory output under the production multiplier.
pub fn production_phase(
    mut plant: ResMut<Plant>,
    mut rng: ResMut<SimRng>,
    mut tick: ResMut<TickState>,
) {
    let multiplier = tick.production_multiplier;
    tick.produced = plant.0.produce(multiplier, rng.stream());
}

/// Cap sales by available goods, book costs and profit, record the month and
/// roll state forward.
pub fn settlement_phase(
    mut clock: ResMut<Clock>,
    mut plant: ResMut<Plant>,
    mut popularity: ResMut<Popularity>,
    mut ledger: ResMut<Ledger>,
    tick: Res<TickState>,
) {
    let stamp = clock.stamp();
    let available = plant.0.inventory() + tick.produced;
    let s = settle(
        tick.demand_units,
        tick.demand_revenue,
        available,
        &tick.store_demand,
    );
    assert!(s.revenue >= Decimal::ZERO, "negative revenue {}", s.revenue);

    let production_cost = plant.0.compute_cost(s.sold);
    let resource_cost = plant.0.maintenance_cost();
    let total_expense = production_cost + resource_cost;
    let monthly_profit = s.revenue - total_expense;
    ledger.cumulative_profit += monthly_profit;
    let storage = plant.0.ship(tick.produced, s.sold);

    popularity.0.apply_delta(tick.popularity_delta);
    let record = MonthRecord {
        stamp,
        label: stamp.label(),
        revenue: s.revenue,
        profit: ledger.cumulative_profit,
        monthly_profit,
        production_cost,
        resource_cost,
        total_expense,
        popularity: popularity.0.popularity(),
        storage,
        produced: tick.produced,
        sold: s.sold,
        fired_event: tick.fired_event.clone(),
        store_sales: s.store_sales.clone(),
    };
    info!(
        month = %record.label,
        popularity = format_args!("{:.2}", record.popularity),
        sold = record.sold,
        profit = %record.monthly_profit,
        "month settled"
    );
    debug!(
        produced = record.produced,
        storage,
        demand = tick.demand_units,
        consumer_popularity = tick.adjusted_popularity,
        "settlement detail"
    );
    ledger.records.push(record);
    ledger.final_store_sales = s.store_sales;

    popularity.0.end_of_tick();
    plant.0.advance_growth();
    clock.tick += 1;
}
