//! Consumer agents and the per-month purchase decision.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sim_core::{RandomSource, StoreId, StoreSales};
use tracing::debug;

/// Influence at or above which a purchasing agent lifts popularity.
pub const INFLUENCER_THRESHOLD: f64 = 0.7;
/// Popularity gained per influential purchase.
pub const INFLUENCER_BOOST: f64 = 0.02;
/// Popularity gained when the best store outsells `STORE_BONUS_FACTOR` units per agent.
pub const STORE_BONUS: f64 = 0.03;
pub const STORE_BONUS_FACTOR: u64 = 3;
/// Weights of the three purchase-quantity tiers: six units, four to five, one to three.
pub const QUANTITY_TIERS: [f64; 3] = [0.50, 0.15, 0.35];

/// A synthetic consumer with fixed attributes drawn at creation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConsumerAgent {
    pub id: u32,
    /// Baseline liking for the product in percent, 80..=100.
    pub base_affinity: u32,
    pub age: u32,
    pub salary: u32,
    /// Word-of-mouth reach in [0, 1).
    pub influence: f64,
    pub home_store: StoreId,
    pub health: u32,
    /// Pull towards substitute products in [0, 1).
    pub alternative_pull: f64,
    /// Appetite for celebrations in [0, 1).
    pub festivity: f64,
    /// Probability used in the most recent decision.
    pub buy_probability: f64,
    /// Whether the agent bought in the most recent decision.
    pub purchased: bool,
    /// Units bought in the most recent decision.
    pub units_bought: u64,
}

impl ConsumerAgent {
    /// Draw a fresh agent. Attributes are drawn in declaration order.
    pub fn generate<R: RandomSource + ?Sized>(id: u32, rng: &mut R) -> Self {
        let base_affinity = rng.int_range(80, 100) as u32;
        let age = rng.int_range(18, 70) as u32;
        let salary = rng.int_range(5000, 12000) as u32;
        let influence = rng.uniform();
        let home_store = rng
            .pick_index(StoreId::ALL.len())
            .and_then(StoreId::from_index)
            .unwrap_or(StoreId::Store1);
        let health = rng.int_range(50, 100) as u32;
        let alternative_pull = rng.uniform();
        let festivity = rng.uniform();
        Self {
            id,
            base_affinity,
            age,
            salary,
            influence,
            home_store,
            health,
            alternative_pull,
            festivity,
            buy_probability: 0.0,
            purchased: false,
            units_bought: 0,
        }
    }

    /// Unclamped propensity: affinity plus every attribute adjustment.
    pub fn propensity(&self) -> f64 {
        f64::from(self.base_affinity) / 100.0
            + age_adjustment(self.age)
            + salary_adjustment(self.salary)
            + health_adjustment(self.health)
            + festivity_adjustment(self.festivity)
            + alternative_adjustment(self.alternative_pull)
    }

    /// Purchase probability: the propensity clamped to [0, 1].
    pub fn buy_probability(&self) -> f64 {
        self.propensity().clamp(0.0, 1.0)
    }
}

pub fn age_adjustment(age: u32) -> f64 {
    if (18..=28).contains(&age) {
        0.03
    } else if age >= 70 {
        -0.03
    } else {
        0.0
    }
}

pub fn salary_adjustment(salary: u32) -> f64 {
    if salary < 7000 {
        0.10
    } else if salary < 10000 {
        0.07
    } else {
        0.04
    }
}

/// Health 89 deliberately falls in neither band; the 50..89 band is half-open.
pub fn health_adjustment(health: u32) -> f64 {
    if health >= 90 {
        -0.05
    } else if (50..89).contains(&health) {
        0.03
    } else {
        0.0
    }
}

pub fn festivity_adjustment(festivity: f64) -> f64 {
    if festivity >= 0.8 {
        0.10
    } else {
        0.0
    }
}

pub fn alternative_adjustment(alternative_pull: f64) -> f64 {
    if alternative_pull >= 0.7 {
        -0.15
    } else {
        0.0
    }
}

/// Units bought by one purchasing agent: 6 half the time, otherwise 4–5
/// (15% overall) or 1–3 (35% overall).
pub fn purchase_quantity<R: RandomSource + ?Sized>(rng: &mut R) -> u64 {
    match rng.weighted_index(&QUANTITY_TIERS) {
        Some(1) => rng.int_range(4, 5) as u64,
        Some(2) => rng.int_range(1, 3) as u64,
        _ => 6,
    }
}

/// Aggregate result of one month of purchase decisions.
#[derive(Clone, Debug, PartialEq)]
pub struct PurchaseOutcome {
    pub units: u64,
    pub revenue: Decimal,
    /// Popularity gained from influencers and the store bonus.
    pub popularity_delta: f64,
    /// The popularity level passed in plus `popularity_delta`.
    pub popularity: f64,
    /// Units per store, always one entry per store in reporting order.
    pub store_sales: Vec<StoreSales>,
    pub buyers: u32,
}

/// Fixed-size set of consumer agents.
#[derive(Clone, Debug, Default)]
pub struct ConsumerPopulation {
    agents: Vec<ConsumerAgent>,
}

impl ConsumerPopulation {
    /// Draw `size` agents from the random stream.
    pub fn generate<R: RandomSource + ?Sized>(size: u32, rng: &mut R) -> Self {
        let agents = (0..size).map(|id| ConsumerAgent::generate(id, rng)).collect();
        Self { agents }
    }

    pub fn from_agents(agents: Vec<ConsumerAgent>) -> Self {
        Self { agents }
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn agents(&self) -> &[ConsumerAgent] {
        &self.agents
    }

    /// Run one month of purchase decisions.
    ///
    /// Each agent draws one uniform sample and buys when it does not exceed
    /// its probability. Purchases do not depend on `popularity`; the level is
    /// carried through and returned with the month's gains added. Only the
    /// transient decision fields of each agent are updated; static attributes
    /// never change.
    pub fn decide_purchases<R: RandomSource + ?Sized>(
        &mut self,
        popularity: f64,
        unit_price: Decimal,
        rng: &mut R,
    ) -> PurchaseOutcome {
        let mut per_store = [0u64; 5];
        let mut units = 0u64;
        let mut revenue = Decimal::ZERO;
        let mut popularity_delta = 0.0;
        let mut buyers = 0u32;

        for agent in &mut self.agents {
            agent.buy_probability = agent.buy_probability();
            if rng.uniform() <= agent.buy_probability {
                let qty = purchase_quantity(rng);
                agent.purchased = true;
                agent.units_bought = qty;
                units += qty;
                revenue += Decimal::from(qty) * unit_price;
                per_store[agent.home_store.index()] += qty;
                buyers += 1;
                if agent.influence >= INFLUENCER_THRESHOLD {
                    popularity_delta += INFLUENCER_BOOST;
                }
            } else {
                agent.purchased = false;
                agent.units_bought = 0;
            }
        }

        let best = per_store.iter().copied().max().unwrap_or(0);
        if best > STORE_BONUS_FACTOR * self.agents.len() as u64 {
            popularity_delta += STORE_BONUS;
        }

        let store_sales = StoreId::ALL
            .iter()
            .map(|&store| StoreSales {
                store,
                sales: per_store[store.index()],
            })
            .collect();
        debug!(buyers, units, popularity, "purchase decisions");
        PurchaseOutcome {
            units,
            revenue,
            popularity_delta,
            popularity: popularity + popularity_delta,
            store_sales,
            buyers,
        }
    }
}
