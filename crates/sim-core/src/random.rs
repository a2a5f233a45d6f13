//! Injectable random stream used by every stochastic component.
//!
//! Production runs use [`SeededSource`], a ChaCha8 stream seeded from the run
//! configuration. Tests can substitute [`ScriptedSource`], which replays a
//! fixed sequence of uniform samples so outcomes can be computed by hand.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

/// Source of random variates.
pub trait RandomSource {
    /// Uniform sample in `[0, 1)`.
    fn uniform(&mut self) -> f64;

    /// Normally distributed sample.
    fn gaussian(&mut self, mean: f64, std_dev: f64) -> f64;

    /// Uniform integer in `[low, high]`, both inclusive. Returns `low` when the
    /// range is empty.
    fn int_range(&mut self, low: i64, high: i64) -> i64;

    /// Uniform sample in `[low, high)`.
    fn uniform_range(&mut self, low: f64, high: f64) -> f64 {
        low + (high - low) * self.uniform()
    }

    /// Bernoulli trial with success probability `p`.
    fn chance(&mut self, p: f64) -> bool {
        self.uniform() < p
    }

    /// Uniformly chosen index into a collection of `len` items.
    fn pick_index(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        Some(self.int_range(0, len as i64 - 1) as usize)
    }

    /// Index chosen with probability proportional to `weights`. Non-finite and
    /// negative weights count as zero; `None` when nothing has weight.
    fn weighted_index(&mut self, weights: &[f64]) -> Option<usize> {
        let usable = |w: f64| if w.is_finite() && w > 0.0 { w } else { 0.0 };
        let total: f64 = weights.iter().map(|&w| usable(w)).sum();
        if total <= 0.0 {
            return None;
        }
        let target = self.uniform() * total;
        let mut acc = 0.0;
        let mut last = None;
        for (i, &w) in weights.iter().enumerate() {
            let w = usable(w);
            if w == 0.0 {
                continue;
            }
            acc += w;
            last = Some(i);
            if target < acc {
                return Some(i);
            }
        }
        // Float accumulation can leave `target` just above the final sum.
        last
    }
}

/// Deterministic ChaCha8-backed stream.
#[derive(Clone, Debug)]
pub struct SeededSource {
    rng: ChaCha8Rng,
}

impl SeededSource {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SeededSource {
    fn uniform(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    fn gaussian(&mut self, mean: f64, std_dev: f64) -> f64 {
        match Normal::new(mean, std_dev) {
            Ok(normal) => normal.sample(&mut self.rng),
            Err(_) => mean,
        }
    }

    fn int_range(&mut self, low: i64, high: i64) -> i64 {
        if high <= low {
            return low;
        }
        self.rng.gen_range(low..=high)
    }
}

/// Replays a fixed, cycling sequence of uniform samples.
///
/// Integer and gaussian draws are derived from the next uniform sample, so a
/// script of `[0.0]` always yields the lowest integer and `mean - std_dev`.
#[derive(Clone, Debug)]
pub struct ScriptedSource {
    values: Vec<f64>,
    cursor: usize,
}

impl ScriptedSource {
    /// Values are clamped into `[0, 1)`. An empty script behaves like `[0.0]`.
    pub fn new(values: Vec<f64>) -> Self {
        let mut values: Vec<f64> = values
            .into_iter()
            .map(|v| if v.is_finite() { v.clamp(0.0, 0.999_999_999) } else { 0.0 })
            .collect();
        if values.is_empty() {
            values.push(0.0);
        }
        Self { values, cursor: 0 }
    }

    /// A script that repeats one value forever.
    pub fn constant(value: f64) -> Self {
        Self::new(vec![value])
    }

    /// Number of samples drawn so far.
    pub fn draws(&self) -> usize {
        self.cursor
    }
}

impl RandomSource for ScriptedSource {
    fn uniform(&mut self) -> f64 {
        let v = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        v
    }

    fn gaussian(&mut self, mean: f64, std_dev: f64) -> f64 {
        mean + std_dev * (2.0 * self.uniform() - 1.0)
    }

    fn int_range(&mut self, low: i64, high: i64) -> i64 {
        if high <= low {
            return low;
        }
        let span = (high - low + 1) as f64;
        let offset = (self.uniform() * span).floor() as i64;
        low + offset.min(high - low)
    }
}
