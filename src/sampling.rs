use rand::seq::SliceRandom;
use rand_xoshiro::Xoshiro256PlusPlus;
use rand_xoshiro::rand_core::SeedableRng;
use serde::{Deserialize, Serialize};

/// Seed used when reproducible sampling is requested without a seed.
pub const DEFAULT_SEED: u64 = 1;

/// How example reviews are picked.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sampling {
    /// Every call starts from the same seed, so the same input gives the same picks.
    Seeded(u64),
    /// Every call draws a fresh seed.
    Unseeded,
}

impl Default for Sampling {
    fn default() -> Self {
        Sampling::Seeded(DEFAULT_SEED)
    }
}

impl Sampling {
    fn rng(&self) -> Xoshiro256PlusPlus {
        let seed = match self {
            Sampling::Seeded(seed) => *seed,
            Sampling::Unseeded => rand::random(),
        };
        Xoshiro256PlusPlus::seed_from_u64(seed)
    }

    /// Pick `k` items without replacement.
    ///
    /// With at most `k` items there is nothing to choose, and all of them are
    /// returned in their original order.
    pub fn sample<T: Clone>(&self, items: &[T], k: usize) -> Vec<T> {
        if items.len() <= k {
            return items.to_vec();
        }
        let mut rng = self.rng();
        items.choose_multiple(&mut rng, k).cloned().collect()
    }

    /// Pick one item, if there is any.
    pub fn pick<T: Clone>(&self, items: &[T]) -> Option<T> {
        match items.len() {
            0 => None,
            1 => Some(items[0].clone()),
            _ => items.choose(&mut self.rng()).cloned(),
        }
    }
}
