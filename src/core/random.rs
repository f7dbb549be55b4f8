//! Weighted random selection over any `rand::Rng`
//!
//! Every random decision in generation takes `&mut R where R: Rng`, so a
//! seeded `ChaCha8Rng` reproduces a battlefield exactly.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Weighted draws shared by terrain fill, class choice and tile choice
pub trait WeightedRng: Rng {
    /// Index drawn proportionally to `weights`
    ///
    /// Linear scan with a decreasing remainder. Non-positive weights are
    /// never chosen. Returns `None` when no weight is positive.
    fn pick_weighted_index(&mut self, weights: &[f64]) -> Option<usize> {
        let total: f64 = weights.iter().filter(|w| **w > 0.0).sum();
        if total <= 0.0 {
            return None;
        }

        let mut roll = self.gen::<f64>() * total;
        let mut last_positive = None;
        for (idx, &weight) in weights.iter().enumerate() {
            if weight <= 0.0 {
                continue;
            }
            roll -= weight;
            if roll <= 0.0 {
                return Some(idx);
            }
            last_positive = Some(idx);
        }

        // Float drift can leave a sliver of remainder
        last_positive
    }

    /// Item drawn proportionally to its weight
    fn pick_weighted<'a, T>(&mut self, entries: &'a [(T, f64)]) -> Option<&'a T> {
        let weights: Vec<f64> = entries.iter().map(|(_, w)| *w).collect();
        self.pick_weighted_index(&weights).map(|idx| &entries[idx].0)
    }

    /// Uniform integer in `[min, max]`, tolerating `min > max` by returning `min`
    fn roll_inclusive(&mut self, min: usize, max: usize) -> usize {
        if max <= min {
            min
        } else {
            self.gen_range(min..=max)
        }
    }
}

impl<R: Rng + ?Sized> WeightedRng for R {}

/// Deterministic generator for a seed
pub fn seeded_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}
