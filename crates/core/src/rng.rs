//! RNG module - seeded randomness for grids and prompts
//!
//! Every random decision in a session (grid sampling, target choice, "DON'T TAP"
//! and Stroop rolls, shape layout) goes through one [`GameRng`], so the same seed
//! replays the same session given the same inputs.

use rand::seq::{IndexedRandom, SliceRandom};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

/// Deterministic PCG-backed RNG owned by one engine
#[derive(Debug, Clone)]
pub struct GameRng {
    inner: Pcg32,
    seed: u64,
}

impl GameRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u64) -> Self {
        Self {
            inner: Pcg32::seed_from_u64(seed),
            seed,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// True with probability `p` (clamped to [0, 1])
    pub fn chance(&mut self, p: f64) -> bool {
        self.inner.random_bool(p.clamp(0.0, 1.0))
    }

    /// Uniform pick, None on an empty slice
    pub fn pick<T: Copy>(&mut self, items: &[T]) -> Option<T> {
        items.choose(&mut self.inner).copied()
    }

    /// Shuffle a slice in place
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.inner);
    }

    /// Up to `n` distinct elements in random order (sampling without replacement)
    pub fn sample<T: Copy>(&mut self, items: &[T], n: usize) -> Vec<T> {
        let mut out = items.to_vec();
        out.shuffle(&mut self.inner);
        out.truncate(n);
        out
    }

    /// Uniform value in [0, max), 0 when max is 0
    pub fn next_range(&mut self, max: u32) -> u32 {
        if max == 0 {
            return 0;
        }
        self.inner.random_range(0..max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rng_deterministic() {
        let mut rng1 = GameRng::new(12345);
        let mut rng2 = GameRng::new(12345);

        // Same seed should produce same sequence
        for _ in 0..100 {
            assert_eq!(rng1.next_range(1000), rng2.next_range(1000));
        }
    }

    #[test]
    fn test_pick_empty_is_none() {
        let mut rng = GameRng::new(1);
        let empty: [u8; 0] = [];
        assert_eq!(rng.pick(&empty), None);
        assert_eq!(rng.pick(&[7u8]), Some(7));
    }

    #[test]
    fn test_sample_without_replacement() {
        let mut rng = GameRng::new(9);
        let items: Vec<u32> = (0..9).collect();
        for n in [0, 3, 6, 9, 12] {
            let mut picked = rng.sample(&items, n);
            assert_eq!(picked.len(), n.min(items.len()));
            picked.sort_unstable();
            picked.dedup();
            assert_eq!(picked.len(), n.min(items.len()), "duplicates for n={}", n);
        }
    }

    #[test]
    fn test_chance_extremes() {
        let mut rng = GameRng::new(3);
        for _ in 0..50 {
            assert!(!rng.chance(0.0));
            assert!(rng.chance(1.0));
            // Out-of-range probabilities are clamped rather than panicking
            assert!(rng.chance(2.0));
        }
    }

    #[test]
    fn test_shuffle_keeps_elements() {
        let mut rng = GameRng::new(42);
        let mut items = [1, 2, 3, 4, 5, 6];
        rng.shuffle(&mut items);
        let mut sorted = items;
        sorted.sort_unstable();
        assert_eq!(sorted, [1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_next_range_zero() {
        let mut rng = GameRng::new(5);
        assert_eq!(rng.next_range(0), 0);
        assert!(rng.next_range(3) < 3);
    }
}
