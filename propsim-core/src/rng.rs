//! Deterministic RNG hierarchy.
//!
//! A master seed is expanded into one sub-seed per Monte Carlo run via BLAKE3.
//! Derivation depends only on `(master_seed, run_index)`, so results are the
//! same whether runs execute sequentially or across threads.

use rand::rngs::StdRng;
use rand::SeedableRng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RngHierarchy {
    master_seed: u64,
}

impl RngHierarchy {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }

    /// Sub-seed for run `run_index`.
    pub fn run_seed(&self, run_index: u64) -> u64 {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&self.master_seed.to_le_bytes());
        hasher.update(b"monte_carlo");
        hasher.update(&run_index.to_le_bytes());
        let hash = hasher.finalize();
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&hash.as_bytes()[..8]);
        u64::from_le_bytes(bytes)
    }

    pub fn rng_for_run(&self, run_index: u64) -> StdRng {
        StdRng::seed_from_u64(self.run_seed(run_index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn run_seeds_are_deterministic() {
        let h = RngHierarchy::new(42);
        assert_eq!(h.run_seed(0), h.run_seed(0));
        assert_eq!(h.run_seed(17), RngHierarchy::new(42).run_seed(17));
    }

    #[test]
    fn runs_get_distinct_seeds() {
        let h = RngHierarchy::new(42);
        let seeds: std::collections::HashSet<u64> = (0..1000).map(|i| h.run_seed(i)).collect();
        assert_eq!(seeds.len(), 1000);
    }

    #[test]
    fn master_seed_changes_everything() {
        assert_ne!(RngHierarchy::new(1).run_seed(0), RngHierarchy::new(2).run_seed(0));
    }

    #[test]
    fn derivation_is_order_independent() {
        let h = RngHierarchy::new(42);
        let forward: Vec<u64> = (0..10).map(|i| h.run_seed(i)).collect();
        let mut backward: Vec<u64> = (0..10).rev().map(|i| h.run_seed(i)).collect();
        backward.reverse();
        assert_eq!(forward, backward);
    }

    #[test]
    fn rng_streams_reproduce() {
        let h = RngHierarchy::new(9);
        let mut a = h.rng_for_run(3);
        let mut b = h.rng_for_run(3);
        for _ in 0..5 {
            assert_eq!(a.gen::<u32>(), b.gen::<u32>());
        }
    }
}
