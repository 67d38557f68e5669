//! Hash Router
//!
//! Maps keys to buckets with a keyed hash whose seed is drawn randomly for
//! each cache instance, so callers cannot craft keys that all collide into
//! one chain.

use std::collections::hash_map::RandomState;
use std::hash::BuildHasher;

#[derive(Debug, Clone)]
pub(crate) struct HashRouter {
    seed: RandomState,
    buckets: usize,
}

impl HashRouter {
    pub(crate) fn new(buckets: usize) -> Self {
        debug_assert!(buckets > 0, "router needs at least one bucket");
        Self {
            seed: RandomState::new(),
            buckets,
        }
    }

    /// Returns `keyed_hash(seed, key) mod buckets`.
    pub(crate) fn route(&self, key: &str) -> usize {
        (self.seed.hash_one(key) % self.buckets as u64) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_is_stable_per_instance() {
        let router = HashRouter::new(16);
        for key in ["a", "key1", "", "a much longer key with spaces"] {
            assert_eq!(router.route(key), router.route(key));
        }
    }

    #[test]
    fn test_route_stays_in_range() {
        let router = HashRouter::new(7);
        for i in 0..1000 {
            assert!(router.route(&format!("key{i}")) < 7);
        }
    }

    #[test]
    fn test_single_bucket() {
        let router = HashRouter::new(1);
        assert_eq!(router.route("anything"), 0);
    }

    #[test]
    fn test_routes_spread_over_buckets() {
        let router = HashRouter::new(8);
        let mut used = [false; 8];
        for i in 0..256 {
            used[router.route(&format!("key{i}"))] = true;
        }
        assert!(used.iter().all(|&u| u), "256 keys should touch all 8 buckets");
    }
}
