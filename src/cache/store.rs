//! Cache Store Module
//!
//! Main cache engine combining hash-bucketed record storage with a global
//! recency list for LRU eviction and per-record timers for TTL expiry.
//! Every piece of mutable state sits behind one `tokio::sync::Mutex`.

use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, trace};

use crate::cache::bucket::{BucketTable, Lookup};
use crate::cache::lru::RecencyList;
use crate::cache::record::{Record, RecordId, Records};
use crate::cache::router::HashRouter;
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::tasks::ExpiryTimer;

// == Cache ==
/// Fixed-capacity concurrent cache with LRU eviction and per-entry TTL.
///
/// Cloning yields another handle onto the same cache. When the last handle
/// is dropped every outstanding TTL timer is canceled.
///
/// All operations must run inside a tokio runtime, since TTL timers are
/// spawned as tokio tasks.
pub struct Cache<V> {
    shared: Arc<Shared<V>>,
}

impl<V> Clone for Cache<V> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

struct Shared<V> {
    capacity: usize,
    router: HashRouter,
    state: Mutex<State<V>>,
}

/// Mutable cache state, only reachable through `Shared::state`.
struct State<V> {
    buckets: BucketTable,
    records: Records<V>,
    recency: RecencyList,
    size: usize,
    generation: u64,
}

impl<V> State<V> {
    fn new(capacity: usize) -> Self {
        Self {
            buckets: BucketTable::new(capacity),
            records: Records::with_capacity(capacity),
            recency: RecencyList::with_capacity(capacity),
            size: 0,
            generation: 0,
        }
    }

    fn next_generation(&mut self) -> u64 {
        self.generation = self.generation.wrapping_add(1);
        self.generation
    }
}

impl<V: Clone + Send + 'static> Cache<V> {
    // == Constructor ==
    /// Creates an empty cache holding at most `capacity` entries.
    ///
    /// The key space is split into `capacity` buckets routed by a hash with
    /// a per-instance random seed.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(CacheError::InvalidCapacity(capacity));
        }

        Ok(Self {
            shared: Arc::new(Shared {
                capacity,
                router: HashRouter::new(capacity),
                state: Mutex::new(State::new(capacity)),
            }),
        })
    }

    /// Creates a cache sized from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        Self::new(config.capacity)
    }

    // == Get ==
    /// Retrieves a value by key, marking it as most recently used.
    ///
    /// Returns `None` without side effects on a miss.
    pub async fn get(&self, key: &str) -> Option<V> {
        let shared = &self.shared;
        let bucket = shared.router.route(key);
        let mut state = shared.state.lock().await;

        let lookup = shared.lookup(&state, bucket, key);
        let id = lookup.found?;
        shared.touch(&mut state, bucket, lookup);

        state.records.get(id).map(|record| record.value.clone())
    }

    // == Set ==
    /// Stores a value under `key` for `ttl`.
    ///
    /// An existing key has its value, timer, and recency position refreshed
    /// in place. A new key in a full cache first evicts the least recently
    /// used entry.
    pub async fn set(&self, key: impl Into<String>, value: V, ttl: Duration) {
        let key = key.into();
        let shared = &self.shared;
        let bucket = shared.router.route(&key);
        let mut state = shared.state.lock().await;

        let generation = state.next_generation();
        let lookup = shared.lookup(&state, bucket, &key);

        if let Some(id) = lookup.found {
            if let Some(record) = state.records.get_mut(id) {
                record.refresh(value, || self.arm_timer(bucket, &key, generation, ttl));
            }
            shared.touch(&mut state, bucket, lookup);
            trace!(key = %key, generation, "refreshed cache record");
            return;
        }

        if state.size == shared.capacity {
            shared.evict(&mut state);
        }

        let timer = self.arm_timer(bucket, &key, generation, ttl);
        shared.insert(&mut state, Record::new(key, value, bucket, timer));
        trace!(bucket, generation, size = state.size, "inserted cache record");
    }

    // == Read-only Queries ==
    /// Returns the number of live entries.
    pub async fn len(&self) -> usize {
        self.shared.state.lock().await.size
    }

    /// Returns true if the cache holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Returns the fixed capacity given at construction.
    pub fn capacity(&self) -> usize {
        self.shared.capacity
    }

    /// Checks for a live key without touching its recency position.
    pub async fn contains(&self, key: &str) -> bool {
        let shared = &self.shared;
        let bucket = shared.router.route(key);
        let state = shared.state.lock().await;
        shared.lookup(&state, bucket, key).found.is_some()
    }

    /// Returns the time left before `key` expires, without touching its
    /// recency position. `None` if the key is absent, `Duration::MAX` if its
    /// TTL was too large to ever fire.
    pub async fn ttl_remaining(&self, key: &str) -> Option<Duration> {
        let shared = &self.shared;
        let bucket = shared.router.route(key);
        let state = shared.state.lock().await;

        let id = shared.lookup(&state, bucket, key).found?;
        let record = state.records.get(id)?;
        Some(record.ttl_remaining().unwrap_or(Duration::MAX))
    }

    /// Arms the TTL timer for a record. Firing re-enters the lock through
    /// `Shared::expire` and only removes the record if `generation` still
    /// matches.
    fn arm_timer(&self, bucket: usize, key: &str, generation: u64, ttl: Duration) -> ExpiryTimer {
        let shared: Weak<Shared<V>> = Arc::downgrade(&self.shared);
        let key = key.to_string();

        ExpiryTimer::arm(generation, ttl, async move {
            if let Some(shared) = shared.upgrade() {
                shared.expire(bucket, &key, generation).await;
            }
        })
    }
}

// == Locked Helpers ==
// Every helper below requires the cache lock to be held by the caller.
impl<V> Shared<V> {
    /// Debug-only probe that the cache lock is currently held.
    ///
    /// The probe is racy (another task could take the lock between the probe
    /// and the check) and only catches helpers called outside any critical
    /// section.
    fn assert_locked(&self) {
        debug_assert!(
            self.state.try_lock().is_err(),
            "cache state must only be accessed while the cache lock is held"
        );
    }

    fn lookup(&self, state: &State<V>, bucket: usize, key: &str) -> Lookup {
        self.assert_locked();
        state.buckets.lookup(&state.records, bucket, key)
    }

    /// Moves a found record to the front of both its bucket chain and the
    /// recency list.
    fn touch(&self, state: &mut State<V>, bucket: usize, lookup: Lookup) {
        self.assert_locked();
        let Some(id) = lookup.found else {
            return;
        };
        state.buckets.promote(&mut state.records, bucket, lookup);
        state.recency.move_to_front(id);
    }

    /// Links a new record into its bucket chain and the front of the recency list.
    fn insert(&self, state: &mut State<V>, record: Record<V>) -> RecordId {
        self.assert_locked();
        let bucket = record.bucket;
        let id = state.records.insert(record);
        state.buckets.push_front(&mut state.records, bucket, id);
        state.recency.push_front(id);
        state.size += 1;
        id
    }

    /// Removes the record currently stored under `key`.
    ///
    /// With `generation` set, the record is only removed if its timer carries
    /// that generation. Returns whether anything was removed.
    fn delete(&self, state: &mut State<V>, bucket: usize, key: &str, generation: Option<u64>) -> bool {
        self.assert_locked();
        let lookup = self.lookup(state, bucket, key);
        let Some(id) = lookup.found else {
            return false;
        };

        if let Some(generation) = generation {
            let current = state.records.get(id).map(|record| record.timer.generation());
            if current != Some(generation) {
                return false;
            }
        }

        state.buckets.unlink(&mut state.records, bucket, lookup);
        state.recency.remove(id);
        if let Some(record) = state.records.remove(id) {
            record.timer.cancel();
        }
        state.size -= 1;
        true
    }

    /// Evicts the globally least recently used record.
    fn evict(&self, state: &mut State<V>) {
        self.assert_locked();
        let Some(victim) = state.recency.back() else {
            return;
        };
        let Some((bucket, key)) = state
            .records
            .get(victim)
            .map(|record| (record.bucket, record.key.clone()))
        else {
            return;
        };

        if self.delete(state, bucket, &key, None) {
            debug!(key = %key, "evicted least recently used record");
        }
    }

    /// Timer callback: takes the lock itself and removes `key` if the record
    /// has not been superseded since the timer was armed.
    async fn expire(&self, bucket: usize, key: &str, generation: u64) {
        let mut state = self.state.lock().await;
        if self.delete(&mut state, bucket, key, Some(generation)) {
            debug!(key = %key, generation, "TTL expired cache record");
        } else {
            trace!(key = %key, generation, "stale TTL timer found nothing to remove");
        }
    }
}

impl<V> Drop for Shared<V> {
    fn drop(&mut self) {
        for (_, record) in self.state.get_mut().records.iter() {
            record.timer.cancel();
        }
    }
}

// == Test Support ==
#[cfg(test)]
impl<V: Clone + Send + 'static> Cache<V> {
    /// Panics unless bucket chains, recency list, arena, and size agree.
    pub(crate) async fn assert_consistent(&self) {
        let shared = &self.shared;
        let state = shared.state.lock().await;

        assert!(state.size <= shared.capacity, "size exceeds capacity");
        assert_eq!(state.recency.len(), state.size, "recency list length != size");
        assert_eq!(state.records.iter().count(), state.size, "arena count != size");

        let mut chained = 0;
        for bucket in 0..state.buckets.len() {
            for id in state.buckets.chain(&state.records, bucket) {
                let record = state.records.get(id).expect("chained id must be live");
                assert_eq!(record.bucket, bucket, "record stored in the wrong bucket");
                assert_eq!(shared.router.route(&record.key), bucket, "record routed elsewhere");
                chained += 1;
            }
        }
        assert_eq!(chained, state.size, "chained records != size");

        let mut keys: Vec<&str> = state.records.iter().map(|(_, r)| r.key.as_str()).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), state.size, "duplicate keys stored");
    }

    /// Keys ordered from most to least recently used.
    pub(crate) async fn recency_keys(&self) -> Vec<String> {
        let state = self.shared.state.lock().await;
        state
            .recency
            .iter()
            .filter_map(|id| state.records.get(id).map(|r| r.key.clone()))
            .collect()
    }

    /// Key at the head of the bucket chain `key` routes to.
    pub(crate) async fn chain_head(&self, key: &str) -> Option<String> {
        let bucket = self.shared.router.route(key);
        let state = self.shared.state.lock().await;
        let id = state.buckets.chain(&state.records, bucket).next()?;
        state.records.get(id).map(|r| r.key.clone())
    }

    /// Current timer generation stored for `key`.
    pub(crate) async fn generation_of(&self, key: &str) -> Option<u64> {
        let shared = &self.shared;
        let bucket = shared.router.route(key);
        let state = shared.state.lock().await;
        let id = shared.lookup(&state, bucket, key).found?;
        state.records.get(id).map(|r| r.timer.generation())
    }

    /// Runs the timer callback for `key` directly, as a stale timer would.
    pub(crate) async fn fire_expiry(&self, key: &str, generation: u64) {
        let bucket = self.shared.router.route(key);
        self.shared.expire(bucket, key, generation).await;
    }
}
