//! Cache Record Module
//!
//! Defines individual cache records and the arena that owns them. Records are
//! addressed by stable `RecordId` handles so bucket chains and the recency
//! list can link them without shared ownership.

use std::time::Duration;

use crate::tasks::ExpiryTimer;

/// Stable handle to a record slot in the arena.
pub(crate) type RecordId = usize;

// == Record ==
/// A single live cache record.
#[derive(Debug)]
pub(crate) struct Record<V> {
    /// The key this record is stored under
    pub(crate) key: String,
    /// The stored value
    pub(crate) value: V,
    /// Bucket the key routes to, kept so eviction can skip rehashing
    pub(crate) bucket: usize,
    /// Next record in the same bucket chain
    pub(crate) next: Option<RecordId>,
    /// Active TTL timer
    pub(crate) timer: ExpiryTimer,
}

impl<V> Record<V> {
    // == Constructor ==
    pub(crate) fn new(key: String, value: V, bucket: usize, timer: ExpiryTimer) -> Self {
        Self {
            key,
            value,
            bucket,
            next: None,
            timer,
        }
    }

    // == Refresh ==
    /// Replaces the value and timer in place.
    ///
    /// The old timer is canceled before the value is replaced and `arm`
    /// schedules the new one.
    pub(crate) fn refresh(&mut self, value: V, arm: impl FnOnce() -> ExpiryTimer) {
        self.timer.cancel();
        self.value = value;
        self.timer = arm();
    }

    // == Time To Live ==
    /// Returns the remaining TTL, or None if the timer never fires.
    pub(crate) fn ttl_remaining(&self) -> Option<Duration> {
        self.timer.remaining()
    }
}

// == Record Arena ==
/// Slot storage for records with a free list for handle reuse.
#[derive(Debug)]
pub(crate) struct Records<V> {
    slots: Vec<Option<Record<V>>>,
    free: Vec<RecordId>,
}

impl<V> Records<V> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
        }
    }

    /// Stores a record and returns its handle.
    pub(crate) fn insert(&mut self, record: Record<V>) -> RecordId {
        match self.free.pop() {
            Some(id) => {
                self.slots[id] = Some(record);
                id
            }
            None => {
                self.slots.push(Some(record));
                self.slots.len() - 1
            }
        }
    }

    /// Takes a record out of its slot, freeing the handle.
    pub(crate) fn remove(&mut self, id: RecordId) -> Option<Record<V>> {
        let record = self.slots.get_mut(id)?.take()?;
        self.free.push(id);
        Some(record)
    }

    pub(crate) fn get(&self, id: RecordId) -> Option<&Record<V>> {
        self.slots.get(id)?.as_ref()
    }

    pub(crate) fn get_mut(&mut self, id: RecordId) -> Option<&mut Record<V>> {
        self.slots.get_mut(id)?.as_mut()
    }

    /// Iterates over every live record.
    pub(crate) fn iter(&self) -> impl Iterator<Item = (RecordId, &Record<V>)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(id, slot)| slot.as_ref().map(|record| (id, record)))
    }
}
