//! Recency List Module
//!
//! Global doubly-linked recency ordering over record handles, used to pick
//! the LRU eviction victim in O(1).

use crate::cache::record::RecordId;

// == Link ==
#[derive(Debug, Default, Clone, Copy)]
struct Link {
    prev: Option<RecordId>,
    next: Option<RecordId>,
    linked: bool,
}

// == Recency List ==
/// Tracks access order for LRU eviction across every live record.
///
/// Links are stored in a side table indexed by `RecordId`, so each record
/// owns exactly one node and moving an already-linked node never allocates:
/// - Front = Most recently used
/// - Back = Least recently used
#[derive(Debug, Default)]
pub(crate) struct RecencyList {
    links: Vec<Link>,
    head: Option<RecordId>,
    tail: Option<RecordId>,
    len: usize,
}

impl RecencyList {
    // == Constructor ==
    /// Creates an empty list with link slots preallocated for `capacity` records.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            links: Vec::with_capacity(capacity),
            ..Self::default()
        }
    }

    // == Push Front ==
    /// Links a record that is not yet in the list as the most recently used.
    pub(crate) fn push_front(&mut self, id: RecordId) {
        if self.links.len() <= id {
            self.links.resize(id + 1, Link::default());
        }
        debug_assert!(!self.links[id].linked, "record {id} is already linked");

        self.links[id] = Link {
            prev: None,
            next: self.head,
            linked: true,
        };
        match self.head {
            Some(old_head) => self.links[old_head].prev = Some(id),
            None => self.tail = Some(id),
        }
        self.head = Some(id);
        self.len += 1;
    }

    // == Touch ==
    /// Marks a linked record as recently used (moves it to the front).
    pub(crate) fn move_to_front(&mut self, id: RecordId) {
        if self.head == Some(id) {
            return;
        }
        self.remove(id);
        self.push_front(id);
    }

    // == Remove ==
    /// Unlinks a record from the list. Unlinked ids are ignored.
    pub(crate) fn remove(&mut self, id: RecordId) {
        let Some(link) = self.links.get(id).copied().filter(|l| l.linked) else {
            return;
        };

        match link.prev {
            Some(prev) => self.links[prev].next = link.next,
            None => self.head = link.next,
        }
        match link.next {
            Some(next) => self.links[next].prev = link.prev,
            None => self.tail = link.prev,
        }
        self.links[id] = Link::default();
        self.len -= 1;
    }

    // == Back ==
    /// Returns the least recently used record, the eviction victim.
    pub(crate) fn back(&self) -> Option<RecordId> {
        self.tail
    }

    // == Front ==
    #[allow(dead_code)]
    pub(crate) fn front(&self) -> Option<RecordId> {
        self.head
    }

    // == Length ==
    #[allow(dead_code)]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Iterates from most to least recently used.
    #[allow(dead_code)]
    pub(crate) fn iter(&self) -> impl Iterator<Item = RecordId> + '_ {
        std::iter::successors(self.head, move |&id| self.links[id].next)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn order(list: &RecencyList) -> Vec<RecordId> {
        list.iter().collect()
    }

    #[test]
    fn test_recency_new() {
        let list = RecencyList::with_capacity(4);
        assert_eq!(list.len(), 0);
        assert_eq!(list.back(), None);
        assert_eq!(list.front(), None);
    }

    #[test]
    fn test_recency_push_front() {
        let mut list = RecencyList::with_capacity(4);

        list.push_front(0);
        list.push_front(1);
        list.push_front(2);

        assert_eq!(list.len(), 3);
        // 0 is oldest (added first)
        assert_eq!(list.back(), Some(0));
        assert_eq!(order(&list), vec![2, 1, 0]);
    }

    #[test]
    fn test_recency_move_to_front() {
        let mut list = RecencyList::with_capacity(4);

        list.push_front(0);
        list.push_front(1);
        list.push_front(2);

        list.move_to_front(0);

        assert_eq!(list.len(), 3);
        assert_eq!(list.back(), Some(1));
        assert_eq!(order(&list), vec![0, 2, 1]);
    }

    #[test]
    fn test_recency_move_front_is_noop() {
        let mut list = RecencyList::with_capacity(4);

        list.push_front(0);
        list.push_front(1);
        list.move_to_front(1);
        list.move_to_front(1);

        assert_eq!(order(&list), vec![1, 0]);
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_recency_remove_middle_and_ends() {
        let mut list = RecencyList::with_capacity(4);

        for id in 0..4 {
            list.push_front(id);
        }
        // [3, 2, 1, 0]
        list.remove(2);
        assert_eq!(order(&list), vec![3, 1, 0]);

        list.remove(0);
        assert_eq!(list.back(), Some(1));

        list.remove(3);
        assert_eq!(list.front(), Some(1));
        assert_eq!(list.len(), 1);

        list.remove(1);
        assert_eq!(list.len(), 0);
        assert_eq!(list.back(), None);
        assert_eq!(list.front(), None);
    }

    #[test]
    fn test_recency_remove_unlinked_id() {
        let mut list = RecencyList::with_capacity(4);

        list.push_front(0);
        list.remove(7);
        list.remove(0);
        list.remove(0);

        assert_eq!(list.len(), 0);
    }

    #[test]
    fn test_recency_reuses_removed_slot() {
        let mut list = RecencyList::with_capacity(2);

        list.push_front(0);
        list.push_front(1);
        list.remove(0);
        list.push_front(0);

        assert_eq!(order(&list), vec![0, 1]);
        assert_eq!(list.back(), Some(1));
    }

    #[test]
    fn test_recency_order_after_multiple_touches() {
        let mut list = RecencyList::with_capacity(3);

        list.push_front(0);
        list.push_front(1);
        list.push_front(2);

        list.move_to_front(0);
        list.move_to_front(2);
        list.move_to_front(1);

        // touch(0): [0, 2, 1]; touch(2): [2, 0, 1]; touch(1): [1, 2, 0]
        assert_eq!(order(&list), vec![1, 2, 0]);
        assert_eq!(list.back(), Some(0));
    }
}
