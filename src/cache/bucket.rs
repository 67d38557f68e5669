//! Bucket Chains
//!
//! Open hashing with chaining: each bucket heads a singly-linked chain of
//! record handles threaded through `Record::next`.

use crate::cache::record::{RecordId, Records};

/// Result of scanning one bucket chain for a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Lookup {
    /// The matching record, if any
    pub(crate) found: Option<RecordId>,
    /// Record immediately before `found`, `None` when `found` is the head
    pub(crate) prev: Option<RecordId>,
    /// Current head of the chain, useful on a miss for insertion
    pub(crate) head: Option<RecordId>,
}

/// Fixed-length table of bucket chain heads.
#[derive(Debug)]
pub(crate) struct BucketTable {
    heads: Vec<Option<RecordId>>,
}

impl BucketTable {
    pub(crate) fn new(buckets: usize) -> Self {
        Self {
            heads: vec![None; buckets],
        }
    }

    /// Linear scan of `bucket` for `key`.
    pub(crate) fn lookup<V>(&self, records: &Records<V>, bucket: usize, key: &str) -> Lookup {
        let head = self.heads[bucket];
        let mut prev = None;
        let mut cursor = head;

        while let Some(id) = cursor {
            let Some(record) = records.get(id) else {
                break;
            };
            if record.key == key {
                return Lookup {
                    found: Some(id),
                    prev,
                    head,
                };
            }
            prev = Some(id);
            cursor = record.next;
        }

        Lookup {
            found: None,
            prev: None,
            head,
        }
    }

    /// Prepends a record to its bucket's chain.
    pub(crate) fn push_front<V>(&mut self, records: &mut Records<V>, bucket: usize, id: RecordId) {
        let head = self.heads[bucket];
        if let Some(record) = records.get_mut(id) {
            record.next = head;
        }
        self.heads[bucket] = Some(id);
    }

    /// Unlinks the record found by `lookup`, patching the predecessor or the head.
    pub(crate) fn unlink<V>(&mut self, records: &mut Records<V>, bucket: usize, lookup: Lookup) {
        let Some(id) = lookup.found else {
            return;
        };
        let next = records.get_mut(id).and_then(|record| record.next.take());

        match lookup.prev.and_then(|prev| records.get_mut(prev)) {
            Some(prev) => prev.next = next,
            None => self.heads[bucket] = next,
        }
    }

    /// Moves the record found by `lookup` to the head of its chain.
    pub(crate) fn promote<V>(&mut self, records: &mut Records<V>, bucket: usize, lookup: Lookup) {
        let Some(id) = lookup.found else {
            return;
        };
        if lookup.head == Some(id) {
            return;
        }
        self.unlink(records, bucket, lookup);
        self.push_front(records, bucket, id);
    }

    /// Iterates over the record handles chained in `bucket`, head first.
    #[allow(dead_code)]
    pub(crate) fn chain<'a, V>(
        &self,
        records: &'a Records<V>,
        bucket: usize,
    ) -> impl Iterator<Item = RecordId> + 'a {
        std::iter::successors(self.heads[bucket], move |&id| {
            records.get(id).and_then(|record| record.next)
        })
    }

    #[allow(dead_code)]
    pub(crate) fn len(&self) -> usize {
        self.heads.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::record::Record;
    use crate::tasks::ExpiryTimer;
    use std::time::Duration;

    fn insert(table: &mut BucketTable, records: &mut Records<u32>, key: &str, value: u32) -> RecordId {
        let timer = ExpiryTimer::arm(0, Duration::from_secs(60), async {});
        let id = records.insert(Record::new(key.to_string(), value, 0, timer));
        table.push_front(records, 0, id);
        id
    }

    fn keys(table: &BucketTable, records: &Records<u32>) -> Vec<String> {
        table
            .chain(records, 0)
            .map(|id| records.get(id).unwrap().key.clone())
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_lookup_hit_and_miss() {
        let mut table = BucketTable::new(1);
        let mut records = Records::with_capacity(3);

        let a = insert(&mut table, &mut records, "a", 1);
        let b = insert(&mut table, &mut records, "b", 2);
        let c = insert(&mut table, &mut records, "c", 3);

        // Chain is [c, b, a]
        let found = table.lookup(&records, 0, "a");
        assert_eq!(found.found, Some(a));
        assert_eq!(found.prev, Some(b));
        assert_eq!(found.head, Some(c));

        let head = table.lookup(&records, 0, "c");
        assert_eq!(head.found, Some(c));
        assert_eq!(head.prev, None);

        let miss = table.lookup(&records, 0, "weird");
        assert_eq!(miss.found, None);
        assert_eq!(miss.head, Some(c));
    }

    #[tokio::test(start_paused = true)]
    async fn test_lookup_empty_bucket() {
        let table = BucketTable::new(4);
        let records: Records<u32> = Records::with_capacity(4);

        let miss = table.lookup(&records, 3, "key");
        assert_eq!(
            miss,
            Lookup {
                found: None,
                prev: None,
                head: None
            }
        );
        assert_eq!(table.len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unlink_head_middle_tail() {
        let mut table = BucketTable::new(1);
        let mut records = Records::with_capacity(4);

        for (i, key) in ["a", "b", "c", "d"].iter().enumerate() {
            insert(&mut table, &mut records, key, i as u32);
        }
        assert_eq!(keys(&table, &records), ["d", "c", "b", "a"]);

        let middle = table.lookup(&records, 0, "b");
        table.unlink(&mut records, 0, middle);
        assert_eq!(keys(&table, &records), ["d", "c", "a"]);

        let head = table.lookup(&records, 0, "d");
        table.unlink(&mut records, 0, head);
        assert_eq!(keys(&table, &records), ["c", "a"]);

        let tail = table.lookup(&records, 0, "a");
        table.unlink(&mut records, 0, tail);
        assert_eq!(keys(&table, &records), ["c"]);

        let miss = table.lookup(&records, 0, "zzz");
        table.unlink(&mut records, 0, miss);
        assert_eq!(keys(&table, &records), ["c"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_promote_moves_record_to_head() {
        let mut table = BucketTable::new(1);
        let mut records = Records::with_capacity(3);

        insert(&mut table, &mut records, "a", 1);
        insert(&mut table, &mut records, "b", 2);
        insert(&mut table, &mut records, "c", 3);

        let found = table.lookup(&records, 0, "a");
        table.promote(&mut records, 0, found);
        assert_eq!(keys(&table, &records), ["a", "c", "b"]);

        // Promoting the head changes nothing
        let head = table.lookup(&records, 0, "a");
        table.promote(&mut records, 0, head);
        assert_eq!(keys(&table, &records), ["a", "c", "b"]);
    }
}
