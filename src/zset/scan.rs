use bytes::Bytes;
use itertools::Itertools;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::zset::SortedSet;

/// One batch of a cursor scan. A `cursor` of 0 means the scan is complete.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanPage {
    pub cursor: u64,
    pub entries: Vec<(Bytes, f64)>,
}

impl ScanPage {
    pub fn empty() -> ScanPage {
        ScanPage {
            cursor: 0,
            entries: Vec::new(),
        }
    }
}

/// Position of a member in scan order. Keyed with fixed SipHash keys so that cursors handed to a
/// client stay meaningful across calls.
pub(super) fn scan_hash(member: &[u8]) -> u64 {
    let mut hasher = DefaultHasher::new();
    member.hash(&mut hasher);
    hasher.finish()
}

impl SortedSet {
    /// Returns roughly `count` members whose scan hash is at or after `cursor`.
    ///
    /// Members sharing the highest hash of the batch are all included, so the next cursor can
    /// start strictly after it. A member that stays in the set for the whole scan is returned
    /// exactly once; members added or removed meanwhile may or may not be.
    ///
    /// Seeks straight to `cursor` in the scan order, so a call costs O(log n + count).
    pub fn scan(&self, cursor: u64, count: usize) -> ScanPage {
        let count = count.max(1);

        let mut candidates = self.scan_order.range((cursor, Bytes::new())..).peekable();
        let mut batch: Vec<&(u64, Bytes)> = candidates.by_ref().take(count).collect();

        let Some(&&(boundary, _)) = batch.last() else {
            return ScanPage::empty();
        };
        batch.extend(candidates.peeking_take_while(|(hash, _)| *hash == boundary));

        let cursor = candidates.peek().map_or(0, |(hash, _)| *hash);
        let entries = batch
            .into_iter()
            .filter_map(|(_, member)| self.score(member).map(|score| (member.clone(), score)))
            .collect();

        ScanPage { cursor, entries }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::zset::{AddOptions, Order};

    fn set_of(n: usize) -> SortedSet {
        (0..n)
            .map(|i| (Bytes::from(format!("member:{i}")), i as f64))
            .collect()
    }

    fn scan_all(set: &SortedSet, count: usize) -> Vec<Bytes> {
        let mut seen = vec![];
        let mut cursor = 0;
        loop {
            let page = set.scan(cursor, count);
            seen.extend(page.entries.into_iter().map(|(m, _)| m));
            cursor = page.cursor;
            if cursor == 0 {
                break;
            }
        }
        seen
    }

    #[test]
    fn visits_every_member_once() {
        let set = set_of(100);

        for count in [1, 7, 10, 100, 1000] {
            let seen = scan_all(&set, count);
            let unique: HashSet<&Bytes> = seen.iter().collect();

            assert_eq!(seen.len(), 100);
            assert_eq!(unique.len(), 100);
        }
    }

    #[test]
    fn batches_respect_count() {
        let set = set_of(50);

        let page = set.scan(0, 10);
        assert_eq!(page.entries.len(), 10);
        assert_ne!(page.cursor, 0);

        let page = set.scan(0, 0);
        assert_eq!(page.entries.len(), 1);
    }

    #[test]
    fn batches_seek_to_the_cursor() {
        let set = set_of(1000);
        let mut hashes: Vec<u64> = set.scores().keys().map(|m| scan_hash(m)).collect();
        hashes.sort_unstable();

        let page = set.scan(0, 10);
        let mut batch: Vec<u64> = page.entries.iter().map(|(m, _)| scan_hash(m)).collect();
        batch.sort_unstable();
        assert_eq!(batch, hashes[..10]);
        assert_eq!(page.cursor, hashes[10]);

        // Resuming from an arbitrary cursor yields exactly the next `count` hashes.
        let page = set.scan(hashes[500], 25);
        let mut batch: Vec<u64> = page.entries.iter().map(|(m, _)| scan_hash(m)).collect();
        batch.sort_unstable();
        assert_eq!(batch, hashes[500..525]);
        assert_eq!(page.cursor, hashes[525]);

        let page = set.scan(hashes[995], 10);
        assert_eq!(page.entries.len(), 5);
        assert_eq!(page.cursor, 0);
    }

    #[test]
    fn scan_order_follows_mutations() {
        let mut set = set_of(30);

        set.remove(b"member:3");
        set.remove_range_by_rank(0, 1);
        set.pop(Order::Descending, 2);
        set.incr_by(Bytes::from("member:10"), 5.0).unwrap();
        set.add(Bytes::from("new"), 1.0, AddOptions::default())
            .unwrap();

        assert_eq!(set.scan_order.len(), set.len());
        let seen: HashSet<Bytes> = scan_all(&set, 4).into_iter().collect();
        let expected: HashSet<Bytes> = set.scores().keys().cloned().collect();
        assert_eq!(seen, expected);
    }

    #[test]
    fn empty_set() {
        let set = SortedSet::new();

        assert_eq!(set.scan(0, 10), ScanPage::empty());
        assert_eq!(set.scan(12345, 10), ScanPage::empty());
    }

    #[test]
    fn survives_mutation_between_calls() {
        let mut set = set_of(40);
        let mut seen = vec![];

        let page = set.scan(0, 10);
        seen.extend(page.entries.into_iter().map(|(m, _)| m));
        let mut cursor = page.cursor;

        for i in 100..120 {
            set.add(
                Bytes::from(format!("extra:{i}")),
                0.0,
                AddOptions::default(),
            )
            .unwrap();
        }

        while cursor != 0 {
            let page = set.scan(cursor, 10);
            seen.extend(page.entries.into_iter().map(|(m, _)| m));
            cursor = page.cursor;
        }

        for i in 0..40 {
            let member = Bytes::from(format!("member:{i}"));
            assert_eq!(seen.iter().filter(|m| **m == member).count(), 1);
        }
    }
}
