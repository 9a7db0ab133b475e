use bytes::Bytes;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::ops::Deref;
use std::sync::Arc;
use tracing::debug;

use crate::zset::algebra::{self, Aggregate, Source};
use crate::zset::range::{LexRange, Limit, ScoreRange};
use crate::zset::{AddOptions, AddOutcome, Order, ScanPage, SortedSet, ZSetError};

/// The Store maps names to sorted sets. A set springs into existence on its first write and is
/// destroyed as soon as it becomes empty, so a missing key and an empty set are indistinguishable.
///
/// Each set sits behind its own lock: writers of one set exclude each other, readers share it,
/// and operations on different sets never contend beyond the short registry lookups. The store
/// is cheaply cloneable and shared between connections.
#[derive(Clone, Default)]
pub struct Store {
    inner: Arc<InnerStore>,
}

impl Store {
    pub fn new() -> Store {
        Store::default()
    }
}

impl Deref for Store {
    type Target = InnerStore;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

type Collection = Arc<RwLock<Slot>>;

#[derive(Default)]
pub struct InnerStore {
    collections: RwLock<HashMap<Bytes, Collection>>,
}

#[derive(Default)]
struct Slot {
    set: SortedSet,
    // Set once the slot has been removed from the registry. A writer that finds a detached slot
    // must look the key up again.
    detached: bool,
}

impl InnerStore {
    pub fn add(&self, key: &[u8], member: Bytes, score: f64) -> Result<AddOutcome, ZSetError> {
        self.write_or_create(key, |set| set.add(member, score, AddOptions::default()))
    }

    /// Adds all pairs under a single write lock, or none of them if any score is invalid.
    pub fn add_all(
        &self,
        key: &[u8],
        entries: Vec<(Bytes, f64)>,
        options: AddOptions,
    ) -> Result<Vec<AddOutcome>, ZSetError> {
        self.write_or_create(key, |set| set.add_all(entries, options))
    }

    pub fn remove(&self, key: &[u8], members: &[Bytes]) -> usize {
        self.write_existing(key, |set| {
            members.iter().filter(|member| set.remove(member)).count()
        })
        .unwrap_or(0)
    }

    pub fn incr_by(&self, key: &[u8], member: Bytes, delta: f64) -> Result<f64, ZSetError> {
        self.write_or_create(key, |set| set.incr_by(member, delta))
    }

    pub fn score(&self, key: &[u8], member: &[u8]) -> Option<f64> {
        self.read(key, |set| set.score(member)).flatten()
    }

    pub fn scores(&self, key: &[u8], members: &[Bytes]) -> Vec<Option<f64>> {
        self.read(key, |set| members.iter().map(|m| set.score(m)).collect())
            .unwrap_or_else(|| vec![None; members.len()])
    }

    pub fn rank(&self, key: &[u8], member: &[u8], order: Order) -> Option<usize> {
        self.read(key, |set| set.rank(member, order)).flatten()
    }

    pub fn len(&self, key: &[u8]) -> usize {
        self.read(key, |set| set.len()).unwrap_or(0)
    }

    pub fn range_by_rank(
        &self,
        key: &[u8],
        start: i64,
        stop: i64,
        order: Order,
    ) -> Vec<(Bytes, f64)> {
        self.read(key, |set| set.range_by_rank(start, stop, order))
            .unwrap_or_default()
    }

    pub fn range_by_score(
        &self,
        key: &[u8],
        range: &ScoreRange,
        limit: Limit,
        order: Order,
    ) -> Vec<(Bytes, f64)> {
        self.read(key, |set| set.range_by_score(range, limit, order))
            .unwrap_or_default()
    }

    pub fn range_by_lex(
        &self,
        key: &[u8],
        range: &LexRange,
        limit: Limit,
        order: Order,
    ) -> Vec<(Bytes, f64)> {
        self.read(key, |set| set.range_by_lex(range, limit, order))
            .unwrap_or_default()
    }

    pub fn count_by_score(&self, key: &[u8], range: &ScoreRange) -> usize {
        self.read(key, |set| set.count_by_score(range)).unwrap_or(0)
    }

    pub fn count_by_lex(&self, key: &[u8], range: &LexRange) -> usize {
        self.read(key, |set| set.count_by_lex(range)).unwrap_or(0)
    }

    pub fn remove_range_by_rank(&self, key: &[u8], start: i64, stop: i64) -> usize {
        self.write_existing(key, |set| set.remove_range_by_rank(start, stop))
            .unwrap_or(0)
    }

    pub fn remove_range_by_score(&self, key: &[u8], range: &ScoreRange) -> usize {
        self.write_existing(key, |set| set.remove_range_by_score(range))
            .unwrap_or(0)
    }

    pub fn remove_range_by_lex(&self, key: &[u8], range: &LexRange) -> usize {
        self.write_existing(key, |set| set.remove_range_by_lex(range))
            .unwrap_or(0)
    }

    pub fn pop(&self, key: &[u8], order: Order, count: usize) -> Vec<(Bytes, f64)> {
        self.write_existing(key, |set| set.pop(order, count))
            .unwrap_or_default()
    }

    pub fn scan(&self, key: &[u8], cursor: u64, count: usize) -> ScanPage {
        self.read(key, |set| set.scan(cursor, count))
            .unwrap_or_else(ScanPage::empty)
    }

    /// Union of the given `(key, weight)` sources. Each source is read under its own lock.
    pub fn union(
        &self,
        keys: &[(Bytes, f64)],
        aggregate: Aggregate,
    ) -> Result<SortedSet, ZSetError> {
        algebra::union(&self.sources(keys), aggregate)
    }

    pub fn intersect(
        &self,
        keys: &[(Bytes, f64)],
        aggregate: Aggregate,
    ) -> Result<SortedSet, ZSetError> {
        algebra::intersect(&self.sources(keys), aggregate)
    }

    /// Members of the first key missing from every other key. No keys yield an empty set.
    pub fn difference(&self, keys: &[Bytes]) -> SortedSet {
        let keys: Vec<(Bytes, f64)> = keys.iter().map(|key| (key.clone(), 1.0)).collect();
        let sources = self.sources(&keys);

        match sources.split_first() {
            Some((first, others)) => algebra::difference(first, others),
            None => SortedSet::new(),
        }
    }

    /// Stores the union into `destination` and returns its cardinality.
    pub fn union_store(
        &self,
        destination: &[u8],
        keys: &[(Bytes, f64)],
        aggregate: Aggregate,
    ) -> Result<usize, ZSetError> {
        let result = self.union(keys, aggregate)?;
        Ok(self.replace(destination, result))
    }

    pub fn intersect_store(
        &self,
        destination: &[u8],
        keys: &[(Bytes, f64)],
        aggregate: Aggregate,
    ) -> Result<usize, ZSetError> {
        let result = self.intersect(keys, aggregate)?;
        Ok(self.replace(destination, result))
    }

    pub fn difference_store(&self, destination: &[u8], keys: &[Bytes]) -> usize {
        let result = self.difference(keys);
        self.replace(destination, result)
    }

    /// Destroys the set stored at `key`. Returns whether it existed.
    pub fn delete(&self, key: &[u8]) -> bool {
        let Some(collection) = self.collections.write().remove(key) else {
            return false;
        };

        let mut slot = collection.write();
        slot.detached = true;
        let existed = !slot.set.is_empty();
        slot.set = SortedSet::new();

        debug!(key = %String::from_utf8_lossy(key), "collection deleted");
        existed
    }

    pub fn exists(&self, key: &[u8]) -> bool {
        self.read(key, |set| !set.is_empty()).unwrap_or(false)
    }

    pub fn keys(&self) -> Vec<Bytes> {
        self.snapshot()
            .into_iter()
            .filter(|(_, collection)| {
                let slot = collection.read();
                !slot.detached && !slot.set.is_empty()
            })
            .map(|(key, _)| key)
            .collect()
    }

    pub fn dbsize(&self) -> usize {
        self.keys().len()
    }

    fn snapshot(&self) -> Vec<(Bytes, Collection)> {
        self.collections
            .read()
            .iter()
            .map(|(key, collection)| (key.clone(), collection.clone()))
            .collect()
    }

    fn sources(&self, keys: &[(Bytes, f64)]) -> Vec<Source> {
        keys.iter()
            .map(|(key, weight)| {
                let scores = self
                    .read(key, |set| set.scores().clone())
                    .unwrap_or_default();
                Source::new(scores, *weight)
            })
            .collect()
    }

    // Swaps the contents of `destination` for `set` in one write. An empty result removes the
    // destination.
    fn replace(&self, destination: &[u8], set: SortedSet) -> usize {
        let len = set.len();
        if len == 0 {
            self.delete(destination);
            return 0;
        }

        self.write_or_create(destination, |current| *current = set);
        debug!(
            key = %String::from_utf8_lossy(destination),
            len,
            "collection replaced"
        );
        len
    }

    fn lookup(&self, key: &[u8]) -> Option<Collection> {
        self.collections.read().get(key).cloned()
    }

    fn get_or_create(&self, key: &[u8]) -> Collection {
        if let Some(collection) = self.lookup(key) {
            return collection;
        }

        self.collections
            .write()
            .entry(Bytes::copy_from_slice(key))
            .or_insert_with(|| {
                debug!(key = %String::from_utf8_lossy(key), "collection created");
                Arc::new(RwLock::new(Slot::default()))
            })
            .clone()
    }

    fn read<T>(&self, key: &[u8], f: impl FnOnce(&SortedSet) -> T) -> Option<T> {
        loop {
            let collection = self.lookup(key)?;
            let slot = collection.read();
            if !slot.detached {
                return Some(f(&slot.set));
            }
        }
    }

    fn write_or_create<T, F>(&self, key: &[u8], f: F) -> T
    where
        F: FnOnce(&mut SortedSet) -> T,
    {
        let mut f = f;
        loop {
            let collection = self.get_or_create(key);
            match self.apply(key, &collection, f) {
                Ok(res) => return res,
                Err(back) => f = back,
            }
        }
    }

    fn write_existing<T, F>(&self, key: &[u8], f: F) -> Option<T>
    where
        F: FnOnce(&mut SortedSet) -> T,
    {
        let mut f = f;
        loop {
            let collection = self.lookup(key)?;
            match self.apply(key, &collection, f) {
                Ok(res) => return Some(res),
                Err(back) => f = back,
            }
        }
    }

    // Runs `f` on the set under its write lock. A set left empty is detached and unregistered
    // before the lock is released. Hands `f` back if the slot was already detached.
    fn apply<T, F>(&self, key: &[u8], collection: &Collection, f: F) -> Result<T, F>
    where
        F: FnOnce(&mut SortedSet) -> T,
    {
        let mut slot = collection.write();
        if slot.detached {
            return Err(f);
        }

        let res = f(&mut slot.set);

        if slot.set.is_empty() {
            slot.detached = true;

            let mut collections = self.collections.write();
            if collections
                .get(key)
                .is_some_and(|current| Arc::ptr_eq(current, collection))
            {
                collections.remove(key);
                debug!(key = %String::from_utf8_lossy(key), "collection destroyed");
            }
        }

        Ok(res)
    }
}
