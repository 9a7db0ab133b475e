//! Sorted sets: collections of unique members, each with a finite score, kept in
//! `(score, member)` order.
//!
//! A [`SortedSet`] pairs two structures: a span-annotated skiplist that answers every ordered
//! query in logarithmic time, and a hash map from member to score for constant-time membership
//! and score lookups. A third, ordered by scan hash, lets cursor scans seek to their batch.
//! All of them are only ever mutated together, by the methods in this module.

pub mod algebra;
pub mod range;
pub mod scan;
mod skiplist;

use bytes::Bytes;
use std::collections::{BTreeSet, HashMap};
use thiserror::Error as ThisError;

use range::{clamp_rank_range, LexRange, Limit, ScoreRange};
use skiplist::SkipList;

pub use algebra::Aggregate;
pub use scan::ScanPage;

#[derive(Debug, ThisError, PartialEq, Clone)]
pub enum ZSetError {
    #[error("score is not a finite number: {0}")]
    InvalidScore(f64),
    #[error("invalid range; {0}")]
    InvalidRange(String),
}

/// Direction in which ranks and ranges are counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Order {
    #[default]
    Ascending,
    Descending,
}

/// `NX` / `XX`: restrict an add to members that are new or to members that already exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    OnlyNew,
    OnlyExisting,
}

/// `GT` / `LT`: only update an existing member when the new score is greater (or less) than the
/// current one. New members are not affected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Greater,
    Less,
}

impl Comparison {
    fn allows(self, current: f64, new: f64) -> bool {
        match self {
            Comparison::Greater => new > current,
            Comparison::Less => new < current,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AddOptions {
    pub condition: Option<Condition>,
    pub comparison: Option<Comparison>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AddOutcome {
    Created,
    Updated { previous: f64 },
    /// The options prevented the add.
    Skipped,
}

pub fn check_score(score: f64) -> Result<f64, ZSetError> {
    if score.is_finite() {
        Ok(score)
    } else {
        Err(ZSetError::InvalidScore(score))
    }
}

#[derive(Debug, Default)]
pub struct SortedSet {
    index: SkipList,
    members: HashMap<Bytes, f64>,
    scan_order: BTreeSet<(u64, Bytes)>,
}

impl SortedSet {
    pub fn new() -> SortedSet {
        SortedSet::default()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Inserts `member` with `score`, or moves it to `score` if it is already present.
    pub fn add(
        &mut self,
        member: Bytes,
        score: f64,
        options: AddOptions,
    ) -> Result<AddOutcome, ZSetError> {
        check_score(score)?;
        Ok(self.upsert(member, score, options))
    }

    /// Adds every pair or none of them: all scores are validated before the first insert. When a
    /// member appears twice the last pair wins.
    pub fn add_all(
        &mut self,
        entries: Vec<(Bytes, f64)>,
        options: AddOptions,
    ) -> Result<Vec<AddOutcome>, ZSetError> {
        for (_, score) in &entries {
            check_score(*score)?;
        }

        Ok(entries
            .into_iter()
            .map(|(member, score)| self.upsert(member, score, options))
            .collect())
    }

    /// Adds `delta` to the score of `member`, treating an absent member as 0. Fails without
    /// side effects if `delta` or the result is not finite.
    pub fn incr_by(&mut self, member: Bytes, delta: f64) -> Result<f64, ZSetError> {
        check_score(delta)?;
        let score = check_score(self.score(&member).unwrap_or(0.0) + delta)?;
        self.upsert(member, score, AddOptions::default());
        Ok(score)
    }

    pub fn remove(&mut self, member: &[u8]) -> bool {
        match self.members.remove(member) {
            Some(score) => {
                let key = (scan::scan_hash(member), Bytes::copy_from_slice(member));
                self.scan_order.remove(&key);
                self.index.remove(score, member)
            }
            None => false,
        }
    }

    pub fn score(&self, member: &[u8]) -> Option<f64> {
        self.members.get(member).copied()
    }

    pub fn rank(&self, member: &[u8], order: Order) -> Option<usize> {
        let score = self.score(member)?;
        let rank = self.index.rank(score, member)?;

        Some(match order {
            Order::Ascending => rank,
            Order::Descending => self.len() - 1 - rank,
        })
    }

    /// Entries between ranks `start` and `stop` inclusive, counted in `order`. Negative ranks
    /// count from the end; bounds outside the collection are clamped.
    pub fn range_by_rank(&self, start: i64, stop: i64, order: Order) -> Vec<(Bytes, f64)> {
        let Some((start, stop)) = clamp_rank_range(start, stop, self.len()) else {
            return Vec::new();
        };

        let anchor = match order {
            Order::Ascending => start,
            Order::Descending => self.len() - 1 - start,
        };

        self.index
            .iter_from_rank(anchor, order)
            .take(stop - start + 1)
            .map(owned)
            .collect()
    }

    pub fn range_by_score(&self, range: &ScoreRange, limit: Limit, order: Order) -> Vec<(Bytes, f64)> {
        limit
            .apply(self.index.range_by_score(*range, order))
            .map(owned)
            .collect()
    }

    /// Entries whose member falls within `range`, in member order.
    ///
    /// Lexicographic ranges assume every entry has the same score. With mixed scores the index is
    /// searched as if it were sorted by member alone: the walk starts at the first entry reached
    /// that satisfies the lower bound and yields entries in index order until one fails the upper
    /// bound, so the result depends on how scores interleave members.
    pub fn range_by_lex(&self, range: &LexRange, limit: Limit, order: Order) -> Vec<(Bytes, f64)> {
        limit
            .apply(self.index.range_by_lex(range, order))
            .map(owned)
            .collect()
    }

    pub fn count_by_score(&self, range: &ScoreRange) -> usize {
        self.index.count_in_score_range(range)
    }

    /// Same single-score assumption as [`SortedSet::range_by_lex`].
    pub fn count_by_lex(&self, range: &LexRange) -> usize {
        self.index.count_in_lex_range(range)
    }

    pub fn remove_range_by_rank(&mut self, start: i64, stop: i64) -> usize {
        let Some((start, stop)) = clamp_rank_range(start, stop, self.len()) else {
            return 0;
        };

        let removed = self.index.remove_range_by_rank(start, stop);
        self.forget(&removed)
    }

    pub fn remove_range_by_score(&mut self, range: &ScoreRange) -> usize {
        let removed = self.index.remove_range_by_score(range);
        self.forget(&removed)
    }

    pub fn remove_range_by_lex(&mut self, range: &LexRange) -> usize {
        let removed = self.index.remove_range_by_lex(range);
        self.forget(&removed)
    }

    /// Removes and returns up to `count` entries from the low (`Ascending`) or high end.
    pub fn pop(&mut self, order: Order, count: usize) -> Vec<(Bytes, f64)> {
        let popped: Vec<(Bytes, f64)> = self.index.iter(order).take(count).map(owned).collect();
        for (member, _) in &popped {
            self.remove(member);
        }
        popped
    }

    /// All entries in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = (&Bytes, f64)> + '_ {
        self.index.iter(Order::Ascending)
    }

    pub(crate) fn scores(&self) -> &HashMap<Bytes, f64> {
        &self.members
    }

    fn upsert(&mut self, member: Bytes, score: f64, options: AddOptions) -> AddOutcome {
        let current = self.score(&member);

        match (current, options.condition) {
            (None, Some(Condition::OnlyExisting)) | (Some(_), Some(Condition::OnlyNew)) => {
                AddOutcome::Skipped
            }
            (None, _) => {
                self.scan_order.insert((scan::scan_hash(&member), member.clone()));
                self.index.insert(score, member.clone());
                self.members.insert(member, score);
                AddOutcome::Created
            }
            (Some(previous), _) => {
                if let Some(comparison) = options.comparison {
                    if !comparison.allows(previous, score) {
                        return AddOutcome::Skipped;
                    }
                }

                if previous != score {
                    self.index.update_score(previous, &member, score);
                    self.members.insert(member, score);
                }

                AddOutcome::Updated { previous }
            }
        }
    }

    fn forget(&mut self, removed: &[Bytes]) -> usize {
        for member in removed {
            self.members.remove(member);
            self.scan_order.remove(&(scan::scan_hash(member), member.clone()));
        }
        removed.len()
    }
}

/// Builds a set from pairs whose scores are already known to be finite.
impl FromIterator<(Bytes, f64)> for SortedSet {
    fn from_iter<I: IntoIterator<Item = (Bytes, f64)>>(iter: I) -> Self {
        let mut set = SortedSet::new();
        for (member, score) in iter {
            set.upsert(member, score, AddOptions::default());
        }
        set
    }
}

fn owned((member, score): (&Bytes, f64)) -> (Bytes, f64) {
    (member.clone(), score)
}
