use bytes::Bytes;
use std::collections::HashMap;
use strum_macros::{Display, EnumString};

use crate::zset::{check_score, SortedSet, ZSetError};

/// How the weighted scores of a member found in several sources are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, Display)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum Aggregate {
    #[default]
    Sum,
    Min,
    Max,
}

impl Aggregate {
    fn combine(self, acc: f64, score: f64) -> f64 {
        match self {
            Aggregate::Sum => acc + score,
            Aggregate::Min => acc.min(score),
            Aggregate::Max => acc.max(score),
        }
    }
}

/// A snapshot of one input collection together with the weight its scores are multiplied by.
/// A missing collection is an empty source.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Source {
    pub scores: HashMap<Bytes, f64>,
    pub weight: f64,
}

impl Source {
    pub fn new(scores: HashMap<Bytes, f64>, weight: f64) -> Source {
        Source { scores, weight }
    }

    fn weighted(&self, member: &[u8]) -> Option<f64> {
        self.scores.get(member).map(|score| score * self.weight)
    }
}

impl From<&SortedSet> for Source {
    fn from(set: &SortedSet) -> Source {
        Source::new(set.scores().clone(), 1.0)
    }
}

/// Every member of any source, scored by aggregating its weighted scores over the sources that
/// contain it.
pub fn union(sources: &[Source], aggregate: Aggregate) -> Result<SortedSet, ZSetError> {
    check_weights(sources)?;

    let mut scores: HashMap<Bytes, f64> = HashMap::new();
    for source in sources {
        for member in source.scores.keys() {
            if scores.contains_key(member) {
                continue;
            }
            let score = fold(sources, member, aggregate);
            scores.insert(member.clone(), score);
        }
    }

    collect(scores)
}

/// Members present in every source. An empty list of sources yields an empty set.
pub fn intersect(sources: &[Source], aggregate: Aggregate) -> Result<SortedSet, ZSetError> {
    check_weights(sources)?;

    let Some(smallest) = sources.iter().min_by_key(|source| source.scores.len()) else {
        return Ok(SortedSet::new());
    };

    let scores = smallest
        .scores
        .keys()
        .filter(|member| sources.iter().all(|s| s.scores.contains_key(*member)))
        .map(|member| (member.clone(), fold(sources, member, aggregate)))
        .collect();

    collect(scores)
}

/// Members of `first` that appear in none of `others`, keeping their score in `first`.
pub fn difference(first: &Source, others: &[Source]) -> SortedSet {
    first
        .scores
        .iter()
        .filter(|(member, _)| !others.iter().any(|s| s.scores.contains_key(*member)))
        .map(|(member, score)| (member.clone(), *score))
        .collect()
}

fn fold(sources: &[Source], member: &[u8], aggregate: Aggregate) -> f64 {
    sources
        .iter()
        .filter_map(|source| source.weighted(member))
        .reduce(|acc, score| aggregate.combine(acc, score))
        .unwrap_or(0.0)
}

fn check_weights(sources: &[Source]) -> Result<(), ZSetError> {
    for source in sources {
        check_score(source.weight)?;
    }
    Ok(())
}

fn collect(scores: HashMap<Bytes, f64>) -> Result<SortedSet, ZSetError> {
    for score in scores.values() {
        check_score(*score)?;
    }
    Ok(scores.into_iter().collect())
}
