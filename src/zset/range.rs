use bytes::Bytes;
use std::str::FromStr;

use crate::zset::ZSetError;

/// One end of a score interval. Infinite values are accepted here, only stored scores must be
/// finite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScoreBound {
    Inclusive(f64),
    Exclusive(f64),
}

impl ScoreBound {
    pub fn value(self) -> f64 {
        match self {
            ScoreBound::Inclusive(v) | ScoreBound::Exclusive(v) => v,
        }
    }
}

/// Parses the wire form of a score bound: `1.5`, `(1.5`, `-inf`, `+inf`.
impl FromStr for ScoreBound {
    type Err = ZSetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (exclusive, number) = match s.strip_prefix('(') {
            Some(rest) => (true, rest),
            None => (false, s),
        };

        let value = match number.to_ascii_lowercase().as_str() {
            "-inf" => f64::NEG_INFINITY,
            "+inf" | "inf" => f64::INFINITY,
            other => other
                .parse::<f64>()
                .map_err(|_| ZSetError::InvalidRange("min or max is not a float".to_string()))?,
        };

        if value.is_nan() {
            return Err(ZSetError::InvalidRange(
                "min or max is not a float".to_string(),
            ));
        }

        Ok(if exclusive {
            ScoreBound::Exclusive(value)
        } else {
            ScoreBound::Inclusive(value)
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreRange {
    min: ScoreBound,
    max: ScoreBound,
}

impl ScoreRange {
    /// Builds a range, rejecting NaN bounds and a `min` greater than `max`. Equal values with an
    /// exclusive side are valid and simply match nothing.
    pub fn new(min: ScoreBound, max: ScoreBound) -> Result<ScoreRange, ZSetError> {
        if min.value().is_nan() || max.value().is_nan() {
            return Err(ZSetError::InvalidRange(
                "min or max is not a float".to_string(),
            ));
        }
        if min.value() > max.value() {
            return Err(ZSetError::InvalidRange(
                "min is greater than max".to_string(),
            ));
        }

        Ok(ScoreRange { min, max })
    }

    pub fn inclusive(min: f64, max: f64) -> Result<ScoreRange, ZSetError> {
        ScoreRange::new(ScoreBound::Inclusive(min), ScoreBound::Inclusive(max))
    }

    pub fn gte_min(&self, score: f64) -> bool {
        match self.min {
            ScoreBound::Inclusive(min) => score >= min,
            ScoreBound::Exclusive(min) => score > min,
        }
    }

    pub fn lte_max(&self, score: f64) -> bool {
        match self.max {
            ScoreBound::Inclusive(max) => score <= max,
            ScoreBound::Exclusive(max) => score < max,
        }
    }

    pub fn contains(&self, score: f64) -> bool {
        self.gte_min(score) && self.lte_max(score)
    }
}

/// One end of a lexicographic interval over member bytes.
#[derive(Debug, Clone, PartialEq)]
pub enum LexBound {
    Unbounded,
    Inclusive(Bytes),
    Exclusive(Bytes),
    /// `+` given as a minimum or `-` as a maximum. Nothing satisfies it.
    Empty,
}

impl LexBound {
    /// Parses a lower bound: `-`, `[value` or `(value`. `+` is accepted and matches nothing.
    pub fn parse_min(raw: &Bytes) -> Result<LexBound, ZSetError> {
        LexBound::parse(raw, b'-', b'+')
    }

    /// Parses an upper bound: `+`, `[value` or `(value`. `-` is accepted and matches nothing.
    pub fn parse_max(raw: &Bytes) -> Result<LexBound, ZSetError> {
        LexBound::parse(raw, b'+', b'-')
    }

    fn parse(raw: &Bytes, open: u8, closed: u8) -> Result<LexBound, ZSetError> {
        match raw.first() {
            Some(&c) if c == open && raw.len() == 1 => Ok(LexBound::Unbounded),
            Some(&c) if c == closed && raw.len() == 1 => Ok(LexBound::Empty),
            Some(b'[') => Ok(LexBound::Inclusive(raw.slice(1..))),
            Some(b'(') => Ok(LexBound::Exclusive(raw.slice(1..))),
            _ => Err(ZSetError::InvalidRange(
                "min or max not valid string range item".to_string(),
            )),
        }
    }

    fn value(&self) -> Option<&Bytes> {
        match self {
            LexBound::Unbounded | LexBound::Empty => None,
            LexBound::Inclusive(v) | LexBound::Exclusive(v) => Some(v),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LexRange {
    min: LexBound,
    max: LexBound,
}

impl LexRange {
    pub fn new(min: LexBound, max: LexBound) -> Result<LexRange, ZSetError> {
        if let (Some(lo), Some(hi)) = (min.value(), max.value()) {
            if lo > hi {
                return Err(ZSetError::InvalidRange(
                    "min is greater than max".to_string(),
                ));
            }
        }

        Ok(LexRange { min, max })
    }

    pub fn unbounded() -> LexRange {
        LexRange {
            min: LexBound::Unbounded,
            max: LexBound::Unbounded,
        }
    }

    pub fn gte_min(&self, member: &[u8]) -> bool {
        match &self.min {
            LexBound::Unbounded => true,
            LexBound::Empty => false,
            LexBound::Inclusive(min) => member >= min.as_ref(),
            LexBound::Exclusive(min) => member > min.as_ref(),
        }
    }

    pub fn lte_max(&self, member: &[u8]) -> bool {
        match &self.max {
            LexBound::Unbounded => true,
            LexBound::Empty => false,
            LexBound::Inclusive(max) => member <= max.as_ref(),
            LexBound::Exclusive(max) => member < max.as_ref(),
        }
    }

    pub fn contains(&self, member: &[u8]) -> bool {
        self.gte_min(member) && self.lte_max(member)
    }
}

/// `LIMIT offset count` applied after the range filter.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Limit {
    pub offset: usize,
    pub count: Option<usize>,
}

impl Limit {
    /// A negative offset matches nothing and a negative count means "no limit".
    pub fn new(offset: i64, count: i64) -> Limit {
        if offset < 0 {
            return Limit {
                offset: 0,
                count: Some(0),
            };
        }

        Limit {
            offset: offset as usize,
            count: usize::try_from(count).ok(),
        }
    }

    pub(crate) fn apply<I: Iterator>(&self, iter: I) -> impl Iterator<Item = I::Item> {
        iter.skip(self.offset).take(self.count.unwrap_or(usize::MAX))
    }
}

/// Resolves a `[start, stop]` rank interval against a collection of `len` entries. Negative
/// indexes count from the end and out of range bounds are clamped; `None` means the interval
/// selects nothing.
pub fn clamp_rank_range(start: i64, stop: i64, len: usize) -> Option<(usize, usize)> {
    let len = len as i64;
    let start = if start < 0 { (len + start).max(0) } else { start };
    let stop = if stop < 0 { len + stop } else { stop.min(len - 1) };

    if start > stop || start >= len {
        return None;
    }

    Some((start as usize, stop as usize))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_score_bounds() {
        assert_eq!("1.5".parse::<ScoreBound>(), Ok(ScoreBound::Inclusive(1.5)));
        assert_eq!("(2".parse::<ScoreBound>(), Ok(ScoreBound::Exclusive(2.0)));
        assert_eq!(
            "-inf".parse::<ScoreBound>(),
            Ok(ScoreBound::Inclusive(f64::NEG_INFINITY))
        );
        assert_eq!(
            "(+inf".parse::<ScoreBound>(),
            Ok(ScoreBound::Exclusive(f64::INFINITY))
        );
        assert!("abc".parse::<ScoreBound>().is_err());
        assert!("nan".parse::<ScoreBound>().is_err());
    }

    #[test]
    fn score_range_rejects_min_above_max() {
        assert_eq!(
            ScoreRange::inclusive(2.0, 1.0),
            Err(ZSetError::InvalidRange(
                "min is greater than max".to_string()
            ))
        );
        assert!(ScoreRange::inclusive(f64::NAN, 1.0).is_err());
    }

    #[test]
    fn score_range_bounds() {
        let range =
            ScoreRange::new(ScoreBound::Exclusive(1.0), ScoreBound::Inclusive(3.0)).unwrap();

        assert!(!range.contains(1.0));
        assert!(range.contains(1.5));
        assert!(range.contains(3.0));
        assert!(!range.contains(3.5));

        let empty =
            ScoreRange::new(ScoreBound::Exclusive(1.0), ScoreBound::Inclusive(1.0)).unwrap();
        assert!(!empty.contains(1.0));
    }

    #[test]
    fn parse_lex_bounds() {
        assert_eq!(
            LexBound::parse_min(&Bytes::from("-")),
            Ok(LexBound::Unbounded)
        );
        assert_eq!(
            LexBound::parse_max(&Bytes::from("+")),
            Ok(LexBound::Unbounded)
        );
        assert_eq!(
            LexBound::parse_min(&Bytes::from("[abc")),
            Ok(LexBound::Inclusive(Bytes::from("abc")))
        );
        assert_eq!(
            LexBound::parse_max(&Bytes::from("(abc")),
            Ok(LexBound::Exclusive(Bytes::from("abc")))
        );
        assert_eq!(LexBound::parse_min(&Bytes::from("+")), Ok(LexBound::Empty));
        assert_eq!(LexBound::parse_max(&Bytes::from("-")), Ok(LexBound::Empty));
        assert!(LexBound::parse_max(&Bytes::from("abc")).is_err());
        assert!(LexBound::parse_max(&Bytes::new()).is_err());
    }

    #[test]
    fn lex_range_rejects_min_above_max() {
        let min = LexBound::Inclusive(Bytes::from("c"));
        let max = LexBound::Exclusive(Bytes::from("a"));

        assert!(LexRange::new(min, max).is_err());
    }

    #[test]
    fn lex_range_bounds() {
        let range = LexRange::new(
            LexBound::Exclusive(Bytes::from("a")),
            LexBound::Inclusive(Bytes::from("c")),
        )
        .unwrap();

        assert!(!range.contains(b"a"));
        assert!(range.contains(b"b"));
        assert!(range.contains(b"c"));
        assert!(!range.contains(b"ca"));
        assert!(LexRange::unbounded().contains(b""));
    }

    #[test]
    fn lex_range_reversed_infinities_match_nothing() {
        let range = LexRange::new(LexBound::Empty, LexBound::Unbounded).unwrap();
        assert!(!range.contains(b""));
        assert!(!range.contains(b"zzz"));

        let range = LexRange::new(LexBound::Unbounded, LexBound::Empty).unwrap();
        assert!(!range.contains(b"a"));
    }

    #[test]
    fn limit_from_wire() {
        assert_eq!(
            Limit::new(1, -1),
            Limit {
                offset: 1,
                count: None
            }
        );
        assert_eq!(
            Limit::new(-1, 10),
            Limit {
                offset: 0,
                count: Some(0)
            }
        );
        assert_eq!(Limit::new(0, 2).apply(1..10).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn clamp_ranks() {
        assert_eq!(clamp_rank_range(0, -1, 4), Some((0, 3)));
        assert_eq!(clamp_rank_range(-2, -1, 4), Some((2, 3)));
        assert_eq!(clamp_rank_range(-100, 100, 4), Some((0, 3)));
        assert_eq!(clamp_rank_range(5, 10, 3), None);
        assert_eq!(clamp_rank_range(2, 1, 4), None);
        assert_eq!(clamp_rank_range(0, -5, 4), None);
        assert_eq!(clamp_rank_range(0, -1, 0), None);
    }
}
