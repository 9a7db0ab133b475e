use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::store::Store;
use crate::zset::{Aggregate, SortedSet};
use crate::Error;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SetOp {
    Union,
    Inter,
    Diff,
}

/// `ZUNION`, `ZINTER` and `ZDIFF`, and their `STORE` variants which write the result to
/// `destination` (replacing it) and reply with its cardinality.
///
/// ```text
/// ZUNION numkeys key [key ...] [WEIGHTS weight [weight ...]] [AGGREGATE SUM|MIN|MAX] [WITHSCORES]
/// ZUNIONSTORE destination numkeys key [key ...] [WEIGHTS ...] [AGGREGATE ...]
/// ZDIFF numkeys key [key ...] [WITHSCORES]
/// ```
///
/// Missing keys are empty sets. Each score is multiplied by the weight of its key (1 by default)
/// before scores are aggregated (summed by default). `ZDIFF` keeps the scores of the first key.
///
/// Ref: <https://redis.io/docs/latest/commands/zunion/>
#[derive(Debug, PartialEq)]
pub struct ZSetOp {
    pub op: SetOp,
    pub destination: Option<Bytes>,
    pub keys: Vec<Bytes>,
    pub weights: Option<Vec<f64>>,
    pub aggregate: Aggregate,
    pub with_scores: bool,
}

impl ZSetOp {
    pub(super) fn parse(parser: &mut CommandParser, op: SetOp, store: bool) -> Result<Self, Error> {
        let command = command_name(op, store);
        let invalid = |argument: String| CommandParserError::InvalidCommandArgument {
            command: command.to_string(),
            argument,
        };

        let destination = if store {
            Some(parser.next_bytes()?)
        } else {
            None
        };

        let numkeys = parser.next_integer()?;
        if numkeys < 1 {
            return Err(invalid(numkeys.to_string()).into());
        }

        // `numkeys` is untrusted; the keys themselves bound the allocation.
        let mut keys = vec![];
        for _ in 0..numkeys {
            keys.push(parser.next_bytes()?);
        }

        let mut weights = None;
        let mut aggregate = Aggregate::default();
        let mut with_scores = false;

        while let Some(option) = parser.next_option()? {
            match option.as_str() {
                "WEIGHTS" if op != SetOp::Diff && weights.is_none() => {
                    let mut values = Vec::with_capacity(keys.len());
                    for _ in 0..keys.len() {
                        values.push(parser.next_float()?);
                    }
                    weights = Some(values);
                }
                "AGGREGATE" if op != SetOp::Diff => {
                    let name = parser.next_string()?;
                    aggregate = name.parse::<Aggregate>().map_err(|_| invalid(name))?;
                }
                "WITHSCORES" if !store => with_scores = true,
                _ => return Err(invalid(option).into()),
            }
        }

        Ok(Self {
            op,
            destination,
            keys,
            weights,
            aggregate,
            with_scores,
        })
    }

    fn weighted_keys(&self) -> Vec<(Bytes, f64)> {
        match &self.weights {
            Some(weights) => self.keys.iter().cloned().zip(weights.iter().copied()).collect(),
            None => self.keys.iter().map(|key| (key.clone(), 1.0)).collect(),
        }
    }
}

impl Executable for ZSetOp {
    fn exec(self, store: Store) -> Result<Frame, Error> {
        if let Some(destination) = &self.destination {
            let len = match self.op {
                SetOp::Union => {
                    store.union_store(destination, &self.weighted_keys(), self.aggregate)?
                }
                SetOp::Inter => {
                    store.intersect_store(destination, &self.weighted_keys(), self.aggregate)?
                }
                SetOp::Diff => store.difference_store(destination, &self.keys),
            };

            return Ok(Frame::Integer(len as i64));
        }

        let result = match self.op {
            SetOp::Union => store.union(&self.weighted_keys(), self.aggregate)?,
            SetOp::Inter => store.intersect(&self.weighted_keys(), self.aggregate)?,
            SetOp::Diff => store.difference(&self.keys),
        };

        Ok(Frame::entries(entries(&result), self.with_scores))
    }
}

fn entries(set: &SortedSet) -> Vec<(Bytes, f64)> {
    set.iter()
        .map(|(member, score)| (member.clone(), score))
        .collect()
}

fn command_name(op: SetOp, store: bool) -> &'static str {
    match (op, store) {
        (SetOp::Union, false) => "ZUNION",
        (SetOp::Union, true) => "ZUNIONSTORE",
        (SetOp::Inter, false) => "ZINTER",
        (SetOp::Inter, true) => "ZINTERSTORE",
        (SetOp::Diff, false) => "ZDIFF",
        (SetOp::Diff, true) => "ZDIFFSTORE",
    }
}
