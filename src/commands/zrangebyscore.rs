use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::store::Store;
use crate::zset::range::{Limit, ScoreRange};
use crate::zset::Order;
use crate::Error;

/// Returns the members with a score between `min` and `max`. `ZREVRANGEBYSCORE` takes `max min`
/// and returns them from the highest score down.
///
/// Options:
/// * `WITHSCORES`: reply with each member followed by its score.
/// * `LIMIT offset count`: skip `offset` matches and return at most `count`; a negative `count`
///   returns everything after the offset.
///
/// Ref: <https://redis.io/docs/latest/commands/zrangebyscore/>
#[derive(Debug, PartialEq)]
pub struct ZRangeByScore {
    pub key: Bytes,
    pub range: ScoreRange,
    pub limit: Limit,
    pub order: Order,
    pub with_scores: bool,
}

impl ZRangeByScore {
    pub(super) fn parse(parser: &mut CommandParser, order: Order) -> Result<Self, Error> {
        let key = parser.next_bytes()?;
        let range = parser.next_score_range(order)?;

        let mut limit = Limit::default();
        let mut with_scores = false;

        while let Some(option) = parser.next_option()? {
            match option.as_str() {
                "WITHSCORES" => with_scores = true,
                "LIMIT" => limit = parser.next_limit()?,
                _ => {
                    return Err(CommandParserError::InvalidCommandArgument {
                        command: "ZRANGEBYSCORE".to_string(),
                        argument: option,
                    }
                    .into())
                }
            }
        }

        Ok(Self {
            key,
            range,
            limit,
            order,
            with_scores,
        })
    }
}

impl Executable for ZRangeByScore {
    fn exec(self, store: Store) -> Result<Frame, Error> {
        let entries = store.range_by_score(&self.key, &self.range, self.limit, self.order);
        Ok(Frame::entries(entries, self.with_scores))
    }
}

#[cfg(test)]
mod tests {
    use crate::commands::Command;
    use crate::zset::range::ScoreBound;

    use super::*;

    fn frame(parts: &[&'static str]) -> Frame {
        Frame::Array(
            parts
                .iter()
                .map(|part| Frame::Bulk(Bytes::from(*part)))
                .collect(),
        )
    }

    fn store() -> Store {
        let store = Store::new();
        for (member, score) in [("a", 1.0), ("b", 3.0), ("c", 2.0), ("d", -1.0)] {
            store.add(b"fan", Bytes::from(member), score).unwrap();
        }
        store
    }

    #[test]
    fn parse_reverse_with_options() {
        let cmd = Command::try_from(frame(&[
            "ZREVRANGEBYSCORE",
            "fan",
            "2",
            "(-1",
            "LIMIT",
            "1",
            "3",
            "WITHSCORES",
        ]))
        .unwrap();

        assert_eq!(
            cmd,
            Command::ZRevRangeByScore(ZRangeByScore {
                key: Bytes::from("fan"),
                range: ScoreRange::new(ScoreBound::Exclusive(-1.0), ScoreBound::Inclusive(2.0))
                    .unwrap(),
                limit: Limit {
                    offset: 1,
                    count: Some(3)
                },
                order: Order::Descending,
                with_scores: true,
            })
        );
    }

    #[test]
    fn incomplete_limit() {
        let err = Command::try_from(frame(&["ZRANGEBYSCORE", "fan", "0", "1", "LIMIT", "1"]))
            .err()
            .unwrap();
        let err = err.downcast_ref::<CommandParserError>().unwrap();

        assert_eq!(*err, CommandParserError::EndOfStream);
    }

    #[test]
    fn ranges() {
        let cmd = Command::try_from(frame(&["ZRANGEBYSCORE", "fan", "1", "2"])).unwrap();
        assert_eq!(cmd.exec(store()).unwrap(), frame(&["a", "c"]));

        let cmd = Command::try_from(frame(&[
            "ZRANGEBYSCORE",
            "fan",
            "1",
            "2",
            "WITHSCORES",
            "LIMIT",
            "1",
            "2",
        ]))
        .unwrap();
        assert_eq!(cmd.exec(store()).unwrap(), frame(&["c", "2"]));

        let cmd = Command::try_from(frame(&["ZREVRANGEBYSCORE", "fan", "2", "-1"])).unwrap();
        assert_eq!(cmd.exec(store()).unwrap(), frame(&["c", "a", "d"]));

        let cmd = Command::try_from(frame(&[
            "ZREVRANGEBYSCORE",
            "fan",
            "2",
            "-1",
            "LIMIT",
            "2",
            "3",
        ]))
        .unwrap();
        assert_eq!(cmd.exec(store()).unwrap(), frame(&["d"]));

        let cmd = Command::try_from(frame(&["ZRANGEBYSCORE", "fan", "-inf", "+inf"])).unwrap();
        assert_eq!(cmd.exec(store()).unwrap(), frame(&["d", "a", "c", "b"]));
    }
}
