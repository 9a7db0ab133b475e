use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::store::Store;
use crate::zset::range::ScoreRange;
use crate::zset::Order;
use crate::Error;

/// Returns the number of members with a score between `min` and `max`. Bounds are inclusive
/// unless prefixed with `(`; `-inf` and `+inf` are accepted.
///
/// Ref: <https://redis.io/docs/latest/commands/zcount/>
#[derive(Debug, PartialEq)]
pub struct ZCount {
    pub key: Bytes,
    pub range: ScoreRange,
}

impl Executable for ZCount {
    fn exec(self, store: Store) -> Result<Frame, Error> {
        let count = store.count_by_score(&self.key, &self.range);
        Ok(Frame::Integer(count as i64))
    }
}

impl TryFrom<&mut CommandParser> for ZCount {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_bytes()?;
        let range = parser.next_score_range(Order::Ascending)?;

        Ok(Self { key, range })
    }
}

#[cfg(test)]
mod tests {
    use crate::commands::Command;
    use crate::zset::range::ScoreBound;
    use crate::zset::ZSetError;

    use super::*;

    fn frame(parts: &[&'static str]) -> Frame {
        Frame::Array(
            parts
                .iter()
                .map(|part| Frame::Bulk(Bytes::from(*part)))
                .collect(),
        )
    }

    #[test]
    fn parse_bounds() {
        let cmd = Command::try_from(frame(&["ZCOUNT", "fan", "(1", "+inf"])).unwrap();

        assert_eq!(
            cmd,
            Command::ZCount(ZCount {
                key: Bytes::from("fan"),
                range: ScoreRange::new(
                    ScoreBound::Exclusive(1.0),
                    ScoreBound::Inclusive(f64::INFINITY)
                )
                .unwrap(),
            })
        );
    }

    #[test]
    fn min_greater_than_max() {
        let err = Command::try_from(frame(&["ZCOUNT", "fan", "2", "1"]))
            .err()
            .unwrap();

        assert_eq!(
            err.downcast_ref::<ZSetError>(),
            Some(&ZSetError::InvalidRange(
                "min is greater than max".to_string()
            ))
        );
    }

    #[test]
    fn counts() {
        let store = Store::new();
        for (member, score) in [("a", 1.0), ("b", 3.0), ("c", 2.0), ("d", -1.0)] {
            store.add(b"fan", Bytes::from(member), score).unwrap();
        }

        let cmd = Command::try_from(frame(&["ZCOUNT", "fan", "-1", "2"])).unwrap();
        assert_eq!(cmd.exec(store.clone()).unwrap(), Frame::Integer(3));

        let cmd = Command::try_from(frame(&["ZCOUNT", "missing", "-inf", "+inf"])).unwrap();
        assert_eq!(cmd.exec(store).unwrap(), Frame::Integer(0));
    }
}
