use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::store::Store;
use crate::zset::range::ScoreRange;
use crate::zset::Order;
use crate::Error;

/// Removes all members with a score between `min` and `max`.
///
/// Ref: <https://redis.io/docs/latest/commands/zremrangebyscore/>
#[derive(Debug, PartialEq)]
pub struct ZRemRangeByScore {
    pub key: Bytes,
    pub range: ScoreRange,
}

impl Executable for ZRemRangeByScore {
    fn exec(self, store: Store) -> Result<Frame, Error> {
        let removed = store.remove_range_by_score(&self.key, &self.range);
        Ok(Frame::Integer(removed as i64))
    }
}

impl TryFrom<&mut CommandParser> for ZRemRangeByScore {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_bytes()?;
        let range = parser.next_score_range(Order::Ascending)?;

        Ok(Self { key, range })
    }
}
