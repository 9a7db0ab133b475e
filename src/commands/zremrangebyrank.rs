use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::store::Store;
use crate::Error;

/// Removes all members with a rank between `start` and `stop`, both inclusive. Negative ranks
/// count from the highest score.
///
/// Ref: <https://redis.io/docs/latest/commands/zremrangebyrank/>
#[derive(Debug, PartialEq)]
pub struct ZRemRangeByRank {
    pub key: Bytes,
    pub start: i64,
    pub stop: i64,
}

impl Executable for ZRemRangeByRank {
    fn exec(self, store: Store) -> Result<Frame, Error> {
        let removed = store.remove_range_by_rank(&self.key, self.start, self.stop);
        Ok(Frame::Integer(removed as i64))
    }
}

impl TryFrom<&mut CommandParser> for ZRemRangeByRank {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_bytes()?;
        let start = parser.next_integer()?;
        let stop = parser.next_integer()?;

        Ok(Self { key, start, stop })
    }
}
