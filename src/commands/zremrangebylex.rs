use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::store::Store;
use crate::zset::range::LexRange;
use crate::zset::Order;
use crate::Error;

/// Removes all members between `min` and `max` in lexicographical order, assuming all members
/// share the same score.
///
/// Ref: <https://redis.io/docs/latest/commands/zremrangebylex/>
#[derive(Debug, PartialEq)]
pub struct ZRemRangeByLex {
    pub key: Bytes,
    pub range: LexRange,
}

impl Executable for ZRemRangeByLex {
    fn exec(self, store: Store) -> Result<Frame, Error> {
        let removed = store.remove_range_by_lex(&self.key, &self.range);
        Ok(Frame::Integer(removed as i64))
    }
}

impl TryFrom<&mut CommandParser> for ZRemRangeByLex {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_bytes()?;
        let range = parser.next_lex_range(Order::Ascending)?;

        Ok(Self { key, range })
    }
}
