use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::store::Store;
use crate::zset::Order;
use crate::Error;

/// Returns the members between ranks `start` and `stop`, both inclusive, ordered from the lowest
/// (`ZRANGE`) or the highest (`ZREVRANGE`) score. Negative ranks count from the end.
///
/// Ref: <https://redis.io/docs/latest/commands/zrange/>
#[derive(Debug, PartialEq)]
pub struct ZRange {
    pub key: Bytes,
    pub start: i64,
    pub stop: i64,
    pub order: Order,
    pub with_scores: bool,
}

impl ZRange {
    pub(super) fn parse(parser: &mut CommandParser, order: Order) -> Result<Self, Error> {
        let key = parser.next_bytes()?;
        let start = parser.next_integer()?;
        let stop = parser.next_integer()?;

        let mut with_scores = false;

        while let Some(option) = parser.next_option()? {
            match option.as_str() {
                "WITHSCORES" => with_scores = true,
                _ => {
                    return Err(CommandParserError::InvalidCommandArgument {
                        command: "ZRANGE".to_string(),
                        argument: option,
                    }
                    .into())
                }
            }
        }

        Ok(Self {
            key,
            start,
            stop,
            order,
            with_scores,
        })
    }
}

impl Executable for ZRange {
    fn exec(self, store: Store) -> Result<Frame, Error> {
        let entries = store.range_by_rank(&self.key, self.start, self.stop, self.order);
        Ok(Frame::entries(entries, self.with_scores))
    }
}
