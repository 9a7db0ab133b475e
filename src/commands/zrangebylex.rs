use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::store::Store;
use crate::zset::range::{LexRange, Limit};
use crate::zset::Order;
use crate::Error;

/// Returns the members between `min` and `max` in lexicographical order, assuming all members
/// share the same score. `ZREVRANGEBYLEX` takes `max min` and walks backwards. Supports
/// `LIMIT offset count`.
///
/// Ref: <https://redis.io/docs/latest/commands/zrangebylex/>
#[derive(Debug, PartialEq)]
pub struct ZRangeByLex {
    pub key: Bytes,
    pub range: LexRange,
    pub limit: Limit,
    pub order: Order,
}

impl ZRangeByLex {
    pub(super) fn parse(parser: &mut CommandParser, order: Order) -> Result<Self, Error> {
        let key = parser.next_bytes()?;
        let range = parser.next_lex_range(order)?;

        let mut limit = Limit::default();

        while let Some(option) = parser.next_option()? {
            match option.as_str() {
                "LIMIT" => limit = parser.next_limit()?,
                _ => {
                    return Err(CommandParserError::InvalidCommandArgument {
                        command: "ZRANGEBYLEX".to_string(),
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
        })
    }
}

impl Executable for ZRangeByLex {
    fn exec(self, store: Store) -> Result<Frame, Error> {
        let entries = store.range_by_lex(&self.key, &self.range, self.limit, self.order);
        Ok(Frame::entries(entries, false))
    }
}
