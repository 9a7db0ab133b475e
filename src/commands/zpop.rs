use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::store::Store;
use crate::zset::Order;
use crate::Error;

/// Removes and returns up to `count` members with the lowest (`ZPOPMIN`) or highest (`ZPOPMAX`)
/// scores, each followed by its score. `count` defaults to 1.
///
/// Ref: <https://redis.io/docs/latest/commands/zpopmin/>
#[derive(Debug, PartialEq)]
pub struct ZPop {
    pub key: Bytes,
    pub order: Order,
    pub count: usize,
}

impl ZPop {
    pub(super) fn parse(parser: &mut CommandParser, order: Order) -> Result<Self, Error> {
        let key = parser.next_bytes()?;

        let count = match parser.next_integer() {
            Ok(count) => usize::try_from(count).map_err(|_| {
                CommandParserError::InvalidCommandArgument {
                    command: "ZPOP".to_string(),
                    argument: count.to_string(),
                }
            })?,
            Err(CommandParserError::EndOfStream) => 1,
            Err(err) => return Err(err.into()),
        };

        Ok(Self { key, order, count })
    }
}

impl Executable for ZPop {
    fn exec(self, store: Store) -> Result<Frame, Error> {
        let popped = store.pop(&self.key, self.order, self.count);
        Ok(Frame::entries(popped, true))
    }
}

#[cfg(test)]
mod tests {
    use crate::commands::Command;

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
    fn parse() {
        let cmd = Command::try_from(frame(&["ZPOPMAX", "fan"])).unwrap();
        assert_eq!(
            cmd,
            Command::ZPopMax(ZPop {
                key: Bytes::from("fan"),
                order: Order::Descending,
                count: 1,
            })
        );

        let cmd = Command::try_from(frame(&["ZPOPMIN", "fan", "3"])).unwrap();
        assert_eq!(
            cmd,
            Command::ZPopMin(ZPop {
                key: Bytes::from("fan"),
                order: Order::Ascending,
                count: 3,
            })
        );

        assert!(Command::try_from(frame(&["ZPOPMIN", "fan", "-1"])).is_err());
    }

    #[test]
    fn pops() {
        let store = Store::new();
        for (member, score) in [("a", 1.0), ("b", 3.0), ("c", 2.0)] {
            store.add(b"fan", Bytes::from(member), score).unwrap();
        }

        let cmd = Command::try_from(frame(&["ZPOPMIN", "fan"])).unwrap();
        assert_eq!(cmd.exec(store.clone()).unwrap(), frame(&["a", "1"]));

        let cmd = Command::try_from(frame(&["ZPOPMAX", "fan", "5"])).unwrap();
        assert_eq!(cmd.exec(store.clone()).unwrap(), frame(&["b", "3", "c", "2"]));

        assert!(!store.exists(b"fan"));
    }
}
