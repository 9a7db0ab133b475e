use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::store::Store;
use crate::zset::Order;
use crate::Error;

/// Returns the 0-based rank of `member`, with scores ordered from low to high (`ZRANK`) or from
/// high to low (`ZREVRANK`). Nil if the member or the key does not exist.
///
/// Ref: <https://redis.io/docs/latest/commands/zrank/>
#[derive(Debug, PartialEq)]
pub struct ZRank {
    pub key: Bytes,
    pub member: Bytes,
    pub order: Order,
}

impl ZRank {
    pub(super) fn parse(parser: &mut CommandParser, order: Order) -> Result<Self, Error> {
        let key = parser.next_bytes()?;
        let member = parser.next_bytes()?;

        Ok(Self { key, member, order })
    }
}

impl Executable for ZRank {
    fn exec(self, store: Store) -> Result<Frame, Error> {
        let res = store
            .rank(&self.key, &self.member, self.order)
            .map_or(Frame::Null, |rank| Frame::Integer(rank as i64));

        Ok(res)
    }
}

#[cfg(test)]
mod tests {
    use crate::commands::Command;

    use super::*;

    fn store() -> Store {
        let store = Store::new();
        for (member, score) in [("a", 1.0), ("b", 3.0), ("c", 2.0), ("d", -1.0)] {
            store.add(b"fan", Bytes::from(member), score).unwrap();
        }
        store
    }

    #[test]
    fn rank_and_reverse_rank() {
        let frame = Frame::Array(vec![
            Frame::Bulk(Bytes::from("ZREVRANK")),
            Frame::Bulk(Bytes::from("fan")),
            Frame::Bulk(Bytes::from("b")),
        ]);
        let cmd = Command::try_from(frame).unwrap();

        assert_eq!(
            cmd,
            Command::ZRevRank(ZRank {
                key: Bytes::from("fan"),
                member: Bytes::from("b"),
                order: Order::Descending,
            })
        );
        assert_eq!(cmd.exec(store()).unwrap(), Frame::Integer(0));

        let cmd = ZRank {
            key: Bytes::from("fan"),
            member: Bytes::from("b"),
            order: Order::Ascending,
        };
        assert_eq!(cmd.exec(store()).unwrap(), Frame::Integer(3));
    }

    #[test]
    fn missing_member() {
        let cmd = ZRank {
            key: Bytes::from("fan"),
            member: Bytes::from("x"),
            order: Order::Ascending,
        };

        assert_eq!(cmd.exec(store()).unwrap(), Frame::Null);
    }
}
