use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::store::Store;
use crate::zset::range::LexRange;
use crate::zset::Order;
use crate::Error;

/// Returns the number of members between `min` and `max` in lexicographical order, assuming all
/// members share the same score. Bounds are `-`, `+`, `[value` or `(value`.
///
/// Ref: <https://redis.io/docs/latest/commands/zlexcount/>
#[derive(Debug, PartialEq)]
pub struct ZLexCount {
    pub key: Bytes,
    pub range: LexRange,
}

impl Executable for ZLexCount {
    fn exec(self, store: Store) -> Result<Frame, Error> {
        let count = store.count_by_lex(&self.key, &self.range);
        Ok(Frame::Integer(count as i64))
    }
}

impl TryFrom<&mut CommandParser> for ZLexCount {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_bytes()?;
        let range = parser.next_lex_range(Order::Ascending)?;

        Ok(Self { key, range })
    }
}

#[cfg(test)]
mod tests {
    use crate::commands::Command;
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
    fn counts() {
        let store = Store::new();
        for member in ["a", "b", "c", "d", "e"] {
            store.add(b"fan", Bytes::from(member), 0.0).unwrap();
        }

        let cmd = Command::try_from(frame(&["ZLEXCOUNT", "fan", "-", "+"])).unwrap();
        assert_eq!(cmd.exec(store.clone()).unwrap(), Frame::Integer(5));

        let cmd = Command::try_from(frame(&["ZLEXCOUNT", "fan", "(a", "[c"])).unwrap();
        assert_eq!(cmd.exec(store).unwrap(), Frame::Integer(2));
    }

    #[test]
    fn invalid_bound() {
        let err = Command::try_from(frame(&["ZLEXCOUNT", "fan", "a", "+"]))
            .err()
            .unwrap();

        assert!(matches!(
            err.downcast_ref::<ZSetError>(),
            Some(ZSetError::InvalidRange(_))
        ));
    }
}
