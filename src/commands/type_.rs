use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::store::Store;
use crate::Error;

/// Returns the string representation of the type of the value stored at `key`.
///
/// Every key holds a sorted set, so the answer is either `zset` or, if the key does not exist,
/// `none`.
///
/// Ref: <https://redis.io/docs/latest/commands/type/>
#[derive(Debug, PartialEq)]
pub struct Type {
    pub key: Bytes,
}

impl Executable for Type {
    fn exec(self, store: Store) -> Result<Frame, Error> {
        let type_ = if store.exists(&self.key) { "zset" } else { "none" };

        Ok(Frame::Simple(type_.to_string()))
    }
}

impl TryFrom<&mut CommandParser> for Type {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_bytes()?;
        Ok(Self { key })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::Command;

    #[test]
    fn existing_key() {
        let store = Store::new();

        let frame = Frame::Array(vec![
            Frame::Bulk(Bytes::from("TYPE")),
            Frame::Bulk(Bytes::from("key1")),
        ]);
        let cmd = Command::try_from(frame).unwrap();

        assert_eq!(
            cmd,
            Command::Type(Type {
                key: Bytes::from("key1"),
            })
        );

        store.add(b"key1", Bytes::from("a"), 1.0).unwrap();

        let result = cmd.exec(store.clone()).unwrap();

        assert_eq!(result, Frame::Simple("zset".to_string()));
    }

    #[test]
    fn missing_key() {
        let store = Store::new();

        let cmd = Type {
            key: Bytes::from("key1"),
        };

        let result = cmd.exec(store.clone()).unwrap();

        assert_eq!(result, Frame::Simple("none".to_string()));
    }
}
