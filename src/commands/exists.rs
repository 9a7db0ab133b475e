use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::store::Store;
use crate::Error;

/// Returns how many of the given keys exist. A key mentioned twice is counted twice.
///
/// Ref: <https://redis.io/docs/latest/commands/exists/>
#[derive(Debug, PartialEq)]
pub struct Exists {
    pub keys: Vec<Bytes>,
}

impl Executable for Exists {
    fn exec(self, store: Store) -> Result<Frame, Error> {
        let count = self.keys.iter().filter(|key| store.exists(key)).count();
        Ok(Frame::Integer(count as i64))
    }
}

impl TryFrom<&mut CommandParser> for Exists {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let keys = parser.remaining_bytes()?;
        Ok(Self { keys })
    }
}

#[cfg(test)]
mod tests {
    use crate::commands::Command;

    use super::*;

    #[test]
    fn counts_existing_keys() {
        let store = Store::new();
        store.add(b"foo", Bytes::from("a"), 1.0).unwrap();

        let frame = Frame::Array(vec![
            Frame::Bulk(Bytes::from("EXISTS")),
            Frame::Bulk(Bytes::from("foo")),
            Frame::Bulk(Bytes::from("bar")),
            Frame::Bulk(Bytes::from("foo")),
        ]);
        let cmd = Command::try_from(frame).unwrap();
        assert_eq!(
            cmd,
            Command::Exists(Exists {
                keys: vec![Bytes::from("foo"), Bytes::from("bar"), Bytes::from("foo")]
            })
        );

        assert_eq!(cmd.exec(store).unwrap(), Frame::Integer(2));
    }
}
