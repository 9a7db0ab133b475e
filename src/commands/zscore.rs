use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::store::Store;
use crate::Error;

/// Returns the score of `member`, or nil if the member or the key does not exist.
///
/// Ref: <https://redis.io/docs/latest/commands/zscore/>
#[derive(Debug, PartialEq)]
pub struct ZScore {
    pub key: Bytes,
    pub member: Bytes,
}

impl Executable for ZScore {
    fn exec(self, store: Store) -> Result<Frame, Error> {
        let res = store
            .score(&self.key, &self.member)
            .map_or(Frame::Null, Frame::score);

        Ok(res)
    }
}

impl TryFrom<&mut CommandParser> for ZScore {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_bytes()?;
        let member = parser.next_bytes()?;

        Ok(Self { key, member })
    }
}

#[cfg(test)]
mod tests {
    use crate::commands::Command;

    use super::*;

    #[test]
    fn existing_and_missing() {
        let store = Store::new();
        store.add(b"fan", Bytes::from("b"), 3.0).unwrap();

        let frame = Frame::Array(vec![
            Frame::Bulk(Bytes::from("ZSCORE")),
            Frame::Bulk(Bytes::from("fan")),
            Frame::Bulk(Bytes::from("b")),
        ]);
        let cmd = Command::try_from(frame).unwrap();
        assert_eq!(
            cmd,
            Command::ZScore(ZScore {
                key: Bytes::from("fan"),
                member: Bytes::from("b"),
            })
        );
        assert_eq!(cmd.exec(store.clone()).unwrap(), Frame::Bulk(Bytes::from("3")));

        let cmd = ZScore {
            key: Bytes::from("fan"),
            member: Bytes::from("x"),
        };
        assert_eq!(cmd.exec(store).unwrap(), Frame::Null);
    }
}
