use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::store::Store;
use crate::Error;

/// Removes the specified members from the sorted set stored at `key`. Non existing members are
/// ignored.
///
/// Ref: <https://redis.io/docs/latest/commands/zrem/>
#[derive(Debug, PartialEq)]
pub struct ZRem {
    pub key: Bytes,
    pub members: Vec<Bytes>,
}

impl Executable for ZRem {
    fn exec(self, store: Store) -> Result<Frame, Error> {
        let removed = store.remove(&self.key, &self.members);
        Ok(Frame::Integer(removed as i64))
    }
}

impl TryFrom<&mut CommandParser> for ZRem {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_bytes()?;
        let members = parser.remaining_bytes()?;

        Ok(Self { key, members })
    }
}
