use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::store::Store;
use crate::Error;

/// Returns the number of members of the sorted set stored at `key`, 0 if it does not exist.
///
/// Ref: <https://redis.io/docs/latest/commands/zcard/>
#[derive(Debug, PartialEq)]
pub struct ZCard {
    pub key: Bytes,
}

impl Executable for ZCard {
    fn exec(self, store: Store) -> Result<Frame, Error> {
        Ok(Frame::Integer(store.len(&self.key) as i64))
    }
}

impl TryFrom<&mut CommandParser> for ZCard {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_bytes()?;
        Ok(Self { key })
    }
}
