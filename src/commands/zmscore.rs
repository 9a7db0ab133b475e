use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::store::Store;
use crate::Error;

/// Returns the scores of the given members, with nil for every member that does not exist.
///
/// Ref: <https://redis.io/docs/latest/commands/zmscore/>
#[derive(Debug, PartialEq)]
pub struct ZMScore {
    pub key: Bytes,
    pub members: Vec<Bytes>,
}

impl Executable for ZMScore {
    fn exec(self, store: Store) -> Result<Frame, Error> {
        let scores = store
            .scores(&self.key, &self.members)
            .into_iter()
            .map(|score| score.map_or(Frame::Null, Frame::score))
            .collect();

        Ok(Frame::Array(scores))
    }
}

impl TryFrom<&mut CommandParser> for ZMScore {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_bytes()?;
        let members = parser.remaining_bytes()?;

        Ok(Self { key, members })
    }
}
