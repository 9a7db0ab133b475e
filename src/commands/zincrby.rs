use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::store::Store;
use crate::Error;

/// Increments the score of `member` by `increment`. A missing member is added with
/// `increment` as its score. Replies with the new score.
///
/// Ref: <https://redis.io/docs/latest/commands/zincrby/>
#[derive(Debug, PartialEq)]
pub struct ZIncrBy {
    pub key: Bytes,
    pub increment: f64,
    pub member: Bytes,
}

impl Executable for ZIncrBy {
    fn exec(self, store: Store) -> Result<Frame, Error> {
        let score = store.incr_by(&self.key, self.member, self.increment)?;
        Ok(Frame::score(score))
    }
}

impl TryFrom<&mut CommandParser> for ZIncrBy {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_bytes()?;
        let increment = parser.next_float()?;
        let member = parser.next_bytes()?;

        Ok(Self {
            key,
            increment,
            member,
        })
    }
}
