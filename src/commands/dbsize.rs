use crate::commands::executable::Executable;
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::store::Store;
use crate::Error;

/// Returns the number of keys in the database.
///
/// Ref: <https://redis.io/docs/latest/commands/dbsize/>
#[derive(Debug, PartialEq)]
pub struct DBSize;

impl Executable for DBSize {
    fn exec(self, store: Store) -> Result<Frame, Error> {
        Ok(Frame::Integer(store.dbsize() as i64))
    }
}

impl TryFrom<&mut CommandParser> for DBSize {
    type Error = Error;

    fn try_from(_parser: &mut CommandParser) -> Result<Self, Self::Error> {
        Ok(Self)
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;
    use crate::commands::Command;

    #[test]
    fn counts_keys() {
        let store = Store::new();
        store.add(b"a", Bytes::from("m"), 1.0).unwrap();
        store.add(b"b", Bytes::from("m"), 1.0).unwrap();

        let frame = Frame::Array(vec![Frame::Bulk(Bytes::from("DBSIZE"))]);
        let cmd = Command::try_from(frame).unwrap();

        assert_eq!(cmd, Command::DBSize(DBSize));
        assert_eq!(cmd.exec(store).unwrap(), Frame::Integer(2));
    }
}
