use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::store::Store;
use crate::Error;

/// Lists the commands supported by the server. `COMMAND COUNT` returns how many there are; any
/// other form (`COMMAND`, `COMMAND DOCS`, ...) returns their names.
///
/// Ref: <https://redis.io/docs/latest/commands/command/>
#[derive(Debug, PartialEq)]
pub struct Command {
    pub count_only: bool,
}

impl Executable for Command {
    fn exec(self, _store: Store) -> Result<Frame, Error> {
        let names = super::Command::names();

        if self.count_only {
            return Ok(Frame::Integer(names.len() as i64));
        }

        let names = names
            .iter()
            .map(|name| Frame::Bulk(Bytes::from_static(name.as_bytes())))
            .collect();

        Ok(Frame::Array(names))
    }
}

impl TryFrom<&mut CommandParser> for Command {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let count_only = matches!(parser.next_option()?.as_deref(), Some("COUNT"));
        Ok(Self { count_only })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::Command as Cmd;

    #[test]
    fn lists_command_names() {
        let frame = Frame::Array(vec![Frame::Bulk(Bytes::from("COMMAND"))]);
        let cmd = Cmd::try_from(frame).unwrap();

        assert_eq!(cmd, Cmd::Command(Command { count_only: false }));

        let Frame::Array(names) = cmd.exec(Store::new()).unwrap() else {
            panic!("expected an array");
        };
        assert!(names.contains(&Frame::Bulk(Bytes::from("ZADD"))));
        assert!(names.contains(&Frame::Bulk(Bytes::from("ZREVRANGEBYSCORE"))));
        assert!(names.contains(&Frame::Bulk(Bytes::from("DBSIZE"))));
    }

    #[test]
    fn count() {
        let frame = Frame::Array(vec![
            Frame::Bulk(Bytes::from("COMMAND")),
            Frame::Bulk(Bytes::from("count")),
        ]);
        let cmd = Cmd::try_from(frame).unwrap();

        assert_eq!(
            cmd.exec(Store::new()).unwrap(),
            Frame::Integer(Cmd::names().len() as i64)
        );
    }
}
