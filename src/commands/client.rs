use crate::commands::executable::Executable;
use crate::commands::{CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::store::Store;
use crate::Error;

/// Connection management. Client libraries send `CLIENT SETNAME` / `CLIENT SETINFO` right after
/// connecting; every subcommand is acknowledged and otherwise ignored.
///
/// Ref: <https://redis.io/docs/latest/commands/client/>
#[derive(Debug, PartialEq)]
pub struct Client {
    pub subcommand: String,
}

impl Executable for Client {
    fn exec(self, _store: Store) -> Result<Frame, Error> {
        Ok(Frame::Simple("OK".to_string()))
    }
}

impl TryFrom<&mut CommandParser> for Client {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let subcommand = parser.next_string()?.to_uppercase();

        // Arguments of the subcommand are not interpreted.
        loop {
            match parser.next_bytes() {
                Ok(_) => continue,
                Err(CommandParserError::EndOfStream) => break,
                Err(err) => return Err(err.into()),
            }
        }

        Ok(Self { subcommand })
    }
}
