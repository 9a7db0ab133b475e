use bytes::Bytes;
use glob_match::glob_match;

use crate::commands::executable::Executable;
use crate::commands::{CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::store::Store;
use crate::Error;

const DEFAULT_COUNT: usize = 10;

/// Incrementally iterates the members of a sorted set. Start with cursor 0 and keep calling with
/// the returned cursor until it is 0 again. Each member present for the whole iteration is
/// returned exactly once.
///
/// Options:
/// * `MATCH pattern`: only return members matching the glob-style pattern. Filtering happens
///   after a batch is selected, so a call may return fewer members than `COUNT`, even none.
/// * `COUNT count`: how many members to examine per call, 10 by default.
///
/// Ref: <https://redis.io/docs/latest/commands/zscan/>
#[derive(Debug, PartialEq)]
pub struct ZScan {
    pub key: Bytes,
    pub cursor: u64,
    pub pattern: Option<String>,
    pub count: usize,
}

impl Executable for ZScan {
    fn exec(self, store: Store) -> Result<Frame, Error> {
        let page = store.scan(&self.key, self.cursor, self.count);

        let entries = match &self.pattern {
            Some(pattern) => page
                .entries
                .into_iter()
                .filter(|(member, _)| glob_match(pattern, &String::from_utf8_lossy(member)))
                .collect(),
            None => page.entries,
        };

        Ok(Frame::Array(vec![
            Frame::Bulk(Bytes::from(page.cursor.to_string())),
            Frame::entries(entries, true),
        ]))
    }
}

impl TryFrom<&mut CommandParser> for ZScan {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_bytes()?;

        let cursor = parser.next_string()?;
        let cursor = cursor
            .parse::<u64>()
            .map_err(|_| CommandParserError::InvalidCommandArgument {
                command: "ZSCAN".to_string(),
                argument: cursor,
            })?;

        let mut pattern = None;
        let mut count = DEFAULT_COUNT;

        while let Some(option) = parser.next_option()? {
            match option.as_str() {
                "MATCH" => pattern = Some(parser.next_string()?),
                "COUNT" => {
                    let value = parser.next_integer()?;
                    count = usize::try_from(value)
                        .ok()
                        .filter(|count| *count > 0)
                        .ok_or_else(|| CommandParserError::InvalidCommandArgument {
                            command: "ZSCAN".to_string(),
                            argument: value.to_string(),
                        })?;
                }
                _ => {
                    return Err(CommandParserError::InvalidCommandArgument {
                        command: "ZSCAN".to_string(),
                        argument: option,
                    }
                    .into())
                }
            }
        }

        Ok(Self {
            key,
            cursor,
            pattern,
            count,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use crate::commands::Command;

    use super::*;

    fn frame(parts: &[&'static str]) -> Frame {
        Frame::Array(
            parts
                .iter()
                .map(|part| Frame::Bulk(Bytes::from(*part)))
                .collect(),
        )
    }

    #[test]
    fn parse() {
        let cmd = Command::try_from(frame(&["ZSCAN", "fan", "0", "match", "a*", "COUNT", "5"]))
            .unwrap();

        assert_eq!(
            cmd,
            Command::ZScan(ZScan {
                key: Bytes::from("fan"),
                cursor: 0,
                pattern: Some("a*".to_string()),
                count: 5,
            })
        );

        assert!(Command::try_from(frame(&["ZSCAN", "fan", "-1"])).is_err());
        assert!(Command::try_from(frame(&["ZSCAN", "fan", "0", "COUNT", "0"])).is_err());
    }

    #[test]
    fn full_iteration() {
        let store = Store::new();
        for i in 0..30 {
            store
                .add(b"fan", Bytes::from(format!("m{i}")), i as f64)
                .unwrap();
        }

        let mut seen = HashSet::new();
        let mut cursor = 0;
        loop {
            let cmd = ZScan {
                key: Bytes::from("fan"),
                cursor,
                pattern: None,
                count: 4,
            };
            let Frame::Array(reply) = cmd.exec(store.clone()).unwrap() else {
                panic!("expected an array");
            };
            let [Frame::Bulk(next), Frame::Array(entries)] = &reply[..] else {
                panic!("unexpected reply {:?}", reply);
            };

            for pair in entries.chunks(2) {
                let Frame::Bulk(member) = &pair[0] else {
                    panic!("expected a member, got {:?}", pair[0]);
                };
                assert!(seen.insert(member.clone()));
            }

            cursor = std::str::from_utf8(next).unwrap().parse().unwrap();
            if cursor == 0 {
                break;
            }
        }

        assert_eq!(seen.len(), 30);
    }

    #[test]
    fn with_pattern() {
        let store = Store::new();
        store.add(b"fan", Bytes::from("apple"), 1.0).unwrap();
        store.add(b"fan", Bytes::from("banana"), 2.0).unwrap();

        let cmd = ZScan {
            key: Bytes::from("fan"),
            cursor: 0,
            pattern: Some("a*".to_string()),
            count: 10,
        };

        assert_eq!(
            cmd.exec(store).unwrap(),
            Frame::Array(vec![
                Frame::Bulk(Bytes::from("0")),
                Frame::Array(vec![
                    Frame::Bulk(Bytes::from("apple")),
                    Frame::Bulk(Bytes::from("1"))
                ]),
            ])
        );
    }
}
