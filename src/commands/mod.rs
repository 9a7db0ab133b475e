pub mod client;
pub mod command;
pub mod dbsize;
pub mod del;
pub mod executable;
pub mod exists;
pub mod keys;
pub mod ping;
pub mod type_;
pub mod zadd;
pub mod zcard;
pub mod zcount;
pub mod zincrby;
pub mod zlexcount;
pub mod zmscore;
pub mod zpop;
pub mod zrange;
pub mod zrangebylex;
pub mod zrangebyscore;
pub mod zrank;
pub mod zrem;
pub mod zremrangebylex;
pub mod zremrangebyrank;
pub mod zremrangebyscore;
pub mod zscan;
pub mod zscore;
pub mod zsetop;

use bytes::Bytes;
use enum_variants::CommandNames;
use std::{str, vec};
use thiserror::Error as ThisError;

use crate::commands::executable::Executable;
use crate::frame::Frame;
use crate::store::Store;
use crate::zset::range::{LexBound, LexRange, Limit, ScoreBound, ScoreRange};
use crate::zset::Order;
use crate::Error;

use client::Client;
use command::Command as Command_;
use dbsize::DBSize;
use del::Del;
use exists::Exists;
use keys::Keys;
use ping::Ping;
use type_::Type;
use zadd::ZAdd;
use zcard::ZCard;
use zcount::ZCount;
use zincrby::ZIncrBy;
use zlexcount::ZLexCount;
use zmscore::ZMScore;
use zpop::ZPop;
use zrange::ZRange;
use zrangebylex::ZRangeByLex;
use zrangebyscore::ZRangeByScore;
use zrank::ZRank;
use zrem::ZRem;
use zremrangebylex::ZRemRangeByLex;
use zremrangebyrank::ZRemRangeByRank;
use zremrangebyscore::ZRemRangeByScore;
use zscan::ZScan;
use zscore::ZScore;
use zsetop::{SetOp, ZSetOp};

/// Every command the server understands. Commands that only differ in direction or output
/// (`ZRANGE` and `ZREVRANGE`, `ZUNION` and `ZUNIONSTORE`, ...) get their own variant around a
/// shared implementation, so that `COMMAND` can list each name.
#[derive(Debug, PartialEq, CommandNames)]
pub enum Command {
    ZAdd(ZAdd),
    ZCard(ZCard),
    ZCount(ZCount),
    ZDiff(ZSetOp),
    ZDiffStore(ZSetOp),
    ZIncrBy(ZIncrBy),
    ZInter(ZSetOp),
    ZInterStore(ZSetOp),
    ZLexCount(ZLexCount),
    ZMScore(ZMScore),
    ZPopMax(ZPop),
    ZPopMin(ZPop),
    ZRange(ZRange),
    ZRangeByLex(ZRangeByLex),
    ZRangeByScore(ZRangeByScore),
    ZRank(ZRank),
    ZRem(ZRem),
    ZRemRangeByLex(ZRemRangeByLex),
    ZRemRangeByRank(ZRemRangeByRank),
    ZRemRangeByScore(ZRemRangeByScore),
    ZRevRange(ZRange),
    ZRevRangeByLex(ZRangeByLex),
    ZRevRangeByScore(ZRangeByScore),
    ZRevRank(ZRank),
    ZScan(ZScan),
    ZScore(ZScore),
    ZUnion(ZSetOp),
    ZUnionStore(ZSetOp),

    DBSize(DBSize),
    Del(Del),
    Exists(Exists),
    Keys(Keys),
    Type(Type),

    Client(Client),
    Command(Command_),
    Ping(Ping),
}

impl Executable for Command {
    fn exec(self, store: Store) -> Result<Frame, Error> {
        match self {
            Command::ZAdd(cmd) => cmd.exec(store),
            Command::ZCard(cmd) => cmd.exec(store),
            Command::ZCount(cmd) => cmd.exec(store),
            Command::ZIncrBy(cmd) => cmd.exec(store),
            Command::ZLexCount(cmd) => cmd.exec(store),
            Command::ZMScore(cmd) => cmd.exec(store),
            Command::ZPopMax(cmd) | Command::ZPopMin(cmd) => cmd.exec(store),
            Command::ZRange(cmd) | Command::ZRevRange(cmd) => cmd.exec(store),
            Command::ZRangeByLex(cmd) | Command::ZRevRangeByLex(cmd) => cmd.exec(store),
            Command::ZRangeByScore(cmd) | Command::ZRevRangeByScore(cmd) => cmd.exec(store),
            Command::ZRank(cmd) | Command::ZRevRank(cmd) => cmd.exec(store),
            Command::ZRem(cmd) => cmd.exec(store),
            Command::ZRemRangeByLex(cmd) => cmd.exec(store),
            Command::ZRemRangeByRank(cmd) => cmd.exec(store),
            Command::ZRemRangeByScore(cmd) => cmd.exec(store),
            Command::ZScan(cmd) => cmd.exec(store),
            Command::ZScore(cmd) => cmd.exec(store),
            Command::ZDiff(cmd)
            | Command::ZDiffStore(cmd)
            | Command::ZInter(cmd)
            | Command::ZInterStore(cmd)
            | Command::ZUnion(cmd)
            | Command::ZUnionStore(cmd) => cmd.exec(store),

            Command::DBSize(cmd) => cmd.exec(store),
            Command::Del(cmd) => cmd.exec(store),
            Command::Exists(cmd) => cmd.exec(store),
            Command::Keys(cmd) => cmd.exec(store),
            Command::Type(cmd) => cmd.exec(store),

            Command::Client(cmd) => cmd.exec(store),
            Command::Command(cmd) => cmd.exec(store),
            Command::Ping(cmd) => cmd.exec(store),
        }
    }
}

impl TryFrom<Frame> for Command {
    type Error = Error;

    fn try_from(frame: Frame) -> Result<Self, Self::Error> {
        // Clients send commands to the Redis server as RESP arrays.
        let frames = match frame {
            Frame::Array(array) => array,
            frame => {
                return Err(CommandParserError::InvalidFrame {
                    expected: "array".to_string(),
                    actual: frame,
                }
                .into())
            }
        };

        let parser = &mut CommandParser {
            parts: frames.into_iter(),
        };

        let command_name = parser.parse_command_name()?;

        match &command_name[..] {
            "zadd" => ZAdd::try_from(parser).map(Command::ZAdd),
            "zcard" => ZCard::try_from(parser).map(Command::ZCard),
            "zcount" => ZCount::try_from(parser).map(Command::ZCount),
            "zdiff" => ZSetOp::parse(parser, SetOp::Diff, false).map(Command::ZDiff),
            "zdiffstore" => ZSetOp::parse(parser, SetOp::Diff, true).map(Command::ZDiffStore),
            "zincrby" => ZIncrBy::try_from(parser).map(Command::ZIncrBy),
            "zinter" => ZSetOp::parse(parser, SetOp::Inter, false).map(Command::ZInter),
            "zinterstore" => ZSetOp::parse(parser, SetOp::Inter, true).map(Command::ZInterStore),
            "zlexcount" => ZLexCount::try_from(parser).map(Command::ZLexCount),
            "zmscore" => ZMScore::try_from(parser).map(Command::ZMScore),
            "zpopmax" => ZPop::parse(parser, Order::Descending).map(Command::ZPopMax),
            "zpopmin" => ZPop::parse(parser, Order::Ascending).map(Command::ZPopMin),
            "zrange" => ZRange::parse(parser, Order::Ascending).map(Command::ZRange),
            "zrangebylex" => {
                ZRangeByLex::parse(parser, Order::Ascending).map(Command::ZRangeByLex)
            }
            "zrangebyscore" => {
                ZRangeByScore::parse(parser, Order::Ascending).map(Command::ZRangeByScore)
            }
            "zrank" => ZRank::parse(parser, Order::Ascending).map(Command::ZRank),
            "zrem" => ZRem::try_from(parser).map(Command::ZRem),
            "zremrangebylex" => ZRemRangeByLex::try_from(parser).map(Command::ZRemRangeByLex),
            "zremrangebyrank" => ZRemRangeByRank::try_from(parser).map(Command::ZRemRangeByRank),
            "zremrangebyscore" => {
                ZRemRangeByScore::try_from(parser).map(Command::ZRemRangeByScore)
            }
            "zrevrange" => ZRange::parse(parser, Order::Descending).map(Command::ZRevRange),
            "zrevrangebylex" => {
                ZRangeByLex::parse(parser, Order::Descending).map(Command::ZRevRangeByLex)
            }
            "zrevrangebyscore" => {
                ZRangeByScore::parse(parser, Order::Descending).map(Command::ZRevRangeByScore)
            }
            "zrevrank" => ZRank::parse(parser, Order::Descending).map(Command::ZRevRank),
            "zscan" => ZScan::try_from(parser).map(Command::ZScan),
            "zscore" => ZScore::try_from(parser).map(Command::ZScore),
            "zunion" => ZSetOp::parse(parser, SetOp::Union, false).map(Command::ZUnion),
            "zunionstore" => ZSetOp::parse(parser, SetOp::Union, true).map(Command::ZUnionStore),

            "dbsize" => DBSize::try_from(parser).map(Command::DBSize),
            "del" => Del::try_from(parser).map(Command::Del),
            "exists" => Exists::try_from(parser).map(Command::Exists),
            "keys" => Keys::try_from(parser).map(Command::Keys),
            "type" => Type::try_from(parser).map(Command::Type),

            "client" => Client::try_from(parser).map(Command::Client),
            "command" => Command_::try_from(parser).map(Command::Command),
            "ping" => Ping::try_from(parser).map(Command::Ping),
            _ => Err(CommandParserError::UnknownCommand {
                command: command_name,
            }
            .into()),
        }
    }
}

struct CommandParser {
    parts: vec::IntoIter<Frame>,
}

impl CommandParser {
    fn parse_command_name(&mut self) -> Result<String, CommandParserError> {
        let command_name = self
            .parts
            .next()
            .ok_or_else(|| CommandParserError::EndOfStream)?;

        match command_name {
            Frame::Simple(s) => Ok(s.to_lowercase()),
            Frame::Bulk(bytes) => str::from_utf8(&bytes[..])
                .map(|s| s.to_lowercase())
                .map_err(CommandParserError::InvalidUTF8String),
            frame => Err(CommandParserError::InvalidFrame {
                expected: "simple string".to_string(),
                actual: frame,
            }),
        }
    }

    fn next_string(&mut self) -> Result<String, CommandParserError> {
        let frame = self
            .parts
            .next()
            .ok_or_else(|| CommandParserError::EndOfStream)?;

        match frame {
            // Both `Simple` and `Bulk` representation may be strings. Strings are parsed to UTF-8.
            // While errors are stored as strings, they are considered separate types.
            Frame::Simple(s) => Ok(s),
            Frame::Bulk(bytes) => str::from_utf8(&bytes[..])
                .map(|s| s.to_string())
                .map_err(CommandParserError::InvalidUTF8String),
            frame => Err(CommandParserError::InvalidFrame {
                expected: "simple or bulk string".to_string(),
                actual: frame,
            }),
        }
    }

    fn next_integer(&mut self) -> Result<i64, CommandParserError> {
        let frame = self
            .parts
            .next()
            .ok_or_else(|| CommandParserError::EndOfStream)?;

        match frame {
            Frame::Integer(i) => Ok(i),
            Frame::Simple(string) => {
                string
                    .parse::<i64>()
                    .map_err(|_| CommandParserError::InvalidFrame {
                        expected: "parseable i64 frame".to_string(),
                        actual: Frame::Simple(string),
                    })
            }
            Frame::Bulk(bytes) => str::from_utf8(&bytes[..])
                .map_err(CommandParserError::InvalidUTF8String)?
                .parse::<i64>()
                .map_err(|_| CommandParserError::InvalidFrame {
                    expected: "parseable i64 frame".to_string(),
                    actual: Frame::Bulk(bytes),
                }),
            frame => Err(CommandParserError::InvalidFrame {
                expected: "integer".to_string(),
                actual: frame,
            }),
        }
    }

    /// Parses a float argument. `inf`, `+inf` and `-inf` are accepted; whether an infinite value
    /// is allowed is up to the command.
    fn next_float(&mut self) -> Result<f64, CommandParserError> {
        let frame = self
            .parts
            .next()
            .ok_or_else(|| CommandParserError::EndOfStream)?;

        match frame {
            Frame::Integer(i) => Ok(i as f64),
            Frame::Simple(string) => parse_float(&string).ok_or(CommandParserError::InvalidFrame {
                expected: "parseable f64 frame".to_string(),
                actual: Frame::Simple(string),
            }),
            Frame::Bulk(bytes) => {
                let string = str::from_utf8(&bytes[..]).map_err(CommandParserError::InvalidUTF8String)?;
                parse_float(string).ok_or_else(|| CommandParserError::InvalidFrame {
                    expected: "parseable f64 frame".to_string(),
                    actual: Frame::Bulk(bytes.clone()),
                })
            }
            frame => Err(CommandParserError::InvalidFrame {
                expected: "float".to_string(),
                actual: frame,
            }),
        }
    }

    fn next_bytes(&mut self) -> Result<Bytes, CommandParserError> {
        let frame = self
            .parts
            .next()
            .ok_or_else(|| CommandParserError::EndOfStream)?;

        match frame {
            // Both `Simple` and `Bulk` representation may be strings. Strings are parsed to UTF-8.
            // While errors are stored as strings, they are considered separate types.
            Frame::Simple(s) => Ok(Bytes::from(s)),
            Frame::Bulk(bytes) => Ok(bytes),
            frame => Err(CommandParserError::InvalidFrame {
                expected: "simple or bulk string".to_string(),
                actual: frame,
            }),
        }
    }

    /// Reads the next option keyword, upper-cased, or `None` once the arguments are exhausted.
    fn next_option(&mut self) -> Result<Option<String>, CommandParserError> {
        match self.next_string() {
            Ok(option) => Ok(Some(option.to_uppercase())),
            Err(CommandParserError::EndOfStream) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Reads `min max` as a score range. Reversed commands take `max min`.
    fn next_score_range(&mut self, order: Order) -> Result<ScoreRange, Error> {
        let first = self.next_string()?.parse::<ScoreBound>()?;
        let second = self.next_string()?.parse::<ScoreBound>()?;

        let range = match order {
            Order::Ascending => ScoreRange::new(first, second)?,
            Order::Descending => ScoreRange::new(second, first)?,
        };

        Ok(range)
    }

    /// Reads `min max` as a lexicographic range. Reversed commands take `max min`.
    fn next_lex_range(&mut self, order: Order) -> Result<LexRange, Error> {
        let first = self.next_bytes()?;
        let second = self.next_bytes()?;

        let (min, max) = match order {
            Order::Ascending => (first, second),
            Order::Descending => (second, first),
        };

        Ok(LexRange::new(
            LexBound::parse_min(&min)?,
            LexBound::parse_max(&max)?,
        )?)
    }

    /// Reads the `offset count` pair following a `LIMIT` keyword.
    fn next_limit(&mut self) -> Result<Limit, CommandParserError> {
        let offset = self.next_integer()?;
        let count = self.next_integer()?;

        Ok(Limit::new(offset, count))
    }

    /// Collects the remaining arguments, requiring at least one.
    fn remaining_bytes(&mut self) -> Result<Vec<Bytes>, CommandParserError> {
        let mut values = vec![];

        loop {
            match self.next_bytes() {
                Ok(value) => values.push(value),
                Err(CommandParserError::EndOfStream) if !values.is_empty() => {
                    break;
                }
                Err(err) => return Err(err),
            }
        }

        Ok(values)
    }
}

// Rust accepts "nan" and "infinity", the protocol does not.
fn parse_float(s: &str) -> Option<f64> {
    match s.to_ascii_lowercase().as_str() {
        "inf" | "+inf" => Some(f64::INFINITY),
        "-inf" => Some(f64::NEG_INFINITY),
        s if s.contains("nan") || s.contains("inf") => None,
        s => s.parse::<f64>().ok(),
    }
}

#[derive(Debug, ThisError, PartialEq)]
pub(crate) enum CommandParserError {
    #[error("protocol error; invalid frame, expected {expected}, got {actual}")]
    InvalidFrame { expected: String, actual: Frame },
    #[error("protocol error; unknown command {command}")]
    UnknownCommand { command: String },
    #[error("protocol error; invalid command argument {command} {argument}")]
    InvalidCommandArgument { command: String, argument: String },
    #[error("protocol error; invalid UTF-8 string")]
    InvalidUTF8String(#[from] str::Utf8Error),
    #[error("protocol error; attempting to extract a value failed due to the frame being fully consumed")]
    EndOfStream,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser(parts: &[&'static str]) -> CommandParser {
        let frames: Vec<Frame> = parts
            .iter()
            .map(|part| Frame::Bulk(Bytes::from(*part)))
            .collect();

        CommandParser {
            parts: frames.into_iter(),
        }
    }

    #[test]
    fn command_names_are_case_insensitive() {
        let frame = Frame::Array(vec![
            Frame::Simple(String::from("zCaRd")),
            Frame::Simple(String::from("fan")),
        ]);

        let cmd = Command::try_from(frame).unwrap();

        assert_eq!(
            cmd,
            Command::ZCard(ZCard {
                key: Bytes::from("fan")
            })
        );
    }

    #[test]
    fn not_an_array() {
        let frame = Frame::Simple(String::from("ZCARD"));
        let err = Command::try_from(frame).err().unwrap();
        let err = err.downcast_ref::<CommandParserError>().unwrap();

        assert_eq!(
            *err,
            CommandParserError::InvalidFrame {
                expected: "array".to_string(),
                actual: Frame::Simple(String::from("ZCARD"))
            }
        );
    }

    #[test]
    fn unknown_command() {
        let frame = Frame::Array(vec![Frame::Bulk(Bytes::from("GET"))]);
        let err = Command::try_from(frame).err().unwrap();
        let err = err.downcast_ref::<CommandParserError>().unwrap();

        assert_eq!(
            *err,
            CommandParserError::UnknownCommand {
                command: "get".to_string()
            }
        );
    }

    #[test]
    fn next_float() {
        let mut parser = parser(&["1.5", "-3", "+inf", "-inf", "nan", "abc", "1e3"]);

        assert_eq!(parser.next_float(), Ok(1.5));
        assert_eq!(parser.next_float(), Ok(-3.0));
        assert_eq!(parser.next_float(), Ok(f64::INFINITY));
        assert_eq!(parser.next_float(), Ok(f64::NEG_INFINITY));
        assert!(parser.next_float().is_err());
        assert!(parser.next_float().is_err());
        assert_eq!(parser.next_float(), Ok(1000.0));
        assert_eq!(parser.next_float(), Err(CommandParserError::EndOfStream));
    }

    #[test]
    fn next_option() {
        let mut parser = parser(&["withscores"]);

        assert_eq!(parser.next_option(), Ok(Some("WITHSCORES".to_string())));
        assert_eq!(parser.next_option(), Ok(None));
    }

    #[test]
    fn remaining_bytes() {
        let mut parser = self::parser(&["a", "b"]);
        assert_eq!(
            parser.remaining_bytes(),
            Ok(vec![Bytes::from("a"), Bytes::from("b")])
        );

        let mut parser = self::parser(&[]);
        assert_eq!(
            parser.remaining_bytes(),
            Err(CommandParserError::EndOfStream)
        );
    }
}
