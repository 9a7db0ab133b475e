use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{parse_float, CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::store::Store;
use crate::zset::{AddOptions, AddOutcome, Comparison, Condition};
use crate::Error;

/// Adds all the specified members with the specified scores to the sorted set stored at `key`.
/// If a member is already present its score is updated and the member moved to its new position.
///
/// Options, given before the first score:
/// * `NX`: only add new members.
/// * `XX`: only update members that already exist.
/// * `GT` / `LT`: only update existing members if the new score is greater / less.
/// * `CH`: count updated members in the reply, not only new ones.
///
/// Ref: <https://redis.io/docs/latest/commands/zadd/>
#[derive(Debug, PartialEq)]
pub struct ZAdd {
    pub key: Bytes,
    pub options: AddOptions,
    pub changed: bool,
    pub entries: Vec<(Bytes, f64)>,
}

impl Executable for ZAdd {
    fn exec(self, store: Store) -> Result<Frame, Error> {
        let scores: Vec<f64> = self.entries.iter().map(|(_, score)| *score).collect();
        let outcomes = store.add_all(&self.key, self.entries, self.options)?;

        let count = outcomes
            .iter()
            .zip(scores)
            .filter(|(outcome, score)| match outcome {
                AddOutcome::Created => true,
                AddOutcome::Updated { previous } => self.changed && previous != score,
                AddOutcome::Skipped => false,
            })
            .count();

        Ok(Frame::Integer(count as i64))
    }
}

impl TryFrom<&mut CommandParser> for ZAdd {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_bytes()?;

        let mut options = AddOptions::default();
        let mut changed = false;

        let first_score = loop {
            let token = parser.next_string()?;

            match token.to_uppercase().as_str() {
                "NX" if options.condition.is_none() && options.comparison.is_none() => {
                    options.condition = Some(Condition::OnlyNew);
                }
                "XX" if options.condition.is_none() => {
                    options.condition = Some(Condition::OnlyExisting);
                }
                "GT" if options.comparison.is_none()
                    && options.condition != Some(Condition::OnlyNew) =>
                {
                    options.comparison = Some(Comparison::Greater);
                }
                "LT" if options.comparison.is_none()
                    && options.condition != Some(Condition::OnlyNew) =>
                {
                    options.comparison = Some(Comparison::Less);
                }
                "CH" => changed = true,
                "NX" | "XX" | "GT" | "LT" => {
                    return Err(CommandParserError::InvalidCommandArgument {
                        command: "ZADD".to_string(),
                        argument: token,
                    }
                    .into());
                }
                _ => match parse_float(&token) {
                    Some(score) => break score,
                    None => {
                        return Err(CommandParserError::InvalidCommandArgument {
                            command: "ZADD".to_string(),
                            argument: token,
                        }
                        .into());
                    }
                },
            }
        };

        let mut entries = vec![(parser.next_bytes()?, first_score)];

        loop {
            match parser.next_float() {
                Ok(score) => entries.push((parser.next_bytes()?, score)),
                Err(CommandParserError::EndOfStream) => break,
                Err(err) => return Err(err.into()),
            }
        }

        Ok(Self {
            key,
            options,
            changed,
            entries,
        })
    }
}
