//! Chat commands.
//!
//! | Command                      | Effect                                     |
//! |------------------------------|--------------------------------------------|
//! | `!<kind>`                    | spawn a troop for CT on the first lane     |
//! | `!<kind> <faction> [<lane>]` | spawn for `ct` or `t`, optionally on a lane |
//! | `!clear [<faction>]`         | remove every troop, or one faction's       |
//!
//! `<kind>` is any classification suffix (`door`, `vase`, ...). Command
//! words and factions are matched ignoring ASCII case.

use tracing::trace;

use crate::roster::Faction;
use crate::troop::Classification;

/// A parsed chat command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    Spawn {
        kind: Classification,
        faction: Option<Faction>,
        lane: Option<String>,
    },
    Clear {
        faction: Option<Faction>,
    },
}

/// Why a chat line is not a usable command.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    /// Not a command at all.
    #[error("unknown command '{text}'")]
    Unknown { text: String },

    /// A known command with arguments it cannot use.
    #[error("bad argument '{argument}' to !{command}: {reason}")]
    BadArgument {
        command: String,
        argument: String,
        reason: &'static str,
    },
}

impl ChatCommand {
    /// Parse one chat line.
    pub fn parse(text: &str) -> Result<Self, CommandError> {
        let unknown = || CommandError::Unknown {
            text: text.to_owned(),
        };
        let mut words = text.split_whitespace();
        let head = words
            .next()
            .and_then(|w| w.strip_prefix('!'))
            .ok_or_else(unknown)?;
        let args: Vec<&str> = words.collect();
        trace!(head, ?args, "parsing chat command");

        if head.eq_ignore_ascii_case("clear") {
            return match args.as_slice() {
                [] => Ok(ChatCommand::Clear { faction: None }),
                [faction] => Ok(ChatCommand::Clear {
                    faction: Some(parse_faction(head, faction)?),
                }),
                [_, extra, ..] => Err(too_many(head, extra)),
            };
        }

        let kind = Classification::from_suffix(head).ok_or_else(unknown)?;
        match args.as_slice() {
            [] => Ok(ChatCommand::Spawn {
                kind,
                faction: None,
                lane: None,
            }),
            [faction] => Ok(ChatCommand::Spawn {
                kind,
                faction: Some(parse_faction(head, faction)?),
                lane: None,
            }),
            [faction, lane] => Ok(ChatCommand::Spawn {
                kind,
                faction: Some(parse_faction(head, faction)?),
                lane: Some((*lane).to_owned()),
            }),
            [_, _, extra, ..] => Err(too_many(head, extra)),
        }
    }
}

fn parse_faction(command: &str, argument: &str) -> Result<Faction, CommandError> {
    Faction::parse(argument).ok_or_else(|| CommandError::BadArgument {
        command: command.to_owned(),
        argument: argument.to_owned(),
        reason: "faction must be 'ct' or 't'",
    })
}

fn too_many(command: &str, extra: &str) -> CommandError {
    CommandError::BadArgument {
        command: command.to_owned(),
        argument: extra.to_owned(),
        reason: "too many arguments",
    }
}
