//! User commands accepted by the world, and their text form.

use std::str::FromStr;

use lifepool_core::Entity;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A command from the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "kebab-case")]
pub enum ShellCommand {
    /// Remove every agent and energy point and reset the counters
    Clear,
    SpawnSchool,
    SpawnPredator,
    SpawnRandom { count: usize },
    /// Remove the topmost agent under a point, scattering its energy
    Click { x: f32, y: f32 },
    Resize { width: f32, height: f32 },
}

/// What a command did
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    Cleared,
    Spawned(usize),
    Removed { agent: Entity, energy_points: usize },
    /// A click that hit nothing
    Missed,
    Resized,
}

#[derive(Debug, Error, PartialEq)]
pub enum CommandParseError {
    #[error("empty command")]
    Empty,

    #[error("unknown command: {0}")]
    Unknown(String),

    #[error("{command} expects {expected} argument(s)")]
    Arity { command: String, expected: usize },

    #[error("invalid number '{0}'")]
    InvalidNumber(String),
}

fn number<T: FromStr>(token: &str) -> Result<T, CommandParseError> {
    token
        .parse()
        .map_err(|_| CommandParseError::InvalidNumber(token.to_string()))
}

impl FromStr for ShellCommand {
    type Err = CommandParseError;

    /// Parse the whitespace-separated text form, e.g. `click 120 40`
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let Some((&name, args)) = tokens.split_first() else {
            return Err(CommandParseError::Empty);
        };

        let expect = |expected: usize| {
            if args.len() == expected {
                Ok(())
            } else {
                Err(CommandParseError::Arity {
                    command: name.to_string(),
                    expected,
                })
            }
        };

        match name.to_ascii_lowercase().as_str() {
            "clear" => expect(0).map(|_| ShellCommand::Clear),
            "school" | "spawn-school" => expect(0).map(|_| ShellCommand::SpawnSchool),
            "predator" | "spawn-predator" => expect(0).map(|_| ShellCommand::SpawnPredator),
            "random" | "spawn-random" => {
                expect(1)?;
                Ok(ShellCommand::SpawnRandom {
                    count: number(args[0])?,
                })
            }
            "click" => {
                expect(2)?;
                Ok(ShellCommand::Click {
                    x: number(args[0])?,
                    y: number(args[1])?,
                })
            }
            "resize" => {
                expect(2)?;
                Ok(ShellCommand::Resize {
                    width: number(args[0])?,
                    height: number(args[1])?,
                })
            }
            other => Err(CommandParseError::Unknown(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_text_commands() {
        assert_eq!("clear".parse::<ShellCommand>(), Ok(ShellCommand::Clear));
        assert_eq!("  School ".parse::<ShellCommand>(), Ok(ShellCommand::SpawnSchool));
        assert_eq!("random 10".parse::<ShellCommand>(), Ok(ShellCommand::SpawnRandom { count: 10 }));
        assert_eq!(
            "click 12.5 40".parse::<ShellCommand>(),
            Ok(ShellCommand::Click { x: 12.5, y: 40.0 })
        );
    }

    #[test]
    fn reports_bad_input() {
        assert_eq!("".parse::<ShellCommand>(), Err(CommandParseError::Empty));
        assert!(matches!("dance".parse::<ShellCommand>(), Err(CommandParseError::Unknown(_))));
        assert!(matches!("click 3".parse::<ShellCommand>(), Err(CommandParseError::Arity { expected: 2, .. })));
        assert_eq!(
            "random many".parse::<ShellCommand>(),
            Err(CommandParseError::InvalidNumber("many".to_string()))
        );
    }

    #[test]
    fn json_form_is_tagged() {
        let json = serde_json::to_string(&ShellCommand::Resize { width: 800.0, height: 600.0 }).unwrap();
        assert_eq!(json, r#"{"command":"resize","width":800.0,"height":600.0}"#);
        let back: ShellCommand = serde_json::from_str(r#"{"command":"spawn-random","count":3}"#).unwrap();
        assert_eq!(back, ShellCommand::SpawnRandom { count: 3 });
    }
}
