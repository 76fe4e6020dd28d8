//! CLI commands.

use thiserror::Error;

/// Why a prompt line could not be parsed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command '{0}' (type 'help')")]
    Unknown(String),
    #[error("'{0}' needs a number")]
    MissingArgument(String),
    #[error("'{0}' takes no argument")]
    UnexpectedArgument(String),
    #[error("too many arguments for '{0}'")]
    TooManyArguments(String),
    #[error("'{0}' is not a notification number")]
    BadPosition(String),
}

/// A line typed at the prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    List,
    /// 1-based position in the newest-first list
    Read(usize),
    ReadAll,
    Remove(usize),
    Clear,
    Status,
    Help,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let mut parts = line.split_whitespace();
        let Some(name) = parts.next() else {
            return Err(CommandError::Empty);
        };
        let argument = parts.next();
        if parts.next().is_some() {
            return Err(CommandError::TooManyArguments(name.to_string()));
        }

        match (name, argument) {
            ("list" | "ls", None) => Ok(Command::List),
            ("read", Some(n)) => Ok(Command::Read(parse_position(n)?)),
            ("read-all", None) => Ok(Command::ReadAll),
            ("remove" | "rm", Some(n)) => Ok(Command::Remove(parse_position(n)?)),
            ("clear", None) => Ok(Command::Clear),
            ("status", None) => Ok(Command::Status),
            ("help" | "?", None) => Ok(Command::Help),
            ("quit" | "exit", None) => Ok(Command::Quit),
            ("read" | "remove" | "rm", None) => {
                Err(CommandError::MissingArgument(name.to_string()))
            }
            (
                "list" | "ls" | "read-all" | "clear" | "status" | "help" | "?" | "quit" | "exit",
                Some(_),
            ) => Err(CommandError::UnexpectedArgument(name.to_string())),
            _ => Err(CommandError::Unknown(name.to_string())),
        }
    }
}

fn parse_position(value: &str) -> Result<usize, CommandError> {
    match value.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err(CommandError::BadPosition(value.to_string())),
    }
}
