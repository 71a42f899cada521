//! User-facing session commands.
//!
//! `SessionLoad[!] [file]`, `SessionStart[!] [file]` and `SessionStop` map
//! onto the session manager; the bang sets `force`. `SessionStatus` and
//! `SessionList` are read-only.

use crate::session::SessionError;
use std::path::PathBuf;
use thiserror::Error;

pub const LOAD_COMMAND: &str = "SessionLoad";
pub const START_COMMAND: &str = "SessionStart";
pub const STOP_COMMAND: &str = "SessionStop";
pub const STATUS_COMMAND: &str = "SessionStatus";
pub const LIST_COMMAND: &str = "SessionList";

/// Every command name the runtime registers
pub const COMMAND_NAMES: [&str; 5] = [
    LOAD_COMMAND,
    START_COMMAND,
    STOP_COMMAND,
    STATUS_COMMAND,
    LIST_COMMAND,
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Load { force: bool, file: Option<PathBuf> },
    Start { force: bool, file: Option<PathBuf> },
    Stop,
    Status,
    List,
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Not an editor command: {0}")]
    Unknown(String),

    #[error("{command}: {message}")]
    Usage {
        command: &'static str,
        message: String,
    },

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("Failed to list sessions: {0:#}")]
    Catalog(anyhow::Error),
}

impl SessionCommand {
    pub fn name(&self) -> &'static str {
        match self {
            SessionCommand::Load { .. } => LOAD_COMMAND,
            SessionCommand::Start { .. } => START_COMMAND,
            SessionCommand::Stop => STOP_COMMAND,
            SessionCommand::Status => STATUS_COMMAND,
            SessionCommand::List => LIST_COMMAND,
        }
    }

    /// Parse a command line.
    ///
    /// Returns `None` when the first word is not a session command, so the
    /// caller can try its own commands. Everything after the name is the
    /// file argument, spaces included.
    pub fn parse(line: &str) -> Option<Result<Self, CommandError>> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };
        let (name, force) = match word.strip_suffix('!') {
            Some(name) => (name, true),
            None => (word, false),
        };
        let name = COMMAND_NAMES.into_iter().find(|known| *known == name)?;
        let file = (!rest.is_empty()).then(|| PathBuf::from(rest));

        let command = match name {
            LOAD_COMMAND => Ok(SessionCommand::Load { force, file }),
            START_COMMAND => Ok(SessionCommand::Start { force, file }),
            _ if force => Err(CommandError::Usage {
                command: name,
                message: "does not accept !".to_string(),
            }),
            _ if file.is_some() => Err(CommandError::Usage {
                command: name,
                message: "takes no arguments".to_string(),
            }),
            STOP_COMMAND => Ok(SessionCommand::Stop),
            STATUS_COMMAND => Ok(SessionCommand::Status),
            _ => Ok(SessionCommand::List),
        };
        Some(command)
    }
}
