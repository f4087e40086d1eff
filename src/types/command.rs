use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::errors::CommandError;
use crate::types::settings::{DisplayMode, Scope};

/// A user-invoked configuration change.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigCommand {
    SetToken(String),
    SetUsername(String),
    SetDisplayMode(DisplayMode),
    SetScope(Scope),
}

impl ConfigCommand {
    /// Builds a command from its name and raw argument.
    pub fn parse(name: &str, value: &str) -> Result<Self, CommandError> {
        match name {
            "set-token" => Ok(Self::SetToken(value.to_string())),
            "set-username" => Ok(Self::SetUsername(value.to_string())),
            "display" => value
                .parse()
                .map(Self::SetDisplayMode)
                .map_err(CommandError::InvalidArgument),
            "scope" => value
                .parse()
                .map(Self::SetScope)
                .map_err(CommandError::InvalidArgument),
            other => Err(CommandError::UnknownCommand(other.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::SetToken(_) => "set-token",
            Self::SetUsername(_) => "set-username",
            Self::SetDisplayMode(_) => "display",
            Self::SetScope(_) => "scope",
        }
    }
}

impl fmt::Display for ConfigCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Never echo the token itself.
            Self::SetToken(_) => write!(f, "set-token ****"),
            Self::SetUsername(name) => write!(f, "set-username {}", name),
            Self::SetDisplayMode(mode) => write!(f, "display {}", mode),
            Self::SetScope(scope) => write!(f, "scope {}", scope),
        }
    }
}

/// Result of running a [`ConfigCommand`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct CommandOutcome {
    /// Whether anything was persisted. Blank token or username input is ignored.
    pub changed: bool,
    /// The page must be reloaded so the scope gate and settings are re-evaluated.
    pub reload_required: bool,
}

impl CommandOutcome {
    pub fn from_changed(changed: bool) -> Self {
        Self {
            changed,
            reload_required: changed,
        }
    }
}
