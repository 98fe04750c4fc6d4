//! Command events observed on the event bus.
//!
//! The relay never interprets a command. It only needs a stable string form
//! to use as the lookup key against provider rule tables.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An opaque command value (`ON`, `OFF`, `50`, ...).
///
/// The canonical string form is the value passed to providers, so two commands
/// compare equal exactly when their string forms do.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Command(String);

impl Command {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Canonical string form used as the lookup key.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Command {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Command {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A command addressed to a named entity, produced by the external event source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandEvent {
    entity_name: String,
    command: Command,
}

impl CommandEvent {
    pub fn new(entity_name: impl Into<String>, command: impl Into<Command>) -> Self {
        Self {
            entity_name: entity_name.into(),
            command: command.into(),
        }
    }

    pub fn entity_name(&self) -> &str {
        &self.entity_name
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}
