//! Domain model (commands, resolved actions, outcomes).

pub mod action;
pub mod command;
pub mod outcome;

pub use action::ResolvedAction;
pub use command::{Command, CommandEvent};
pub use outcome::{DispatchOutcome, OutcomeKind};
