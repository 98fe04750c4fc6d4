//! Outcome model: the terminal state of one dispatch call.
//!
//! A dispatch is a self-contained transaction. It always ends in exactly one
//! of these states, and none of them is an error from the caller's side.

use serde::{Deserialize, Serialize};

use super::action::ResolvedAction;

/// Classification without payload, used for counters and log fields.
///
/// Serialized as SCREAMING_SNAKE_CASE to match the log vocabulary:
/// FAST_REJECTED / UNRESOLVED / RESOLVED_INVALID / EXECUTED.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutcomeKind {
    FastRejected,
    Unresolved,
    ResolvedInvalid,
    Executed,
}

/// What a dispatch did.
///
/// - `FastRejected`: no provider claims the entity at all. Expected for most entities.
/// - `Unresolved`: the entity is bound, but no provider has a URL for this command.
/// - `ResolvedInvalid`: a provider matched but its method or URL is blank.
/// - `Executed`: the action was handed to the executor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "action", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DispatchOutcome {
    FastRejected,
    Unresolved,
    ResolvedInvalid,
    Executed(ResolvedAction),
}

impl DispatchOutcome {
    pub fn kind(&self) -> OutcomeKind {
        match self {
            DispatchOutcome::FastRejected => OutcomeKind::FastRejected,
            DispatchOutcome::Unresolved => OutcomeKind::Unresolved,
            DispatchOutcome::ResolvedInvalid => OutcomeKind::ResolvedInvalid,
            DispatchOutcome::Executed(_) => OutcomeKind::Executed,
        }
    }

    /// The action handed to the executor, if any.
    pub fn action(&self) -> Option<&ResolvedAction> {
        match self {
            DispatchOutcome::Executed(action) => Some(action),
            _ => None,
        }
    }

    pub fn is_executed(&self) -> bool {
        matches!(self, DispatchOutcome::Executed(_))
    }
}
