//! Invocation state machine.
//!
//! Every request moves forward through the pipeline and ends in exactly one
//! terminal state:
//!
//! ```text
//! Received ──> Validated ──> Authorized ──> Executing ──> Completed
//!     │             │                           ├──────> Failed
//!     └─> Failed    └─> Failed                  └──────> TimedOut
//! ```
//!
//! Terminal states are final and nothing re-enters `Received`.
//! [`InvocationTracker::advance`] rejects any other transition.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// State of a single invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvocationState {
    Received,
    Validated,
    Authorized,
    Executing,
    Completed,
    Failed,
    TimedOut,
}

impl InvocationState {
    pub fn as_str(&self) -> &str {
        match self {
            InvocationState::Received => "received",
            InvocationState::Validated => "validated",
            InvocationState::Authorized => "authorized",
            InvocationState::Executing => "executing",
            InvocationState::Completed => "completed",
            InvocationState::Failed => "failed",
            InvocationState::TimedOut => "timed_out",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            InvocationState::Completed | InvocationState::Failed | InvocationState::TimedOut
        )
    }

    pub fn can_transition_to(&self, next: InvocationState) -> bool {
        use InvocationState::*;
        matches!(
            (self, next),
            (Received, Validated)
                | (Received, Failed)
                | (Validated, Authorized)
                | (Validated, Failed)
                | (Authorized, Executing)
                | (Executing, Completed)
                | (Executing, Failed)
                | (Executing, TimedOut)
        )
    }
}

impl std::fmt::Display for InvocationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("illegal invocation transition {from} -> {to}")]
pub struct IllegalTransition {
    pub from: InvocationState,
    pub to: InvocationState,
}

/// Tracks one invocation through the state machine.
#[derive(Debug, Clone)]
pub struct InvocationTracker {
    id: String,
    tool_name: String,
    state: InvocationState,
    history: Vec<InvocationState>,
}

impl InvocationTracker {
    pub fn new(id: impl Into<String>, tool_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tool_name: tool_name.into(),
            state: InvocationState::Received,
            history: vec![InvocationState::Received],
        }
    }

    pub fn advance(&mut self, next: InvocationState) -> Result<(), IllegalTransition> {
        if !self.state.can_transition_to(next) {
            return Err(IllegalTransition {
                from: self.state,
                to: next,
            });
        }
        self.state = next;
        self.history.push(next);
        Ok(())
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn tool_name(&self) -> &str {
        &self.tool_name
    }

    pub fn state(&self) -> InvocationState {
        self.state
    }

    pub fn history(&self) -> &[InvocationState] {
        &self.history
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use InvocationState::*;

    #[test]
    fn test_happy_path() {
        let mut t = InvocationTracker::new("inv-1", "file_reader");
        for next in [Validated, Authorized, Executing, Completed] {
            t.advance(next).unwrap();
        }
        assert!(t.is_terminal());
        assert_eq!(
            t.history(),
            &[Received, Validated, Authorized, Executing, Completed]
        );
    }

    #[test]
    fn test_validation_failure_goes_straight_to_failed() {
        let mut t = InvocationTracker::new("inv-2", "file_reader");
        t.advance(Failed).unwrap();
        assert_eq!(t.state(), Failed);
    }

    #[test]
    fn test_terminal_states_are_final() {
        let mut t = InvocationTracker::new("inv-3", "slow");
        for next in [Validated, Authorized, Executing, TimedOut] {
            t.advance(next).unwrap();
        }
        let err = t.advance(Completed).unwrap_err();
        assert_eq!(err.from, TimedOut);
        assert!(t.advance(Received).is_err());
        assert_eq!(t.state(), TimedOut);
    }

    #[test]
    fn test_cannot_skip_authorization() {
        let mut t = InvocationTracker::new("inv-4", "t");
        t.advance(Validated).unwrap();
        assert!(t.advance(Executing).is_err());
        assert!(!Authorized.can_transition_to(TimedOut));
    }
}
