//! Core state machine implementation
//!
//! Validates every transition against the fixed edge set and logs
//! how long the previous state lasted.

use std::time::Instant;

use tracing::info;

/// The four possible states of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Waiting for a wake phrase or manual trigger
    #[default]
    AwaitingActivation,
    /// Capturing and dispatching one command
    AwaitingCommand,
    /// Waiting for activation after a sleep command
    Sleeping,
    /// Shut down, no further transitions
    Terminated,
}

impl SessionState {
    /// Whether the state blocks on an activation signal
    pub fn is_waiting(&self) -> bool {
        matches!(self, Self::AwaitingActivation | Self::Sleeping)
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionState::AwaitingActivation => write!(f, "AWAITING_ACTIVATION"),
            SessionState::AwaitingCommand => write!(f, "AWAITING_COMMAND"),
            SessionState::Sleeping => write!(f, "SLEEPING"),
            SessionState::Terminated => write!(f, "TERMINATED"),
        }
    }
}

/// Rejected transition between two states
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("illegal session transition {from} -> {to}")]
pub struct TransitionError {
    pub from: SessionState,
    pub to: SessionState,
}

/// The single session instance
#[derive(Debug)]
pub struct Session {
    state: SessionState,
    /// State the current one was entered from
    previous: Option<SessionState>,
    entered_at: Instant,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Create a session waiting for activation
    pub fn new() -> Self {
        Self {
            state: SessionState::AwaitingActivation,
            previous: None,
            entered_at: Instant::now(),
        }
    }

    /// Get the current state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Get the state the current one was entered from
    pub fn previous(&self) -> Option<SessionState> {
        self.previous
    }

    /// Check whether `from -> to` is one of the defined edges
    pub fn is_allowed(from: SessionState, to: SessionState) -> bool {
        use SessionState::*;

        match (from, to) {
            (AwaitingActivation | Sleeping, AwaitingCommand) => true,
            (AwaitingCommand, AwaitingActivation | Sleeping) => true,
            (Terminated, _) => false,
            (_, Terminated) => true,
            _ => false,
        }
    }

    /// Perform a state transition
    pub fn transition_to(&mut self, next: SessionState) -> Result<(), TransitionError> {
        let from = self.state;
        if !Self::is_allowed(from, next) {
            return Err(TransitionError { from, to: next });
        }

        info!(
            from = %from,
            to = %next,
            duration_ms = self.entered_at.elapsed().as_millis() as u64,
            "session transition"
        );

        self.previous = Some(from);
        self.state = next;
        self.entered_at = Instant::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let session = Session::new();
        assert_eq!(session.state(), SessionState::AwaitingActivation);
        assert!(session.previous().is_none());
    }

    #[test]
    fn test_command_round_trip() {
        let mut session = Session::new();
        session.transition_to(SessionState::AwaitingCommand).unwrap();
        session.transition_to(SessionState::AwaitingActivation).unwrap();
        assert_eq!(session.state(), SessionState::AwaitingActivation);
        assert_eq!(session.previous(), Some(SessionState::AwaitingCommand));
    }

    #[test]
    fn test_sleep_then_wake() {
        let mut session = Session::new();
        session.transition_to(SessionState::AwaitingCommand).unwrap();
        session.transition_to(SessionState::Sleeping).unwrap();
        assert!(session.state().is_waiting());

        session.transition_to(SessionState::AwaitingCommand).unwrap();
        assert_eq!(session.previous(), Some(SessionState::Sleeping));
    }

    #[test]
    fn test_activation_cannot_skip_command() {
        let mut session = Session::new();
        let err = session.transition_to(SessionState::Sleeping).unwrap_err();
        assert_eq!(err.from, SessionState::AwaitingActivation);
        assert_eq!(err.to, SessionState::Sleeping);
        assert_eq!(session.state(), SessionState::AwaitingActivation);
    }

    #[test]
    fn test_sleeping_only_wakes_into_command() {
        let mut session = Session::new();
        session.transition_to(SessionState::AwaitingCommand).unwrap();
        session.transition_to(SessionState::Sleeping).unwrap();
        assert!(session.transition_to(SessionState::AwaitingActivation).is_err());
        assert_eq!(session.state(), SessionState::Sleeping);
    }

    #[test]
    fn test_terminate_from_anywhere() {
        for path in [
            vec![],
            vec![SessionState::AwaitingCommand],
            vec![SessionState::AwaitingCommand, SessionState::Sleeping],
        ] {
            let mut session = Session::new();
            for state in path {
                session.transition_to(state).unwrap();
            }
            session.transition_to(SessionState::Terminated).unwrap();
            assert_eq!(session.state(), SessionState::Terminated);
        }
    }

    #[test]
    fn test_terminated_is_final() {
        let mut session = Session::new();
        session.transition_to(SessionState::Terminated).unwrap();
        assert!(session.transition_to(SessionState::AwaitingActivation).is_err());
        assert!(session.transition_to(SessionState::Terminated).is_err());
    }
}
