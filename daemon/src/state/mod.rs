//! Session state machine
//!
//! One session per process, owned by the activation controller:
//! - AwaitingActivation: waiting for a wake phrase or manual trigger
//! - AwaitingCommand: cue played, capturing and dispatching one command
//! - Sleeping: like AwaitingActivation, but the next command skips the cue
//! - Terminated: final, reached on a terminate command or an interrupt

mod machine;

pub use machine::{Session, SessionState, TransitionError};
