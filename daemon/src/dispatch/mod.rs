//! Command classification and dispatch
//!
//! A transcript is matched against `PHRASE_TABLE` in order and the first
//! matching rule builds the `Intent`. Matching is plain substring
//! containment, so the table order decides overlapping phrases: specific
//! rules such as "play music" must stay ahead of the "play" catch-all.

mod dispatcher;
mod intent;

pub use dispatcher::{CommandDispatcher, ControlSignal};
