//! Activation and the top-level control loop
//!
//! [`ActivationController`] owns the session state machine. It waits for a
//! wake phrase or manual trigger, captures one command and hands it to the
//! dispatcher, then acts on the returned control signal.

mod controller;
mod trigger;
mod wake;

pub use controller::{ActivationController, Services, ShutdownReason};
pub use trigger::{spawn_terminal_reader, ActivationTrigger, ChannelTrigger, TriggerSource};
#[cfg(test)]
pub use trigger::TriggerClosed;
pub use wake::WakePhrases;

/// How the controller learns that the user wants to talk
pub enum Activation {
    /// Continuously listen for one of the phrases
    WakeWord(WakePhrases),
    /// Wait on an explicit trigger
    Manual(Box<dyn ActivationTrigger>),
}

impl Activation {
    /// Spoken once the daemon is ready
    pub fn banner(&self) -> String {
        match self {
            Activation::WakeWord(phrases) => format!(
                "Jarvis is online. Say {} to activate me.",
                phrases.spoken_name().unwrap_or_else(|| "Jarvis".to_string())
            ),
            Activation::Manual(_) => "Jarvis is online. Press the trigger to talk.".to_string(),
        }
    }

    /// Spoken when a sleep command is dispatched
    pub fn sleep_notice(&self) -> String {
        match self {
            Activation::WakeWord(phrases) => format!(
                "Going to sleep. Say {} to wake me up.",
                phrases.spoken_name().unwrap_or_else(|| "Jarvis".to_string())
            ),
            Activation::Manual(_) => "Going to sleep. Use the trigger to wake me up.".to_string(),
        }
    }
}

impl std::fmt::Debug for Activation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Activation::WakeWord(phrases) => f.debug_tuple("WakeWord").field(phrases).finish(),
            Activation::Manual(_) => f.write_str("Manual"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{CallLog, CountedTrigger};

    #[test]
    fn test_wake_word_messages_name_first_phrase() {
        let activation = Activation::WakeWord(WakePhrases::new(["jarvis", "hey jarvis"]));
        assert_eq!(activation.banner(), "Jarvis is online. Say Jarvis to activate me.");
        assert_eq!(
            activation.sleep_notice(),
            "Going to sleep. Say Jarvis to wake me up."
        );
    }

    #[test]
    fn test_manual_messages() {
        let log = CallLog::default();
        let activation = Activation::Manual(Box::new(CountedTrigger::new(&log, 0)));
        assert_eq!(activation.banner(), "Jarvis is online. Press the trigger to talk.");
        assert_eq!(
            activation.sleep_notice(),
            "Going to sleep. Use the trigger to wake me up."
        );
    }
}
