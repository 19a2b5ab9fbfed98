//! Intents and the ordered phrase table

use crate::transcription::Transcript;

/// Rule identity, one per table entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntentKind {
    OpenGoogle,
    OpenYouTube,
    OpenSpotify,
    NextTrack,
    PreviousTrack,
    PauseMusic,
    ResumeMusic,
    PlayNamedTrack,
    Sleep,
    Terminate,
}

/// Classification of one transcript
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    OpenGoogle,
    OpenYouTube,
    OpenSpotify,
    NextTrack,
    PreviousTrack,
    PauseMusic,
    ResumeMusic,
    /// `name` may be empty when only "play" was said
    PlayNamedTrack { name: String },
    Sleep,
    Terminate,
    /// Nothing matched; forwarded to the AI responder
    Fallback { query: String },
}

/// One (predicate, constructor) pair of the table
#[derive(Debug)]
pub struct PhraseRule {
    pub kind: IntentKind,
    /// The rule matches if the transcript contains any of these
    pub phrases: &'static [&'static str],
}

impl PhraseRule {
    pub fn matches(&self, transcript: &str) -> bool {
        self.phrases.iter().any(|p| transcript.contains(p))
    }

    fn build(&self, transcript: &str) -> Intent {
        match self.kind {
            IntentKind::OpenGoogle => Intent::OpenGoogle,
            IntentKind::OpenYouTube => Intent::OpenYouTube,
            IntentKind::OpenSpotify => Intent::OpenSpotify,
            IntentKind::NextTrack => Intent::NextTrack,
            IntentKind::PreviousTrack => Intent::PreviousTrack,
            IntentKind::PauseMusic => Intent::PauseMusic,
            IntentKind::ResumeMusic => Intent::ResumeMusic,
            IntentKind::PlayNamedTrack => Intent::PlayNamedTrack {
                name: transcript.replacen("play", "", 1).trim().to_string(),
            },
            IntentKind::Sleep => Intent::Sleep,
            IntentKind::Terminate => Intent::Terminate,
        }
    }
}

/// Evaluated top to bottom, first match wins. Order is load-bearing.
pub const PHRASE_TABLE: &[PhraseRule] = &[
    PhraseRule { kind: IntentKind::OpenGoogle, phrases: &["open google"] },
    PhraseRule { kind: IntentKind::OpenYouTube, phrases: &["open youtube"] },
    PhraseRule { kind: IntentKind::OpenSpotify, phrases: &["open spotify"] },
    PhraseRule { kind: IntentKind::NextTrack, phrases: &["next song"] },
    PhraseRule { kind: IntentKind::PreviousTrack, phrases: &["previous song"] },
    PhraseRule { kind: IntentKind::PauseMusic, phrases: &["pause music", "pause"] },
    PhraseRule { kind: IntentKind::ResumeMusic, phrases: &["play music", "resume"] },
    PhraseRule { kind: IntentKind::PlayNamedTrack, phrases: &["play"] },
    PhraseRule { kind: IntentKind::Sleep, phrases: &["stop listening", "go to sleep"] },
    PhraseRule { kind: IntentKind::Terminate, phrases: &["exit", "shutdown", "goodbye"] },
];

/// Classify a transcript into exactly one intent
pub fn classify(transcript: &Transcript) -> Intent {
    let text = transcript.as_str();
    PHRASE_TABLE
        .iter()
        .find(|rule| rule.matches(text))
        .map(|rule| rule.build(text))
        .unwrap_or_else(|| Intent::Fallback {
            query: text.to_string(),
        })
}
