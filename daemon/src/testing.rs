//! In-memory collaborators shared by unit tests
//!
//! Every fake appends to a shared [`CallLog`], so a test can assert the
//! exact order of side effects across collaborators.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::actions::{ActionError, Desktop, MediaSearch, SystemKey};
use crate::activation::{ActivationTrigger, TriggerClosed};
use crate::ai::{AiError, ChatBackend};
use crate::audio::{ToneError, TonePlayer};
use crate::speech::{SpeechEngine, SpeechError};
use crate::transcription::{CaptureLimits, Transcriber, Transcript, TranscriptionError};

#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    /// Sentences passed to the speech engine, in order
    pub fn spoken(&self) -> Vec<String> {
        self.entries()
            .iter()
            .filter_map(|e| e.strip_prefix("speak:").map(str::to_string))
            .collect()
    }

    /// Number of entries starting with `prefix`
    pub fn count(&self, prefix: &str) -> usize {
        self.entries().iter().filter(|e| e.starts_with(prefix)).count()
    }
}

pub struct FakeSpeech {
    log: CallLog,
    fail: bool,
}

impl FakeSpeech {
    pub fn new(log: &CallLog) -> Self {
        Self { log: log.clone(), fail: false }
    }

    pub fn failing(log: &CallLog) -> Self {
        Self { log: log.clone(), fail: true }
    }
}

#[async_trait]
impl SpeechEngine for FakeSpeech {
    async fn say(&self, sentence: &str) -> Result<(), SpeechError> {
        self.log.push(format!("speak:{sentence}"));
        if self.fail {
            return Err(SpeechError::Spawn {
                program: "fake",
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no synthesizer"),
            });
        }
        Ok(())
    }
}

pub struct FakeTonePlayer {
    log: CallLog,
    fail: bool,
}

impl FakeTonePlayer {
    pub fn new(log: &CallLog) -> Self {
        Self { log: log.clone(), fail: false }
    }

    pub fn failing(log: &CallLog) -> Self {
        Self { log: log.clone(), fail: true }
    }
}

#[async_trait]
impl TonePlayer for FakeTonePlayer {
    async fn play(&self, _samples: Vec<f32>, _sample_rate: u32) -> Result<(), ToneError> {
        self.log.push("cue");
        if self.fail {
            return Err(ToneError::NoDevice);
        }
        Ok(())
    }
}

pub struct FakeDesktop {
    log: CallLog,
    fail: bool,
}

impl FakeDesktop {
    pub fn new(log: &CallLog) -> Self {
        Self { log: log.clone(), fail: false }
    }

    /// Every call is logged and then fails
    pub fn failing(log: &CallLog) -> Self {
        Self { log: log.clone(), fail: true }
    }

    fn io_error(&self) -> std::io::Error {
        std::io::Error::new(std::io::ErrorKind::Other, "desktop unavailable")
    }
}

impl Desktop for FakeDesktop {
    fn press_key(&self, key: SystemKey) -> Result<(), ActionError> {
        self.log.push(format!("key:{key:?}"));
        if self.fail {
            return Err(ActionError::Keyboard("desktop unavailable".to_string()));
        }
        Ok(())
    }

    fn open_url(&self, url: &str) -> Result<(), ActionError> {
        self.log.push(format!("open:{url}"));
        if self.fail {
            return Err(ActionError::Browser {
                url: url.to_string(),
                source: self.io_error(),
            });
        }
        Ok(())
    }

    fn launch(&self, app: &str) -> Result<(), ActionError> {
        self.log.push(format!("launch:{app}"));
        if self.fail {
            return Err(ActionError::Launch {
                app: app.to_string(),
                source: self.io_error(),
            });
        }
        Ok(())
    }
}

pub struct FakeSearch {
    log: CallLog,
    result: Option<String>,
}

impl FakeSearch {
    pub fn found(log: &CallLog, url: &str) -> Self {
        Self { log: log.clone(), result: Some(url.to_string()) }
    }

    pub fn empty(log: &CallLog) -> Self {
        Self { log: log.clone(), result: None }
    }
}

#[async_trait]
impl MediaSearch for FakeSearch {
    async fn first_result(&self, query: &str) -> Result<String, ActionError> {
        self.log.push(format!("search:{query}"));
        self.result
            .clone()
            .ok_or_else(|| ActionError::NoSearchResult(query.to_string()))
    }
}

pub struct FakeChat {
    log: CallLog,
    reply: Option<String>,
}

impl FakeChat {
    pub fn replying(log: &CallLog, reply: &str) -> Self {
        Self { log: log.clone(), reply: Some(reply.to_string()) }
    }

    pub fn failing(log: &CallLog) -> Self {
        Self { log: log.clone(), reply: None }
    }
}

#[async_trait]
impl ChatBackend for FakeChat {
    async fn complete(&self, query: &str) -> Result<String, AiError> {
        self.log.push(format!("ai:{query}"));
        self.reply
            .clone()
            .ok_or_else(|| AiError::ServiceUnavailable("connection refused".to_string()))
    }
}

/// Replays a fixed sequence of capture results
pub struct ScriptedTranscriber {
    log: CallLog,
    script: Mutex<VecDeque<Result<Transcript, TranscriptionError>>>,
}

impl ScriptedTranscriber {
    pub fn new(
        log: &CallLog,
        script: impl IntoIterator<Item = Result<&'static str, TranscriptionError>>,
    ) -> Self {
        let script = script
            .into_iter()
            .map(|r| r.map(Transcript::new))
            .collect();
        Self { log: log.clone(), script: Mutex::new(script) }
    }
}

#[async_trait]
impl Transcriber for ScriptedTranscriber {
    async fn capture(&self, limits: CaptureLimits) -> Result<Transcript, TranscriptionError> {
        let kind = if limits == CaptureLimits::COMMAND { "command" } else { "wake" };
        self.log.push(format!("listen:{kind}"));
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("transcriber script exhausted"))
    }
}

/// Fires a fixed number of times, then reports the source closed
pub struct CountedTrigger {
    log: CallLog,
    remaining: usize,
}

impl CountedTrigger {
    pub fn new(log: &CallLog, presses: usize) -> Self {
        Self { log: log.clone(), remaining: presses }
    }
}

#[async_trait]
impl ActivationTrigger for CountedTrigger {
    async fn wait(&mut self) -> Result<(), TriggerClosed> {
        if self.remaining == 0 {
            return Err(TriggerClosed);
        }
        self.remaining -= 1;
        self.log.push("trigger");
        Ok(())
    }
}
