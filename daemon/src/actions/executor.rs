//! One concrete action per intent

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::speech::SpeechOutput;

use super::{ActionError, Desktop, MediaSearch, SystemKey};

/// Time given to a freshly launched media player to come up
pub const LAUNCH_SETTLE: Duration = Duration::from_secs(5);

pub struct ActionExecutor {
    desktop: Arc<dyn Desktop>,
    search: Box<dyn MediaSearch>,
    speech: Arc<SpeechOutput>,
    media_player: String,
    launch_settle: Duration,
}

impl ActionExecutor {
    pub fn new(
        desktop: Arc<dyn Desktop>,
        search: Box<dyn MediaSearch>,
        speech: Arc<SpeechOutput>,
        media_player: String,
    ) -> Self {
        Self {
            desktop,
            search,
            speech,
            media_player,
            launch_settle: LAUNCH_SETTLE,
        }
    }

    /// Override the post-launch wait
    #[cfg(test)]
    pub fn with_launch_settle(mut self, settle: Duration) -> Self {
        self.launch_settle = settle;
        self
    }

    pub fn open_url(&self, url: &str) -> Result<(), ActionError> {
        info!(url, "opening url");
        self.desktop.open_url(url)
    }

    /// Launch or raise the media player and give it time to start
    pub async fn open_media_player(&self) -> Result<(), ActionError> {
        info!(app = %self.media_player, "opening media player");
        self.desktop.launch(&self.media_player)?;
        tokio::time::sleep(self.launch_settle).await;
        Ok(())
    }

    /// Send a media transport key
    pub fn media_key(&self, key: SystemKey) -> Result<(), ActionError> {
        self.desktop.press_key(key)
    }

    /// Announce, look up and open the first match for `name`
    pub async fn play_named_track(&self, name: &str) -> Result<(), ActionError> {
        self.speech.speak(&format!("Playing {name} on YouTube")).await;
        let url = self.search.first_result(name).await?;
        info!(track = name, %url, "playing track");
        self.desktop.open_url(&url)
    }
}
