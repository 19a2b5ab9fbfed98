//! Side-effecting actions invoked by the dispatcher
//!
//! Desktop automation and media lookup sit behind [`Desktop`] and
//! [`MediaSearch`]; [`ActionExecutor`] composes them into one action
//! per intent.

mod desktop;
mod executor;
mod youtube;

use async_trait::async_trait;

pub use desktop::SystemDesktop;
pub use executor::ActionExecutor;
pub use youtube::YouTubeSearch;

/// Keys the assistant presses on the user's behalf
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemKey {
    VolumeUp,
    VolumeDown,
    NextTrack,
    PreviousTrack,
    PlayPause,
}

/// Failure of a single action
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    #[error("failed to open {url}: {source}")]
    Browser {
        url: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to launch {app}: {source}")]
    Launch {
        app: String,
        #[source]
        source: std::io::Error,
    },

    #[error("key press failed: {0}")]
    Keyboard(String),

    #[error("media search failed: {0}")]
    Search(String),

    #[error("no video found for {0:?}")]
    NoSearchResult(String),
}

/// Desktop automation capability
pub trait Desktop: Send + Sync {
    fn press_key(&self, key: SystemKey) -> Result<(), ActionError>;

    /// Open `url` in the default browser
    fn open_url(&self, url: &str) -> Result<(), ActionError>;

    /// Launch or raise an application by name or path
    fn launch(&self, app: &str) -> Result<(), ActionError>;
}

/// Resolves a free-text track request to a playable URL
#[async_trait]
pub trait MediaSearch: Send + Sync {
    async fn first_result(&self, query: &str) -> Result<String, ActionError>;
}
