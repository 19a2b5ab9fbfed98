//! First-hit YouTube lookup

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use regex::Regex;
use tracing::debug;

use super::{ActionError, MediaSearch};

const SEARCH_URL: &str = "https://www.youtube.com/results";
const WATCH_URL: &str = "https://www.youtube.com/watch?v=";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Scrapes the YouTube results page for the first video id
pub struct YouTubeSearch {
    client: reqwest::Client,
    video_id: Regex,
}

impl YouTubeSearch {
    pub fn new() -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("failed to build HTTP client")?;
        let video_id = Regex::new(r#"(?:watch\?v=|"videoId":")([A-Za-z0-9_-]{11})"#)
            .context("invalid video id pattern")?;

        Ok(Self { client, video_id })
    }

    /// Extract the first video id from a results page
    pub fn first_video_id<'a>(&self, html: &'a str) -> Option<&'a str> {
        self.video_id
            .captures(html)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }
}

/// Results page URL for `query`
pub fn search_url(query: &str) -> String {
    format!("{SEARCH_URL}?search_query={}", urlencoding::encode(query))
}

#[async_trait]
impl MediaSearch for YouTubeSearch {
    async fn first_result(&self, query: &str) -> Result<String, ActionError> {
        let url = search_url(query);
        debug!(%url, "searching YouTube");

        let html = self
            .client
            .get(&url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| ActionError::Search(e.to_string()))?
            .text()
            .await
            .map_err(|e| ActionError::Search(e.to_string()))?;

        let id = self
            .first_video_id(&html)
            .ok_or_else(|| ActionError::NoSearchResult(query.to_string()))?;
        Ok(format!("{WATCH_URL}{id}"))
    }
}
