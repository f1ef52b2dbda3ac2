//! Episode discovery through the YouTube Data API v3.
//!
//! Channels resolve to their uploads playlist; playlists are paged 50 items at
//! a time. Listing failures are logged and whatever was collected is returned.

use crate::catalog::NewEpisode;
use crate::config::{ChannelSettings, FetchSettings};
use crate::error::{PodbriefError, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use url::Url;

const PAGE_SIZE: &str = "50";
const PRIVATE_VIDEO_TITLE: &str = "Private video";

#[derive(Debug, Deserialize)]
struct ChannelListResponse {
    #[serde(default)]
    items: Vec<ChannelItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelItem {
    content_details: ContentDetails,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContentDetails {
    related_playlists: RelatedPlaylists,
}

#[derive(Debug, Deserialize)]
struct RelatedPlaylists {
    uploads: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItemsResponse {
    #[serde(default)]
    items: Vec<PlaylistItem>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlaylistItem {
    snippet: Snippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    #[serde(default)]
    title: String,
    channel_id: Option<String>,
    #[serde(default)]
    channel_title: String,
    published_at: Option<DateTime<Utc>>,
    resource_id: ResourceId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResourceId {
    video_id: String,
}

impl Snippet {
    fn into_episode(self) -> NewEpisode {
        let video_id = self.resource_id.video_id;
        NewEpisode {
            url: watch_url(&video_id),
            video_id,
            channel_id: self.channel_id,
            channel_title: self.channel_title,
            title: self.title,
            published_at: self.published_at,
        }
    }
}

/// Canonical watch URL for a video.
pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", video_id)
}

/// Minimal YouTube Data API client.
pub struct YouTubeClient {
    base_url: String,
    api_key: String,
    http: reqwest::Client,
}

impl YouTubeClient {
    /// Build from settings. A missing API key is a configuration error.
    pub fn from_settings(settings: &FetchSettings) -> Result<Self> {
        let api_key = std::env::var(&settings.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                PodbriefError::Config(format!(
                    "YouTube API key not found in {}",
                    settings.api_key_env
                ))
            })?;

        Self::new(&settings.base_url, &api_key)
    }

    pub fn new(base_url: &str, api_key: &str) -> Result<Self> {
        Url::parse(base_url)?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            http,
        })
    }

    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        resource: &str,
        params: &[(&str, &str)],
    ) -> Result<T> {
        let mut url = Url::parse(&format!("{}/{}", self.base_url, resource))?;
        url.query_pairs_mut()
            .extend_pairs(params)
            .append_pair("key", &self.api_key);

        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PodbriefError::YouTube(format!(
                "{} returned {}: {}",
                resource, status, body
            )));
        }

        Ok(response.json().await?)
    }

    /// Uploads playlist of a channel, or `None` if the channel is unknown or the call fails.
    pub async fn uploads_playlist_id(&self, channel_id: &str) -> Option<String> {
        let response: ChannelListResponse = match self
            .get("channels", &[("part", "contentDetails"), ("id", channel_id)])
            .await
        {
            Ok(r) => r,
            Err(e) => {
                error!("YouTube API error getting uploads playlist: {}", e);
                return None;
            }
        };

        match response.items.into_iter().next() {
            Some(item) => {
                let uploads = item.content_details.related_playlists.uploads;
                debug!("Uploads playlist for {}: {}", channel_id, uploads);
                Some(uploads)
            }
            None => {
                error!("Channel not found: {}", channel_id);
                None
            }
        }
    }

    /// List a playlist, skipping private videos, stopping at `max_results`.
    pub async fn playlist_videos(
        &self,
        playlist_id: &str,
        max_results: Option<usize>,
    ) -> Vec<NewEpisode> {
        let mut videos = Vec::new();
        let mut skipped_private = 0usize;
        let mut page_token: Option<String> = None;

        loop {
            let mut params = vec![
                ("part", "snippet"),
                ("playlistId", playlist_id),
                ("maxResults", PAGE_SIZE),
            ];
            if let Some(token) = page_token.as_deref() {
                params.push(("pageToken", token));
            }

            let page: PlaylistItemsResponse = match self.get("playlistItems", &params).await {
                Ok(page) => page,
                Err(e) => {
                    error!("YouTube API error fetching playlist {}: {}", playlist_id, e);
                    return videos;
                }
            };

            for item in page.items {
                if item.snippet.title == PRIVATE_VIDEO_TITLE {
                    debug!("Skipping private video: {}", item.snippet.resource_id.video_id);
                    skipped_private += 1;
                    continue;
                }

                videos.push(item.snippet.into_episode());
                if max_results.is_some_and(|max| videos.len() >= max) {
                    info!("Reached max results limit ({})", videos.len());
                    return videos;
                }
            }

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        if skipped_private > 0 {
            info!(
                "Fetched {} videos from playlist {} (skipped {} private)",
                videos.len(),
                playlist_id,
                skipped_private
            );
        } else {
            info!("Fetched {} videos from playlist {}", videos.len(), playlist_id);
        }
        videos
    }

    /// Episodes of one configured channel or playlist.
    pub async fn channel_episodes(
        &self,
        channel: &ChannelSettings,
        max_per_channel: Option<usize>,
    ) -> Vec<NewEpisode> {
        if let Some(playlist_id) = &channel.playlist_id {
            info!("Fetching episodes from playlist: {} ({})", channel.name, playlist_id);
            return self.playlist_videos(playlist_id, max_per_channel).await;
        }

        let Some(channel_id) = &channel.channel_id else {
            warn!("Channel {} has neither channel_id nor playlist_id", channel.name);
            return Vec::new();
        };

        info!("Fetching episodes from channel: {} ({})", channel.name, channel_id);
        match self.uploads_playlist_id(channel_id).await {
            Some(uploads) => self.playlist_videos(&uploads, max_per_channel).await,
            None => Vec::new(),
        }
    }
}
