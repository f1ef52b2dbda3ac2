//! Transcript acquisition for Podbrief.
//!
//! Each external transcript source is a [`TranscriptProvider`]. The
//! [`TranscriptFetcher`] tries them in configured order and keeps the first
//! transcript that is long enough to be plausible.
//!
//! # Providers
//!
//! - **supadata**: keyed JSON API returning a flat transcript field.
//! - **ytio**: public API returning an array of caption segments.
//! - **socialkit**: keyed JSON API returning a flat transcript field.
//! - **youtube_captions**: YouTube's own timed-text captions, one request per language.

mod captions;
mod client;
mod failover;
mod socialkit;
mod supadata;
mod ytio;

pub use captions::YoutubeCaptionsProvider;
pub use failover::{FetchedTranscript, TranscriptFetcher};
pub use socialkit::SocialKitProvider;
pub use supadata::SupadataProvider;
pub use ytio::YtioProvider;

use async_trait::async_trait;
use thiserror::Error;

/// A provider could not deliver a transcript.
///
/// Covers disabled providers, missing credentials, network and HTTP status
/// failures, unparseable responses and empty content alike.
#[derive(Debug, Error)]
#[error("{provider} unavailable: {reason}")]
pub struct ProviderUnavailable {
    pub provider: String,
    pub reason: String,
}

impl ProviderUnavailable {
    pub fn new(provider: &str, reason: impl Into<String>) -> Self {
        Self {
            provider: provider.to_string(),
            reason: reason.into(),
        }
    }
}

/// Transcript text as returned by a single provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderTranscript {
    /// Non-empty transcript text.
    pub text: String,
    /// Language code.
    pub language: String,
}

/// Trait for transcript sources.
#[async_trait]
pub trait TranscriptProvider: Send + Sync {
    /// Registry name used in the configured provider order.
    fn name(&self) -> &str;

    /// Fetch the transcript of a video.
    async fn fetch(&self, video_id: &str) -> std::result::Result<ProviderTranscript, ProviderUnavailable>;
}
