//! SocialKit transcript provider.

use super::client::{fetch_flat, ProviderClient};
use super::{ProviderTranscript, ProviderUnavailable, TranscriptProvider};
use crate::config::ProviderSettings;
use crate::error::Result;
use async_trait::async_trait;

const DEFAULT_BASE_URL: &str = "https://api.socialkit.dev/youtube-transcript";
const DEFAULT_API_KEY_ENV: &str = "SOCIALKIT_API_KEY";

/// SocialKit: `GET {base}?video_id=ID` with a bearer key.
pub struct SocialKitProvider {
    client: ProviderClient,
}

impl SocialKitProvider {
    pub const NAME: &'static str = "socialkit";

    pub fn new(settings: &ProviderSettings) -> Result<Self> {
        Ok(Self {
            client: ProviderClient::new(
                Self::NAME,
                settings,
                DEFAULT_BASE_URL,
                Some(DEFAULT_API_KEY_ENV),
            )?,
        })
    }
}

#[async_trait]
impl TranscriptProvider for SocialKitProvider {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn fetch(&self, video_id: &str) -> std::result::Result<ProviderTranscript, ProviderUnavailable> {
        fetch_flat(&self.client, video_id).await
    }
}
