//! Supadata transcript provider.

use super::client::{fetch_flat, ProviderClient};
use super::{ProviderTranscript, ProviderUnavailable, TranscriptProvider};
use crate::config::ProviderSettings;
use crate::error::Result;
use async_trait::async_trait;

const DEFAULT_BASE_URL: &str = "https://api.supadata.ai/v1/youtube/transcript";
const DEFAULT_API_KEY_ENV: &str = "SUPADATA_API_KEY";

/// Supadata: `GET {base}?video_id=ID` with a bearer key.
pub struct SupadataProvider {
    client: ProviderClient,
}

impl SupadataProvider {
    pub const NAME: &'static str = "supadata";

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
impl TranscriptProvider for SupadataProvider {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn fetch(&self, video_id: &str) -> std::result::Result<ProviderTranscript, ProviderUnavailable> {
        fetch_flat(&self.client, video_id).await
    }
}
