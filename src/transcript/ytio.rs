//! youtube-transcript.io provider.

use super::client::{non_empty, ProviderClient};
use super::{ProviderTranscript, ProviderUnavailable, TranscriptProvider};
use crate::config::ProviderSettings;
use crate::error::Result;
use async_trait::async_trait;
use serde::Deserialize;

const DEFAULT_BASE_URL: &str = "https://www.youtube-transcript.io/api";

/// youtube-transcript.io: `GET {base}/transcript?videoId=ID`, no key.
///
/// The endpoint only serves English captions.
pub struct YtioProvider {
    client: ProviderClient,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum YtioResponse {
    Segments(Vec<YtioSegment>),
    Flat { transcript: String },
}

#[derive(Debug, Deserialize)]
struct YtioSegment {
    #[serde(default, alias = "transcript")]
    text: String,
}

impl YtioResponse {
    fn into_text(self) -> String {
        match self {
            YtioResponse::Segments(segments) => segments
                .into_iter()
                .map(|s| s.text.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect::<Vec<_>>()
                .join(" "),
            YtioResponse::Flat { transcript } => transcript,
        }
    }
}

impl YtioProvider {
    pub const NAME: &'static str = "ytio";

    pub fn new(settings: &ProviderSettings) -> Result<Self> {
        Ok(Self {
            client: ProviderClient::new(Self::NAME, settings, DEFAULT_BASE_URL, None)?,
        })
    }
}

#[async_trait]
impl TranscriptProvider for YtioProvider {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn fetch(&self, video_id: &str) -> std::result::Result<ProviderTranscript, ProviderUnavailable> {
        self.client.ensure_enabled()?;

        let mut url = self.client.endpoint("transcript")?;
        url.query_pairs_mut().append_pair("videoId", video_id);

        let body: YtioResponse = self.client.get_json(url, None).await?;
        let text = non_empty(&self.client, body.into_text())?;

        Ok(ProviderTranscript {
            text,
            language: "en".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::serve;
    use axum::extract::Query;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;
    use std::collections::HashMap;

    fn provider(base: &str) -> YtioProvider {
        YtioProvider::new(&ProviderSettings {
            base_url: Some(base.to_string()),
            ..ProviderSettings::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_joins_segments() {
        let router = Router::new().route(
            "/api/transcript",
            get(|Query(q): Query<HashMap<String, String>>| async move {
                assert_eq!(q.get("videoId").map(String::as_str), Some("xyz"));
                Json(json!([
                    {"text": "first part", "start": 0.0},
                    {"text": " "},
                    {"text": "second part", "start": 2.5}
                ]))
            }),
        );
        let base = serve(router).await;

        let transcript = provider(&format!("{}/api", base)).fetch("xyz").await.unwrap();
        assert_eq!(transcript.text, "first part second part");
        assert_eq!(transcript.language, "en");
    }

    #[tokio::test]
    async fn test_accepts_flat_transcript() {
        let router = Router::new().route(
            "/api/transcript",
            get(|| async { Json(json!({"transcript": "whole thing"})) }),
        );
        let base = serve(router).await;

        let transcript = provider(&format!("{}/api/", base)).fetch("xyz").await.unwrap();
        assert_eq!(transcript.text, "whole thing");
    }

    #[tokio::test]
    async fn test_empty_segments_unavailable() {
        let router = Router::new().route("/api/transcript", get(|| async { Json(json!([])) }));
        let base = serve(router).await;

        let err = provider(&format!("{}/api", base)).fetch("xyz").await.unwrap_err();
        assert_eq!(err.provider, "ytio");
    }
}
