//! YouTube timed-text captions provider.

use super::client::ProviderClient;
use super::{ProviderTranscript, ProviderUnavailable, TranscriptProvider};
use crate::config::ProviderSettings;
use crate::error::Result;
use async_trait::async_trait;
use serde::Deserialize;

const DEFAULT_BASE_URL: &str = "https://www.youtube.com/api/timedtext";

/// Public captions: `GET {base}?v=ID&lang=L&fmt=json3`, one request per
/// configured language until one yields text.
pub struct YoutubeCaptionsProvider {
    client: ProviderClient,
    languages: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Json3 {
    #[serde(default)]
    events: Vec<Json3Event>,
}

#[derive(Debug, Default, Deserialize)]
struct Json3Event {
    #[serde(default)]
    segs: Vec<Json3Seg>,
}

#[derive(Debug, Default, Deserialize)]
struct Json3Seg {
    #[serde(default)]
    utf8: String,
}

impl Json3 {
    fn into_text(self) -> String {
        self.events
            .into_iter()
            .map(|event| {
                event
                    .segs
                    .into_iter()
                    .map(|s| s.utf8)
                    .collect::<String>()
                    .replace('\n', " ")
                    .trim()
                    .to_string()
            })
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl YoutubeCaptionsProvider {
    pub const NAME: &'static str = "youtube_captions";

    pub fn new(settings: &ProviderSettings) -> Result<Self> {
        let languages = if settings.languages.is_empty() {
            vec!["en".to_string()]
        } else {
            settings.languages.clone()
        };

        Ok(Self {
            client: ProviderClient::new(Self::NAME, settings, DEFAULT_BASE_URL, None)?,
            languages,
        })
    }
}

#[async_trait]
impl TranscriptProvider for YoutubeCaptionsProvider {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn fetch(&self, video_id: &str) -> std::result::Result<ProviderTranscript, ProviderUnavailable> {
        self.client.ensure_enabled()?;

        let mut last_reason = String::from("no caption languages configured");
        for lang in &self.languages {
            let mut url = self.client.base_url().clone();
            url.query_pairs_mut()
                .append_pair("v", video_id)
                .append_pair("lang", lang)
                .append_pair("fmt", "json3");

            match self.client.get_json::<Json3>(url, None).await {
                Ok(captions) => {
                    let text = captions.into_text();
                    if !text.is_empty() {
                        return Ok(ProviderTranscript {
                            text,
                            language: lang.clone(),
                        });
                    }
                    last_reason = format!("no {} captions", lang);
                }
                Err(e) => {
                    tracing::debug!("Captions in {} failed for {}: {}", lang, video_id, e.reason);
                    last_reason = e.reason;
                }
            }
        }

        Err(self.client.unavailable(last_reason))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::serve;
    use axum::extract::Query;
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;
    use std::collections::HashMap;

    fn provider(base: String, languages: &[&str]) -> YoutubeCaptionsProvider {
        YoutubeCaptionsProvider::new(&ProviderSettings {
            base_url: Some(base),
            languages: languages.iter().map(|l| l.to_string()).collect(),
            ..ProviderSettings::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_falls_through_languages() {
        let router = Router::new().route(
            "/timedtext",
            get(|Query(q): Query<HashMap<String, String>>| async move {
                assert_eq!(q.get("fmt").map(String::as_str), Some("json3"));
                match q.get("lang").map(String::as_str) {
                    Some("de") => Ok(Json(json!({
                        "events": [
                            {"segs": [{"utf8": "Hallo"}, {"utf8": " Welt\n"}]},
                            {"tStartMs": 100},
                            {"segs": [{"utf8": "zweite Zeile"}]}
                        ]
                    }))),
                    Some("en") => Ok(Json(json!({"events": []}))),
                    _ => Err(StatusCode::NOT_FOUND),
                }
            }),
        );
        let base = serve(router).await;

        let transcript = provider(format!("{}/timedtext", base), &["fr", "en", "de"])
            .fetch("v1")
            .await
            .unwrap();
        assert_eq!(transcript.language, "de");
        assert_eq!(transcript.text, "Hallo Welt zweite Zeile");
    }

    #[tokio::test]
    async fn test_no_language_matches() {
        let router = Router::new().route(
            "/timedtext",
            get(|| async { StatusCode::NOT_FOUND }),
        );
        let base = serve(router).await;

        let err = provider(format!("{}/timedtext", base), &[])
            .fetch("v1")
            .await
            .unwrap_err();
        assert_eq!(err.provider, "youtube_captions");
    }
}
