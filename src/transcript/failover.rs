//! Ordered provider failover with a minimum-length gate.

use super::{
    SocialKitProvider, SupadataProvider, TranscriptProvider, YoutubeCaptionsProvider, YtioProvider,
};
use crate::archive::sha256_hex;
use crate::catalog::TranscriptRecord;
use crate::config::TranscriptSettings;
use crate::error::Result;
use std::collections::HashMap;
use std::path::PathBuf;

/// A transcript that passed the length gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedTranscript {
    pub text: String,
    /// Name of the provider that delivered it.
    pub provider: String,
    pub language: String,
}

impl FetchedTranscript {
    /// Length in characters.
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    /// Catalog record for this transcript. The checksum covers the exact text.
    pub fn into_record(self, path: Option<PathBuf>) -> TranscriptRecord {
        TranscriptRecord {
            checksum: sha256_hex(&self.text),
            length: self.char_count(),
            on_disk: path.is_some(),
            path,
            text: self.text,
            provider: self.provider,
            language: self.language,
        }
    }
}

/// Tries providers in a fixed order and returns the first acceptable transcript.
pub struct TranscriptFetcher {
    providers: HashMap<String, Box<dyn TranscriptProvider>>,
    order: Vec<String>,
    min_chars: usize,
}

impl TranscriptFetcher {
    /// Build the registry of built-in providers from settings.
    pub fn from_settings(settings: &TranscriptSettings) -> Result<Self> {
        let providers: Vec<Box<dyn TranscriptProvider>> = vec![
            Box::new(SupadataProvider::new(&settings.supadata)?),
            Box::new(YtioProvider::new(&settings.ytio)?),
            Box::new(SocialKitProvider::new(&settings.socialkit)?),
            Box::new(YoutubeCaptionsProvider::new(&settings.youtube_captions)?),
        ];

        Ok(Self::with_providers(
            providers,
            settings.order.clone(),
            settings.min_chars,
        ))
    }

    /// Build a fetcher over an arbitrary provider set.
    pub fn with_providers(
        providers: Vec<Box<dyn TranscriptProvider>>,
        order: Vec<String>,
        min_chars: usize,
    ) -> Self {
        let providers = providers
            .into_iter()
            .map(|p| (p.name().to_string(), p))
            .collect();

        Self {
            providers,
            order,
            min_chars,
        }
    }

    pub fn order(&self) -> &[String] {
        &self.order
    }

    pub fn min_chars(&self) -> usize {
        self.min_chars
    }

    /// Fetch a transcript for `video_id`.
    ///
    /// Providers are consulted strictly in order and the loop stops at the
    /// first transcript of at least `min_chars` characters. Returns `None`
    /// when every provider is unavailable or too short.
    pub async fn fetch(&self, video_id: &str, title: &str) -> Option<FetchedTranscript> {
        for name in &self.order {
            let Some(provider) = self.providers.get(name) else {
                tracing::warn!("Unknown transcript provider '{}', skipping", name);
                continue;
            };

            let transcript = match provider.fetch(video_id).await {
                Ok(t) => t,
                Err(e) => {
                    tracing::debug!("{} for {}", e, video_id);
                    continue;
                }
            };

            let chars = transcript.text.chars().count();
            if chars < self.min_chars {
                tracing::warn!(
                    "{} returned {} chars for '{}' ({}), below minimum {}",
                    name,
                    chars,
                    title,
                    video_id,
                    self.min_chars
                );
                continue;
            }

            tracing::info!(
                "Got transcript for '{}' from {} ({} chars, {})",
                title,
                name,
                chars,
                transcript.language
            );
            return Some(FetchedTranscript {
                text: transcript.text,
                provider: name.clone(),
                language: transcript.language,
            });
        }

        tracing::warn!("No transcript available for '{}' ({})", title, video_id);
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::{ProviderTranscript, ProviderUnavailable};
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    /// Provider that records every call and returns a canned answer.
    struct FakeProvider {
        name: &'static str,
        answer: Option<(String, &'static str)>,
        calls: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl TranscriptProvider for FakeProvider {
        fn name(&self) -> &str {
            self.name
        }

        async fn fetch(
            &self,
            video_id: &str,
        ) -> std::result::Result<ProviderTranscript, ProviderUnavailable> {
            self.calls.lock().unwrap().push(self.name.to_string());
            match &self.answer {
                Some((text, language)) => Ok(ProviderTranscript {
                    text: text.clone(),
                    language: language.to_string(),
                }),
                None => Err(ProviderUnavailable::new(self.name, format!("nothing for {}", video_id))),
            }
        }
    }

    fn fake(
        name: &'static str,
        answer: Option<(String, &'static str)>,
        calls: &Arc<Mutex<Vec<String>>>,
    ) -> Box<dyn TranscriptProvider> {
        Box::new(FakeProvider {
            name,
            answer,
            calls: calls.clone(),
        })
    }

    fn order(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[tokio::test]
    async fn test_falls_over_to_next_provider() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let fetcher = TranscriptFetcher::with_providers(
            vec![
                fake("a", None, &calls),
                fake("b", Some(("x".repeat(500), "fr")), &calls),
            ],
            order(&["a", "b"]),
            400,
        );

        let fetched = fetcher.fetch("vid", "Episode").await.unwrap();
        assert_eq!(fetched.provider, "b");
        assert_eq!(fetched.language, "fr");
        assert_eq!(fetched.char_count(), 500);
        assert_eq!(*calls.lock().unwrap(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_stops_at_first_success() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let fetcher = TranscriptFetcher::with_providers(
            vec![
                fake("a", Some(("y".repeat(10), "en")), &calls),
                fake("b", Some(("z".repeat(20), "en")), &calls),
            ],
            order(&["b", "a"]),
            5,
        );

        let fetched = fetcher.fetch("vid", "Episode").await.unwrap();
        assert_eq!(fetched.provider, "b");
        assert_eq!(*calls.lock().unwrap(), vec!["b"]);
    }

    #[tokio::test]
    async fn test_short_transcript_rejected() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let fetcher = TranscriptFetcher::with_providers(
            vec![fake("a", Some(("w".repeat(50), "en")), &calls)],
            order(&["a"]),
            400,
        );

        assert!(fetcher.fetch("vid", "Episode").await.is_none());
    }

    #[tokio::test]
    async fn test_min_chars_counts_characters_not_bytes() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        // 4 characters, 8 bytes
        let fetcher = TranscriptFetcher::with_providers(
            vec![fake("a", Some(("ääää".to_string(), "de")), &calls)],
            order(&["a"]),
            5,
        );

        assert!(fetcher.fetch("vid", "Episode").await.is_none());
    }

    #[tokio::test]
    async fn test_unknown_provider_skipped() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let fetcher = TranscriptFetcher::with_providers(
            vec![fake("a", Some(("q".repeat(10), "en")), &calls)],
            order(&["nope", "a"]),
            1,
        );

        let fetched = fetcher.fetch("vid", "Episode").await.unwrap();
        assert_eq!(fetched.provider, "a");
    }

    #[tokio::test]
    async fn test_all_unavailable() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let fetcher = TranscriptFetcher::with_providers(
            vec![fake("a", None, &calls), fake("b", None, &calls)],
            order(&["a", "b"]),
            1,
        );

        assert!(fetcher.fetch("vid", "Episode").await.is_none());
        assert_eq!(calls.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_into_record_checksum() {
        let fetched = FetchedTranscript {
            text: "hello".to_string(),
            provider: "a".to_string(),
            language: "en".to_string(),
        };

        let record = fetched.into_record(Some(PathBuf::from("/tmp/x.md")));
        assert_eq!(
            record.checksum,
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
        assert_eq!(record.length, 5);
        assert!(record.on_disk);

        let record = FetchedTranscript {
            text: "hello".to_string(),
            provider: "a".to_string(),
            language: "en".to_string(),
        }
        .into_record(None);
        assert!(!record.on_disk);
    }

    #[test]
    fn test_from_settings_registers_builtins() {
        let fetcher = TranscriptFetcher::from_settings(&TranscriptSettings::default()).unwrap();
        for name in fetcher.order() {
            assert!(fetcher.providers.contains_key(name), "{} not registered", name);
        }
        assert_eq!(fetcher.min_chars(), 400);
    }
}
