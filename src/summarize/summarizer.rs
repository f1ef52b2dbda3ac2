//! Transcript to markdown summary.

use super::OllamaClient;
use crate::config::{Prompts, Settings};
use crate::error::Result;
use std::collections::HashMap;
use std::path::PathBuf;

/// Transcripts longer than this many characters are cut before prompting.
pub const MAX_TRANSCRIPT_CHARS: usize = 8000;

const TRUNCATION_MARKER: &str = "...\n[TRANSCRIPT TRUNCATED]";
const DEFAULT_HEADING: &str = "# Summary\n\n";

/// Renders prompts and post-processes model output.
///
/// Channel templates are resolved on first use and cached for the life of the
/// summarizer.
pub struct Summarizer {
    client: OllamaClient,
    prompts: Prompts,
    default_template: String,
    channel_prompts: HashMap<String, PathBuf>,
    cache: HashMap<String, String>,
}

impl Summarizer {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let client = OllamaClient::from_settings(&settings.summarize)?;
        let default_template =
            Prompts::load_template(&Settings::expand_path(&settings.summarize.prompt_path));
        let channel_prompts = settings
            .summarize
            .channel_prompts
            .iter()
            .map(|(channel, path)| (channel.clone(), Settings::expand_path(path)))
            .collect();

        Ok(Self::new(
            client,
            Prompts::new(&settings.prompts.variables),
            default_template,
            channel_prompts,
        ))
    }

    pub fn new(
        client: OllamaClient,
        prompts: Prompts,
        default_template: String,
        channel_prompts: HashMap<String, PathBuf>,
    ) -> Self {
        Self {
            client,
            prompts,
            default_template,
            channel_prompts,
            cache: HashMap::new(),
        }
    }

    pub fn client(&self) -> &OllamaClient {
        &self.client
    }

    pub fn model(&self) -> &str {
        self.client.model()
    }

    /// Effective template for a channel, resolved once per channel.
    fn template_for(&mut self, channel: Option<&str>) -> &str {
        let Some(channel) = channel else {
            return &self.default_template;
        };

        if !self.cache.contains_key(channel) {
            let template = match self.channel_prompts.get(channel) {
                Some(path) => match std::fs::read_to_string(path) {
                    Ok(template) => {
                        tracing::info!("Using prompt {} for {}", path.display(), channel);
                        template
                    }
                    Err(e) => {
                        tracing::warn!(
                            "Prompt for {} not readable at {} ({}), using default",
                            channel,
                            path.display(),
                            e
                        );
                        self.default_template.clone()
                    }
                },
                None => self.default_template.clone(),
            };
            self.cache.insert(channel.to_string(), template);
        }

        self.cache
            .get(channel)
            .map(String::as_str)
            .unwrap_or(self.default_template.as_str())
    }

    /// Prompt that would be sent for a transcript.
    pub fn build_prompt(&mut self, transcript: &str, channel: Option<&str>, title: &str) -> String {
        let mut vars = HashMap::new();
        vars.insert("transcript".to_string(), truncate_transcript(transcript));
        vars.insert("channel".to_string(), channel.unwrap_or_default().to_string());
        vars.insert("title".to_string(), title.to_string());

        let template = self.template_for(channel).to_string();
        self.prompts.render_with_custom(&template, &vars)
    }

    /// Summarize a transcript. `None` for blank input or when generation fails.
    pub async fn summarize(
        &mut self,
        transcript: &str,
        channel: Option<&str>,
        title: &str,
    ) -> Option<String> {
        if transcript.trim().is_empty() {
            tracing::warn!("Empty transcript for '{}', not summarizing", title);
            return None;
        }

        let prompt = self.build_prompt(transcript, channel, title);
        let raw = self.client.generate(&prompt, None).await?;
        Some(clean_summary(&raw))
    }
}

/// Cut to [`MAX_TRANSCRIPT_CHARS`] characters and mark the cut.
pub fn truncate_transcript(text: &str) -> String {
    match text.char_indices().nth(MAX_TRANSCRIPT_CHARS) {
        Some((cut, _)) => format!("{}{}", &text[..cut], TRUNCATION_MARKER),
        None => text.to_string(),
    }
}

/// Trim and make sure the summary opens with a markdown heading.
pub fn clean_summary(raw: &str) -> String {
    let text = raw.trim();
    if text.starts_with('#') {
        text.to_string()
    } else {
        format!("{}{}", DEFAULT_HEADING, text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::serve;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tempfile::TempDir;

    fn offline_client() -> OllamaClient {
        OllamaClient::with_timing(
            "http://127.0.0.1:9",
            "m",
            Duration::from_millis(200),
            1,
            Duration::from_millis(1),
        )
        .unwrap()
    }

    #[test]
    fn test_clean_summary_adds_heading() {
        assert_eq!(clean_summary("Key point one."), "# Summary\n\nKey point one.");
        assert_eq!(clean_summary("\n## Notes\n- a\n"), "## Notes\n- a");
    }

    #[test]
    fn test_truncate_transcript() {
        let short = "a".repeat(MAX_TRANSCRIPT_CHARS);
        assert_eq!(truncate_transcript(&short), short);

        let long = "é".repeat(MAX_TRANSCRIPT_CHARS + 10);
        let cut = truncate_transcript(&long);
        assert!(cut.ends_with("[TRANSCRIPT TRUNCATED]"));
        assert_eq!(
            cut.chars().count(),
            MAX_TRANSCRIPT_CHARS + TRUNCATION_MARKER.chars().count()
        );
    }

    #[test]
    fn test_channel_template_cached() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tech.md");
        std::fs::write(&path, "TECH {{channel}}: {{transcript}}").unwrap();

        let mut channel_prompts = HashMap::new();
        channel_prompts.insert("Tech Talk".to_string(), path.clone());
        let mut summarizer = Summarizer::new(
            offline_client(),
            Prompts::default(),
            "DEFAULT {{title}}: {transcript}".to_string(),
            channel_prompts,
        );

        assert_eq!(
            summarizer.build_prompt("words", Some("Tech Talk"), "Ep"),
            "TECH Tech Talk: words"
        );

        // Cached: later edits to the file are not picked up.
        std::fs::write(&path, "CHANGED").unwrap();
        assert_eq!(
            summarizer.build_prompt("more", Some("Tech Talk"), "Ep"),
            "TECH Tech Talk: more"
        );

        assert_eq!(
            summarizer.build_prompt("words", Some("Other"), "Ep 2"),
            "DEFAULT Ep 2: words"
        );
        assert_eq!(summarizer.build_prompt("x", None, "Ep 3"), "DEFAULT Ep 3: x");
    }

    #[test]
    fn test_missing_channel_file_uses_default() {
        let mut channel_prompts = HashMap::new();
        channel_prompts.insert("Gone".to_string(), PathBuf::from("/nonexistent/prompt.md"));
        let mut summarizer = Summarizer::new(
            offline_client(),
            Prompts::default(),
            "custom default {{transcript}}".to_string(),
            channel_prompts,
        );

        assert_eq!(
            summarizer.build_prompt("t", Some("Gone"), "Ep"),
            "custom default t"
        );
    }

    #[test]
    fn test_code_in_transcript_is_not_substituted() {
        let mut summarizer = Summarizer::new(
            offline_client(),
            Prompts::default(),
            "{{title}}\n{{transcript}}".to_string(),
            HashMap::new(),
        );

        assert_eq!(
            summarizer.build_prompt("the code was fn f() {title} end", None, "EPISODE TITLE"),
            "EPISODE TITLE\nthe code was fn f() {title} end"
        );
    }

    #[tokio::test]
    async fn test_blank_transcript_skips_generation() {
        let mut summarizer = Summarizer::new(
            offline_client(),
            Prompts::default(),
            "{{transcript}}".to_string(),
            HashMap::new(),
        );
        assert!(summarizer.summarize("  \n ", None, "Ep").await.is_none());
    }

    #[tokio::test]
    async fn test_summarize_end_to_end() {
        let seen = Arc::new(Mutex::new(String::new()));
        let captured = seen.clone();
        let router = Router::new().route(
            "/api/generate",
            post(move |Json(body): Json<Value>| async move {
                *captured.lock().unwrap() = body["prompt"].as_str().unwrap_or_default().to_string();
                Json(json!({"response": "Key point one."}))
            }),
        );
        let base = serve(router).await;

        let client =
            OllamaClient::with_timing(&base, "m", Duration::from_secs(2), 3, Duration::from_millis(1))
                .unwrap();
        let mut vars = HashMap::new();
        vars.insert("audience".to_string(), "engineers".to_string());
        let mut summarizer = Summarizer::new(
            client,
            Prompts::new(&vars),
            "For {{audience}}: {{transcript}}".to_string(),
            HashMap::new(),
        );

        let summary = summarizer
            .summarize("the transcript", Some("Chan"), "Ep")
            .await
            .unwrap();
        assert_eq!(summary, "# Summary\n\nKey point one.");
        assert_eq!(*seen.lock().unwrap(), "For engineers: the transcript");
    }
}
