//! Configuration settings for Podbrief.

use crate::error::{PodbriefError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub channels: Vec<ChannelSettings>,
    pub fetch: FetchSettings,
    pub transcripts: TranscriptSettings,
    pub summarize: SummarizeSettings,
    pub digest: DigestSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for storing application data.
    pub data_dir: String,
    /// Directory for raw transcript files.
    pub transcript_dir: String,
    /// Directory for summary files.
    pub summary_dir: String,
    /// Path to the SQLite catalog.
    pub db_path: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: "./data".to_string(),
            transcript_dir: "./data/transcripts".to_string(),
            summary_dir: "./data/summaries".to_string(),
            db_path: "./podbrief.db".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// A YouTube channel or playlist to archive.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ChannelSettings {
    /// Display name, also used to pick channel-specific prompts.
    pub name: String,
    /// Channel ID; its uploads playlist is archived.
    pub channel_id: Option<String>,
    /// Playlist ID; takes precedence over `channel_id`.
    pub playlist_id: Option<String>,
}

impl ChannelSettings {
    /// Drop tracking parameters (`&si=...`) and empty values.
    fn normalize(&mut self) {
        self.channel_id = clean_id(self.channel_id.take());
        self.playlist_id = clean_id(self.playlist_id.take());
    }
}

fn clean_id(id: Option<String>) -> Option<String> {
    id.map(|v| v.split('&').next().unwrap_or_default().trim().to_string())
        .filter(|v| !v.is_empty())
}

/// YouTube Data API settings for episode discovery.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchSettings {
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// API root.
    pub base_url: String,
    /// Maximum videos per channel (None = all).
    pub max_per_channel: Option<usize>,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            api_key_env: "YOUTUBE_API_KEY".to_string(),
            base_url: "https://www.googleapis.com/youtube/v3".to_string(),
            max_per_channel: None,
        }
    }
}

/// Per-provider transcript source settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    /// Endpoint root. None = the provider's built-in endpoint.
    pub base_url: Option<String>,
    /// Environment variable holding the API key, for providers that need one.
    pub api_key_env: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Disabled providers always report themselves unavailable.
    pub enabled: bool,
    /// Caption languages to request, in preference order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub languages: Vec<String>,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            base_url: None,
            api_key_env: None,
            timeout_secs: 30,
            enabled: true,
            languages: Vec::new(),
        }
    }
}

impl ProviderSettings {
    fn with_endpoint(base_url: &str, api_key_env: Option<&str>) -> Self {
        Self {
            base_url: Some(base_url.to_string()),
            api_key_env: api_key_env.map(str::to_string),
            ..Self::default()
        }
    }
}

/// Transcript failover settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptSettings {
    /// Provider names, tried in this order.
    pub order: Vec<String>,
    /// Transcripts shorter than this many characters are rejected.
    pub min_chars: usize,
    pub supadata: ProviderSettings,
    pub ytio: ProviderSettings,
    pub socialkit: ProviderSettings,
    pub youtube_captions: ProviderSettings,
}

impl Default for TranscriptSettings {
    fn default() -> Self {
        Self {
            order: vec![
                "supadata".to_string(),
                "ytio".to_string(),
                "socialkit".to_string(),
                "youtube_captions".to_string(),
            ],
            min_chars: 400,
            supadata: ProviderSettings::with_endpoint(
                "https://api.supadata.ai/v1/youtube/transcript",
                Some("SUPADATA_API_KEY"),
            ),
            ytio: ProviderSettings::with_endpoint("https://www.youtube-transcript.io/api", None),
            socialkit: ProviderSettings::with_endpoint(
                "https://api.socialkit.dev/youtube-transcript",
                Some("SOCIALKIT_API_KEY"),
            ),
            youtube_captions: ProviderSettings {
                languages: vec!["en".to_string()],
                ..ProviderSettings::with_endpoint("https://www.youtube.com/api/timedtext", None)
            },
        }
    }
}

impl TranscriptSettings {
    /// All provider blocks, keyed by their registry name.
    pub fn providers(&self) -> [(&'static str, &ProviderSettings); 4] {
        [
            ("supadata", &self.supadata),
            ("ytio", &self.ytio),
            ("socialkit", &self.socialkit),
            ("youtube_captions", &self.youtube_captions),
        ]
    }
}

/// Local summarization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarizeSettings {
    /// Ollama server root.
    pub host: String,
    /// Model used for generation.
    pub model: String,
    /// Default prompt template file.
    pub prompt_path: String,
    /// Channel name -> prompt template file.
    pub channel_prompts: HashMap<String, String>,
    /// Per-attempt request timeout in seconds.
    pub timeout_secs: u64,
    /// Total generation attempts.
    pub retry_attempts: u32,
}

impl Default for SummarizeSettings {
    fn default() -> Self {
        Self {
            host: "http://localhost:11434".to_string(),
            model: "llama3.1:8b".to_string(),
            prompt_path: "./prompts/default_prompt.md".to_string(),
            channel_prompts: HashMap::new(),
            timeout_secs: 300,
            retry_attempts: 3,
        }
    }
}

/// Digest settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DigestSettings {
    /// Look-back window in days.
    pub days: u32,
    /// Where digest previews are written.
    pub output_dir: String,
}

impl Default for DigestSettings {
    fn default() -> Self {
        Self {
            days: 7,
            output_dir: "./data/digests".to_string(),
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PromptSettings {
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or the default location if None.
    ///
    /// Falls back to `<file>.example` when the file itself is missing.
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let mut config_path = Self::resolve_path(path);

        if !config_path.exists() {
            let example = example_path(&config_path);
            if example.exists() {
                warn!(
                    "Config file not found at {}, using {}",
                    config_path.display(),
                    example.display()
                );
                config_path = example;
            } else {
                return Err(PodbriefError::Config(format!(
                    "Configuration file not found: {}",
                    config_path.display()
                )));
            }
        }

        let content = std::fs::read_to_string(&config_path)?;
        let settings = Self::from_toml(&content)?;
        info!("Configuration loaded from {}", config_path.display());
        Ok(settings)
    }

    /// Parse settings from TOML text, interpolating `${VAR}` references first.
    pub fn from_toml(content: &str) -> Result<Self> {
        let mut value: toml::Value = toml::from_str(content)?;
        interpolate_env(&mut value);

        let mut settings: Settings = value.try_into()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check channel identities and provider endpoints.
    pub fn validate(&mut self) -> Result<()> {
        for channel in &mut self.channels {
            channel.normalize();
            if channel.channel_id.is_none() && channel.playlist_id.is_none() {
                return Err(PodbriefError::Config(format!(
                    "Channel '{}' must provide either channel_id or playlist_id",
                    channel.name
                )));
            }
        }

        if self.channels.is_empty() {
            warn!("No channels configured");
        }

        for (name, provider) in self.transcripts.providers() {
            if let Some(base_url) = &provider.base_url {
                url::Url::parse(base_url).map_err(|e| {
                    PodbriefError::Config(format!("Invalid base_url for provider '{}': {}", name, e))
                })?;
            }
        }

        Ok(())
    }

    /// Resolve the configuration file path.
    ///
    /// An explicit path wins; otherwise `./podbrief.toml` if present, else the
    /// per-user config directory.
    pub fn resolve_path(path: Option<&Path>) -> PathBuf {
        match path {
            Some(p) => Self::expand_path(&p.to_string_lossy()),
            None => {
                let local = PathBuf::from("podbrief.toml");
                if local.exists() {
                    local
                } else {
                    Self::default_config_path()
                }
            }
        }
    }

    /// Get the per-user configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("podbrief")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded data directory path.
    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.data_dir)
    }

    /// Get the expanded transcript directory path.
    pub fn transcript_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.transcript_dir)
    }

    /// Get the expanded summary directory path.
    pub fn summary_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.summary_dir)
    }

    /// Get the expanded catalog path.
    pub fn db_path(&self) -> PathBuf {
        Self::expand_path(&self.general.db_path)
    }

    /// Get the expanded digest output directory.
    pub fn digest_dir(&self) -> PathBuf {
        Self::expand_path(&self.digest.output_dir)
    }
}

fn example_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".example");
    path.with_file_name(name)
}

/// Replace `${VAR}` references in every string value. Unset variables become empty.
fn interpolate_env(value: &mut toml::Value) {
    match value {
        toml::Value::String(s) if s.contains('$') => {
            *s = expand_env(s);
        }
        toml::Value::Array(items) => items.iter_mut().for_each(interpolate_env),
        toml::Value::Table(table) => {
            for (_, item) in table.iter_mut() {
                interpolate_env(item);
            }
        }
        _ => {}
    }
}

/// Expand environment references in a single string.
pub fn expand_env(input: &str) -> String {
    shellexpand::env_with_context_no_errors(input, |var: &str| -> Option<String> {
        match std::env::var(var) {
            Ok(v) => Some(v),
            Err(_) => {
                warn!("Environment variable '{}' not found, using empty string", var);
                Some(String::new())
            }
        }
    })
    .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.general.db_path, "./podbrief.db");
        assert!(settings.channels.is_empty());
        assert_eq!(settings.transcripts.min_chars, 400);
        assert_eq!(settings.transcripts.order.len(), 4);
        assert_eq!(settings.summarize.retry_attempts, 3);
        assert_eq!(
            settings.transcripts.supadata.api_key_env.as_deref(),
            Some("SUPADATA_API_KEY")
        );
    }

    #[test]
    fn test_env_interpolation() {
        std::env::set_var("PODBRIEF_TEST_DB_NAME", "archive");
        let settings = Settings::from_toml(
            r#"
            [general]
            db_path = "${PODBRIEF_TEST_DB_NAME}.db"
            summary_dir = "${PODBRIEF_TEST_SURELY_UNSET}/summaries"
            "#,
        )
        .unwrap();

        assert_eq!(settings.general.db_path, "archive.db");
        assert_eq!(settings.general.summary_dir, "/summaries");
    }

    #[test]
    fn test_channel_ids_are_cleaned() {
        let settings = Settings::from_toml(
            r#"
            [[channels]]
            name = "Show"
            playlist_id = "PL123&si=tracking"
            "#,
        )
        .unwrap();

        assert_eq!(settings.channels[0].playlist_id.as_deref(), Some("PL123"));
        assert!(settings.channels[0].channel_id.is_none());
    }

    #[test]
    fn test_channel_without_ids_is_rejected() {
        let result = Settings::from_toml(
            r#"
            [[channels]]
            name = "Nameless"
            channel_id = ""
            "#,
        );
        assert!(matches!(result, Err(PodbriefError::Config(_))));
    }

    #[test]
    fn test_partial_provider_table_keeps_other_defaults() {
        let settings = Settings::from_toml(
            r#"
            [transcripts]
            order = ["ytio"]
            min_chars = 100

            [transcripts.supadata]
            enabled = false
            "#,
        )
        .unwrap();

        assert_eq!(settings.transcripts.order, vec!["ytio".to_string()]);
        assert!(!settings.transcripts.supadata.enabled);
        assert!(settings.transcripts.ytio.base_url.is_some());
    }

    #[test]
    fn test_invalid_provider_url_is_rejected() {
        let result = Settings::from_toml(
            r#"
            [transcripts.ytio]
            base_url = "not a url"
            "#,
        );
        assert!(matches!(result, Err(PodbriefError::Config(_))));
    }

    #[test]
    fn test_example_fallback_and_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("podbrief.toml");

        assert!(matches!(
            Settings::load_from(Some(path.as_path())),
            Err(PodbriefError::Config(_))
        ));

        std::fs::write(
            dir.path().join("podbrief.toml.example"),
            "[summarize]\nmodel = \"mistral\"\n",
        )
        .unwrap();
        let settings = Settings::load_from(Some(path.as_path())).unwrap();
        assert_eq!(settings.summarize.model, "mistral");
    }
}
