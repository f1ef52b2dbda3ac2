//! HTTP plumbing shared by the transcript providers.

use super::ProviderUnavailable;
use crate::config::ProviderSettings;
use crate::error::Result;
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

/// Endpoint, credential lookup and HTTP client for one provider.
pub(crate) struct ProviderClient {
    name: &'static str,
    enabled: bool,
    api_key_env: Option<String>,
    base_url: Url,
    http: reqwest::Client,
}

impl ProviderClient {
    /// Build a client from settings, filling in the provider's built-in endpoint
    /// and key variable when the settings leave them out.
    pub fn new(
        name: &'static str,
        settings: &ProviderSettings,
        default_base_url: &str,
        default_api_key_env: Option<&str>,
    ) -> Result<Self> {
        let base_url = Url::parse(settings.base_url.as_deref().unwrap_or(default_base_url))?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self {
            name,
            enabled: settings.enabled,
            api_key_env: settings
                .api_key_env
                .clone()
                .or_else(|| default_api_key_env.map(str::to_string)),
            base_url,
            http,
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn unavailable(&self, reason: impl Into<String>) -> ProviderUnavailable {
        ProviderUnavailable::new(self.name, reason)
    }

    pub fn ensure_enabled(&self) -> std::result::Result<(), ProviderUnavailable> {
        if self.enabled {
            Ok(())
        } else {
            Err(self.unavailable("provider disabled"))
        }
    }

    /// Read the API key from the configured environment variable.
    pub fn api_key(&self) -> std::result::Result<String, ProviderUnavailable> {
        let var = self
            .api_key_env
            .as_deref()
            .ok_or_else(|| self.unavailable("API key not configured"))?;

        match std::env::var(var) {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(self.unavailable(format!("API key not set in {}", var))),
        }
    }

    /// `base_url` with the given path appended.
    pub fn endpoint(&self, path: &str) -> std::result::Result<Url, ProviderUnavailable> {
        let joined = format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        Url::parse(&joined).map_err(|e| self.unavailable(format!("bad endpoint: {}", e)))
    }

    /// GET a URL and decode its JSON body. Non-2xx statuses count as failures.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        bearer: Option<&str>,
    ) -> std::result::Result<T, ProviderUnavailable> {
        let mut request = self.http.get(url);
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| self.unavailable(format!("request failed: {}", e)))?;

        let body = response
            .text()
            .await
            .map_err(|e| self.unavailable(format!("reading response failed: {}", e)))?;

        serde_json::from_str(&body)
            .map_err(|e| self.unavailable(format!("response parse error: {}", e)))
    }
}

/// Reject empty or whitespace-only text.
pub(crate) fn non_empty(
    client: &ProviderClient,
    text: String,
) -> std::result::Result<String, ProviderUnavailable> {
    if text.trim().is_empty() {
        Err(client.unavailable("returned empty transcript"))
    } else {
        Ok(text)
    }
}

/// Response shape shared by the keyed providers: `{ "transcript": ..., "language": ... }`.
#[derive(Debug, serde::Deserialize)]
pub(crate) struct FlatTranscript {
    #[serde(default)]
    pub transcript: String,
    #[serde(default)]
    pub language: Option<String>,
}

/// Fetch from a keyed `?video_id=` endpoint returning [`FlatTranscript`].
pub(crate) async fn fetch_flat(
    client: &ProviderClient,
    video_id: &str,
) -> std::result::Result<super::ProviderTranscript, ProviderUnavailable> {
    client.ensure_enabled()?;
    let api_key = client.api_key()?;

    let mut url = client.base_url().clone();
    url.query_pairs_mut().append_pair("video_id", video_id);

    let body: FlatTranscript = client.get_json(url, Some(api_key.as_str())).await?;
    let text = non_empty(client, body.transcript)?;
    let language = body
        .language
        .filter(|l| !l.trim().is_empty())
        .unwrap_or_else(|| "en".to_string());

    tracing::debug!("Fetched transcript from {} for {}", client.name(), video_id);
    Ok(super::ProviderTranscript { text, language })
}
