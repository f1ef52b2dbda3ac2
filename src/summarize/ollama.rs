//! Ollama generation client with bounded retries.

use crate::config::SummarizeSettings;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Base delay for exponential backoff.
const BASE_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Timeout for the health check.
const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

/// Why a single generation attempt failed.
#[derive(Debug)]
enum AttemptError {
    Timeout,
    Request(String),
    Empty,
    Parse(String),
}

/// Client for a local Ollama server.
pub struct OllamaClient {
    host: Url,
    model: String,
    retry_attempts: u32,
    base_delay: Duration,
    http: reqwest::Client,
}

impl OllamaClient {
    pub fn from_settings(settings: &SummarizeSettings) -> Result<Self> {
        Self::with_timing(
            &settings.host,
            &settings.model,
            Duration::from_secs(settings.timeout_secs),
            settings.retry_attempts,
            BASE_RETRY_DELAY,
        )
    }

    /// Build a client with explicit request timeout and backoff base.
    pub fn with_timing(
        host: &str,
        model: &str,
        timeout: Duration,
        retry_attempts: u32,
        base_delay: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            host: Url::parse(host)?,
            model: model.to_string(),
            retry_attempts: retry_attempts.max(1),
            base_delay,
            http,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.host.as_str().trim_end_matches('/'), path)
    }

    /// Probe `/api/tags`. Advisory only; callers go on either way.
    pub async fn check_health(&self) -> bool {
        let result = self
            .http
            .get(self.endpoint("api/tags"))
            .timeout(HEALTH_TIMEOUT)
            .send()
            .await
            .and_then(|r| r.error_for_status());

        match result {
            Ok(_) => {
                debug!("Ollama reachable at {}", self.host);
                true
            }
            Err(e) => {
                warn!("Ollama health check failed at {}: {}", self.host, e);
                false
            }
        }
    }

    async fn attempt(
        &self,
        prompt: &str,
        system: Option<&str>,
    ) -> std::result::Result<String, AttemptError> {
        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            system,
        };

        let response = self
            .http
            .post(self.endpoint("api/generate"))
            .json(&request)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(classify)?;

        let body = response.text().await.map_err(classify)?;
        let parsed: GenerateResponse =
            serde_json::from_str(&body).map_err(|e| AttemptError::Parse(e.to_string()))?;

        let text = parsed.response.trim();
        if text.is_empty() {
            return Err(AttemptError::Empty);
        }
        Ok(text.to_string())
    }

    /// Generate a completion, retrying transient failures.
    ///
    /// Timeouts and request failures back off `base * 2^attempt` before the
    /// next attempt. Empty output is retried immediately. A malformed response
    /// aborts at once. Returns `None` when no attempt produced text.
    pub async fn generate(&self, prompt: &str, system: Option<&str>) -> Option<String> {
        for attempt in 0..self.retry_attempts {
            let backoff = match self.attempt(prompt, system).await {
                Ok(text) => {
                    info!("Generated {} chars with {}", text.chars().count(), self.model);
                    return Some(text);
                }
                Err(AttemptError::Parse(e)) => {
                    warn!("Unparseable Ollama response, giving up: {}", e);
                    return None;
                }
                Err(AttemptError::Empty) => {
                    warn!(
                        "Empty response from {} (attempt {}/{})",
                        self.model,
                        attempt + 1,
                        self.retry_attempts
                    );
                    false
                }
                Err(AttemptError::Timeout) => {
                    warn!(
                        "Ollama request timed out (attempt {}/{})",
                        attempt + 1,
                        self.retry_attempts
                    );
                    true
                }
                Err(AttemptError::Request(e)) => {
                    warn!(
                        "Ollama request failed (attempt {}/{}): {}",
                        attempt + 1,
                        self.retry_attempts,
                        e
                    );
                    true
                }
            };

            if backoff && attempt + 1 < self.retry_attempts {
                let delay = self.base_delay * 2u32.saturating_pow(attempt);
                debug!("Retrying in {:?}", delay);
                tokio::time::sleep(delay).await;
            }
        }

        warn!("Generation failed after {} attempts", self.retry_attempts);
        None
    }
}

fn classify(e: reqwest::Error) -> AttemptError {
    if e.is_timeout() {
        AttemptError::Timeout
    } else {
        AttemptError::Request(e.to_string())
    }
}
