//! LLM completion adapter.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;

use super::provider::{build_request, extract_text};
use super::retry::{RetryingCaller, Sleeper, TokioSleeper};
use crate::application::ports::{CompletionPort, UpstreamError};
use crate::domain::backoff::BackoffConfig;
use crate::infrastructure::config::{AiProvider, AiSettings, ApiKey};

/// [`CompletionPort`] over Gemini, `OpenAI` or Anthropic.
#[derive(Clone)]
pub struct LlmClient {
    caller: RetryingCaller,
    provider: AiProvider,
    api_key: Option<ApiKey>,
    model: String,
    base_url: String,
    system_prompt: String,
    backoff: BackoffConfig,
}

impl LlmClient {
    /// Create a client that sleeps on the tokio timer between retries.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built.
    pub fn new(settings: &AiSettings) -> Result<Self, UpstreamError> {
        Self::with_sleeper(settings, Arc::new(TokioSleeper))
    }

    /// Create a client with a custom [`Sleeper`].
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built.
    pub fn with_sleeper(
        settings: &AiSettings,
        sleeper: Arc<dyn Sleeper>,
    ) -> Result<Self, UpstreamError> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| UpstreamError::Network(e.to_string()))?;

        Ok(Self {
            caller: RetryingCaller::new(client, sleeper, settings.provider.as_str()),
            provider: settings.provider,
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
            base_url: settings.base_url.clone(),
            system_prompt: settings.system_prompt.clone(),
            backoff: BackoffConfig::new(settings.max_retries, settings.initial_backoff),
        })
    }
}

#[async_trait]
impl CompletionPort for LlmClient {
    fn provider(&self) -> &'static str {
        self.provider.as_str()
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn complete(&self, prompt: &str) -> Result<Option<String>, UpstreamError> {
        let key = self
            .api_key
            .as_ref()
            .ok_or(UpstreamError::MissingCredential(self.provider.as_str()))?;

        let spec = build_request(
            self.provider,
            &self.base_url,
            &self.model,
            key.expose(),
            &self.system_prompt,
            prompt,
        );
        let body = self.caller.call(&spec, self.backoff).await?;
        Ok(extract_text(self.provider, &body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct NoSleep;

    #[async_trait]
    impl Sleeper for NoSleep {
        async fn sleep(&self, _duration: Duration) {}
    }

    fn settings(provider: AiProvider, base_url: String, key: Option<&str>) -> AiSettings {
        AiSettings {
            provider,
            api_key: key.and_then(ApiKey::new),
            model: provider.default_model().to_string(),
            base_url,
            ..AiSettings::default()
        }
    }

    #[tokio::test]
    async fn gemini_round_trip() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-1.5-flash:generateContent"))
            .and(header("x-goog-api-key", "g-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{"content": {"parts": [{"text": "Renforcer AAPL"}]}}]
            })))
            .mount(&server)
            .await;

        let client = LlmClient::with_sleeper(
            &settings(AiProvider::Gemini, server.uri(), Some("g-key")),
            Arc::new(NoSleep),
        )
        .unwrap();
        let text = client.complete("Analyse").await.unwrap();
        assert_eq!(text.as_deref(), Some("Renforcer AAPL"));
    }

    #[tokio::test]
    async fn anthropic_without_text_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"content": []})))
            .mount(&server)
            .await;

        let client = LlmClient::with_sleeper(
            &settings(AiProvider::Anthropic, server.uri(), Some("a-key")),
            Arc::new(NoSleep),
        )
        .unwrap();
        assert_eq!(client.complete("x").await.unwrap(), None);
    }

    #[tokio::test]
    async fn missing_key_is_not_sent() {
        let client = LlmClient::new(&settings(
            AiProvider::OpenAi,
            "http://127.0.0.1:9".to_string(),
            None,
        ))
        .unwrap();
        assert!(!client.is_configured());
        assert_eq!(client.provider(), "openai");
        assert_eq!(
            client.complete("x").await,
            Err(UpstreamError::MissingCredential("openai"))
        );
    }
}
