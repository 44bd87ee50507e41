//! Advisor Service
//!
//! Forwards a free-text prompt to the configured LLM provider and returns
//! the raw model text. The prompt and answer are opaque to the proxy.

use std::sync::Arc;

use thiserror::Error;

use crate::application::ports::{CompletionPort, UpstreamError};

/// AI completion errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AdvisorError {
    /// Provider key is not configured.
    #[error("Configuration serveur manquante : {env_var} introuvable.")]
    MissingApiKey {
        /// Environment variable expected to hold the key.
        env_var: &'static str,
    },

    /// Prompt was missing or blank.
    #[error("Le prompt est requis")]
    EmptyPrompt,

    /// Provider failed after retries.
    #[error("Échec de l'analyse IA")]
    Upstream(#[source] UpstreamError),

    /// Provider answered without any text.
    #[error("L'IA n'a pas généré de contenu")]
    NoContent,
}

/// LLM completion use case.
pub struct AdvisorService {
    completion: Arc<dyn CompletionPort>,
    key_env_var: &'static str,
}

impl AdvisorService {
    /// Create a new advisor service. `key_env_var` names the variable
    /// reported when the provider key is missing.
    #[must_use]
    pub fn new(completion: Arc<dyn CompletionPort>, key_env_var: &'static str) -> Self {
        Self {
            completion,
            key_env_var,
        }
    }

    /// Generate an analysis for `prompt`.
    ///
    /// # Errors
    ///
    /// Returns `MissingApiKey` before anything else, then `EmptyPrompt`,
    /// `Upstream` or `NoContent`.
    pub async fn analyze(&self, prompt: Option<&str>) -> Result<String, AdvisorError> {
        if !self.completion.is_configured() {
            return Err(AdvisorError::MissingApiKey {
                env_var: self.key_env_var,
            });
        }
        let prompt = prompt
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .ok_or(AdvisorError::EmptyPrompt)?;

        let provider = self.completion.provider();
        tracing::info!(provider, prompt_chars = prompt.chars().count(), "Requesting analysis");

        match self.completion.complete(prompt).await {
            Ok(Some(text)) if !text.trim().is_empty() => Ok(text),
            Ok(_) => {
                tracing::warn!(provider, "Model returned no text");
                Err(AdvisorError::NoContent)
            }
            Err(e) => {
                tracing::error!(provider, error = %e, "Analysis failed");
                Err(AdvisorError::Upstream(e))
            }
        }
    }

    /// Whether the provider key is configured.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.completion.is_configured()
    }

    /// Provider name.
    #[must_use]
    pub fn provider(&self) -> &'static str {
        self.completion.provider()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::MockCompletionPort;

    fn completion(configured: bool) -> MockCompletionPort {
        let mut mock = MockCompletionPort::new();
        mock.expect_is_configured().return_const(configured);
        mock.expect_provider().return_const("gemini");
        mock
    }

    fn service(mock: MockCompletionPort) -> AdvisorService {
        AdvisorService::new(Arc::new(mock), "GEMINI_API_KEY")
    }

    #[tokio::test]
    async fn missing_key_wins_over_missing_prompt() {
        let mut mock = completion(false);
        mock.expect_complete().never();
        let err = service(mock).analyze(None).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Configuration serveur manquante : GEMINI_API_KEY introuvable."
        );
    }

    #[tokio::test]
    async fn blank_prompt_is_rejected() {
        let mut mock = completion(true);
        mock.expect_complete().never();
        let svc = service(mock);
        assert_eq!(svc.analyze(None).await, Err(AdvisorError::EmptyPrompt));
        assert_eq!(svc.analyze(Some("  ")).await, Err(AdvisorError::EmptyPrompt));
    }

    #[tokio::test]
    async fn returns_model_text() {
        let mut mock = completion(true);
        mock.expect_complete()
            .withf(|p| p.to_string() == "Analyse AAPL")
            .returning(|_| Ok(Some("Conserver".to_string())));
        let text = service(mock).analyze(Some(" Analyse AAPL ")).await.unwrap();
        assert_eq!(text, "Conserver");
    }

    #[tokio::test]
    async fn empty_answer_is_no_content() {
        let mut mock = completion(true);
        mock.expect_complete().returning(|_| Ok(None));
        assert_eq!(
            service(mock).analyze(Some("x")).await,
            Err(AdvisorError::NoContent)
        );
    }

    #[tokio::test]
    async fn upstream_failure_is_wrapped() {
        let mut mock = completion(true);
        mock.expect_complete().returning(|_| {
            Err(UpstreamError::Status {
                status: 503,
                message: "overloaded".into(),
            })
        });
        let err = service(mock).analyze(Some("x")).await.unwrap_err();
        assert_eq!(err.to_string(), "Échec de l'analyse IA");
        assert!(matches!(err, AdvisorError::Upstream(UpstreamError::Status { status: 503, .. })));
    }
}
