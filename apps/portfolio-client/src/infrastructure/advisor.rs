//! Advisor client for the proxy's `POST /ai` endpoint.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::domain::{Extraction, extract_json};

/// Model answer with any structured data recovered from it.
#[derive(Debug, Clone, PartialEq)]
pub struct Advice {
    /// Raw model text.
    pub text: String,
    /// JSON object found in the text, if any.
    pub structured: Extraction,
}

#[derive(Debug, Deserialize)]
struct AnalysisBody {
    analysis: String,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: String,
    message: Option<String>,
}

/// Advisor request errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AdviceError {
    /// Transport failure.
    #[error("network error: {0}")]
    Network(String),

    /// The proxy refused or failed the request.
    #[error("advisor returned {status}: {error}")]
    Rejected {
        /// HTTP status.
        status: u16,
        /// Error summary from the proxy.
        error: String,
        /// Underlying cause, when reported.
        message: Option<String>,
    },

    /// The success body could not be read.
    #[error("unexpected response: {0}")]
    Format(String),
}

/// HTTP advisor client.
#[derive(Debug, Clone)]
pub struct AdvisorClient {
    client: Client,
    base_url: String,
}

impl AdvisorClient {
    /// Create a client against `base_url`.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, AdviceError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AdviceError::Network(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Ask for an analysis of `prompt`.
    ///
    /// # Errors
    ///
    /// Returns `Rejected` for any non-success status, `Network` or `Format`
    /// otherwise. A missing JSON object in the answer is not an error.
    pub async fn analyze(&self, prompt: &str) -> Result<Advice, AdviceError> {
        let response = self
            .client
            .post(format!("{}/ai", self.base_url))
            .json(&json!({ "prompt": prompt }))
            .send()
            .await
            .map_err(|e| AdviceError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body: ErrorBody = response.json().await.unwrap_or_default();
            return Err(AdviceError::Rejected {
                status: status.as_u16(),
                error: body.error,
                message: body.message,
            });
        }

        let body: AnalysisBody = response
            .json()
            .await
            .map_err(|e| AdviceError::Format(e.to_string()))?;
        let structured = extract_json(&body.analysis);
        if structured == Extraction::NotFound {
            tracing::debug!("No structured data in analysis");
        }

        Ok(Advice {
            text: body.analysis,
            structured,
        })
    }
}
