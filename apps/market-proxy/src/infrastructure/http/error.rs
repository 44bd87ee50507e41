//! API error mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use super::response::ErrorBody;
use crate::application::ports::UpstreamError;
use crate::application::services::{AdvisorError, QuoteError};

/// Error returned by a handler, rendered as `{error, message?}`.
#[derive(Debug, Clone)]
pub struct ApiError {
    status: StatusCode,
    error: String,
    message: Option<String>,
}

impl ApiError {
    /// Create an error with an explicit status.
    #[must_use]
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            status,
            error: error.into(),
            message: None,
        }
    }

    /// Attach the underlying cause.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Create a bad request error.
    #[must_use]
    pub fn bad_request(error: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, error)
    }

    /// Create an internal error.
    #[must_use]
    pub fn internal(error: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, error)
    }

    /// HTTP status.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<QuoteError> for ApiError {
    fn from(err: QuoteError) -> Self {
        match err {
            QuoteError::InvalidSymbol | QuoteError::EmptyQuery => Self::bad_request(err.to_string()),
            QuoteError::Throttled(_) => Self::new(StatusCode::TOO_MANY_REQUESTS, err.to_string()),
            QuoteError::MissingApiKey | QuoteError::Upstream(_) => Self::internal(err.to_string()),
        }
    }
}

impl From<AdvisorError> for ApiError {
    fn from(err: AdvisorError) -> Self {
        match err {
            AdvisorError::EmptyPrompt => Self::bad_request(err.to_string()),
            AdvisorError::MissingApiKey { env_var } => Self::internal(err.to_string())
                .with_message(format!("Définissez {env_var} dans l'environnement du serveur")),
            AdvisorError::NoContent => Self::internal(err.to_string()),
            AdvisorError::Upstream(ref cause) => {
                let cause = cause.to_string();
                Self::internal(err.to_string()).with_message(cause)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.error,
            message: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

/// Map a search failure, passing upstream statuses through.
pub fn search_error(err: QuoteError) -> ApiError {
    match err {
        QuoteError::Upstream(UpstreamError::Status { status, ref message }) => {
            let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
            ApiError::new(status, message.clone())
        }
        other => other.into(),
    }
}
