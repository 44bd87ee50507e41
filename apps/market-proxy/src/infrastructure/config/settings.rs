//! Proxy Configuration Settings
//!
//! Configuration types for the market proxy, loaded from environment
//! variables. Provider keys are optional at startup: a missing key is
//! reported per request so the health endpoints stay reachable.

use std::time::Duration;

use crate::domain::backoff::{DEFAULT_INITIAL_DELAY, DEFAULT_MAX_RETRIES};
use crate::domain::rate_limit::DEFAULT_BUDGET;

/// Default quote provider REST base URL.
pub const DEFAULT_FINNHUB_BASE_URL: &str = "https://finnhub.io/api/v1";

/// Default EUR to USD exchange-rate endpoint.
pub const DEFAULT_FOREX_URL: &str = "https://api.frankfurter.app/latest?from=EUR&to=USD";

/// Default system instruction sent with every completion.
pub const DEFAULT_SYSTEM_PROMPT: &str = "Tu es un analyste financier professionnel et rigoureux \
spécialisé dans l'analyse de portefeuilles boursiers. Réponds de manière concise, factuelle et objective.";

/// LLM backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AiProvider {
    /// Google Gemini.
    #[default]
    Gemini,
    /// `OpenAI` chat completions.
    OpenAi,
    /// Anthropic messages.
    Anthropic,
}

impl AiProvider {
    /// Parse provider from string. Unknown values fall back to Gemini.
    #[must_use]
    pub fn from_str_case_insensitive(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "openai" => Self::OpenAi,
            "anthropic" => Self::Anthropic,
            _ => Self::Gemini,
        }
    }

    /// Get the provider name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
        }
    }

    /// Environment variable holding the provider key.
    #[must_use]
    pub const fn key_env_var(&self) -> &'static str {
        match self {
            Self::Gemini => "GEMINI_API_KEY",
            Self::OpenAi => "OPENAI_API_KEY",
            Self::Anthropic => "ANTHROPIC_API_KEY",
        }
    }

    /// Model used when `AI_MODEL` is not set.
    #[must_use]
    pub const fn default_model(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini-1.5-flash",
            Self::OpenAi => "gpt-4-turbo-preview",
            Self::Anthropic => "claude-3-sonnet-20240229",
        }
    }

    /// API base URL used when `AI_BASE_URL` is not set.
    #[must_use]
    pub const fn default_base_url(&self) -> &'static str {
        match self {
            Self::Gemini => "https://generativelanguage.googleapis.com/v1beta",
            Self::OpenAi => "https://api.openai.com/v1",
            Self::Anthropic => "https://api.anthropic.com/v1",
        }
    }
}

/// An upstream API key.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wrap a key. Returns `None` for blank values.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// Get the key.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKey([REDACTED])")
    }
}

/// Server port settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    /// Public HTTP API port.
    pub http_port: u16,
    /// Health check HTTP port.
    pub health_port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            http_port: 3000,
            health_port: 8083,
        }
    }
}

/// Quote provider settings.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketDataSettings {
    /// Provider key (`FINNHUB_API_KEY`).
    pub api_key: Option<ApiKey>,
    /// REST base URL.
    pub base_url: String,
    /// Exchange-rate endpoint for EUR/USD.
    pub forex_url: String,
    /// Local request budget per minute.
    pub rate_limit_per_minute: u32,
    /// Upstream request timeout.
    pub timeout: Duration,
}

impl Default for MarketDataSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_FINNHUB_BASE_URL.to_string(),
            forex_url: DEFAULT_FOREX_URL.to_string(),
            rate_limit_per_minute: DEFAULT_BUDGET,
            timeout: Duration::from_secs(30),
        }
    }
}

/// LLM settings.
#[derive(Debug, Clone, PartialEq)]
pub struct AiSettings {
    /// Selected backend.
    pub provider: AiProvider,
    /// Key for the selected backend.
    pub api_key: Option<ApiKey>,
    /// Model name.
    pub model: String,
    /// API base URL.
    pub base_url: String,
    /// System instruction.
    pub system_prompt: String,
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub initial_backoff: Duration,
    /// Upstream request timeout.
    pub timeout: Duration,
}

impl Default for AiSettings {
    fn default() -> Self {
        let provider = AiProvider::default();
        Self {
            provider,
            api_key: None,
            model: provider.default_model().to_string(),
            base_url: provider.default_base_url().to_string(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            max_retries: DEFAULT_MAX_RETRIES,
            initial_backoff: DEFAULT_INITIAL_DELAY,
            timeout: Duration::from_secs(60),
        }
    }
}

/// Complete proxy configuration.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProxyConfig {
    /// Server port settings.
    pub server: ServerSettings,
    /// Quote provider settings.
    pub market: MarketDataSettings,
    /// LLM settings.
    pub ai: AiSettings,
}

impl ProxyConfig {
    /// Create configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a URL setting is blank or the rate budget is zero.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Same as [`ProxyConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = EnvReader(&lookup);

        let server = ServerSettings {
            http_port: env.parse_or("MARKET_PROXY_HTTP_PORT", ServerSettings::default().http_port),
            health_port: env.parse_or(
                "MARKET_PROXY_HEALTH_PORT",
                ServerSettings::default().health_port,
            ),
        };

        let market_defaults = MarketDataSettings::default();
        let market = MarketDataSettings {
            api_key: env.get("FINNHUB_API_KEY").and_then(ApiKey::new),
            base_url: env.url_or("FINNHUB_BASE_URL", &market_defaults.base_url)?,
            forex_url: env.url_or("FOREX_BASE_URL", &market_defaults.forex_url)?,
            rate_limit_per_minute: env.parse_or(
                "QUOTE_RATE_LIMIT_PER_MINUTE",
                market_defaults.rate_limit_per_minute,
            ),
            timeout: env.duration_secs_or("UPSTREAM_TIMEOUT_SECS", market_defaults.timeout),
        };
        if market.rate_limit_per_minute == 0 {
            return Err(ConfigError::InvalidValue {
                key: "QUOTE_RATE_LIMIT_PER_MINUTE".to_string(),
                value: "0".to_string(),
            });
        }

        let provider = env
            .get("AI_PROVIDER")
            .map(|s| AiProvider::from_str_case_insensitive(&s))
            .unwrap_or_default();
        let ai_defaults = AiSettings::default();
        let ai = AiSettings {
            provider,
            api_key: env.get(provider.key_env_var()).and_then(ApiKey::new),
            model: env
                .non_blank("AI_MODEL")
                .unwrap_or_else(|| provider.default_model().to_string()),
            base_url: env.url_or("AI_BASE_URL", provider.default_base_url())?,
            system_prompt: env
                .non_blank("AI_SYSTEM_PROMPT")
                .unwrap_or(ai_defaults.system_prompt),
            max_retries: env.parse_or("AI_MAX_RETRIES", ai_defaults.max_retries),
            initial_backoff: env
                .duration_millis_or("AI_INITIAL_BACKOFF_MS", ai_defaults.initial_backoff),
            timeout: env.duration_secs_or("AI_TIMEOUT_SECS", ai_defaults.timeout),
        };

        Ok(Self { server, market, ai })
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Environment variable has an unusable value.
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue {
        /// Variable name.
        key: String,
        /// Offending value.
        value: String,
    },
}

struct EnvReader<'a, F>(&'a F);

impl<F> EnvReader<'_, F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key)
    }

    fn non_blank(&self, key: &str) -> Option<String> {
        self.get(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse_or<T: std::str::FromStr>(&self, key: &str, default: T) -> T {
        self.get(key)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }

    fn duration_secs_or(&self, key: &str, default: Duration) -> Duration {
        self.get(key)
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map_or(default, Duration::from_secs)
    }

    fn duration_millis_or(&self, key: &str, default: Duration) -> Duration {
        self.get(key)
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map_or(default, Duration::from_millis)
    }

    fn url_or(&self, key: &str, default: &str) -> Result<String, ConfigError> {
        match self.get(key) {
            None => Ok(default.to_string()),
            Some(v) if v.trim().starts_with("http://") || v.trim().starts_with("https://") => {
                Ok(v.trim().trim_end_matches('/').to_string())
            }
            Some(v) => Err(ConfigError::InvalidValue {
                key: key.to_string(),
                value: v,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use test_case::test_case;

    fn config(vars: &[(&str, &str)]) -> Result<ProxyConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ProxyConfig::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn defaults_without_environment() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg, ProxyConfig::default());
        assert_eq!(cfg.server.http_port, 3000);
        assert_eq!(cfg.server.health_port, 8083);
        assert_eq!(cfg.market.rate_limit_per_minute, 30);
        assert!(cfg.market.api_key.is_none());
        assert_eq!(cfg.ai.provider, AiProvider::Gemini);
        assert_eq!(cfg.ai.max_retries, 3);
        assert_eq!(cfg.ai.initial_backoff, Duration::from_millis(1000));
    }

    #[test_case("gemini", AiProvider::Gemini ; "gemini")]
    #[test_case("OpenAI", AiProvider::OpenAi ; "openai mixed case")]
    #[test_case("anthropic", AiProvider::Anthropic ; "anthropic")]
    #[test_case("mistral", AiProvider::Gemini ; "unknown")]
    fn provider_parsing(raw: &str, expected: AiProvider) {
        assert_eq!(AiProvider::from_str_case_insensitive(raw), expected);
    }

    #[test]
    fn provider_selects_key_and_model() {
        let cfg = config(&[
            ("AI_PROVIDER", "anthropic"),
            ("GEMINI_API_KEY", "g-key"),
            ("ANTHROPIC_API_KEY", "a-key"),
        ])
        .unwrap();
        assert_eq!(cfg.ai.api_key.unwrap().expose(), "a-key");
        assert_eq!(cfg.ai.model, "claude-3-sonnet-20240229");
        assert_eq!(cfg.ai.base_url, "https://api.anthropic.com/v1");
    }

    #[test]
    fn overrides_are_applied() {
        let cfg = config(&[
            ("FINNHUB_API_KEY", " fh "),
            ("FINNHUB_BASE_URL", "http://127.0.0.1:9999/"),
            ("QUOTE_RATE_LIMIT_PER_MINUTE", "60"),
            ("MARKET_PROXY_HTTP_PORT", "8080"),
            ("AI_MODEL", "gemini-2.0-flash"),
            ("AI_MAX_RETRIES", "5"),
            ("AI_INITIAL_BACKOFF_MS", "250"),
        ])
        .unwrap();
        assert_eq!(cfg.market.api_key.unwrap().expose(), "fh");
        assert_eq!(cfg.market.base_url, "http://127.0.0.1:9999");
        assert_eq!(cfg.market.rate_limit_per_minute, 60);
        assert_eq!(cfg.server.http_port, 8080);
        assert_eq!(cfg.ai.model, "gemini-2.0-flash");
        assert_eq!(cfg.ai.max_retries, 5);
        assert_eq!(cfg.ai.initial_backoff, Duration::from_millis(250));
    }

    #[test]
    fn unparsable_numbers_fall_back() {
        let cfg = config(&[("MARKET_PROXY_HEALTH_PORT", "not-a-port")]).unwrap();
        assert_eq!(cfg.server.health_port, 8083);
    }

    #[test]
    fn blank_key_is_absent() {
        let cfg = config(&[("FINNHUB_API_KEY", "   ")]).unwrap();
        assert!(cfg.market.api_key.is_none());
    }

    #[test]
    fn zero_budget_is_rejected() {
        let err = config(&[("QUOTE_RATE_LIMIT_PER_MINUTE", "0")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn non_http_url_is_rejected() {
        let err = config(&[("FOREX_BASE_URL", "ftp://rates")]).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                key: "FOREX_BASE_URL".to_string(),
                value: "ftp://rates".to_string()
            }
        );
    }

    #[test]
    fn api_key_redacted_debug() {
        let key = ApiKey::new("secret456").unwrap();
        let debug = format!("{key:?}");
        assert!(!debug.contains("secret456"));
        assert!(debug.contains("[REDACTED]"));
    }
}
