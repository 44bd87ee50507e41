//! Per-provider request shapes and response text extraction.

use serde_json::{Value, json};

use super::retry::RequestSpec;
use crate::infrastructure::config::AiProvider;

/// Anthropic API version header value.
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Output cap for providers that require one.
const MAX_OUTPUT_TOKENS: u32 = 4096;

/// Build the generation request for `provider`.
#[must_use]
pub fn build_request(
    provider: AiProvider,
    base_url: &str,
    model: &str,
    api_key: &str,
    system_prompt: &str,
    prompt: &str,
) -> RequestSpec {
    match provider {
        AiProvider::Gemini => RequestSpec {
            url: format!("{base_url}/models/{model}:generateContent"),
            headers: vec![("x-goog-api-key", api_key.to_string())],
            body: json!({
                "contents": [{ "parts": [{ "text": prompt }] }],
                "systemInstruction": { "parts": [{ "text": system_prompt }] }
            }),
        },
        AiProvider::OpenAi => RequestSpec {
            url: format!("{base_url}/chat/completions"),
            headers: vec![("authorization", format!("Bearer {api_key}"))],
            body: json!({
                "model": model,
                "messages": [
                    { "role": "system", "content": system_prompt },
                    { "role": "user", "content": prompt }
                ]
            }),
        },
        AiProvider::Anthropic => RequestSpec {
            url: format!("{base_url}/messages"),
            headers: vec![
                ("x-api-key", api_key.to_string()),
                ("anthropic-version", ANTHROPIC_VERSION.to_string()),
            ],
            body: json!({
                "model": model,
                "max_tokens": MAX_OUTPUT_TOKENS,
                "system": system_prompt,
                "messages": [{ "role": "user", "content": prompt }]
            }),
        },
    }
}

/// Pull the generated text out of a provider response.
///
/// Returns `None` when the response carries no non-empty text.
#[must_use]
pub fn extract_text(provider: AiProvider, body: &Value) -> Option<String> {
    let pointer = match provider {
        AiProvider::Gemini => "/candidates/0/content/parts/0/text",
        AiProvider::OpenAi => "/choices/0/message/content",
        AiProvider::Anthropic => "/content/0/text",
    };
    body.pointer(pointer)
        .and_then(Value::as_str)
        .filter(|text| !text.trim().is_empty())
        .map(str::to_string)
}
