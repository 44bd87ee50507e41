//! LLM Completion Adapter
//!
//! Sends prompts to the configured provider through a retrying caller
//! (exponential backoff on 429, 5xx and network errors).

mod client;
mod provider;
mod retry;

pub use client::LlmClient;
pub use provider::{build_request, extract_text};
pub use retry::{RequestSpec, RetryingCaller, Sleeper, TokioSleeper};
