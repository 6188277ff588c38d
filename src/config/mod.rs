use crate::cli::Args;
use crate::history::StorageError;
use crate::llm::chat::RetryPolicy;
use crate::llm::LlmConfig;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Gemini API key is required (set GEMINI_API_KEY or --api-key)")]
    MissingApiKey,
    #[error("Unsupported history store type: {0}")]
    UnsupportedHistoryType(String),
    #[error("history store setup failed: {0}")]
    Storage(#[from] StorageError),
    #[error("HTTP client setup failed: {0}")]
    Http(#[from] reqwest::Error),
}

pub fn llm_config(args: &Args) -> LlmConfig {
    LlmConfig {
        api_key: Some(args.api_key.clone()).filter(|k| !k.trim().is_empty()),
        completion_model: args.chat_model.clone(),
        base_url: args.chat_base_url.clone(),
        max_output_tokens: Some(args.max_output_tokens),
        temperature: Some(args.temperature),
    }
}

pub fn retry_policy(args: &Args) -> RetryPolicy {
    RetryPolicy {
        max_attempts: args.max_retries,
        initial_delay: Duration::from_millis(args.initial_delay_ms),
    }
}
