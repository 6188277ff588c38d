pub mod gemini;

use async_trait::async_trait;
use reqwest::StatusCode;
use std::sync::Arc;
use std::time::Duration;
use self::gemini::GeminiChatClient;
use super::LlmConfig;
use crate::config::ConfigError;
use crate::models::chat::ChatMessage;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
pub const DEFAULT_INITIAL_DELAY_MS: u64 = 1000;

/// Turns a conversation history into the next assistant reply.
///
/// Implementations never fail outward: transport problems, API errors and
/// exhausted retries all come back as text the widget can display.
#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn complete(&self, history: &[ChatMessage]) -> String;

    fn get_model(&self) -> String;
    fn get_base_url(&self) -> String;
}

/// Waits between attempts. Swapped for a recorder in tests.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
}

impl RetryPolicy {
    /// Delay after failed attempt `attempt` (0-indexed): `initial_delay * 2^attempt`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.initial_delay.saturating_mul(factor)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            initial_delay: Duration::from_millis(DEFAULT_INITIAL_DELAY_MS),
        }
    }
}

/// 429 and every status from 500 up are worth another attempt; anything else is final.
pub fn is_retryable_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.as_u16() >= 500
}

pub fn new_client(
    config: &LlmConfig,
    retry: RetryPolicy,
) -> Result<Arc<dyn ChatClient>, ConfigError> {
    let client = GeminiChatClient::from_config(config, retry, Arc::new(TokioSleeper))?;
    Ok(Arc::new(client))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_schedule_doubles_from_initial_delay() {
        let policy = RetryPolicy::default();
        let delays: Vec<Duration> = (0..4).map(|k| policy.delay_for(k)).collect();
        assert_eq!(
            delays,
            vec![
                Duration::from_millis(1000),
                Duration::from_millis(2000),
                Duration::from_millis(4000),
                Duration::from_millis(8000),
            ]
        );
    }

    #[test]
    fn test_delay_saturates_instead_of_overflowing() {
        let policy = RetryPolicy {
            max_attempts: 100,
            initial_delay: Duration::from_secs(1),
        };
        assert!(policy.delay_for(64) >= policy.delay_for(31));
    }

    #[test]
    fn test_retryable_statuses() {
        assert!(is_retryable_status(StatusCode::TOO_MANY_REQUESTS));
        assert!(is_retryable_status(StatusCode::INTERNAL_SERVER_ERROR));
        assert!(is_retryable_status(StatusCode::SERVICE_UNAVAILABLE));
        assert!(!is_retryable_status(StatusCode::BAD_REQUEST));
        assert!(!is_retryable_status(StatusCode::FORBIDDEN));
        assert!(!is_retryable_status(StatusCode::NOT_FOUND));
        assert!(is_retryable_status(StatusCode::from_u16(600).unwrap()));
        assert!(is_retryable_status(StatusCode::from_u16(999).unwrap()));
    }

    #[test]
    fn test_new_client_requires_api_key() {
        let result = new_client(&LlmConfig::default(), RetryPolicy::default());
        assert!(matches!(result, Err(ConfigError::MissingApiKey)));
    }
}
