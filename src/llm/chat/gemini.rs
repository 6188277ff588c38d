use async_trait::async_trait;
use serde::{ Deserialize, Serialize };
use std::sync::Arc;
use log::{ debug, error, info, warn };

use super::{ is_retryable_status, ChatClient, RetryPolicy, Sleeper };
use crate::config::ConfigError;
use crate::llm::LlmConfig;
use crate::models::chat::{ ChatMessage, Role };

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-preview-09-2025";
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 1000;
pub const DEFAULT_TEMPERATURE: f32 = 0.8;

pub const RETRIES_EXHAUSTED_REPLY: &str = "Failed to connect to Gemini API after multiple attempts.";
pub const BLOCKED_REPLY: &str = "No response or content blocked by safety filters.";
pub const GENERIC_API_ERROR_REPLY: &str = "API Error.";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<GeminiContent>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct GeminiContent {
    role: &'static str,
    parts: Vec<GeminiPart>,
}

#[derive(Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Serialize, Clone, Copy)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize, Default)]
struct GenerateContentResponse {
    candidates: Option<Vec<GoogleCandidate>>,
    error: Option<GoogleError>,
}

#[derive(Deserialize)]
struct GoogleCandidate {
    content: Option<GoogleContent>,
}

#[derive(Deserialize)]
struct GoogleContent {
    parts: Option<Vec<GooglePart>>,
}

#[derive(Deserialize)]
struct GooglePart {
    text: Option<String>,
}

#[derive(Deserialize)]
struct GoogleError {
    message: Option<String>,
}

impl GenerateContentResponse {
    fn first_text(&self) -> Option<&str> {
        self.candidates
            .as_ref()?
            .first()?
            .content
            .as_ref()?
            .parts
            .as_ref()?
            .first()?
            .text
            .as_deref()
            .filter(|t| !t.is_empty())
    }

    fn error_message(&self) -> Option<&str> {
        self.error
            .as_ref()
            .and_then(|e| e.message.as_deref())
            .filter(|m| !m.is_empty())
    }
}

fn gemini_role(role: Role) -> &'static str {
    match role {
        Role::User => "user",
        Role::Assistant => "model",
    }
}

fn to_gemini_contents(history: &[ChatMessage]) -> Vec<GeminiContent> {
    history
        .iter()
        .map(|m| GeminiContent {
            role: gemini_role(m.role),
            parts: vec![GeminiPart { text: m.content.clone() }],
        })
        .collect()
}

enum Attempt {
    /// Final text for the caller, success or terminal failure.
    Reply(String),
    Retry(String),
}

pub struct GeminiChatClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    generation: GenerationConfig,
    retry: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
}

impl GeminiChatClient {
    pub fn new(
        api_key: String,
        model: Option<String>,
        base_url: Option<String>,
        max_output_tokens: Option<u32>,
        temperature: Option<f32>,
        retry: RetryPolicy,
        sleeper: Arc<dyn Sleeper>,
    ) -> Result<Self, ConfigError> {
        if api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        let http = reqwest::Client::builder().build()?;

        Ok(Self {
            http,
            api_key,
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            generation: GenerationConfig {
                max_output_tokens: max_output_tokens.unwrap_or(DEFAULT_MAX_OUTPUT_TOKENS),
                temperature: temperature.unwrap_or(DEFAULT_TEMPERATURE),
            },
            retry,
            sleeper,
        })
    }

    pub fn from_config(
        config: &LlmConfig,
        retry: RetryPolicy,
        sleeper: Arc<dyn Sleeper>,
    ) -> Result<Self, ConfigError> {
        let api_key = config.api_key.clone().ok_or(ConfigError::MissingApiKey)?;

        Self::new(
            api_key,
            config.completion_model.clone(),
            config.base_url.clone(),
            config.max_output_tokens,
            config.temperature,
            retry,
            sleeper,
        )
    }

    fn endpoint(&self) -> String {
        format!("{}/{}:generateContent", self.base_url, self.model)
    }

    async fn attempt(&self, url: &str, payload: &GenerateContentRequest) -> Attempt {
        let response = match self.http
            .post(url)
            .query(&[("key", self.api_key.as_str())])
            .json(payload)
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => return Attempt::Retry(format!("request failed: {}", e)),
        };

        let status = response.status();
        let body_text = match response.text().await {
            Ok(text) => text,
            Err(e) => return Attempt::Retry(format!("reading response failed: {}", e)),
        };
        let body = serde_json::from_str::<GenerateContentResponse>(&body_text).ok();

        if !status.is_success() {
            let api_message = body.as_ref().and_then(|b| b.error_message());
            if is_retryable_status(status) {
                return Attempt::Retry(format!(
                    "HTTP {}: {}",
                    status.as_u16(),
                    api_message.unwrap_or("no error message")
                ));
            }
            error!("Gemini API HTTP Error {}: {}", status.as_u16(), body_text);
            return Attempt::Reply(
                api_message
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("API HTTP Error: {}", status.as_u16()))
            );
        }

        let body = body.unwrap_or_default();
        if body.error.is_some() {
            error!("Gemini API Error: {}", body_text);
            return Attempt::Reply(
                body.error_message().unwrap_or(GENERIC_API_ERROR_REPLY).to_string()
            );
        }

        match body.first_text() {
            Some(text) => Attempt::Reply(text.to_string()),
            None => {
                warn!("Gemini response had no candidate text: {}", body_text);
                Attempt::Reply(BLOCKED_REPLY.to_string())
            }
        }
    }
}

#[async_trait]
impl ChatClient for GeminiChatClient {
    async fn complete(&self, history: &[ChatMessage]) -> String {
        let payload = GenerateContentRequest {
            contents: to_gemini_contents(history),
            generation_config: self.generation,
        };
        let url = self.endpoint();
        let max_attempts = self.retry.max_attempts.max(1);
        info!(
            "GeminiChatClient::complete() → model={} messages={}",
            self.model,
            history.len()
        );

        for attempt in 0..max_attempts {
            let reason = match self.attempt(&url, &payload).await {
                Attempt::Reply(text) => {
                    debug!("Gemini replied on attempt {}/{}", attempt + 1, max_attempts);
                    return text;
                }
                Attempt::Retry(reason) => reason,
            };

            if attempt + 1 == max_attempts {
                error!("Gemini request failed after {} attempts: {}", max_attempts, reason);
                break;
            }

            let delay = self.retry.delay_for(attempt);
            warn!(
                "Gemini attempt {}/{} failed ({}), retrying in {:?}",
                attempt + 1,
                max_attempts,
                reason,
                delay
            );
            self.sleeper.sleep(delay).await;
        }

        RETRIES_EXHAUSTED_REPLY.to_string()
    }

    fn get_model(&self) -> String {
        self.model.clone()
    }

    fn get_base_url(&self) -> String {
        self.base_url.clone()
    }
}
