use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    // --- History Store Args ---
    /// Where the conversation record lives (file, redis, memory)
    #[arg(long, env = "HISTORY_TYPE", default_value = "file")]
    pub history_type: String,

    /// Directory holding the conversation record when HISTORY_TYPE=file
    #[arg(long, env = "HISTORY_PATH", default_value = ".chatbox")]
    pub history_path: String,

    /// History store host endpoint when HISTORY_TYPE=redis (e.g., redis://127.0.0.1:6379)
    #[arg(long, env = "HISTORY_HOST", default_value = "redis://127.0.0.1:6379")]
    pub history_host: String,

    /// Prefix for Redis history keys.
    #[arg(long, env = "HISTORY_REDIS_PREFIX", default_value = "history:")]
    pub history_redis_prefix: String,

    /// Key of the single stored conversation record.
    #[arg(long, env = "HISTORY_KEY", default_value = "ai-conversation")]
    pub history_key: String,

    // --- Chat LLM Provider Args ---
    /// API key for the Gemini generative-language API
    #[arg(long, env = "GEMINI_API_KEY", default_value = "", hide_env_values = true)]
    pub api_key: String,

    /// Base URL of the models collection (e.g., https://generativelanguage.googleapis.com/v1beta/models)
    #[arg(long, env = "CHAT_BASE_URL")] // No default, let the client handle it if None
    pub chat_base_url: Option<String>,

    /// Model name for chat completion (e.g., gemini-2.5-flash-preview-09-2025)
    #[arg(long, env = "CHAT_MODEL")]
    pub chat_model: Option<String>,

    /// Upper bound on generated tokens per reply.
    #[arg(long, env = "CHAT_MAX_OUTPUT_TOKENS", default_value = "1000")]
    pub max_output_tokens: u32,

    /// Sampling temperature.
    #[arg(long, env = "CHAT_TEMPERATURE", default_value = "0.8")]
    pub temperature: f32,

    /// Attempts per reply before giving up (network errors, 429 and 5xx are retried).
    #[arg(long, env = "CHAT_MAX_RETRIES", default_value = "5")]
    pub max_retries: u32,

    /// Backoff before the second attempt, doubled for each attempt after that.
    #[arg(long, env = "CHAT_INITIAL_DELAY_MS", default_value = "1000")]
    pub initial_delay_ms: u64,

    // --- General App Args ---
    /// Enable debug logging/output
    #[arg(long, env = "DEBUG", default_value = "false")]
    pub debug: bool,
}
