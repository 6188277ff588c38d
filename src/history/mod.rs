mod file;
mod memory;
mod redis;

pub use self::file::FileStorage;
pub use self::memory::MemoryStorage;
pub use self::redis::RedisStorage;

use async_trait::async_trait;
use log::{ error, info };
use std::sync::Arc;
use thiserror::Error;
use crate::cli::Args;
use crate::config::ConfigError;
use crate::models::chat::{ now_iso, Conversation };

pub const DEFAULT_CONVERSATION_KEY: &str = "ai-conversation";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("redis error: {0}")]
    Redis(#[from] ::redis::RedisError),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Single-writer key-value area holding serialized records.
#[async_trait]
pub trait KeyValueStorage: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Persists one conversation snapshot under a fixed key.
///
/// Every operation is best effort: storage and parse failures are logged and
/// the caller always gets a usable [`Conversation`] back.
pub struct ConversationStore {
    storage: Arc<dyn KeyValueStorage>,
    key: String,
}

impl ConversationStore {
    pub fn new(storage: Arc<dyn KeyValueStorage>, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    pub async fn load(&self) -> Conversation {
        let raw = match self.storage.get(&self.key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                let fresh = Conversation::new();
                info!("No stored conversation under '{}', starting {}", self.key, fresh.id);
                return fresh;
            }
            Err(e) => {
                error!("Failed to load conversation '{}': {}", self.key, e);
                return Conversation::new();
            }
        };

        match serde_json::from_str::<Conversation>(&raw) {
            Ok(conversation) => {
                info!(
                    "Loaded conversation {} with {} messages",
                    conversation.id,
                    conversation.messages.len()
                );
                conversation
            }
            Err(e) => {
                error!("Error parsing stored conversation '{}': {}", self.key, e);
                Conversation::new()
            }
        }
    }

    /// Writes `{id, messages, updatedAt}` over the previous record and returns
    /// the snapshot that was written.
    pub async fn save(&self, conversation: &Conversation) -> Conversation {
        let snapshot = Conversation {
            id: conversation.id.clone(),
            messages: conversation.messages.clone(),
            updated_at: Some(now_iso()),
        };

        match serde_json::to_string(&snapshot) {
            Ok(json) => {
                if let Err(e) = self.storage.set(&self.key, &json).await {
                    error!("Failed to save conversation {}: {}", snapshot.id, e);
                }
            }
            Err(e) => error!("Failed to serialize conversation {}: {}", snapshot.id, e),
        }
        snapshot
    }

    pub async fn clear(&self) -> Conversation {
        if let Err(e) = self.storage.remove(&self.key).await {
            error!("Failed to clear conversation '{}': {}", self.key, e);
        }
        Conversation::new()
    }
}

pub fn create_history_store(args: &Args) -> Result<Arc<dyn KeyValueStorage>, ConfigError> {
    match args.history_type.to_lowercase().as_str() {
        "file" => Ok(Arc::new(FileStorage::new(&args.history_path))),
        "redis" => {
            let store = RedisStorage::new(&args.history_host, &args.history_redis_prefix)?;
            Ok(Arc::new(store))
        }
        "memory" => Ok(Arc::new(MemoryStorage::new())),
        other => Err(ConfigError::UnsupportedHistoryType(other.to_string())),
    }
}

pub fn initialize_history_store(args: &Args) -> Result<ConversationStore, ConfigError> {
    let location = match args.history_type.to_lowercase().as_str() {
        "file" => args.history_path.clone(),
        "redis" => args.history_host.clone(),
        _ => "process memory".to_string(),
    };
    info!("Chat history will be stored in: {} at {}", args.history_type, location);
    let storage = create_history_store(args)?;
    Ok(ConversationStore::new(storage, args.history_key.clone()))
}
