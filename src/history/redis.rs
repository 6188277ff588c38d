use async_trait::async_trait;
use crate::history::{ KeyValueStorage, StorageError };
use log::debug;
use redis::{ Client, AsyncCommands };

pub struct RedisStorage {
    client: Client,
    key_prefix: String,
}

impl RedisStorage {
    pub fn new(host: &str, key_prefix: &str) -> Result<Self, StorageError> {
        Ok(Self {
            client: Client::open(host)?,
            key_prefix: key_prefix.to_string(),
        })
    }

    async fn get_connection(&self) -> Result<redis::aio::MultiplexedConnection, redis::RedisError> {
        self.client.get_multiplexed_async_connection().await
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}{}", self.key_prefix, key)
    }
}

#[async_trait]
impl KeyValueStorage for RedisStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let mut conn = self.get_connection().await?;
        let value: Option<String> = conn.get(self.full_key(key)).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut conn = self.get_connection().await?;
        let full_key = self.full_key(key);
        conn.set::<_, _, ()>(&full_key, value).await?;
        debug!("Stored {} bytes under {}", value.len(), full_key);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut conn = self.get_connection().await?;
        conn.del::<_, ()>(self.full_key(key)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_prefixed() {
        let store = RedisStorage::new("redis://127.0.0.1:6379", "chatbox:").unwrap();
        assert_eq!(store.full_key("ai-conversation"), "chatbox:ai-conversation");
    }

    #[test]
    fn test_invalid_host_is_rejected() {
        assert!(RedisStorage::new("not a url", "chatbox:").is_err());
    }
}
