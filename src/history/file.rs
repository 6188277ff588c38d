use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{ Path, PathBuf };
use tokio::fs;
use crate::history::{ KeyValueStorage, StorageError };

/// One `<key>.json` file per record inside `dir`.
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    fn record_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

#[async_trait]
impl KeyValueStorage for FileStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.record_path(key)).await {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir).await?;
        // rename is atomic, so readers never see half a record
        let tmp = self.dir.join(format!(".{}.json.tmp", key));
        fs::write(&tmp, value).await?;
        fs::rename(&tmp, self.record_path(key)).await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.record_path(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_remove() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("nested"));

        assert_eq!(storage.get("ai-conversation").await.unwrap(), None);

        storage.set("ai-conversation", r#"{"id":"conv_1"}"#).await.unwrap();
        storage.set("ai-conversation", r#"{"id":"conv_2"}"#).await.unwrap();
        assert_eq!(
            storage.get("ai-conversation").await.unwrap().as_deref(),
            Some(r#"{"id":"conv_2"}"#)
        );
        assert!(!dir.path().join("nested").join(".ai-conversation.json.tmp").exists());

        storage.remove("ai-conversation").await.unwrap();
        assert_eq!(storage.get("ai-conversation").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_removing_missing_record_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        assert!(storage.remove("never-written").await.is_ok());
    }
}
