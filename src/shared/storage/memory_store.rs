use super::KeyValueStore;
use crate::shared::errors::{AppError, AppResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// メモリ上のキーバリューストア（テスト・一時利用向け）
#[derive(Default)]
pub struct MemoryKeyValueStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_entries<T>(&self, f: impl FnOnce(&mut HashMap<String, String>) -> T) -> AppResult<T> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| AppError::storage(format!("ストアのロックに失敗しました: {e}")))?;
        Ok(f(&mut entries))
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get_item(&self, key: &str) -> AppResult<Option<String>> {
        self.with_entries(|entries| entries.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: String) -> AppResult<()> {
        self.with_entries(|entries| {
            entries.insert(key.to_string(), value);
        })
    }

    async fn remove_item(&self, key: &str) -> AppResult<()> {
        self.with_entries(|entries| {
            entries.remove(key);
        })
    }
}
