use super::KeyValueStore;
use crate::shared::errors::{AppError, AppResult};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tokio::sync::Mutex;

/// JSONファイルに保存するキーバリューストア
///
/// ファイルの中身は `{ "キー": "値" }` 形式のJSONオブジェクト。
/// 書き込みは一時ファイルに書いてからリネームする。
pub struct FileKeyValueStore {
    /// ストアファイルのパス
    path: PathBuf,
    /// 同一プロセス内の読み書きを直列化するロック
    lock: Mutex<()>,
}

impl FileKeyValueStore {
    /// 新しいFileKeyValueStoreを作成する
    ///
    /// # 引数
    /// * `path` - ストアファイルのパス（存在しなくてもよい）
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// ファイル全体を読み込む（ファイルがない場合は空）
    async fn read_entries(&self) -> AppResult<BTreeMap<String, String>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("ストアファイルが存在しないため空として扱います: {:?}", self.path);
                return Ok(BTreeMap::new());
            }
            Err(e) => {
                return Err(AppError::storage(format!(
                    "ストアファイルの読み込みに失敗しました: {:?} ({e})",
                    self.path
                )))
            }
        };

        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_json::from_str(&content).map_err(|e| {
            AppError::storage(format!(
                "ストアファイルの解析に失敗しました: {:?} ({e})",
                self.path
            ))
        })
    }

    /// ファイル全体を書き込む
    async fn write_entries(&self, entries: &BTreeMap<String, String>) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    AppError::storage(format!("ストアディレクトリの作成に失敗しました: {e}"))
                })?;
            }
        }

        let serialized = serde_json::to_string_pretty(entries)
            .map_err(|e| AppError::storage(format!("ストアのシリアライズに失敗しました: {e}")))?;

        let tmp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, serialized).await.map_err(|e| {
            AppError::storage(format!("一時ファイルの書き込みに失敗しました: {e}"))
        })?;
        tokio::fs::rename(&tmp_path, &self.path).await.map_err(|e| {
            AppError::storage(format!("ストアファイルの置き換えに失敗しました: {e}"))
        })?;

        log::debug!("ストアファイルを保存しました: {:?}", self.path);
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for FileKeyValueStore {
    async fn get_item(&self, key: &str) -> AppResult<Option<String>> {
        let _guard = self.lock.lock().await;
        let entries = self.read_entries().await?;
        Ok(entries.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: String) -> AppResult<()> {
        let _guard = self.lock.lock().await;
        let mut entries = self.read_entries().await?;
        entries.insert(key.to_string(), value);
        self.write_entries(&entries).await
    }

    async fn remove_item(&self, key: &str) -> AppResult<()> {
        let _guard = self.lock.lock().await;
        let mut entries = self.read_entries().await?;
        if entries.remove(key).is_none() {
            return Ok(());
        }
        self.write_entries(&entries).await
    }
}
