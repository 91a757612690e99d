//! キーバリューストア
//!
//! 文字列キーに文字列値（通常はJSON）を保存する永続ストア。
//! 値の読み書きは常に丸ごと行い、部分更新はしない。

use crate::shared::errors::AppResult;
use async_trait::async_trait;

mod file_store;
mod memory_store;

pub use file_store::FileKeyValueStore;
pub use memory_store::MemoryKeyValueStore;

/// キーバリューストアのトレイト
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// キーに対応する値を取得する（存在しない場合はNone）
    async fn get_item(&self, key: &str) -> AppResult<Option<String>>;

    /// キーに値を保存する（既存の値は上書き）
    async fn set_item(&self, key: &str, value: String) -> AppResult<()>;

    /// キーを削除する（存在しない場合は何もしない）
    async fn remove_item(&self, key: &str) -> AppResult<()>;
}
