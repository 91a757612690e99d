//! 領収書の永続化ゲートウェイ
//!
//! 領収書一覧全体を1つのJSON配列としてキーバリューストアの固定キーに保存する。
//! 追加・削除のたびに一覧を丸ごと書き換える。

use super::models::Receipt;
use crate::shared::errors::{AppError, AppResult};
use crate::shared::storage::KeyValueStore;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;

/// 領収書一覧を保存するストレージキー
pub const STORAGE_KEY: &str = "@receipts";

/// 領収書の永続化トレイト
#[async_trait]
pub trait ReceiptStorage: Send + Sync {
    /// 保存済みの領収書を挿入順で全件取得する
    async fn list_all(&self) -> AppResult<Vec<Receipt>>;

    /// 領収書を末尾に追加する
    async fn append(&self, receipt: Receipt) -> AppResult<()>;

    /// IDで領収書を削除する（存在しない場合は何もしない）
    async fn remove_by_id(&self, id: &str) -> AppResult<()>;
}

/// キーバリューストアを使った領収書ストレージ
pub struct KeyValueReceiptStorage {
    store: Arc<dyn KeyValueStore>,
    /// 読み込み→書き込みの一連の処理を直列化するロック
    write_lock: Mutex<()>,
}

impl KeyValueReceiptStorage {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    async fn read_all(&self) -> AppResult<Vec<Receipt>> {
        match self.store.get_item(STORAGE_KEY).await? {
            Some(serialized) => serde_json::from_str(&serialized).map_err(|e| {
                AppError::storage(format!("保存済み領収書の解析に失敗しました: {e}"))
            }),
            None => Ok(Vec::new()),
        }
    }

    async fn write_all(&self, receipts: &[Receipt]) -> AppResult<()> {
        let serialized = serde_json::to_string(receipts)
            .map_err(|e| AppError::storage(format!("領収書のシリアライズに失敗しました: {e}")))?;
        self.store.set_item(STORAGE_KEY, serialized).await
    }
}

#[async_trait]
impl ReceiptStorage for KeyValueReceiptStorage {
    async fn list_all(&self) -> AppResult<Vec<Receipt>> {
        let receipts = self.read_all().await?;
        log::debug!("保存済み領収書を読み込みました: {}件", receipts.len());
        Ok(receipts)
    }

    async fn append(&self, receipt: Receipt) -> AppResult<()> {
        receipt.validate()?;

        let _guard = self.write_lock.lock().await;
        let mut receipts = self.read_all().await?;

        if receipts.iter().any(|existing| existing.id == receipt.id) {
            return Err(AppError::storage(format!(
                "領収書IDが重複しています: id={}",
                receipt.id
            )));
        }

        log::info!("領収書を保存します: id={}, amount={}", receipt.id, receipt.amount);
        receipts.push(receipt);
        self.write_all(&receipts).await
    }

    async fn remove_by_id(&self, id: &str) -> AppResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut receipts = self.read_all().await?;

        let before = receipts.len();
        receipts.retain(|receipt| receipt.id != id);

        if receipts.len() == before {
            log::debug!("削除対象の領収書が見つかりません: id={id}");
        } else {
            log::info!("領収書を削除します: id={id}");
        }

        self.write_all(&receipts).await
    }
}
