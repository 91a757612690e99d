//! 領収書一覧コントローラー
//!
//! 永続化ゲートウェイと解析ゲートウェイを仲介し、画面に出す一覧と
//! 合計金額、解析中フラグを保持する。状態の変更はすべてここの操作を通す。

use super::api_client::ReceiptAnalyzer;
use super::formatting::ReceiptFormatter;
use super::models::{Receipt, ReceiptListView};
use super::notifications::{Notice, Notifier};
use super::storage::ReceiptStorage;
use crate::shared::errors::{AppError, AppResult, ErrorSeverity};
use log::{error, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::Mutex;

/// 解析中フラグのガード
///
/// ドロップ時に必ずフラグを下ろす（エラー・パニック・Futureの破棄を含む）。
struct BusyGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> BusyGuard<'a> {
    /// フラグが下りていれば立ててガードを返す。既に立っていればNone
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// 領収書一覧コントローラー
pub struct ReceiptListController {
    storage: Arc<dyn ReceiptStorage>,
    analyzer: Arc<dyn ReceiptAnalyzer>,
    notifier: Arc<dyn Notifier>,
    formatter: ReceiptFormatter,
    /// 永続化済み一覧のメモリ上のコピー（挿入順）
    receipts: RwLock<Vec<Receipt>>,
    /// 解析リクエストが処理中の間だけtrue
    busy: AtomicBool,
    /// 追加・削除・再読み込みを直列化するロック
    operation_lock: Mutex<()>,
}

impl ReceiptListController {
    pub fn new(
        storage: Arc<dyn ReceiptStorage>,
        analyzer: Arc<dyn ReceiptAnalyzer>,
        notifier: Arc<dyn Notifier>,
        formatter: ReceiptFormatter,
    ) -> Self {
        Self {
            storage,
            analyzer,
            notifier,
            formatter,
            receipts: RwLock::new(Vec::new()),
            busy: AtomicBool::new(false),
            operation_lock: Mutex::new(()),
        }
    }

    /// 現在の一覧のコピー
    pub fn receipts(&self) -> Vec<Receipt> {
        self.receipts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// 整形済み合計金額（一覧から都度計算する）
    pub fn total(&self) -> String {
        let receipts = self.receipts.read().unwrap_or_else(PoisonError::into_inner);
        self.formatter.total(&receipts)
    }

    /// 解析リクエストが処理中かどうか
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// 画面表示用のスナップショット
    pub fn snapshot(&self) -> ReceiptListView {
        let receipts = self.receipts();
        let total = self.formatter.total(&receipts);
        ReceiptListView {
            receipts,
            total,
            busy: self.is_busy(),
        }
    }

    /// 永続化済みの一覧を読み込み、メモリ上の一覧を置き換える
    ///
    /// 失敗時は通知を出し、メモリ上の一覧は変更しない。
    pub async fn load(&self) -> AppResult<()> {
        let _lock = self.operation_lock.lock().await;
        self.reload().await
    }

    /// 画像を解析して領収書を追加する
    ///
    /// # 処理内容
    /// 1. 解析中フラグを立てる（既に解析中なら拒否）
    /// 2. 解析ゲートウェイで金額・日付を取得
    /// 3. 金額があれば領収書を作成して保存し、一覧を再読み込み
    ///
    /// # 戻り値
    /// 追加された領収書。金額が読めなかった場合は `AppError::UnreadableAmount`
    pub async fn add_from_image(&self, image_uri: &str) -> AppResult<Receipt> {
        let Some(_busy) = BusyGuard::acquire(&self.busy) else {
            warn!("解析中のため追加を拒否しました: image_uri={image_uri}");
            self.notifier.notify(Notice::AnalysisInProgress);
            return Err(AppError::concurrency("解析リクエストが既に処理中です"));
        };

        let _lock = self.operation_lock.lock().await;

        match self.process_image(image_uri).await {
            Ok(receipt) => {
                // 保存は完了しているため、再読み込みの失敗は通知だけにとどめる
                let _ = self.reload().await;
                Ok(receipt)
            }
            Err(AppError::UnreadableAmount) => {
                warn!("領収書の金額を読み取れませんでした: image_uri={image_uri}");
                self.notifier.notify(Notice::UnreadableAmount);
                Err(AppError::UnreadableAmount)
            }
            Err(e) => {
                self.log_failure("領収書の処理に失敗しました", &e);
                self.notifier.notify(Notice::ProcessFailed);
                Err(e)
            }
        }
    }

    /// IDで領収書を削除する
    ///
    /// 永続化済みデータの削除に成功した場合のみメモリ上の一覧から取り除く。
    /// 存在しないIDの削除はエラーにならない。
    pub async fn remove(&self, id: &str) -> AppResult<()> {
        let _lock = self.operation_lock.lock().await;

        if let Err(e) = self.storage.remove_by_id(id).await {
            self.log_failure("領収書の削除に失敗しました", &e);
            self.notifier.notify(Notice::DeleteFailed);
            return Err(e);
        }

        let mut receipts = self
            .receipts
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        receipts.retain(|receipt| receipt.id != id);
        info!("領収書を削除しました: id={id}, 残り{}件", receipts.len());
        Ok(())
    }

    /// 解析→保存までを行う（ロック取得済みの前提）
    async fn process_image(&self, image_uri: &str) -> AppResult<Receipt> {
        let analyzed = self.analyzer.analyze(image_uri).await?;

        let amount = analyzed.amount().ok_or(AppError::UnreadableAmount)?;
        let date = match analyzed.date() {
            Some(date) => date.to_string(),
            None => self.formatter.today(),
        };

        let receipt = Receipt::new(image_uri, amount, date.as_str());
        self.storage.append(receipt.clone()).await?;

        info!(
            "領収書を追加しました: id={}, amount={}, date={}",
            receipt.id, receipt.amount, receipt.date
        );
        Ok(receipt)
    }

    /// 永続化済みの一覧で置き換える（ロック取得済みの前提）
    async fn reload(&self) -> AppResult<()> {
        match self.storage.list_all().await {
            Ok(stored) => {
                let count = stored.len();
                *self
                    .receipts
                    .write()
                    .unwrap_or_else(PoisonError::into_inner) = stored;
                info!("領収書一覧を読み込みました: {count}件");
                Ok(())
            }
            Err(e) => {
                self.log_failure("領収書一覧の読み込みに失敗しました", &e);
                self.notifier.notify(Notice::LoadFailed);
                Err(e)
            }
        }
    }

    fn log_failure(&self, context: &str, error: &AppError) {
        match error.severity() {
            ErrorSeverity::Low => warn!("{context}: {}", error.details()),
            ErrorSeverity::Medium | ErrorSeverity::High => {
                error!("{context}: {}", error.details())
            }
        }
    }
}
