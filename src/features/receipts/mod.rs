// 領収書機能モジュール

pub mod api_client;
pub mod commands;
pub mod controller;
pub mod formatting;
pub mod models;
pub mod notifications;
pub mod storage;

#[cfg(test)]
mod controller_tests;
#[cfg(test)]
mod test_support;

// 公開インターフェース

// モデル
pub use models::{AnalyzedReceipt, Receipt, ReceiptListView};

// ゲートウェイ
pub use api_client::{ReceiptAnalysisClient, ReceiptAnalyzer};
pub use storage::{KeyValueReceiptStorage, ReceiptStorage, STORAGE_KEY};

// コントローラーと整形
pub use controller::ReceiptListController;
pub use formatting::ReceiptFormatter;

// 通知
pub use notifications::{ConsoleNotifier, LogNotifier, Notice, Notifier};

// コマンド
pub use commands::{delete_receipt, get_receipts, get_total, process_receipt_image, ImageSource};
