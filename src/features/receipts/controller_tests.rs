//! 領収書一覧コントローラーのテスト
//!
//! 読み込み・追加・削除の正常系と、各失敗経路での通知と状態の保持を確認する。

use super::api_client::ReceiptAnalyzer;
use super::controller::ReceiptListController;
use super::formatting::ReceiptFormatter;
use super::models::{AnalyzedReceipt, Receipt};
use super::notifications::Notice;
use super::storage::ReceiptStorage;
use super::test_support::{
    analyzed, FlakyStorage, GatedAnalyzer, RecordingNotifier, ScriptedAnalyzer,
};
use crate::shared::errors::{AppError, AppResult};
use crate::shared::utils::is_valid_nanoid;
use std::sync::Arc;

struct Harness {
    controller: Arc<ReceiptListController>,
    storage: Arc<FlakyStorage>,
    notifier: Arc<RecordingNotifier>,
}

fn harness_with(analyzer: Arc<dyn ReceiptAnalyzer>) -> Harness {
    let storage = Arc::new(FlakyStorage::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let controller = Arc::new(ReceiptListController::new(
        storage.clone(),
        analyzer,
        notifier.clone(),
        ReceiptFormatter::default(),
    ));
    Harness {
        controller,
        storage,
        notifier,
    }
}

fn harness(responses: Vec<AppResult<AnalyzedReceipt>>) -> Harness {
    harness_with(Arc::new(ScriptedAnalyzer::new(responses)))
}

fn stored(id: &str, amount: &str) -> Receipt {
    Receipt {
        id: id.to_string(),
        image_uri: format!("file:///tmp/{id}.jpg"),
        amount: amount.to_string(),
        date: "01.01.2025".to_string(),
    }
}

#[tokio::test]
async fn test_initial_state_is_empty() {
    let h = harness(vec![]);

    assert!(h.controller.receipts().is_empty());
    assert_eq!(h.controller.total(), "0,00 TL");
    assert!(!h.controller.is_busy());
}

#[tokio::test]
async fn test_load_replaces_list_with_stored_receipts() {
    let h = harness(vec![]);
    h.storage.append(stored("a", "10,50 TL")).await.unwrap();
    h.storage.append(stored("b", "5 TL")).await.unwrap();

    h.controller.load().await.unwrap();

    assert_eq!(
        h.controller.receipts(),
        vec![stored("a", "10,50 TL"), stored("b", "5 TL")]
    );
    assert_eq!(h.controller.total(), "15,50 TL");
    assert!(h.notifier.notices().is_empty());
}

#[tokio::test]
async fn test_load_failure_keeps_list_and_notifies() {
    let h = harness(vec![]);
    h.storage.append(stored("a", "1 TL")).await.unwrap();
    h.controller.load().await.unwrap();

    h.storage.append(stored("b", "2 TL")).await.unwrap();
    FlakyStorage::set(&h.storage.fail_list, true);

    let result = h.controller.load().await;

    assert!(matches!(result, Err(AppError::Storage(_))));
    assert_eq!(h.controller.receipts(), vec![stored("a", "1 TL")]);
    assert_eq!(h.notifier.notices(), vec![Notice::LoadFailed]);
}

#[tokio::test]
async fn test_add_appends_receipt_from_analysis() {
    let h = harness(vec![Ok(analyzed(Some("10,50 TL"), Some("05.03.2025")))]);

    let receipt = h
        .controller
        .add_from_image("file:///tmp/photo.jpg")
        .await
        .unwrap();

    assert_eq!(receipt.image_uri, "file:///tmp/photo.jpg");
    assert_eq!(receipt.amount, "10,50 TL");
    assert_eq!(receipt.date, "05.03.2025");
    assert!(is_valid_nanoid(&receipt.id));

    assert_eq!(h.controller.receipts(), vec![receipt.clone()]);
    assert_eq!(h.storage.list_all().await.unwrap(), vec![receipt]);
    assert_eq!(h.controller.total(), "10,50 TL");
    assert!(!h.controller.is_busy());
    assert!(h.notifier.notices().is_empty());
}

#[tokio::test]
async fn test_add_keeps_insertion_order_and_total() {
    let h = harness(vec![
        Ok(analyzed(Some("10,50 TL"), Some("01.01.2025"))),
        Ok(analyzed(Some("5 TL"), Some("02.01.2025"))),
    ]);

    let first = h.controller.add_from_image("a.jpg").await.unwrap();
    let second = h.controller.add_from_image("b.jpg").await.unwrap();

    assert_eq!(h.controller.receipts(), vec![first, second]);
    assert_eq!(h.controller.total(), "15,50 TL");
}

#[tokio::test]
async fn test_add_without_date_uses_today() {
    let h = harness(vec![Ok(analyzed(Some("7 TL"), None))]);
    let today_before = ReceiptFormatter::default().today();

    let receipt = h.controller.add_from_image("a.jpg").await.unwrap();

    // 日付をまたいだ場合に備えて前後どちらかと一致すればよい
    let today_after = ReceiptFormatter::default().today();
    assert!(receipt.date == today_before || receipt.date == today_after);
}

#[tokio::test]
async fn test_add_blank_date_uses_today() {
    let h = harness(vec![Ok(analyzed(Some("7 TL"), Some("   ")))]);

    let receipt = h.controller.add_from_image("a.jpg").await.unwrap();

    assert_eq!(receipt.date.len(), 10);
    assert_ne!(receipt.date.trim(), "");
}

#[tokio::test]
async fn test_add_without_amount_notifies_and_persists_nothing() {
    let h = harness(vec![
        Ok(analyzed(None, Some("01.01.2025"))),
        Ok(analyzed(Some(" "), None)),
    ]);

    for _ in 0..2 {
        let result = h.controller.add_from_image("a.jpg").await;
        assert!(matches!(result, Err(AppError::UnreadableAmount)));
    }

    assert!(h.controller.receipts().is_empty());
    assert!(h.storage.list_all().await.unwrap().is_empty());
    assert_eq!(
        h.notifier.notices(),
        vec![Notice::UnreadableAmount, Notice::UnreadableAmount]
    );
    assert!(!h.controller.is_busy());
}

#[tokio::test]
async fn test_add_transport_failure_notifies_process_failed() {
    let h = harness(vec![Err(AppError::transport("接続できません"))]);

    let result = h.controller.add_from_image("a.jpg").await;

    assert!(matches!(result, Err(AppError::Transport(_))));
    assert!(h.controller.receipts().is_empty());
    assert_eq!(h.notifier.notices(), vec![Notice::ProcessFailed]);
    assert!(!h.controller.is_busy());
}

#[tokio::test]
async fn test_add_storage_failure_notifies_process_failed() {
    let h = harness(vec![Ok(analyzed(Some("3 TL"), Some("01.01.2025")))]);
    FlakyStorage::set(&h.storage.fail_append, true);

    let result = h.controller.add_from_image("a.jpg").await;

    assert!(matches!(result, Err(AppError::Storage(_))));
    assert!(h.controller.receipts().is_empty());
    assert_eq!(h.notifier.notices(), vec![Notice::ProcessFailed]);
    assert!(!h.controller.is_busy());
}

#[tokio::test]
async fn test_add_reload_failure_still_returns_receipt() {
    let h = harness(vec![Ok(analyzed(Some("3 TL"), Some("01.01.2025")))]);
    FlakyStorage::set(&h.storage.fail_list, true);

    let receipt = h.controller.add_from_image("a.jpg").await.unwrap();

    // 保存済みだがメモリ上の一覧は再読み込みに失敗したまま
    assert!(h.controller.receipts().is_empty());
    assert_eq!(h.notifier.notices(), vec![Notice::LoadFailed]);

    FlakyStorage::set(&h.storage.fail_list, false);
    h.controller.load().await.unwrap();
    assert_eq!(h.controller.receipts(), vec![receipt]);
}

#[tokio::test]
async fn test_add_while_busy_is_rejected() {
    let analyzer = Arc::new(GatedAnalyzer::new(analyzed(
        Some("4 TL"),
        Some("01.01.2025"),
    )));
    let h = harness_with(analyzer.clone());

    let controller = h.controller.clone();
    let first = tokio::spawn(async move { controller.add_from_image("a.jpg").await });

    analyzer.started.notified().await;
    assert!(h.controller.is_busy());
    assert!(h.controller.snapshot().busy);

    let second = h.controller.add_from_image("b.jpg").await;
    assert!(matches!(second, Err(AppError::Concurrency(_))));
    assert_eq!(h.notifier.notices(), vec![Notice::AnalysisInProgress]);

    analyzer.release.notify_one();
    let receipt = first.await.unwrap().unwrap();

    assert!(!h.controller.is_busy());
    assert_eq!(h.controller.receipts(), vec![receipt]);
}

#[tokio::test]
async fn test_busy_flag_is_cleared_after_every_outcome() {
    let h = harness(vec![
        Ok(analyzed(Some("1 TL"), None)),
        Ok(analyzed(None, None)),
        Err(AppError::transport("timeout")),
    ]);

    for _ in 0..3 {
        let _ = h.controller.add_from_image("a.jpg").await;
        assert!(!h.controller.is_busy());
    }
}

#[tokio::test]
async fn test_remove_drops_receipt_from_list_and_storage() {
    let h = harness(vec![]);
    h.storage.append(stored("a", "10,50 TL")).await.unwrap();
    h.storage.append(stored("b", "5 TL")).await.unwrap();
    h.controller.load().await.unwrap();

    h.controller.remove("a").await.unwrap();

    assert_eq!(h.controller.receipts(), vec![stored("b", "5 TL")]);
    assert_eq!(h.storage.list_all().await.unwrap(), vec![stored("b", "5 TL")]);
    assert_eq!(h.controller.total(), "5,00 TL");
}

#[tokio::test]
async fn test_remove_unknown_id_is_noop() {
    let h = harness(vec![]);
    h.storage.append(stored("a", "1 TL")).await.unwrap();
    h.storage.append(stored("b", "14,50 TL")).await.unwrap();
    h.controller.load().await.unwrap();
    let total_before = h.controller.total();

    h.controller.remove("missing").await.unwrap();

    assert_eq!(
        h.controller.receipts(),
        vec![stored("a", "1 TL"), stored("b", "14,50 TL")]
    );
    assert_eq!(h.controller.total(), total_before);
    assert_eq!(h.controller.total(), "15,50 TL");

    h.controller.load().await.unwrap();
    assert_eq!(h.controller.receipts().len(), 2);
    assert_eq!(h.controller.total(), "15,50 TL");
    assert!(h.notifier.notices().is_empty());
}

#[tokio::test]
async fn test_removed_id_does_not_return_after_load() {
    let h = harness(vec![]);
    h.storage.append(stored("a", "10,50 TL")).await.unwrap();
    h.storage.append(stored("b", "5 TL")).await.unwrap();
    h.controller.load().await.unwrap();

    h.controller.remove("a").await.unwrap();
    h.controller.load().await.unwrap();

    assert!(h.controller.receipts().iter().all(|r| r.id != "a"));
    assert_eq!(h.controller.receipts(), vec![stored("b", "5 TL")]);
    assert_eq!(h.controller.total(), "5,00 TL");
}

#[tokio::test]
async fn test_successive_adds_then_load_match_storage() {
    let h = harness(vec![
        Ok(analyzed(Some("10,50 TL"), Some("01.01.2025"))),
        Ok(analyzed(Some("5 TL"), None)),
        Ok(analyzed(Some("1.234,56 TL"), Some("03.01.2025"))),
    ]);

    let mut added = Vec::new();
    for image in ["a.jpg", "b.jpg", "c.jpg"] {
        added.push(h.controller.add_from_image(image).await.unwrap());
    }

    h.controller.load().await.unwrap();

    let durable = h.storage.list_all().await.unwrap();
    assert_eq!(h.controller.receipts(), durable);
    assert_eq!(durable, added);
    assert_eq!(h.controller.total(), "1250,06 TL");
}

#[tokio::test]
async fn test_remove_failure_keeps_list_and_notifies() {
    let h = harness(vec![]);
    h.storage.append(stored("a", "1 TL")).await.unwrap();
    h.controller.load().await.unwrap();
    FlakyStorage::set(&h.storage.fail_remove, true);

    let result = h.controller.remove("a").await;

    assert!(matches!(result, Err(AppError::Storage(_))));
    assert_eq!(h.controller.receipts(), vec![stored("a", "1 TL")]);
    assert_eq!(h.storage.list_all().await.unwrap(), vec![stored("a", "1 TL")]);
    assert_eq!(h.notifier.notices(), vec![Notice::DeleteFailed]);
}

#[tokio::test]
async fn test_total_ignores_unparsable_amounts() {
    let h = harness(vec![]);
    h.storage.append(stored("a", "abc")).await.unwrap();
    h.storage.append(stored("b", "2,25 TL")).await.unwrap();
    h.controller.load().await.unwrap();

    let view = h.controller.snapshot();
    assert_eq!(view.receipts.len(), 2);
    assert_eq!(view.total, "2,25 TL");
    assert!(!view.busy);
}

#[tokio::test]
async fn test_analyzer_called_once_per_add() {
    let analyzer = Arc::new(ScriptedAnalyzer::new(vec![Ok(analyzed(Some("1 TL"), None))]));
    let h = harness_with(analyzer.clone());

    h.controller.add_from_image("a.jpg").await.unwrap();

    assert_eq!(analyzer.calls(), 1);
}
