pub mod features;
pub mod shared;

use features::receipts::{
    KeyValueReceiptStorage, Notifier, ReceiptAnalysisClient, ReceiptFormatter,
    ReceiptListController,
};
use log::{error, info};
use shared::config::{
    initialize_application, log_initialization_complete, AnalysisConfig, InitializationResult,
    LocaleConfig, StorageConfig,
};
use shared::errors::AppResult;
use shared::storage::FileKeyValueStore;
use std::sync::Arc;

/// アプリケーション状態（コントローラーと通知先を保持）
pub struct AppState {
    pub controller: Arc<ReceiptListController>,
    pub notifier: Arc<dyn Notifier>,
}

/// アプリケーション状態を組み立てる
///
/// # 引数
/// * `storage_config` - ストレージ設定
/// * `analysis_config` - 解析エンドポイント設定
/// * `locale_config` - 金額・日付の表記設定
/// * `notifier` - ユーザー通知の送り先
///
/// # 戻り値
/// アプリケーション状態、または設定が不正な場合はエラー
pub fn create_app_state(
    storage_config: &StorageConfig,
    analysis_config: AnalysisConfig,
    locale_config: LocaleConfig,
    notifier: Arc<dyn Notifier>,
) -> AppResult<AppState> {
    let store = Arc::new(FileKeyValueStore::new(storage_config.store_path()));
    let storage = Arc::new(KeyValueReceiptStorage::new(store));
    let analyzer = Arc::new(ReceiptAnalysisClient::new(analysis_config)?);
    info!("解析エンドポイント: {}", analyzer.endpoint_url());

    let controller = ReceiptListController::new(
        storage,
        analyzer,
        notifier.clone(),
        ReceiptFormatter::new(locale_config),
    );

    Ok(AppState {
        controller: Arc::new(controller),
        notifier,
    })
}

/// 環境変数から設定を読み込んでアプリケーションを起動する
///
/// # 処理内容
/// 1. データディレクトリの作成と初回起動の判定
/// 2. アプリケーション状態の組み立て
/// 3. 保存済み領収書の読み込み（失敗しても起動は続行）
pub async fn bootstrap(notifier: Arc<dyn Notifier>) -> AppResult<(AppState, InitializationResult)> {
    info!("アプリケーション初期化を開始します...");

    let storage_config = StorageConfig::from_env()?;
    let init_result = initialize_application(&storage_config).map_err(|e| {
        error!("アプリケーションの初期化に失敗しました: {e}");
        e
    })?;

    let state = create_app_state(
        &storage_config,
        AnalysisConfig::from_env(),
        LocaleConfig::from_env()?,
        notifier,
    )?;

    // 読み込み失敗は通知済み。空の一覧で続行する
    let _ = state.controller.load().await;

    log_initialization_complete(&init_result);
    Ok((state, init_result))
}
