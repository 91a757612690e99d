use crate::shared::config::{get_environment, Environment, StorageConfig};
use crate::shared::errors::{AppError, AppResult};
use std::fs;
use std::path::{Path, PathBuf};

/// アプリケーション初期化の結果を表す構造体
#[derive(Debug)]
pub struct InitializationResult {
    /// 初回起動かどうか
    pub is_first_run: bool,
    /// アプリケーションデータディレクトリのパス
    pub app_data_dir: PathBuf,
    /// ストアファイルのパス
    pub store_path: PathBuf,
    /// 実行環境
    pub environment: Environment,
}

/// アプリケーションの初期化を実行する
///
/// # 引数
/// * `storage_config` - ストレージ設定
///
/// # 戻り値
/// 初期化結果、または失敗時はエラー
///
/// # 処理内容
/// 1. アプリケーションデータディレクトリの作成
/// 2. 初回起動の判定（ストアファイルの存在で判定）
pub fn initialize_application(storage_config: &StorageConfig) -> AppResult<InitializationResult> {
    let environment = get_environment();

    let app_data_dir = ensure_app_data_directory(&storage_config.data_dir)?;
    let store_path = storage_config.store_path();

    let is_first_run = !store_path.exists();

    if is_first_run {
        log_first_run_initialization(&environment, &app_data_dir, &store_path);
    }

    Ok(InitializationResult {
        is_first_run,
        app_data_dir,
        store_path,
        environment,
    })
}

/// アプリケーションデータディレクトリを確実に作成する
fn ensure_app_data_directory(app_data_dir: &Path) -> AppResult<PathBuf> {
    if !app_data_dir.exists() {
        fs::create_dir_all(app_data_dir).map_err(|e| {
            AppError::configuration(format!("アプリデータディレクトリの作成に失敗: {e}"))
        })?;

        log::info!("アプリケーションデータディレクトリを作成しました: {app_data_dir:?}");
    } else if !app_data_dir.is_dir() {
        return Err(AppError::configuration(format!(
            "アプリデータディレクトリのパスがファイルを指しています: {app_data_dir:?}"
        )));
    }

    Ok(app_data_dir.to_path_buf())
}

/// 初回起動時の初期化ログを出力する
fn log_first_run_initialization(environment: &Environment, app_data_dir: &Path, store_path: &Path) {
    log::info!("=== アプリケーション初回起動 ===");
    log::info!("実行環境: {environment:?}");
    log::info!("アプリデータディレクトリ: {app_data_dir:?}");
    log::info!("ストアファイル: {store_path:?}");
}

/// 初期化完了ログを出力する
pub fn log_initialization_complete(result: &InitializationResult) {
    if result.is_first_run {
        log::info!("初回起動の初期化が正常に完了しました");
    } else {
        log::info!("アプリケーション起動完了（既存ストアを使用）");
    }
    log::info!("環境: {:?}", result.environment);
    log::info!("ストア: {:?}", result.store_path);
}
