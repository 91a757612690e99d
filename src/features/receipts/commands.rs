use super::models::{Receipt, ReceiptListView};
use super::notifications::Notice;
use crate::shared::utils::resolve_image_path;
use crate::AppState;
use log::{info, warn};
use serde::{Deserialize, Serialize};

/// 対応している画像形式（拡張子）
const SUPPORTED_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "heic"];

/// 画像の取得元
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ImageSource {
    /// カメラで撮影
    Camera,
    /// ライブラリから選択
    Library,
}

impl std::fmt::Display for ImageSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImageSource::Camera => write!(f, "camera"),
            ImageSource::Library => write!(f, "library"),
        }
    }
}

/// 領収書一覧と合計を取得する
///
/// # 引数
/// * `state` - アプリケーション状態
///
/// # 戻り値
/// 画面表示用のスナップショット
pub async fn get_receipts(state: &AppState) -> Result<ReceiptListView, String> {
    Ok(state.controller.snapshot())
}

/// 合計金額を取得する
pub async fn get_total(state: &AppState) -> Result<String, String> {
    Ok(state.controller.total())
}

/// 選択された画像を解析して領収書を追加する
///
/// # 引数
/// * `state` - アプリケーション状態
/// * `image_path` - 画像のパスまたは `file://` URI
/// * `source` - 画像の取得元
///
/// # 戻り値
/// 追加された領収書、または失敗時はユーザー向けメッセージ
pub async fn process_receipt_image(
    state: &AppState,
    image_path: String,
    source: ImageSource,
) -> Result<Receipt, String> {
    if let Err(reason) = validate_image_selection(&image_path) {
        warn!("画像の選択に失敗しました: source={source}, path={image_path}, reason={reason}");
        state.notifier.notify(Notice::ImageSelectionFailed);
        return Err(Notice::ImageSelectionFailed.message().to_string());
    }

    info!("領収書画像を受け付けました: source={source}, path={image_path}");

    state
        .controller
        .add_from_image(&image_path)
        .await
        .map_err(|e| e.into())
}

/// 領収書を削除する
///
/// # 引数
/// * `state` - アプリケーション状態
/// * `id` - 領収書ID
///
/// # 戻り値
/// 成功時はtrue、失敗時はユーザー向けメッセージ
pub async fn delete_receipt(state: &AppState, id: String) -> Result<bool, String> {
    if id.trim().is_empty() {
        warn!("空の領収書IDで削除が要求されました");
        state.notifier.notify(Notice::DeleteFailed);
        return Err(Notice::DeleteFailed.message().to_string());
    }

    state.controller.remove(&id).await.map_err(String::from)?;
    Ok(true)
}

/// 画像ファイルの検証（存在と形式）
fn validate_image_selection(image_path: &str) -> Result<(), String> {
    let path = resolve_image_path(image_path);

    if !path.is_file() {
        return Err("指定されたファイルが存在しません".to_string());
    }

    // ファイル形式の検証（JPG/JPEG/PNG/HEIC）
    let extension = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_lowercase())
        .ok_or_else(|| "ファイル拡張子が取得できません".to_string())?;

    if !SUPPORTED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(format!("サポートされていないファイル形式です: {extension}"));
    }

    Ok(())
}
