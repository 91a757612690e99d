//! ユーザー向け通知
//!
//! 失敗はすべて操作の境界で捕捉され、ここで定義する通知に変換される。
//! 文言はトルコ語（金額表記と同じロケール）。

use serde::Serialize;

/// 通知のタイトル
pub const NOTICE_TITLE: &str = "Hata";

/// ユーザーに表示する通知の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Notice {
    /// 一覧の読み込みに失敗
    LoadFailed,
    /// 削除に失敗
    DeleteFailed,
    /// 解析・保存に失敗
    ProcessFailed,
    /// 金額を読み取れなかった（再撮影を促す）
    UnreadableAmount,
    /// 画像の選択に失敗
    ImageSelectionFailed,
    /// 解析中に再度追加しようとした
    AnalysisInProgress,
}

impl Notice {
    pub fn title(&self) -> &'static str {
        NOTICE_TITLE
    }

    pub fn message(&self) -> &'static str {
        match self {
            Notice::LoadFailed => "Fişler yüklenirken bir hata oluştu.",
            Notice::DeleteFailed => "Fiş silinirken bir hata oluştu.",
            Notice::ProcessFailed => "Fiş işlenirken bir hata oluştu. Lütfen tekrar deneyin.",
            Notice::UnreadableAmount => "Fiş tutarı okunamadı. Lütfen tekrar deneyin.",
            Notice::ImageSelectionFailed => "Görüntü seçilirken bir hata oluştu.",
            Notice::AnalysisInProgress => "Bir fiş zaten işleniyor. Lütfen bekleyin.",
        }
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.title(), self.message())
    }
}

/// 通知の送り先
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// ログにだけ出力する通知先
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: Notice) {
        log::warn!("ユーザー通知: {notice}");
    }
}

/// 標準エラー出力に表示する通知先（CLI用）
#[derive(Debug, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: Notice) {
        log::debug!("ユーザー通知を表示します: {notice:?}");
        eprintln!("{notice}");
    }
}
