use thiserror::Error;

/// アプリケーション全体で使用される統一エラー型
#[derive(Debug, Error)]
pub enum AppError {
    /// 解析エンドポイントとの通信エラー（到達不能・非JSONレスポンスなど）
    #[error("通信エラー: {0}")]
    Transport(String),

    /// 永続ストレージの読み書きエラー
    #[error("ストレージエラー: {0}")]
    Storage(String),

    /// 解析には成功したが金額が含まれていない
    #[error("領収書の金額を読み取れませんでした")]
    UnreadableAmount,

    /// バリデーション関連のエラー
    #[error("バリデーションエラー: {0}")]
    Validation(String),

    /// 設定関連のエラー
    #[error("設定エラー: {0}")]
    Configuration(String),

    /// 並行処理関連のエラー
    #[error("並行処理エラー: {0}")]
    Concurrency(String),
}

/// エラーの重要度を表す列挙型
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ErrorSeverity {
    /// 低重要度（ユーザーが再試行で解決できるもの）
    Low,
    /// 中重要度（外部サービス一時的エラーなど）
    Medium,
    /// 高重要度（ストレージエラーなど）
    High,
}

impl AppError {
    /// ユーザーに表示するためのフレンドリーなメッセージを取得
    ///
    /// # 戻り値
    /// ユーザーに表示可能なエラーメッセージ（トルコ語）
    pub fn user_message(&self) -> &str {
        match self {
            AppError::Transport(_) => "Fiş işlenirken bir hata oluştu. Lütfen tekrar deneyin.",
            AppError::Storage(_) => "Fişler kaydedilirken bir hata oluştu.",
            AppError::UnreadableAmount => "Fiş tutarı okunamadı. Lütfen tekrar deneyin.",
            AppError::Validation(msg) => msg,
            AppError::Configuration(_) => "Uygulama ayarlarında bir hata var.",
            AppError::Concurrency(_) => "Bir fiş zaten işleniyor. Lütfen bekleyin.",
        }
    }

    /// エラーの詳細情報を取得
    ///
    /// # 戻り値
    /// エラーの詳細情報（ログ出力用）
    pub fn details(&self) -> String {
        format!("{self}")
    }

    /// エラーの重要度を取得
    ///
    /// # 戻り値
    /// エラーの重要度レベル
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            AppError::Transport(_) => ErrorSeverity::Medium,
            AppError::Storage(_) => ErrorSeverity::High,
            AppError::UnreadableAmount => ErrorSeverity::Low,
            AppError::Validation(_) => ErrorSeverity::Low,
            AppError::Configuration(_) => ErrorSeverity::High,
            AppError::Concurrency(_) => ErrorSeverity::Low,
        }
    }

    /// 通信エラーを作成するヘルパー関数
    pub fn transport<S: Into<String>>(message: S) -> Self {
        AppError::Transport(message.into())
    }

    /// ストレージエラーを作成するヘルパー関数
    pub fn storage<S: Into<String>>(message: S) -> Self {
        AppError::Storage(message.into())
    }

    /// バリデーションエラーを作成するヘルパー関数
    ///
    /// # 引数
    /// * `message` - バリデーションエラーメッセージ
    ///
    /// # 戻り値
    /// バリデーションエラー
    pub fn validation<S: Into<String>>(message: S) -> Self {
        AppError::Validation(message.into())
    }

    /// 設定エラーを作成するヘルパー関数
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        AppError::Configuration(message.into())
    }

    /// 並行処理エラーを作成するヘルパー関数
    pub fn concurrency<S: Into<String>>(message: S) -> Self {
        AppError::Concurrency(message.into())
    }
}

/// AppErrorからStringへの変換（コマンドハンドラーでの使用のため）
impl From<AppError> for String {
    fn from(error: AppError) -> Self {
        error.user_message().to_string()
    }
}

/// reqwest::ErrorからAppErrorへの変換
impl From<reqwest::Error> for AppError {
    fn from(error: reqwest::Error) -> Self {
        AppError::Transport(format!("解析エンドポイントとの通信に失敗しました: {error}"))
    }
}

/// Result型のエイリアス（アプリケーション全体で使用）
pub type AppResult<T> = Result<T, AppError>;
