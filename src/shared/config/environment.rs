use crate::shared::errors::{AppError, AppResult};
use chrono_tz::Tz;
use std::path::PathBuf;
use url::Url;

/// 解析エンドポイントのデフォルトURL
pub const DEFAULT_ANALYSIS_URL: &str =
    "http://localhost:5678/webhook/ab2c9995-ae98-4e60-9c24-2732d83cbaaf";

/// 金額表記のデフォルト通貨サフィックス
pub const DEFAULT_CURRENCY_SUFFIX: &str = "TL";

/// 日付表記のデフォルトタイムゾーン
pub const DEFAULT_TIMEZONE: &str = "Europe/Istanbul";

/// アプリケーションデータディレクトリ名
pub const APP_DIR_NAME: &str = "fis-takip";

/// アプリケーションの実行環境を表す列挙型
#[derive(Debug, Clone, PartialEq)]
pub enum Environment {
    /// 開発環境
    Development,
    /// プロダクション環境
    Production,
}

/// 環境変数取得エラー
#[derive(Debug, Clone)]
pub struct EnvVarError {
    /// 変数名
    pub var_name: String,
    /// エラーメッセージ
    pub message: String,
}

impl std::fmt::Display for EnvVarError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "環境変数 {} が見つかりません: {}",
            self.var_name, self.message
        )
    }
}

impl std::error::Error for EnvVarError {}

/// 環境変数を取得する（優先順位: 起動時 > コンパイル時 > エラー）
///
/// # 取得順序
/// 1. 起動時の環境変数（`std::env::var`）
/// 2. コンパイル時の環境変数（`option_env!`マクロ、build.rsで埋め込み）
/// 3. どちらも見つからない場合はエラー
#[macro_export]
macro_rules! get_env_var {
    ($var_name:expr) => {{
        if let Ok(value) = std::env::var($var_name) {
            log::debug!("環境変数 {} を起動時の環境変数から取得しました", $var_name);
            Ok(value)
        } else if let Some(value) = option_env!($var_name) {
            log::debug!("環境変数 {} をコンパイル時の環境変数から取得しました", $var_name);
            Ok(value.to_string())
        } else {
            Err($crate::shared::config::environment::EnvVarError {
                var_name: $var_name.to_string(),
                message: format!(
                    "起動時の環境変数 {} もコンパイル時の環境変数も見つかりませんでした",
                    $var_name
                ),
            })
        }
    }};
}

/// 環境変数を取得する（オプション版）
#[macro_export]
macro_rules! get_env_var_optional {
    ($var_name:expr) => {{
        $crate::get_env_var!($var_name).ok()
    }};
}

/// 環境変数を取得する（デフォルト値付き）
#[macro_export]
macro_rules! get_env_var_or_default {
    ($var_name:expr, $default_value:expr) => {{
        $crate::get_env_var!($var_name).unwrap_or_else(|_| {
            log::debug!(
                "環境変数 {} が見つからないため、デフォルト値を使用します: {}",
                $var_name,
                $default_value
            );
            $default_value.to_string()
        })
    }};
}

/// 環境設定を管理する構造体
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    /// 実行環境
    pub environment: String,
    /// ログレベル
    pub log_level: String,
}

impl EnvironmentConfig {
    /// 環境変数から設定を読み込む
    pub fn from_env() -> Self {
        let environment = get_environment();
        let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| {
            if environment == Environment::Development {
                "debug".to_string()
            } else {
                "info".to_string()
            }
        });

        Self {
            environment: format!("{environment:?}").to_lowercase(),
            log_level,
        }
    }

    /// ログレベル文字列をフィルターに変換する
    pub fn level_filter(&self) -> log::LevelFilter {
        match self.log_level.to_lowercase().as_str() {
            "error" => log::LevelFilter::Error,
            "warn" => log::LevelFilter::Warn,
            "info" => log::LevelFilter::Info,
            "debug" => log::LevelFilter::Debug,
            "trace" => log::LevelFilter::Trace,
            "off" => log::LevelFilter::Off,
            _ => log::LevelFilter::Info,
        }
    }
}

/// 現在の実行環境を判定する
///
/// # 判定ロジック
/// 1. 実行時環境変数 ENVIRONMENT を確認
/// 2. デバッグビルドの場合は Development
/// 3. リリースビルドの場合は Production
pub fn get_environment() -> Environment {
    if let Ok(env_var) = std::env::var("ENVIRONMENT") {
        let env = match env_var.as_str() {
            "production" => Environment::Production,
            _ => Environment::Development,
        };
        log::debug!("環境判定: 実行時環境変数を使用 -> {env_var} -> {env:?}");
        return env;
    }

    let env = if cfg!(debug_assertions) {
        Environment::Development
    } else {
        Environment::Production
    };
    log::debug!(
        "環境判定: ビルド設定を使用 -> debug_assertions={} -> {env:?}",
        cfg!(debug_assertions)
    );
    env
}

/// 環境に応じたストアファイル名を取得する
pub fn get_store_filename(env: Environment) -> &'static str {
    match env {
        Environment::Development => "dev_receipts.json",
        Environment::Production => "receipts.json",
    }
}

/// 環境変数の読み込みを確認する
///
/// 開発環境（デバッグビルド）の場合のみ.envファイルを読み込む。
/// 本番ビルドでは環境変数は実行時に設定されることを前提とする。
pub fn load_environment_variables() {
    if cfg!(debug_assertions) {
        match dotenv::dotenv() {
            Ok(path) => {
                eprintln!("環境ファイルを読み込みました: {}", path.display());
            }
            Err(_) => {
                // .envがないのは通常の状態（デフォルト値を使用）
            }
        }
    }
}

/// ログシステムを初期化する
///
/// # 処理内容
/// 1. 環境設定を取得
/// 2. ログレベルを設定
/// 3. env_loggerを初期化（二重初期化は無視）
pub fn initialize_logging_system() {
    let env_config = EnvironmentConfig::from_env();

    let result = env_logger::Builder::from_default_env()
        .filter_level(env_config.level_filter())
        .format_timestamp_secs()
        .format_module_path(false)
        .format_target(false)
        .try_init();

    if let Err(e) = result {
        eprintln!("ログシステムは既に初期化されています: {e}");
        return;
    }

    log::info!(
        "ログシステムを初期化しました: level={}, environment={}",
        env_config.log_level,
        env_config.environment
    );
}

/// 解析エンドポイント設定を管理する構造体
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// 画像をPOSTするWebhookのURL
    pub endpoint_url: String,
    /// リクエストのタイムアウト（秒、未設定ならトランスポートの既定値）
    pub timeout_seconds: Option<u64>,
}

impl AnalysisConfig {
    /// URLを指定して設定を作成
    pub fn new<S: Into<String>>(endpoint_url: S) -> Self {
        Self {
            endpoint_url: endpoint_url.into(),
            timeout_seconds: None,
        }
    }

    /// 環境変数から解析エンドポイント設定を読み込む
    pub fn from_env() -> Self {
        let endpoint_url =
            crate::get_env_var_or_default!("RECEIPT_ANALYSIS_URL", DEFAULT_ANALYSIS_URL);

        let timeout_seconds = crate::get_env_var_optional!("RECEIPT_ANALYSIS_TIMEOUT_SECONDS")
            .and_then(|value| match value.parse::<u64>() {
                Ok(seconds) => Some(seconds),
                Err(_) => {
                    log::warn!(
                        "RECEIPT_ANALYSIS_TIMEOUT_SECONDSのパースに失敗しました。タイムアウトなしで続行します: {value}"
                    );
                    None
                }
            });

        log::info!("解析エンドポイント設定: url={endpoint_url}, timeout={timeout_seconds:?}");

        Self {
            endpoint_url,
            timeout_seconds,
        }
    }

    /// 設定を検証する
    ///
    /// # 戻り値
    /// 設定が有効な場合はOk(())、無効な場合は設定エラー
    pub fn validate(&self) -> AppResult<()> {
        if self.endpoint_url.trim().is_empty() {
            return Err(AppError::configuration(
                "解析エンドポイントのURLが設定されていません",
            ));
        }

        let url = Url::parse(&self.endpoint_url).map_err(|e| {
            AppError::configuration(format!(
                "解析エンドポイントのURLが不正です: {} ({e})",
                self.endpoint_url
            ))
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(AppError::configuration(format!(
                "解析エンドポイントはHTTP(S)である必要があります: {}",
                url.scheme()
            )));
        }

        if self.timeout_seconds == Some(0) {
            return Err(AppError::configuration(
                "タイムアウトは0より大きい値である必要があります",
            ));
        }

        Ok(())
    }

    /// エンドポイントのホストがループバックかどうかを判定
    pub fn is_localhost(&self) -> bool {
        let Ok(url) = Url::parse(&self.endpoint_url) else {
            return false;
        };
        matches!(
            url.host_str(),
            Some("localhost") | Some("127.0.0.1") | Some("[::1]")
        )
    }
}

/// 金額・日付表記の設定
#[derive(Debug, Clone)]
pub struct LocaleConfig {
    /// 金額の末尾に付く通貨サフィックス
    pub currency_suffix: String,
    /// 「今日」の日付を決めるタイムゾーン
    pub timezone: Tz,
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self {
            currency_suffix: DEFAULT_CURRENCY_SUFFIX.to_string(),
            timezone: chrono_tz::Europe::Istanbul,
        }
    }
}

impl LocaleConfig {
    /// 環境変数から表記設定を読み込む
    pub fn from_env() -> AppResult<Self> {
        let currency_suffix =
            crate::get_env_var_or_default!("RECEIPT_CURRENCY_SUFFIX", DEFAULT_CURRENCY_SUFFIX);
        let timezone_name = crate::get_env_var_or_default!("RECEIPT_TIMEZONE", DEFAULT_TIMEZONE);

        Self::new(currency_suffix, &timezone_name)
    }

    /// サフィックスとタイムゾーン名から設定を作成
    pub fn new<S: Into<String>>(currency_suffix: S, timezone_name: &str) -> AppResult<Self> {
        let currency_suffix = currency_suffix.into().trim().to_string();
        if currency_suffix.is_empty() {
            return Err(AppError::configuration("通貨サフィックスが空です"));
        }

        let timezone = timezone_name.parse::<Tz>().map_err(|e| {
            AppError::configuration(format!("不明なタイムゾーンです: {timezone_name} ({e})"))
        })?;

        Ok(Self {
            currency_suffix,
            timezone,
        })
    }
}

/// ストレージ設定
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// アプリケーションデータディレクトリ
    pub data_dir: PathBuf,
    /// ストアファイル名
    pub store_filename: String,
}

impl StorageConfig {
    /// 環境変数から設定を読み込む
    ///
    /// RECEIPT_DATA_DIR が未設定の場合はOS標準のデータディレクトリを使用する
    pub fn from_env() -> AppResult<Self> {
        let data_dir = match std::env::var("RECEIPT_DATA_DIR") {
            Ok(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
            _ => dirs::data_dir()
                .map(|dir| dir.join(APP_DIR_NAME))
                .ok_or_else(|| {
                    AppError::configuration("データディレクトリを特定できませんでした")
                })?,
        };

        Ok(Self {
            data_dir,
            store_filename: get_store_filename(get_environment()).to_string(),
        })
    }

    /// ストアファイルのフルパス
    pub fn store_path(&self) -> PathBuf {
        self.data_dir.join(&self.store_filename)
    }
}
