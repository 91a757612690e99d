/// 共有エラー型とエラーハンドリング
pub mod errors;

/// 共有キーバリューストア
pub mod storage;

/// 共有設定管理
pub mod config;

/// 共有ユーティリティ関数
pub mod utils;

// 便利な再エクスポート
pub use config::{
    get_environment, initialize_application, initialize_logging_system,
    load_environment_variables, log_initialization_complete, AnalysisConfig, Environment,
    EnvironmentConfig, InitializationResult, LocaleConfig, StorageConfig,
};
pub use errors::{AppError, AppResult, ErrorSeverity};
pub use storage::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};
