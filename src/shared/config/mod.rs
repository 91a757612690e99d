/// 環境変数・実行環境の設定
pub mod environment;

/// 起動時の初期化処理
pub mod initialization;

pub use environment::{
    get_environment, get_store_filename, initialize_logging_system, load_environment_variables,
    AnalysisConfig, Environment, EnvironmentConfig, LocaleConfig, StorageConfig,
};
pub use initialization::{initialize_application, log_initialization_complete, InitializationResult};
