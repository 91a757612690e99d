use std::env;

/// コンパイル時に埋め込む設定値
const EMBEDDED_KEYS: &[&str] = &[
    "RECEIPT_ANALYSIS_URL",
    "RECEIPT_ANALYSIS_TIMEOUT_SECONDS",
    "RECEIPT_CURRENCY_SUFFIX",
    "RECEIPT_TIMEZONE",
];

fn main() {
    // ENVIRONMENT環境変数に基づいて適切な.envファイルを読み込み
    let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

    let env_file = match environment.as_str() {
        "production" => ".env.production",
        _ => ".env",
    };

    println!("cargo:rerun-if-env-changed=ENVIRONMENT");
    println!("cargo:rerun-if-changed={env_file}");

    if dotenv::from_filename(env_file).is_ok() {
        println!("cargo:warning={env_file}ファイルを読み込みました");

        // get_env_var! が option_env! で参照できるよう同名で埋め込む
        for key in EMBEDDED_KEYS {
            if let Ok(value) = env::var(key) {
                println!("cargo:rustc-env={key}={value}");
            }
        }
    }
}
