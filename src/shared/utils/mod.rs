pub mod nanoid;

use chrono::{DateTime, TimeZone};
use std::path::PathBuf;

pub use self::nanoid::{generate_receipt_id, is_valid_nanoid};

/// 日付を dd.mm.yyyy 形式（tr-TR のロケール表記）に整形する
///
/// # 引数
/// * `datetime` - 整形する日時（表示したいタイムゾーンのもの）
///
/// # 戻り値
/// 例: "05.03.2025"
pub fn format_locale_date<Tz: TimeZone>(datetime: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    datetime.format("%d.%m.%Y").to_string()
}

/// 画像URIをローカルファイルパスに変換する
///
/// `file://` スキームが付いている場合は取り除く。それ以外はそのままパスとして扱う。
pub fn resolve_image_path(image_uri: &str) -> PathBuf {
    let trimmed = image_uri.trim();
    match trimmed.strip_prefix("file://") {
        Some(path) => PathBuf::from(path),
        None => PathBuf::from(trimmed),
    }
}
