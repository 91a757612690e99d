//! 金額・日付の整形と合計金額の計算
//!
//! 金額は常に "1.234,56 TL" のようなロケール表記の文字列として保存される。
//! 数値に戻すのは合計計算のときだけ。

use super::models::Receipt;
use crate::shared::config::LocaleConfig;
use crate::shared::utils::format_locale_date;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

/// 正規化後の文字列の先頭にある10進数
static LEADING_NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?(?:\d+(?:\.\d*)?|\.\d+)").expect("金額パターンの正規表現が不正です")
});

/// ロケールに従って金額と日付を扱うフォーマッター
#[derive(Debug, Clone, Default)]
pub struct ReceiptFormatter {
    config: LocaleConfig,
}

impl ReceiptFormatter {
    pub fn new(config: LocaleConfig) -> Self {
        Self { config }
    }

    /// 整形済み金額を数値に変換する
    ///
    /// # 処理内容
    /// 1. 末尾の通貨サフィックスを取り除く
    /// 2. カンマを含む場合はドットを桁区切りとみなして除去し、カンマを小数点にする
    /// 3. 先頭の数値部分だけを読む（"12,5 TL civarı" → 12.5）
    ///
    /// # 戻り値
    /// 読み取れない場合は0
    pub fn parse_amount(&self, amount: &str) -> f64 {
        let mut text = amount.trim();
        if let Some(stripped) = text.strip_suffix(self.config.currency_suffix.as_str()) {
            text = stripped.trim_end();
        }

        let normalized = if text.contains(',') {
            text.replace('.', "").replacen(',', ".", 1)
        } else {
            text.to_string()
        };

        LEADING_NUMBER
            .find(&normalized)
            .and_then(|m| m.as_str().parse::<f64>().ok())
            .filter(|value| value.is_finite())
            .unwrap_or(0.0)
    }

    /// 数値を "15,50 TL" 形式に整形する
    pub fn format_amount(&self, value: f64) -> String {
        let mut fixed = format!("{value:.2}");
        if fixed == "-0.00" {
            fixed = "0.00".to_string();
        }
        format!("{} {}", fixed.replace('.', ","), self.config.currency_suffix)
    }

    /// 領収書一覧の合計金額を整形済み文字列で返す
    ///
    /// 読み取れない金額は0として扱う。空の一覧は "0,00 TL"。
    pub fn total(&self, receipts: &[Receipt]) -> String {
        let sum: f64 = receipts
            .iter()
            .map(|receipt| self.parse_amount(&receipt.amount))
            .sum();

        // 個々の金額が有限でも合計があふれることがある
        if !sum.is_finite() {
            log::warn!("合計金額が表現可能な範囲を超えました。0として扱います: {}件", receipts.len());
            return self.format_amount(0.0);
        }
        self.format_amount(sum)
    }

    /// 指定時刻を設定タイムゾーンの日付表記にする
    pub fn date_at(&self, instant: DateTime<Utc>) -> String {
        format_locale_date(&instant.with_timezone(&self.config.timezone))
    }

    /// 今日の日付表記
    pub fn today(&self) -> String {
        self.date_at(Utc::now())
    }
}
