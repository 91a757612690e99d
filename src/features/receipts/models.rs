use crate::shared::errors::{AppError, AppResult};
use crate::shared::utils::generate_receipt_id;
use serde::{Deserialize, Serialize};

/// 保存済み領収書データモデル
///
/// 作成後は変更されない。削除はIDで行う。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub id: String,
    pub image_uri: String,
    /// 整形済み金額（例: "10,50 TL"）
    #[serde(alias = "tutar")]
    pub amount: String,
    /// 整形済み日付（例: "05.03.2025"）
    #[serde(alias = "tarih")]
    pub date: String,
}

impl Receipt {
    /// 新しいIDを採番して領収書を作成する
    pub fn new<S: Into<String>>(image_uri: S, amount: S, date: S) -> Self {
        Self {
            id: generate_receipt_id(),
            image_uri: image_uri.into(),
            amount: amount.into(),
            date: date.into(),
        }
    }

    /// 永続化前の検証
    pub fn validate(&self) -> AppResult<()> {
        if self.id.trim().is_empty() {
            return Err(AppError::validation("Fiş kimliği boş olamaz"));
        }
        if self.amount.trim().is_empty() {
            return Err(AppError::validation("Fiş tutarı boş olamaz"));
        }
        Ok(())
    }
}

/// 解析エンドポイントが返す金額・日付
///
/// どちらも欠落し得る。空白のみの値は欠落として扱う。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzedReceipt {
    #[serde(default, alias = "tutar")]
    pub amount: Option<String>,
    #[serde(default, alias = "tarih")]
    pub date: Option<String>,
}

impl AnalyzedReceipt {
    /// 空でない金額
    pub fn amount(&self) -> Option<&str> {
        non_blank(self.amount.as_deref())
    }

    /// 空でない日付
    pub fn date(&self) -> Option<&str> {
        non_blank(self.date.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// 解析エンドポイントのレスポンス要素（`[{ "data": {...} }]` の1要素）
#[derive(Debug, Deserialize)]
pub struct AnalysisEnvelope {
    pub data: AnalyzedReceipt,
}

/// 画面表示用のスナップショット
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptListView {
    pub receipts: Vec<Receipt>,
    /// 整形済み合計金額（例: "15,50 TL"）
    pub total: String,
    pub busy: bool,
}
