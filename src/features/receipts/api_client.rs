// 解析エンドポイントとの通信を行うクライアント

use super::models::{AnalysisEnvelope, AnalyzedReceipt};
use crate::shared::config::AnalysisConfig;
use crate::shared::errors::{AppError, AppResult};
use crate::shared::utils::resolve_image_path;
use async_trait::async_trait;
use log::{debug, info};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use std::time::Duration;

/// 領収書画像の解析トレイト
#[async_trait]
pub trait ReceiptAnalyzer: Send + Sync {
    /// 画像を解析して金額・日付を取得する
    ///
    /// # 引数
    /// * `image_uri` - 画像のパスまたは `file://` URI
    ///
    /// # 戻り値
    /// 解析結果。通信・デコードの失敗はすべて `AppError::Transport`
    async fn analyze(&self, image_uri: &str) -> AppResult<AnalyzedReceipt>;
}

/// Webhookに画像をPOSTする解析クライアント
///
/// リトライは行わない。タイムアウトは設定されている場合のみ適用する。
pub struct ReceiptAnalysisClient {
    client: Client,
    config: AnalysisConfig,
}

impl ReceiptAnalysisClient {
    /// 新しい解析クライアントを作成
    pub fn new(config: AnalysisConfig) -> AppResult<Self> {
        config.validate()?;

        let mut builder = Client::builder();
        if let Some(seconds) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(seconds));
        }
        // ローカルのWebhookにはシステムプロキシを経由させない
        if config.is_localhost() {
            builder = builder.no_proxy();
        }

        let client = builder
            .build()
            .map_err(|e| AppError::configuration(format!("HTTPクライアント初期化失敗: {e}")))?;

        Ok(Self { client, config })
    }

    /// エンドポイントURL
    pub fn endpoint_url(&self) -> &str {
        &self.config.endpoint_url
    }

    async fn read_image(&self, image_uri: &str) -> AppResult<Vec<u8>> {
        let path = resolve_image_path(image_uri);
        tokio::fs::read(&path).await.map_err(|e| {
            AppError::transport(format!("画像ファイルを読み込めませんでした: {path:?} ({e})"))
        })
    }

    async fn send(&self, image: Vec<u8>) -> AppResult<Vec<AnalysisEnvelope>> {
        let response = self
            .client
            .post(&self.config.endpoint_url)
            .header(CONTENT_TYPE, "image/jpeg")
            .header(ACCEPT, "application/json")
            .body(image)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::transport(format!(
                "解析エンドポイントがエラーを返しました: HTTP {}",
                status.as_u16()
            )));
        }

        let body = response.text().await?;

        serde_json::from_str(&body)
            .map_err(|e| AppError::transport(format!("レスポンス解析エラー: {e}")))
    }
}

#[async_trait]
impl ReceiptAnalyzer for ReceiptAnalysisClient {
    async fn analyze(&self, image_uri: &str) -> AppResult<AnalyzedReceipt> {
        info!("領収書画像の解析を開始します: image_uri={image_uri}");

        let image = self.read_image(image_uri).await?;
        debug!("画像を読み込みました: {} bytes", image.len());

        // 失敗時のログは呼び出し側で出力する
        let envelopes = self.send(image).await?;

        let analyzed = envelopes
            .into_iter()
            .next()
            .map(|envelope| envelope.data)
            .ok_or_else(|| AppError::transport("解析レスポンスが空の配列でした"))?;

        info!(
            "領収書の解析が完了しました: amount={:?}, date={:?}",
            analyzed.amount(),
            analyzed.date()
        );
        Ok(analyzed)
    }
}
