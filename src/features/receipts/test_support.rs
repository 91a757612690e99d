//! 領収書機能のテスト用ダブル

use super::api_client::ReceiptAnalyzer;
use super::models::{AnalyzedReceipt, Receipt};
use super::notifications::{Notice, Notifier};
use super::storage::{KeyValueReceiptStorage, ReceiptStorage};
use crate::shared::errors::{AppError, AppResult};
use crate::shared::storage::MemoryKeyValueStore;
use async_trait::async_trait;
use http_body_util::{BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use hyper::header::{ACCEPT, CONTENT_TYPE};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use std::collections::VecDeque;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// 受け取った通知を記録する通知先
#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }
}

/// 解析結果
pub fn analyzed(amount: Option<&str>, date: Option<&str>) -> AnalyzedReceipt {
    AnalyzedReceipt {
        amount: amount.map(str::to_string),
        date: date.map(str::to_string),
    }
}

/// あらかじめ用意した結果を順番に返す解析器
#[derive(Default)]
pub struct ScriptedAnalyzer {
    responses: Mutex<VecDeque<AppResult<AnalyzedReceipt>>>,
    calls: AtomicUsize,
}

impl ScriptedAnalyzer {
    pub fn new(responses: Vec<AppResult<AnalyzedReceipt>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReceiptAnalyzer for ScriptedAnalyzer {
    async fn analyze(&self, _image_uri: &str) -> AppResult<AnalyzedReceipt> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AppError::transport("スクリプトの応答が尽きました")))
    }
}

/// 解放されるまで応答を保留する解析器
pub struct GatedAnalyzer {
    pub started: Notify,
    pub release: Notify,
    response: AnalyzedReceipt,
}

impl GatedAnalyzer {
    pub fn new(response: AnalyzedReceipt) -> Self {
        Self {
            started: Notify::new(),
            release: Notify::new(),
            response,
        }
    }
}

#[async_trait]
impl ReceiptAnalyzer for GatedAnalyzer {
    async fn analyze(&self, _image_uri: &str) -> AppResult<AnalyzedReceipt> {
        self.started.notify_one();
        self.release.notified().await;
        Ok(self.response.clone())
    }
}

/// 指定した操作を失敗させられるストレージ
pub struct FlakyStorage {
    inner: KeyValueReceiptStorage,
    pub fail_list: AtomicBool,
    pub fail_append: AtomicBool,
    pub fail_remove: AtomicBool,
}

impl Default for FlakyStorage {
    fn default() -> Self {
        Self {
            inner: KeyValueReceiptStorage::new(Arc::new(MemoryKeyValueStore::new())),
            fail_list: AtomicBool::new(false),
            fail_append: AtomicBool::new(false),
            fail_remove: AtomicBool::new(false),
        }
    }
}

impl FlakyStorage {
    pub fn set(flag: &AtomicBool, value: bool) {
        flag.store(value, Ordering::SeqCst);
    }

    fn check(flag: &AtomicBool, operation: &str) -> AppResult<()> {
        if flag.load(Ordering::SeqCst) {
            return Err(AppError::storage(format!("{operation}に失敗しました（テスト）")));
        }
        Ok(())
    }
}

#[async_trait]
impl ReceiptStorage for FlakyStorage {
    async fn list_all(&self) -> AppResult<Vec<Receipt>> {
        Self::check(&self.fail_list, "読み込み")?;
        self.inner.list_all().await
    }

    async fn append(&self, receipt: Receipt) -> AppResult<()> {
        Self::check(&self.fail_append, "追加")?;
        self.inner.append(receipt).await
    }

    async fn remove_by_id(&self, id: &str) -> AppResult<()> {
        Self::check(&self.fail_remove, "削除")?;
        self.inner.remove_by_id(id).await
    }
}

/// スタブWebhookが受け取ったリクエスト
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub content_type: Option<String>,
    pub accept: Option<String>,
    pub body: Vec<u8>,
}

/// 固定レスポンスを返すループバックHTTPサーバー
pub struct StubWebhook {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl StubWebhook {
    /// サーバーを起動する
    pub async fn start(status: u16, body: &str) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));

        let recorded = Arc::clone(&requests);
        let body = body.to_string();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let recorded = Arc::clone(&recorded);
                let body = body.clone();
                tokio::spawn(async move {
                    let service = service_fn(move |req: Request<Incoming>| {
                        handle_request(req, status, body.clone(), Arc::clone(&recorded))
                    });
                    let _ = http1::Builder::new()
                        .serve_connection(TokioIo::new(stream), service)
                        .await;
                });
            }
        });

        Self { addr, requests }
    }

    pub fn url(&self) -> String {
        format!("http://{}/webhook/test", self.addr)
    }

    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.requests.lock().unwrap().last().cloned()
    }

    /// 使われていないポート番号
    pub fn unused_port() -> u16 {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    }
}

async fn handle_request(
    req: Request<Incoming>,
    status: u16,
    body: String,
    recorded: Arc<Mutex<Vec<RecordedRequest>>>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let method = req.method().to_string();
    let content_type = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let accept = req
        .headers()
        .get(ACCEPT)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let request_body = req
        .into_body()
        .collect()
        .await
        .map(|collected| collected.to_bytes().to_vec())
        .unwrap_or_default();

    recorded.lock().unwrap().push(RecordedRequest {
        method,
        content_type,
        accept,
        body: request_body,
    });

    Ok(Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "application/json")
        .body(Full::new(Bytes::from(body)))
        .unwrap())
}
