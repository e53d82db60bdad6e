use std::time::Duration;

use reqwest::Client;
use thiserror::Error;
use url::Url;

use crate::domain::PatronId;

use super::wire::{LoginEnvelope, code_string};

/// 貸出サービス呼び出しの既定デッドライン
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// セッション設定
///
/// 呼び出し側が所有する明示的な設定値。プロセス全体の
/// シングルトンクライアントは存在しない。
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// 図書館のベースURL
    /// （例: `https://ebook.yourcloudlibrary.com/uisvc/BethlehemDistrictLibraries`）
    pub base_url: Url,
    /// 1呼び出しあたりの固定デッドライン。超過はトランスポートエラー
    pub timeout: Duration,
}

impl SessionConfig {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// セッション確立のエラー
#[derive(Debug, Error)]
pub enum SessionError {
    /// ネットワーク/タイムアウト障害
    #[error("network error: {0}")]
    Transport(String),

    /// ログインレスポンスが期待した形でない
    #[error("malformed login response: {0}")]
    Protocol(String),

    /// サーバーがErrorCodeで報告したエラー
    #[error("service error {code}: {message}")]
    Service { code: String, message: String },

    /// `Success != true`。メッセージはサーバーのFailureReason
    #[error("login failed: {0}")]
    LoginFailed(String),
}

impl From<reqwest::Error> for SessionError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

/// 認証済みセッション
///
/// サーバー発行のセッションクッキーを保持するHTTPクライアントと、
/// 束縛されたベースURL。ログイン成功時のみ構築される。
///
/// 利用者1人につき1つ。構築後は読み取り専用で、同一利用者の操作に
/// 逐次再利用できる。複数タスクからの並行利用は設計外であり、
/// 必要なら外部で同期すること。明示的な破棄は無い。
#[derive(Debug, Clone)]
pub struct Session {
    base_url: Url,
    client: Client,
}

impl Session {
    /// 指定した利用者として図書館にログインする
    ///
    /// 失敗した場合、セッションは構築されない。
    ///
    /// # エラー
    /// - `Service`: サーバーがErrorCodeを報告した
    /// - `LoginFailed`: `Success != true`（FailureReasonを保持）
    pub async fn login(patron_id: &PatronId, config: SessionConfig) -> Result<Self, SessionError> {
        let client = Client::builder()
            .cookie_store(true)
            .timeout(config.timeout)
            .build()?;

        let url = join_endpoint(&config.base_url, "Patron/LoginPatron");
        let response = client
            .post(url)
            .json(&serde_json::json!({ "UserId": patron_id.as_str() }))
            .send()
            .await?;

        let envelope: LoginEnvelope = response
            .json()
            .await
            .map_err(|e| SessionError::Protocol(e.to_string()))?;

        if let Some(code) = &envelope.error_code {
            return Err(SessionError::Service {
                code: code_string(code),
                message: envelope.error_message.unwrap_or_default(),
            });
        }

        if envelope.success != Some(true) {
            let reason = envelope
                .failure_reason
                .ok_or_else(|| SessionError::Protocol("missing field FailureReason".into()))?;
            return Err(SessionError::LoginFailed(reason));
        }

        tracing::debug!(library = %config.base_url, "patron session established");

        Ok(Self {
            base_url: config.base_url,
            client,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub(crate) fn client(&self) -> &Client {
        &self.client
    }

    /// エンドポイントの絶対URL文字列を組み立てる
    pub(crate) fn endpoint(&self, path: &str) -> String {
        join_endpoint(&self.base_url, path)
    }
}

fn join_endpoint(base_url: &Url, path: &str) -> String {
    format!("{}/{}", base_url.as_str().trim_end_matches('/'), path)
}
