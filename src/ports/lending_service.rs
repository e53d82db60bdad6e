use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{Item, ItemId, Obii};

/// 貸出サービスのエラー
///
/// サーバーのエラー報告には2系統ある：
/// - `ErrorCode`/`ErrorMessage` → `Service`（サービスレベルの障害）
/// - `Result=false`/`Message` → `Rejected`（業務ルールによる拒否）
#[derive(Debug, Error)]
pub enum LendingServiceError {
    /// ネットワーク/タイムアウト障害
    #[error("network error: {0}")]
    Transport(String),

    /// レスポンスに期待したフィールドが無い、または形が不正
    #[error("malformed response: {0}")]
    Protocol(String),

    /// サーバーがErrorCodeで報告したエラー
    #[error("service error {code}: {message}")]
    Service { code: String, message: String },

    /// サーバーがResult=falseで報告した業務的拒否
    #[error("rejected by the service: {0}")]
    Rejected(String),

    /// アイテムが存在しない
    #[error("item not found: {0}")]
    NotFound(ItemId),
}

pub type Result<T> = std::result::Result<T, LendingServiceError>;

/// 借用中アイテム一覧のエントリ
///
/// ダウンロードトークン（Obii）はこの一覧からのみ取得できる。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BorrowedItem {
    pub id: ItemId,
    pub title: String,
    pub authors: String,
    pub isbn: String,
    pub obii: Obii,
}

/// 貸出サービスポート
///
/// 認証済みセッションに束縛されたリモート貸出サービスとの境界。
/// 1メソッド = 1リクエスト/レスポンス交換で、リトライは行わない。
#[async_trait]
pub trait LendingService: Send + Sync {
    /// アイテムのメタデータと現在許可されている操作を取得する
    async fn get_item(&self, item_id: &ItemId) -> Result<Item>;

    /// この利用者が借用中のアイテム一覧を取得する
    async fn borrowed_items(&self) -> Result<Vec<BorrowedItem>>;

    /// 借用遷移をサーバーに要求する
    async fn borrow(&self, item_id: &ItemId) -> Result<()>;

    /// 返却遷移をサーバーに要求する
    async fn return_item(&self, item_id: &ItemId) -> Result<()>;

    /// Obiiでオフライン閲覧用コンテンツを取得する
    async fn download(&self, obii: &Obii) -> Result<Vec<u8>>;
}
