//! Bibliotheca cloudLibrary の非公式クライアントライブラリ。
//!
//! 利用者としてログインし、カタログアイテムの状態
//! （借用可能/借用中）を取得し、現在許可されている操作
//! （borrow / return / download）を実行する。
//!
//! すべての操作は同期的なHTTP/JSONのリクエスト/レスポンス交換で、
//! サーバーだけが貸出状態の真実の源となる。クライアントは状態を
//! キャッシュせず、毎回のフェッチで再観測する。
//!
//! ```no_run
//! use std::sync::Arc;
//! use bibliotheca::adapters::http::{HttpLendingService, Session, SessionConfig};
//! use bibliotheca::application::patron::{ServiceDependencies, borrow_item, fetch_item};
//! use bibliotheca::domain::{ItemId, PatronId};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let base_url = "https://ebook.yourcloudlibrary.com/uisvc/BethlehemDistrictLibraries".parse()?;
//! let patron = PatronId::new("11111").unwrap();
//! let session = Session::login(&patron, SessionConfig::new(base_url)).await?;
//!
//! let deps = ServiceDependencies {
//!     lending: Arc::new(HttpLendingService::new(session)),
//! };
//!
//! let item = fetch_item(&deps, &ItemId::new("ammqdg9").unwrap()).await?;
//! borrow_item(&deps, &item).await?;
//! # Ok(())
//! # }
//! ```

// === Core Modules ===

/// 純粋なドメイン型と遷移ルール。
pub mod domain;

/// リモートサービスとの境界（trait）。
pub mod ports;

/// 利用者操作のアプリケーション層。
pub mod application;

/// HTTP実装とテスト用モック。
pub mod adapters;

// === Re-exports ===

pub use application::patron::{PatronError, ServiceDependencies};
pub use domain::{Item, ItemId, LendingState, Obii, PatronAction, PatronId};
pub use ports::{BorrowedItem, LendingService, LendingServiceError};
