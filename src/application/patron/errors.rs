use thiserror::Error;

use crate::domain::{ItemId, LendingState, PatronAction, TransitionError};
use crate::ports::LendingServiceError;

/// 利用者操作のエラー
#[derive(Debug, Error)]
pub enum PatronError {
    /// ネットワーク/タイムアウト障害
    #[error("network error: {0}")]
    Transport(String),

    /// レスポンスに期待したフィールドが無い、または形が不正
    #[error("malformed response: {0}")]
    Protocol(String),

    /// サーバーがErrorCodeで報告したエラー
    #[error("service error {code}: {message}")]
    Service { code: String, message: String },

    /// サーバーによる業務的拒否
    ///
    /// クライアント側の事前条件を通過していても発生する。
    /// フェッチと試行の間に他の利用者が状態を変えた場合など。
    #[error("action rejected: {0}")]
    ActionRejected(String),

    /// クライアント側の事前条件違反。ネットワーク呼び出し前に失敗する
    #[error("cannot {attempted}: the item is not in the required state")]
    InvalidTransition {
        attempted: PatronAction,
        observed: Option<LendingState>,
    },

    /// 借用中一覧にアイテムが無く、ダウンロードトークンを解決できない
    #[error("item {0} is not in the borrowed list")]
    NotBorrowed(ItemId),

    /// アイテムが存在しない
    #[error("item {0} not found")]
    ItemNotFound(ItemId),
}

impl From<LendingServiceError> for PatronError {
    fn from(err: LendingServiceError) -> Self {
        match err {
            LendingServiceError::Transport(msg) => Self::Transport(msg),
            LendingServiceError::Protocol(msg) => Self::Protocol(msg),
            LendingServiceError::Service { code, message } => Self::Service { code, message },
            LendingServiceError::Rejected(msg) => Self::ActionRejected(msg),
            LendingServiceError::NotFound(id) => Self::ItemNotFound(id),
        }
    }
}

impl From<TransitionError> for PatronError {
    fn from(err: TransitionError) -> Self {
        match err {
            TransitionError::NotPermitted { attempted, observed } => Self::InvalidTransition {
                attempted,
                observed,
            },
        }
    }
}

/// 利用者操作のResult型
pub type Result<T> = std::result::Result<T, PatronError>;
