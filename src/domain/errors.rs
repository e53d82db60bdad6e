use super::item::{LendingState, PatronAction};

/// 状態遷移のエラー
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionError {
    /// 最後に観測した状態では要求された操作が許可されていない
    NotPermitted {
        attempted: PatronAction,
        observed: Option<LendingState>,
    },
}
