use serde::{Deserialize, Serialize};
use std::fmt;

use super::{ItemId, TransitionError};

/// サーバーがAllowedPatronActionに載せるワイヤ文字列
const WIRE_ACTION_BORROW: &str = "Borrow";
const WIRE_ACTION_RETURN: &str = "Return";

/// 貸出状態 - サーバーが報告する「許可された操作」から導出される
///
/// ワイヤ文字列とのマッピング：
/// - `"Borrow"` → `Available`（この利用者が借用できる）
/// - `"Return"` → `Borrowed`（この利用者が借用中。返却・ダウンロードできる）
///
/// サーバーだけが真実の源であり、クライアントは状態の権威的なコピーを
/// 持たない。状態は毎回のフェッチで再観測される。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LendingState {
    Available,
    Borrowed,
}

impl LendingState {
    /// ワイヤ文字列から変換する。未知の値は`None`
    pub fn from_wire(action: &str) -> Option<Self> {
        match action {
            WIRE_ACTION_BORROW => Some(Self::Available),
            WIRE_ACTION_RETURN => Some(Self::Borrowed),
            _ => None,
        }
    }

    /// この状態でサーバーが報告するワイヤ文字列
    pub fn wire_action(&self) -> &'static str {
        match self {
            Self::Available => WIRE_ACTION_BORROW,
            Self::Borrowed => WIRE_ACTION_RETURN,
        }
    }
}

/// 利用者が試みる操作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatronAction {
    Borrow,
    Return,
    Download,
}

impl PatronAction {
    /// この操作が要求する貸出状態
    ///
    /// `Download`は読み取り専用だが、借用中（`Borrowed`）でのみ有効。
    pub fn required_state(&self) -> LendingState {
        match self {
            Self::Borrow => LendingState::Available,
            Self::Return | Self::Download => LendingState::Borrowed,
        }
    }
}

impl fmt::Display for PatronAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Borrow => "borrow",
            Self::Return => "return",
            Self::Download => "download",
        };
        f.write_str(name)
    }
}

/// カタログアイテムのスナップショット
///
/// フェッチ時点のサーバー状態の不変コピー。自分や他の利用者の操作による
/// 状態変化を観測するには再フェッチが必要。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub id: ItemId,
    pub title: String,
    pub authors: String,
    pub isbn: String,
    /// サーバーが未知の操作名を報告した場合は`None`（どの操作も許可されない）
    pub state: Option<LendingState>,
}

/// 純粋関数：操作の事前条件チェック
///
/// 最後に観測した状態が操作を許可しているかを検証する。
/// ここを通過してもサーバーは拒否しうる（フェッチと試行の間に
/// 他の利用者が状態を変えた場合など）。楽観ロックは存在しない。
pub fn check_transition(item: &Item, action: PatronAction) -> Result<(), TransitionError> {
    match item.state {
        Some(state) if state == action.required_state() => Ok(()),
        observed => Err(TransitionError::NotPermitted {
            attempted: action,
            observed,
        }),
    }
}
