//! 貸出サービスのワイヤスキーマ
//!
//! PascalCaseのJSONレスポンスを型付きで受け、欠落や型不一致は
//! クラッシュではなくプロトコルエラーに変換する。

use serde::Deserialize;
use serde_json::Value;

use crate::domain::{Item, ItemId, LendingState, Obii};
use crate::ports::{BorrowedItem, LendingServiceError};

/// ErrorCodeは文字列とは限らないため、表示用文字列に正規化する
pub(crate) fn code_string(code: &Value) -> String {
    match code {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn missing(field: &str) -> LendingServiceError {
    LendingServiceError::Protocol(format!("missing field {field}"))
}

/// ログインレスポンス
///
/// `ErrorCode`はサービスレベルの障害、`Success != true`は
/// `FailureReason`付きのログイン失敗を意味する。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct LoginEnvelope {
    pub error_code: Option<Value>,
    pub error_message: Option<String>,
    pub success: Option<bool>,
    pub failure_reason: Option<String>,
}

/// GetItemレスポンス
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct ItemEnvelope {
    pub error_code: Option<Value>,
    pub error_message: Option<String>,
    pub title: Option<String>,
    pub authors: Option<String>,
    #[serde(rename = "ISBN")]
    pub isbn: Option<String>,
    pub allowed_patron_action: Option<String>,
}

impl ItemEnvelope {
    /// 検証しつつドメインの`Item`へ変換する
    ///
    /// 未知の`AllowedPatronAction`はデコード失敗ではなく
    /// 「どの操作も許可されない状態」（`state = None`）として扱う。
    pub(crate) fn into_item(self, id: ItemId) -> Result<Item, LendingServiceError> {
        if let Some(code) = &self.error_code {
            return Err(LendingServiceError::Service {
                code: code_string(code),
                message: self.error_message.unwrap_or_default(),
            });
        }

        let title = self.title.ok_or_else(|| missing("Title"))?;
        let authors = self.authors.ok_or_else(|| missing("Authors"))?;
        let isbn = self.isbn.ok_or_else(|| missing("ISBN"))?;
        let action = self
            .allowed_patron_action
            .ok_or_else(|| missing("AllowedPatronAction"))?;

        Ok(Item {
            id,
            title,
            authors,
            isbn,
            state: LendingState::from_wire(&action),
        })
    }
}

/// Borrow/Returnレスポンス
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct MutationEnvelope {
    pub error_code: Option<Value>,
    pub error_message: Option<String>,
    pub result: Option<bool>,
    pub message: Option<String>,
}

impl MutationEnvelope {
    /// `ErrorCode` → `Service`、`Result != true` → `Rejected`
    pub(crate) fn into_result(self) -> Result<(), LendingServiceError> {
        if let Some(code) = &self.error_code {
            return Err(LendingServiceError::Service {
                code: code_string(code),
                message: self.error_message.unwrap_or_default(),
            });
        }

        match self.result {
            Some(true) => Ok(()),
            Some(false) => Err(LendingServiceError::Rejected(
                self.message
                    .unwrap_or_else(|| "request was not accepted".to_string()),
            )),
            None => Err(missing("Result")),
        }
    }
}

/// 借用中一覧のエントリ
///
/// トークン解決に必要なのは`Id`と`Obii`のみ。書誌情報は
/// 欠落していても空文字列で埋める。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct BorrowedEntry {
    pub id: Option<String>,
    pub title: Option<String>,
    pub authors: Option<String>,
    #[serde(rename = "ISBN")]
    pub isbn: Option<String>,
    pub obii: Option<String>,
}

impl BorrowedEntry {
    pub(crate) fn into_borrowed_item(self) -> Result<BorrowedItem, LendingServiceError> {
        let id = self.id.ok_or_else(|| missing("Id"))?;
        let id = ItemId::new(id)
            .map_err(|_| LendingServiceError::Protocol("empty Id in borrowed listing".into()))?;

        let obii = self.obii.ok_or_else(|| missing("Obii"))?;
        let obii = Obii::new(obii)
            .map_err(|_| LendingServiceError::Protocol("empty Obii in borrowed listing".into()))?;

        Ok(BorrowedItem {
            id,
            title: self.title.unwrap_or_default(),
            authors: self.authors.unwrap_or_default(),
            isbn: self.isbn.unwrap_or_default(),
            obii,
        })
    }
}
