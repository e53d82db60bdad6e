use async_trait::async_trait;
use reqwest::StatusCode;

use crate::domain::{Item, ItemId, Obii};
use crate::ports::lending_service::{
    BorrowedItem, LendingService, LendingServiceError, Result,
};

use super::session::Session;
use super::wire::{BorrowedEntry, ItemEnvelope, MutationEnvelope};

/// 貸出サービスのHTTPアダプター
///
/// ログイン済みセッションに束縛され、ポートの1メソッドを
/// 1つのリクエスト/レスポンス交換として実装する。
pub struct HttpLendingService {
    session: Session,
}

impl HttpLendingService {
    pub fn new(session: Session) -> Self {
        Self { session }
    }

    /// Borrow/Return共通の遷移要求
    async fn mutate(&self, path: &str, item_id: &ItemId) -> Result<()> {
        tracing::debug!(item = %item_id, endpoint = path, "requesting lending transition");

        let response = self
            .session
            .client()
            .post(self.session.endpoint(path))
            .json(&serde_json::json!({ "CatalogItemId": item_id.as_str() }))
            .send()
            .await
            .map_err(transport)?;

        let envelope: MutationEnvelope = response.json().await.map_err(protocol)?;
        envelope.into_result()
    }
}

#[async_trait]
impl LendingService for HttpLendingService {
    async fn get_item(&self, item_id: &ItemId) -> Result<Item> {
        let response = self
            .session
            .client()
            .get(self.session.endpoint("Item/GetItem"))
            .query(&[("id", item_id.as_str())])
            .send()
            .await
            .map_err(transport)?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(LendingServiceError::NotFound(item_id.clone()));
        }

        let envelope: ItemEnvelope = response.json().await.map_err(protocol)?;
        envelope.into_item(item_id.clone())
    }

    async fn borrowed_items(&self) -> Result<Vec<BorrowedItem>> {
        let response = self
            .session
            .client()
            .get(self.session.endpoint("Patron/Borrowed"))
            .send()
            .await
            .map_err(transport)?;

        let entries: Vec<BorrowedEntry> = response.json().await.map_err(protocol)?;
        entries
            .into_iter()
            .map(BorrowedEntry::into_borrowed_item)
            .collect()
    }

    async fn borrow(&self, item_id: &ItemId) -> Result<()> {
        self.mutate("Item/Borrow", item_id).await
    }

    async fn return_item(&self, item_id: &ItemId) -> Result<()> {
        self.mutate("Item/Return", item_id).await
    }

    async fn download(&self, obii: &Obii) -> Result<Vec<u8>> {
        // localEpubは値を持たないクエリフラグで、サービスの規約どおりに残す
        let url = format!(
            "{}?localEpub&id={}",
            self.session.endpoint("Reader/OfflineReading"),
            obii.as_str()
        );

        let response = self
            .session
            .client()
            .get(url)
            .send()
            .await
            .map_err(transport)?;

        let bytes = response.bytes().await.map_err(transport)?;
        Ok(bytes.to_vec())
    }
}

fn transport(err: reqwest::Error) -> LendingServiceError {
    LendingServiceError::Transport(err.to_string())
}

fn protocol(err: reqwest::Error) -> LendingServiceError {
    LendingServiceError::Protocol(err.to_string())
}
