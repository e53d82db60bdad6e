use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::{Item, ItemId, LendingState, Obii};
use crate::ports::lending_service::{
    BorrowedItem, LendingService as LendingServiceTrait, LendingServiceError, Result,
};

/// モック内の1アイテム
#[derive(Debug, Clone)]
struct Entry {
    title: String,
    authors: String,
    isbn: String,
    state: Option<LendingState>,
    /// 借用中のときのみ発行される
    obii: Option<Obii>,
    /// 次のborrowをこのメッセージで拒否する
    borrow_rejection: Option<String>,
}

#[derive(Default)]
struct Inner {
    items: HashMap<ItemId, Entry>,
    obii_seq: u32,
}

/// LendingServiceのモック実装
///
/// 状態を持ったテストをサポート：borrow/returnで実際に
/// Available ⇄ Borrowed を遷移し、借用時にObiiを発行する。
/// 他の利用者との競合による拒否を注入できる。
pub struct LendingService {
    inner: Mutex<Inner>,
}

impl LendingService {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
        }
    }

    /// テスト用に貸出可能なアイテムを登録
    pub fn add_available_item(&self, id: ItemId, title: &str, authors: &str, isbn: &str) {
        self.inner.lock().unwrap().items.insert(
            id,
            Entry {
                title: title.to_string(),
                authors: authors.to_string(),
                isbn: isbn.to_string(),
                state: Some(LendingState::Available),
                obii: None,
                borrow_rejection: None,
            },
        );
    }

    /// テスト用に未知の操作名を報告するアイテムを登録
    pub fn add_unknown_state_item(&self, id: ItemId, title: &str) {
        self.inner.lock().unwrap().items.insert(
            id,
            Entry {
                title: title.to_string(),
                authors: String::new(),
                isbn: String::new(),
                state: None,
                obii: None,
                borrow_rejection: None,
            },
        );
    }

    /// 次のborrowを指定メッセージで拒否させる
    ///
    /// フェッチと試行の間に他の利用者が借用した競合をシミュレートする。
    /// 観測される状態はAvailableのまま。
    pub fn reject_next_borrow(&self, id: &ItemId, message: &str) {
        if let Some(entry) = self.inner.lock().unwrap().items.get_mut(id) {
            entry.borrow_rejection = Some(message.to_string());
        }
    }

    /// アイテムを借用中一覧から外す（観測される状態はBorrowedのまま）
    ///
    /// トークン解決において一覧が権威であることのテスト用。
    pub fn remove_from_listing(&self, id: &ItemId) {
        if let Some(entry) = self.inner.lock().unwrap().items.get_mut(id) {
            entry.obii = None;
        }
    }
}

impl Default for LendingService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LendingServiceTrait for LendingService {
    async fn get_item(&self, item_id: &ItemId) -> Result<Item> {
        let inner = self.inner.lock().unwrap();
        let entry = inner
            .items
            .get(item_id)
            .ok_or_else(|| LendingServiceError::NotFound(item_id.clone()))?;

        Ok(Item {
            id: item_id.clone(),
            title: entry.title.clone(),
            authors: entry.authors.clone(),
            isbn: entry.isbn.clone(),
            state: entry.state,
        })
    }

    async fn borrowed_items(&self) -> Result<Vec<BorrowedItem>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .items
            .iter()
            .filter_map(|(id, entry)| {
                entry.obii.clone().map(|obii| BorrowedItem {
                    id: id.clone(),
                    title: entry.title.clone(),
                    authors: entry.authors.clone(),
                    isbn: entry.isbn.clone(),
                    obii,
                })
            })
            .collect())
    }

    async fn borrow(&self, item_id: &ItemId) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.obii_seq += 1;
        let obii = Obii::new(format!("obii-{}", inner.obii_seq)).unwrap();

        let entry = inner
            .items
            .get_mut(item_id)
            .ok_or_else(|| LendingServiceError::NotFound(item_id.clone()))?;

        if let Some(message) = entry.borrow_rejection.take() {
            return Err(LendingServiceError::Rejected(message));
        }

        if entry.state != Some(LendingState::Available) {
            return Err(LendingServiceError::Rejected(
                "item is not available".to_string(),
            ));
        }

        entry.state = Some(LendingState::Borrowed);
        entry.obii = Some(obii);
        Ok(())
    }

    async fn return_item(&self, item_id: &ItemId) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        let entry = inner
            .items
            .get_mut(item_id)
            .ok_or_else(|| LendingServiceError::NotFound(item_id.clone()))?;

        if entry.state != Some(LendingState::Borrowed) {
            return Err(LendingServiceError::Rejected(
                "item is not borrowed".to_string(),
            ));
        }

        entry.state = Some(LendingState::Available);
        entry.obii = None;
        Ok(())
    }

    async fn download(&self, obii: &Obii) -> Result<Vec<u8>> {
        let inner = self.inner.lock().unwrap();
        let entry = inner
            .items
            .values()
            .find(|entry| entry.obii.as_ref() == Some(obii))
            .ok_or_else(|| {
                LendingServiceError::Rejected("unknown download token".to_string())
            })?;

        Ok(format!("license:{}", entry.title).into_bytes())
    }
}
