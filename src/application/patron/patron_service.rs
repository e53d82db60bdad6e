use std::sync::Arc;

use crate::domain::{Item, ItemId, Obii, PatronAction, check_transition};
use crate::ports::{BorrowedItem, LendingService};

use super::errors::{PatronError, Result};

/// サービスの依存関係
///
/// 関数型DDDの原則に従い、データ構造として定義。
/// 振る舞い（メソッド）は持たず、純粋な関数に依存関係を渡す。
#[derive(Clone)]
pub struct ServiceDependencies {
    pub lending: Arc<dyn LendingService>,
}

/// アイテムのメタデータと現在許可されている操作を取得する
///
/// 返される`Item`はフェッチ時点のスナップショット。状態の変化を
/// 観測するには再フェッチが必要。ネットワーク読み取り以外の副作用はない。
///
/// # エラー
/// - `ItemNotFound` / `Service`: サーバーがエラーコードを報告した
/// - `Protocol`: 期待したフィールドが無い、または形が不正
pub async fn fetch_item(deps: &ServiceDependencies, item_id: &ItemId) -> Result<Item> {
    Ok(deps.lending.get_item(item_id).await?)
}

/// 借用中アイテムの一覧を取得する
pub async fn borrowed_items(deps: &ServiceDependencies) -> Result<Vec<BorrowedItem>> {
    Ok(deps.lending.borrowed_items().await?)
}

/// アイテムを借用する
///
/// ビジネスルール：
/// - 最後に観測した状態が`Available`であること
///
/// クライアント側のチェックは高速失敗のための最適化であり、
/// 通過した場合は必ずサーバーに遷移を要求する。サーバーの判定が最終。
///
/// # エラー
/// - `InvalidTransition`: 事前条件違反。ネットワーク呼び出しは行われない
/// - `ActionRejected`: サーバーが拒否した（可用性が変わった場合など）
/// - `Service`: サーバーがエラーコードを報告した
pub async fn borrow_item(deps: &ServiceDependencies, item: &Item) -> Result<()> {
    // 1. クライアント側の事前条件
    check_transition(item, PatronAction::Borrow)?;

    // 2. サーバーへの遷移要求（こちらが権威）
    deps.lending.borrow(&item.id).await?;

    tracing::debug!(item = %item.id, "borrow transition accepted");
    Ok(())
}

/// アイテムを返却する
///
/// ビジネスルール：
/// - 最後に観測した状態が`Borrowed`であること
///
/// 事前条件とサーバー権威の扱いは`borrow_item`と対称。
pub async fn return_item(deps: &ServiceDependencies, item: &Item) -> Result<()> {
    check_transition(item, PatronAction::Return)?;

    deps.lending.return_item(&item.id).await?;

    tracing::debug!(item = %item.id, "return transition accepted");
    Ok(())
}

/// オフライン閲覧用コンテンツ（ライセンスファイル）をダウンロードする
///
/// 2段階プロトコル：
/// 1. 借用中一覧を走査して対象アイテムのObiiを解決する
///    （トークンはメタデータからは得られず、一覧だけが公開する）
/// 2. トークンでコンテンツを取得する
///
/// 結果はキャッシュしない。呼び出しごとにトークンを解決し直す。
/// 状態を変えない読み取り専用の操作。
///
/// # エラー
/// - `InvalidTransition`: 最後に観測した状態が`Borrowed`でない
/// - `NotBorrowed`: 借用中一覧にアイテムが無い（一覧が権威）
pub async fn download_item(deps: &ServiceDependencies, item: &Item) -> Result<Vec<u8>> {
    check_transition(item, PatronAction::Download)?;

    let obii = resolve_obii(deps, &item.id).await?;
    Ok(deps.lending.download(&obii).await?)
}

/// 借用中一覧からダウンロードトークンを解決するヘルパー関数
///
/// 一覧が権威：最後に観測した状態が`Borrowed`でも、
/// 一覧に無ければ`NotBorrowed`で失敗する。
async fn resolve_obii(deps: &ServiceDependencies, item_id: &ItemId) -> Result<Obii> {
    let borrowed = deps.lending.borrowed_items().await?;

    for entry in &borrowed {
        tracing::debug!(item = %entry.id, title = %entry.title, obii = %entry.obii, "borrowed entry");
        if &entry.id == item_id {
            return Ok(entry.obii.clone());
        }
    }

    Err(PatronError::NotBorrowed(item_id.clone()))
}
