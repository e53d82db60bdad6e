use std::sync::Arc;

use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use bibliotheca::adapters::http::{HttpLendingService, Session, SessionConfig, SessionError};
use bibliotheca::application::patron::{
    PatronError, ServiceDependencies, borrow_item, download_item, fetch_item,
};
use bibliotheca::domain::{Item, ItemId, LendingState, PatronId};

// ============================================================================
// テスト用のヘルパー関数
// ============================================================================

async fn login(server: &MockServer) -> Session {
    Mock::given(method("POST"))
        .and(path("/Patron/LoginPatron"))
        .and(body_json(json!({ "UserId": "11111" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "Success": true })))
        .mount(server)
        .await;

    let base_url = Url::parse(&server.uri()).unwrap();
    let patron = PatronId::new("11111").unwrap();
    Session::login(&patron, SessionConfig::new(base_url))
        .await
        .unwrap()
}

async fn deps(server: &MockServer) -> ServiceDependencies {
    let session = login(server).await;
    ServiceDependencies {
        lending: Arc::new(HttpLendingService::new(session)),
    }
}

fn item_id(id: &str) -> ItemId {
    ItemId::new(id).unwrap()
}

fn snapshot(id: &str, state: LendingState) -> Item {
    Item {
        id: item_id(id),
        title: "t".to_string(),
        authors: "a".to_string(),
        isbn: "i".to_string(),
        state: Some(state),
    }
}

// ============================================================================
// ログイン
// ============================================================================

#[tokio::test]
async fn test_login_failure_carries_failure_reason() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/Patron/LoginPatron"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Success": false,
            "FailureReason": "Unknown patron"
        })))
        .mount(&server)
        .await;

    let base_url = Url::parse(&server.uri()).unwrap();
    let patron = PatronId::new("bogus").unwrap();
    let err = Session::login(&patron, SessionConfig::new(base_url))
        .await
        .unwrap_err();

    // セッションは構築されず、サーバーの失敗理由がそのまま伝わる
    assert!(matches!(err, SessionError::LoginFailed(reason) if reason == "Unknown patron"));
}

#[tokio::test]
async fn test_login_error_code_is_service_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/Patron/LoginPatron"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ErrorCode": "E42",
            "ErrorMessage": "service unavailable"
        })))
        .mount(&server)
        .await;

    let base_url = Url::parse(&server.uri()).unwrap();
    let patron = PatronId::new("11111").unwrap();
    let err = Session::login(&patron, SessionConfig::new(base_url))
        .await
        .unwrap_err();

    match err {
        SessionError::Service { code, message } => {
            assert_eq!(code, "E42");
            assert_eq!(message, "service unavailable");
        }
        other => panic!("expected Service, got {other:?}"),
    }
}

// ============================================================================
// fetch_item
// ============================================================================

#[tokio::test]
async fn test_fetch_item_parses_metadata_and_state() {
    let server = MockServer::start().await;
    let deps = deps(&server).await;

    Mock::given(method("GET"))
        .and(path("/Item/GetItem"))
        .and(query_param("id", "ammqdg9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Title": "The Dispossessed",
            "Authors": "Ursula K. Le Guin",
            "ISBN": "9780060512750",
            "AllowedPatronAction": "Borrow"
        })))
        .mount(&server)
        .await;

    let item = fetch_item(&deps, &item_id("ammqdg9")).await.unwrap();
    assert_eq!(item.title, "The Dispossessed");
    assert_eq!(item.state, Some(LendingState::Available));
}

#[tokio::test]
async fn test_fetch_item_missing_field_is_protocol_error() {
    let server = MockServer::start().await;
    let deps = deps(&server).await;

    Mock::given(method("GET"))
        .and(path("/Item/GetItem"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Title": "The Dispossessed"
        })))
        .mount(&server)
        .await;

    let err = fetch_item(&deps, &item_id("ammqdg9")).await.unwrap_err();
    assert!(matches!(err, PatronError::Protocol(_)));
}

#[tokio::test]
async fn test_fetch_item_http_404_is_not_found() {
    let server = MockServer::start().await;
    let deps = deps(&server).await;

    Mock::given(method("GET"))
        .and(path("/Item/GetItem"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = fetch_item(&deps, &item_id("missing")).await.unwrap_err();
    assert!(matches!(err, PatronError::ItemNotFound(id) if id.as_str() == "missing"));
}

// ============================================================================
// borrow
// ============================================================================

#[tokio::test]
async fn test_borrow_posts_catalog_item_id() {
    let server = MockServer::start().await;
    let deps = deps(&server).await;

    Mock::given(method("POST"))
        .and(path("/Item/Borrow"))
        .and(body_json(json!({ "CatalogItemId": "ammqdg9" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "Result": true })))
        .expect(1)
        .mount(&server)
        .await;

    let item = snapshot("ammqdg9", LendingState::Available);
    borrow_item(&deps, &item).await.unwrap();
}

#[tokio::test]
async fn test_borrow_business_rejection_carries_message() {
    let server = MockServer::start().await;
    let deps = deps(&server).await;

    Mock::given(method("POST"))
        .and(path("/Item/Borrow"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Result": false,
            "Message": "No copies available"
        })))
        .mount(&server)
        .await;

    let item = snapshot("ammqdg9", LendingState::Available);
    let err = borrow_item(&deps, &item).await.unwrap_err();
    assert!(matches!(err, PatronError::ActionRejected(msg) if msg == "No copies available"));
}

#[tokio::test]
async fn test_borrow_precondition_failure_makes_no_request() {
    let server = MockServer::start().await;
    let deps = deps(&server).await;

    // /Item/Borrow のモックは登録しない。リクエストが飛べばテストは失敗する
    let item = snapshot("ammqdg9", LendingState::Borrowed);
    let err = borrow_item(&deps, &item).await.unwrap_err();
    assert!(matches!(err, PatronError::InvalidTransition { .. }));

    server.verify().await;
}

// ============================================================================
// download（2段階プロトコル）
// ============================================================================

#[tokio::test]
async fn test_download_scans_listing_then_fetches_content() {
    let server = MockServer::start().await;
    let deps = deps(&server).await;

    Mock::given(method("GET"))
        .and(path("/Patron/Borrowed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "Id": "other",
                "Title": "Another Book",
                "Authors": "someone",
                "ISBN": "0",
                "Obii": "tok-other"
            },
            {
                "Id": "ammqdg9",
                "Title": "The Dispossessed",
                "Authors": "Ursula K. Le Guin",
                "ISBN": "9780060512750",
                "Obii": "tok-9"
            }
        ])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/Reader/OfflineReading"))
        .and(query_param("id", "tok-9"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(&b"ASCM-DATA"[..]))
        .mount(&server)
        .await;

    let item = snapshot("ammqdg9", LendingState::Borrowed);
    let bytes = download_item(&deps, &item).await.unwrap();
    assert_eq!(bytes, b"ASCM-DATA");
}

#[tokio::test]
async fn test_download_without_listing_entry_is_not_borrowed() {
    let server = MockServer::start().await;
    let deps = deps(&server).await;

    Mock::given(method("GET"))
        .and(path("/Patron/Borrowed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let item = snapshot("ammqdg9", LendingState::Borrowed);
    let err = download_item(&deps, &item).await.unwrap_err();
    assert!(matches!(err, PatronError::NotBorrowed(id) if id.as_str() == "ammqdg9"));
}
