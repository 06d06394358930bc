use crate::e2e::helpers;

use futures::future::join_all;
use helpers::mock_backend::VALID_LOGIN_CODE;
use helpers::TestContext;
use pretty_assertions::assert_eq;
use std::collections::HashSet;
use std::time::Duration;
use test_context::test_context;
use watchshop_client::domain::auth::{AuthService, AuthServiceApi, LoginRequest, SESSION_STORAGE_KEY};
use watchshop_client::error::ClientError;
use watchshop_client::infrastructure::http::ApiRequest;
use watchshop_client::infrastructure::storage::KeyValueStore;
use watchshop_client::infrastructure::ui::UiEvent;

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_refresh_and_replay_after_token_expiry(ctx: &TestContext) {
    let auth = AuthService::new(ctx.client.clone());
    auth.login(LoginRequest::new(VALID_LOGIN_CODE)).await.unwrap();
    assert_eq!(ctx.session.access_token().as_deref(), Some("abc"));

    ctx.backend.expire_access_token("ghi", "jkl");

    let brands = ctx.client.send(ApiRequest::get("/brands")).await.unwrap();

    assert_eq!(brands.as_array().map(Vec::len), Some(4));
    assert_eq!(ctx.backend.refresh_calls(), 1);
    assert_eq!(ctx.session.access_token().as_deref(), Some("ghi"));
    assert_eq!(ctx.session.refresh_token().as_deref(), Some("jkl"));

    let stored = ctx.store.get(SESSION_STORAGE_KEY).await.unwrap().unwrap();
    assert_eq!(stored["tokens"]["access_token"], "ghi");
    assert_eq!(stored["tokens"]["refresh_token"], "jkl");
    assert!(ctx.ui.errors().is_empty());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_share_one_refresh_across_concurrent_calls(ctx: &TestContext) {
    ctx.sign_in_with("abc", "def").await;
    ctx.backend.expire_access_token("ghi", "jkl");
    ctx.backend.slow_refresh(Duration::from_millis(150));

    let calls = (0..10).map(|_| {
        let client = ctx.client.clone();
        async move { client.send(ApiRequest::get("/brands")).await }
    });
    let results = join_all(calls).await;

    assert!(results.iter().all(Result::is_ok), "{:?}", results);
    assert_eq!(ctx.backend.refresh_calls(), 1);
    assert_eq!(ctx.client.refresh_coordinator().generation(), 1);
    assert!(!ctx.client.refresh_coordinator().is_refreshing());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_sign_out_once_when_refresh_fails(ctx: &TestContext) {
    ctx.sign_in_with("abc", "def").await;
    ctx.backend.expire_access_token("ghi", "jkl");
    ctx.backend.fail_refresh();
    ctx.backend.slow_refresh(Duration::from_millis(150));

    let calls = (0..5).map(|_| {
        let client = ctx.client.clone();
        async move { client.send(ApiRequest::get("/brands").silent()).await }
    });
    let results = join_all(calls).await;

    assert!(results
        .iter()
        .all(|r| matches!(r, Err(ClientError::RefreshFailed(_)))));
    assert_eq!(ctx.backend.refresh_calls(), 1);
    assert_eq!(ctx.ui.count(&UiEvent::RedirectToLogin), 1);
    assert!(!ctx.session.is_logged_in());
    assert_eq!(ctx.session.access_token(), None);

    let stored = ctx.store.get(SESSION_STORAGE_KEY).await.unwrap().unwrap();
    assert!(stored["tokens"].is_null());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_not_refresh_on_server_errors(ctx: &TestContext) {
    ctx.sign_in_with("abc", "def").await;

    let err = ctx.client.send(ApiRequest::get("/broken")).await.unwrap_err();

    assert_eq!(err.status_code(), Some(500));
    assert_eq!(err.to_string(), "database unavailable");
    assert_eq!(ctx.backend.refresh_calls(), 0);
    assert_eq!(ctx.ui.errors(), vec!["Request failed (500)".to_string()]);
    assert!(ctx.session.is_logged_in());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_tag_every_request_with_a_fresh_id(ctx: &TestContext) {
    ctx.sign_in_with("abc", "def").await;

    for _ in 0..3 {
        ctx.client.send(ApiRequest::get("/brands")).await.unwrap();
    }

    let ids = ctx.backend.request_ids();
    assert_eq!(ids.len(), 3);
    assert_eq!(ids.iter().collect::<HashSet<_>>().len(), 3);
}
