use crate::e2e::helpers;

use helpers::TestContext;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::time::Duration;
use test_context::test_context;
use watchshop_client::domain::catalog::{
    group_brands_by_letter, search_brands, CatalogService, CatalogServiceApi, ProductQuery,
};

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_load_init_data_without_credentials(ctx: &TestContext) {
    ctx.sign_in_with("abc", "def").await;
    let catalog = CatalogService::new(ctx.client.clone(), None);

    let init = catalog.init_data().await.unwrap();

    assert_eq!(init["brands"][0]["name_en"], "Omega");
    assert_eq!(ctx.backend.public_calls_with_auth(), 0);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_group_and_search_brands(ctx: &TestContext) {
    ctx.sign_in_with("abc", "def").await;
    let catalog = CatalogService::new(ctx.client.clone(), Some(Duration::from_secs(60)));

    let brands = catalog.brands().await.unwrap();
    let grouped = group_brands_by_letter(&brands);

    assert_eq!(grouped.keys().cloned().collect::<Vec<_>>(), vec!["O", "P", "R"]);
    assert_eq!(grouped["O"].len(), 2);
    assert_eq!(search_brands(&brands, "OMEGA").len(), 2);
    assert_eq!(search_brands(&brands, "劳力").len(), 1);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_serve_cached_brands_after_sign_out(ctx: &TestContext) {
    ctx.sign_in_with("abc", "def").await;
    let catalog = CatalogService::new(ctx.client.clone(), Some(Duration::from_secs(60)));
    let first = catalog.brands().await.unwrap();

    // Backend would now reject the old token, the cache answers instead
    ctx.backend.expire_access_token("ghi", "jkl");
    let second = catalog.brands().await.unwrap();

    assert_eq!(first, second);
    assert_eq!(ctx.backend.refresh_calls(), 0);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_encode_product_filters(ctx: &TestContext) {
    ctx.sign_in_with("abc", "def").await;
    let catalog = CatalogService::new(ctx.client.clone(), None);

    let result = catalog
        .products(ProductQuery {
            page: Some(2),
            page_size: Some(10),
            category: None,
            keyword: Some("sea master & co".to_string()),
        })
        .await
        .unwrap();

    assert_eq!(
        result["query"],
        json!({"page": "2", "pageSize": "10", "keyword": "sea master & co"})
    );
}
