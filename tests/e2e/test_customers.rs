use crate::e2e::helpers;

use helpers::mock_backend::CUSTOMER_COUNT;
use helpers::TestContext;
use pretty_assertions::assert_eq;
use serde_json::{json, Map};
use test_context::test_context;
use watchshop_client::domain::auth::{AuthService, AuthServiceApi};
use watchshop_client::domain::customer::{
    filter_consumers, BenefitFilters, CustomerService, CustomerServiceApi,
};
use watchshop_client::infrastructure::ui::UiEvent;

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_page_through_customers(ctx: &TestContext) {
    ctx.sign_in_with("abc", "def").await;
    let customers = CustomerService::new(ctx.client.clone());

    let first = customers.fetch_customers(Map::new(), false).await.unwrap();
    assert_eq!(first.list.len(), 20);
    assert!(first.has_more);

    let second = customers.fetch_customers(Map::new(), true).await.unwrap();
    assert_eq!(second.list.len(), CUSTOMER_COUNT - 20);
    assert!(!second.has_more);

    let state = customers.list_state();
    assert_eq!(state.customers.len(), CUSTOMER_COUNT);
    assert_eq!(state.total, CUSTOMER_COUNT as i64);
    assert!(!state.has_more);

    // A fresh load starts over from page one
    customers.fetch_customers(Map::new(), false).await.unwrap();
    assert_eq!(customers.list_state().customers.len(), 20);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_add_and_update_customers_locally(ctx: &TestContext) {
    ctx.sign_in_with("abc", "def").await;
    let customers = CustomerService::new(ctx.client.clone());
    customers.fetch_customers(Map::new(), false).await.unwrap();

    let created = customers
        .add_customer(json!({"name": "New Customer"}))
        .await
        .unwrap();
    assert_eq!(created["id"], 100);

    let updated = customers
        .update_customer(&json!(100), json!({"name": "Renamed"}))
        .await
        .unwrap();
    assert_eq!(updated["name"], "Renamed");

    let state = customers.list_state();
    assert_eq!(state.customers[0], json!({"id": 100, "name": "Renamed"}));
    assert_eq!(state.total, CUSTOMER_COUNT as i64 + 1);
    assert_eq!(ctx.ui.count(&UiEvent::HideLoading), 2);

    assert!(customers.remove_local_customer(&json!(100)));
    assert_eq!(customers.list_state().total, CUSTOMER_COUNT as i64);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_load_and_filter_consumers(ctx: &TestContext) {
    ctx.sign_in_with("abc", "def").await;
    let customers = CustomerService::new(ctx.client.clone());

    let list = customers.consumers(Map::new()).await.unwrap();
    assert_eq!(list.total, 2);

    let matched = filter_consumers(&list.consumers, "", "vip-0002");
    assert_eq!(matched.len(), 1);
    assert_eq!(matched[0].name.as_deref(), Some("Bea"));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_count_available_benefits(ctx: &TestContext) {
    ctx.sign_in_with("abc", "def").await;
    let customers = CustomerService::new(ctx.client.clone());

    let benefits = customers.benefits(BenefitFilters::default()).await.unwrap();

    assert!(benefits.has_benefits());
    assert_eq!(benefits.available_coupons(), 1);
    assert_eq!(benefits.available_privileges(), 1);
    assert_eq!(benefits.total_count, 3);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_drop_customers_on_logout(ctx: &TestContext) {
    ctx.sign_in_with("abc", "def").await;
    let customers = CustomerService::new(ctx.client.clone());
    customers.fetch_customers(Map::new(), false).await.unwrap();
    customers.fetch_customers(Map::new(), true).await.unwrap();
    assert_eq!(customers.list_state().customers.len(), CUSTOMER_COUNT);

    AuthService::new(ctx.client.clone()).logout(false).await.unwrap();

    assert!(customers.list_state().customers.is_empty());
}
