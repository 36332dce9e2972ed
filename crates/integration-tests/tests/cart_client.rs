//! Integration tests for the cart client against an in-process cart server.
//!
//! These tests verify the exact requests each operation sends and the
//! notifier/navigator side effects that follow.

use axum::http::{Method, StatusCode};
use mart_cart_client::{
    CartClientConfig, CartError, ITEM_ADDED_MESSAGE, MISSING_CREDENTIAL_MESSAGE, StatusPolicy,
};
use mart_core::{CartId, ProductId, Quantity};
use mart_integration_tests::{
    LogCapture, TEST_TOKEN, TestContext, build_client, unreachable_base_url,
};
use serde_json::json;

fn bearer() -> String {
    format!("Bearer {TEST_TOKEN}")
}

fn qty(n: u32) -> Quantity {
    Quantity::new(n).expect("non-zero quantity")
}

// =============================================================================
// Missing Credential Tests
// =============================================================================

#[tokio::test]
async fn test_signed_out_add_sends_nothing_and_redirects() {
    let ctx = TestContext::signed_out().await;

    let result = ctx.client.add_item(ProductId::new(1)).await;

    assert!(matches!(result, Err(CartError::MissingCredential)));
    assert!(ctx.server.requests().is_empty());
    assert_eq!(ctx.ports.messages(), vec![MISSING_CREDENTIAL_MESSAGE]);
    assert_eq!(ctx.ports.redirects(), vec!["/login"]);
    assert_eq!(ctx.ports.refreshes(), 0);
}

#[tokio::test]
async fn test_signed_out_update_sends_nothing_and_redirects() {
    let ctx = TestContext::signed_out().await;

    let result = ctx
        .client
        .update_item_quantity(ProductId::new(1), qty(2))
        .await;

    assert!(matches!(result, Err(CartError::MissingCredential)));
    assert!(ctx.server.requests().is_empty());
    assert_eq!(ctx.ports.messages(), vec![MISSING_CREDENTIAL_MESSAGE]);
    assert_eq!(ctx.ports.redirects(), vec!["/login"]);
    assert_eq!(ctx.ports.refreshes(), 0);
}

#[tokio::test]
async fn test_signed_out_remove_sends_nothing_and_redirects() {
    let ctx = TestContext::signed_out().await;

    let result = ctx.client.remove_item(ProductId::new(1)).await;

    assert!(matches!(result, Err(CartError::MissingCredential)));
    assert!(ctx.server.requests().is_empty());
    assert_eq!(ctx.ports.messages(), vec![MISSING_CREDENTIAL_MESSAGE]);
    assert_eq!(ctx.ports.redirects(), vec!["/login"]);
    assert_eq!(ctx.ports.refreshes(), 0);
}

#[tokio::test]
async fn test_signed_out_fetch_redirects() {
    let ctx = TestContext::signed_out().await;

    let result = ctx.client.fetch_cart().await;

    assert!(matches!(result, Err(CartError::MissingCredential)));
    assert!(ctx.server.requests().is_empty());
    assert_eq!(ctx.ports.redirects(), vec!["/login"]);
}

#[tokio::test]
async fn test_custom_login_path() {
    let ctx = TestContext::signed_out().await;
    let config = CartClientConfig::new(ctx.server.base_url()).with_login_path("auth/sign-in");
    let (client, ports, _) = build_client(&config, None);

    let _ = client.add_item(ProductId::new(1)).await;

    assert_eq!(ports.redirects(), vec!["/auth/sign-in"]);
}

#[tokio::test]
async fn test_token_cleared_mid_session() {
    let ctx = TestContext::signed_in().await;

    ctx.client.add_item(ProductId::new(1)).await.expect("signed in");
    ctx.session.clear();
    let result = ctx.client.add_item(ProductId::new(2)).await;

    assert!(matches!(result, Err(CartError::MissingCredential)));
    assert_eq!(ctx.server.requests().len(), 1);
    assert_eq!(
        ctx.ports.messages(),
        vec![ITEM_ADDED_MESSAGE, MISSING_CREDENTIAL_MESSAGE]
    );
}

// =============================================================================
// Request Shape Tests
// =============================================================================

#[tokio::test]
async fn test_add_item_posts_product_id() {
    let ctx = TestContext::signed_in().await;

    let settled = ctx.client.add_item(ProductId::new(7)).await.expect("settled");

    assert_eq!(settled.status, StatusCode::OK);
    let requests = ctx.server.requests();
    assert_eq!(requests.len(), 1);
    let request = requests.first().expect("one request");
    assert_eq!(request.method, Method::POST);
    assert_eq!(request.path, "/carts");
    assert_eq!(request.query, None);
    assert_eq!(request.authorization.as_deref(), Some(bearer().as_str()));
    assert_eq!(request.content_type.as_deref(), Some("application/json"));
    assert_eq!(request.json(), json!({"productId": 7}));

    assert_eq!(ctx.ports.messages(), vec![ITEM_ADDED_MESSAGE]);
    assert_eq!(ctx.ports.refreshes(), 0);
    assert!(ctx.ports.redirects().is_empty());
}

#[tokio::test]
async fn test_update_quantity_patches_count() {
    let ctx = TestContext::signed_in().await;

    ctx.client
        .update_item_quantity(ProductId::new(7), qty(3))
        .await
        .expect("settled");

    let requests = ctx.server.requests();
    assert_eq!(requests.len(), 1);
    let request = requests.first().expect("one request");
    assert_eq!(request.method, Method::PATCH);
    assert_eq!(request.path, "/carts");
    assert_eq!(request.authorization.as_deref(), Some(bearer().as_str()));
    assert_eq!(request.content_type.as_deref(), Some("application/json"));
    assert_eq!(request.json(), json!({"productId": 7, "count": 3}));

    assert_eq!(ctx.ports.refreshes(), 1);
    assert!(ctx.ports.messages().is_empty());
}

#[tokio::test]
async fn test_remove_item_deletes_by_query() {
    let ctx = TestContext::signed_in().await;

    ctx.client
        .remove_item(ProductId::new(7))
        .await
        .expect("settled");

    let requests = ctx.server.requests();
    assert_eq!(requests.len(), 1);
    let request = requests.first().expect("one request");
    assert_eq!(request.method, Method::DELETE);
    assert_eq!(request.path, "/carts");
    assert_eq!(request.query.as_deref(), Some("product-id=7"));
    assert_eq!(request.authorization.as_deref(), Some(bearer().as_str()));
    assert_eq!(request.content_type.as_deref(), Some("application/json"));
    assert!(request.body.is_empty());

    assert_eq!(ctx.ports.refreshes(), 1);
    assert!(ctx.ports.messages().is_empty());
}

#[tokio::test]
async fn test_remove_twice_sends_two_requests() {
    let ctx = TestContext::signed_in().await;

    ctx.client
        .remove_item(ProductId::new(4))
        .await
        .expect("first settled");
    ctx.client
        .remove_item(ProductId::new(4))
        .await
        .expect("second settled");

    let requests = ctx.server.requests();
    assert_eq!(requests.len(), 2);
    assert!(
        requests
            .iter()
            .all(|r| r.method == Method::DELETE && r.query.as_deref() == Some("product-id=4"))
    );
    assert_eq!(ctx.ports.refreshes(), 2);
}

#[tokio::test]
async fn test_concurrent_calls_are_independent() {
    let ctx = TestContext::signed_in().await;

    let (updated, removed) = tokio::join!(
        ctx.client.update_item_quantity(ProductId::new(9), qty(5)),
        ctx.client.remove_item(ProductId::new(9)),
    );

    assert!(updated.is_ok());
    assert!(removed.is_ok());
    assert_eq!(ctx.server.requests().len(), 2);
    assert_eq!(ctx.ports.refreshes(), 2);
}

// =============================================================================
// Transport Failure Tests
// =============================================================================

#[tokio::test]
async fn test_transport_failure_has_no_side_effects() {
    let config = CartClientConfig::new(unreachable_base_url().await);
    let (client, ports, _) = build_client(&config, Some(TEST_TOKEN));

    let added = client.add_item(ProductId::new(1)).await;
    let updated = client.update_item_quantity(ProductId::new(1), qty(2)).await;
    let removed = client.remove_item(ProductId::new(1)).await;

    assert!(matches!(added, Err(CartError::Transport(_))));
    assert!(matches!(updated, Err(CartError::Transport(_))));
    assert!(matches!(removed, Err(CartError::Transport(_))));
    assert!(ports.untouched());
}

#[tokio::test]
async fn test_transport_failure_is_logged_as_error() {
    let config = CartClientConfig::new(unreachable_base_url().await);
    let (client, _, _) = build_client(&config, Some(TEST_TOKEN));
    let (logs, _guard) = LogCapture::start();

    let _ = client.add_item(ProductId::new(1)).await;

    let errors = logs.lines_at("ERROR");
    assert_eq!(errors.len(), 1, "one error event: {errors:?}");
    let event = errors.first().expect("error event");
    assert!(event.contains("Cart request failed"));
    assert!(event.contains(r#"operation="add_item""#));
}

// =============================================================================
// Status Policy Tests
// =============================================================================

#[tokio::test]
async fn test_settle_policy_ignores_error_status() {
    let ctx = TestContext::signed_in().await;
    ctx.server.respond_with(StatusCode::INTERNAL_SERVER_ERROR);

    let settled = ctx
        .client
        .remove_item(ProductId::new(1))
        .await
        .expect("status-blind by default");

    assert_eq!(settled.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(ctx.ports.refreshes(), 1);
}

#[tokio::test]
async fn test_require_success_policy_rejects_error_status() {
    let ctx = TestContext::with_policy(StatusPolicy::RequireSuccess, Some(TEST_TOKEN)).await;
    ctx.server.respond_with(StatusCode::INTERNAL_SERVER_ERROR);

    let added = ctx.client.add_item(ProductId::new(1)).await;
    let removed = ctx.client.remove_item(ProductId::new(1)).await;

    assert!(matches!(added, Err(CartError::Status { status: 500, .. })));
    assert!(matches!(removed, Err(CartError::Status { status: 500, .. })));
    assert_eq!(ctx.server.requests().len(), 2);
    assert!(ctx.ports.untouched());
}

#[tokio::test]
async fn test_require_success_policy_logs_rejection() {
    let ctx = TestContext::with_policy(StatusPolicy::RequireSuccess, Some(TEST_TOKEN)).await;
    ctx.server.respond_with(StatusCode::BAD_REQUEST);
    let (logs, _guard) = LogCapture::start();

    let _ = ctx
        .client
        .update_item_quantity(ProductId::new(1), qty(2))
        .await;

    let warnings = logs.lines_at("WARN");
    assert_eq!(warnings.len(), 1, "one warning: {warnings:?}");
    let event = warnings.first().expect("warning");
    assert!(event.contains("Cart API returned an error status"));
    assert!(event.contains(r#"operation="update_item_quantity""#));
    assert!(event.contains("400"));
    assert!(logs.lines_at("ERROR").is_empty());
}

#[tokio::test]
async fn test_settle_policy_logs_nothing_on_error_status() {
    let ctx = TestContext::signed_in().await;
    ctx.server.respond_with(StatusCode::BAD_REQUEST);
    let (logs, _guard) = LogCapture::start();

    ctx.client
        .add_item(ProductId::new(1))
        .await
        .expect("status-blind by default");

    assert!(logs.lines_at("WARN").is_empty());
    assert!(logs.lines_at("ERROR").is_empty());
}

#[tokio::test]
async fn test_require_success_policy_accepts_2xx() {
    let ctx = TestContext::with_policy(StatusPolicy::RequireSuccess, Some(TEST_TOKEN)).await;
    ctx.server.respond_with(StatusCode::CREATED);

    let settled = ctx.client.add_item(ProductId::new(1)).await.expect("2xx");

    assert_eq!(settled.status, StatusCode::CREATED);
    assert_eq!(ctx.ports.messages(), vec![ITEM_ADDED_MESSAGE]);
}

// =============================================================================
// Fetch Cart Tests
// =============================================================================

#[tokio::test]
async fn test_fetch_cart_decodes_snapshot() {
    let ctx = TestContext::signed_in().await;
    ctx.server.set_cart(json!({
        "cartId": 12,
        "productResponses": [
            {"id": 1, "count": 2, "imageUrl": "/images/chicken.png", "name": "Chicken"},
            {"id": 3, "count": 1, "imageUrl": "/images/pizza.png", "name": "Pizza"}
        ]
    }));

    let cart = ctx.client.fetch_cart().await.expect("cart");

    assert_eq!(cart.cart_id, CartId::new(12));
    assert_eq!(cart.product_responses.len(), 2);
    assert_eq!(cart.total_units(), 3);
    assert_eq!(
        cart.line(ProductId::new(1)).and_then(|l| l.name.as_deref()),
        Some("Chicken")
    );

    let requests = ctx.server.requests();
    let request = requests.first().expect("one request");
    assert_eq!(request.method, Method::GET);
    assert_eq!(request.path, "/carts");
    assert_eq!(request.authorization.as_deref(), Some(bearer().as_str()));
    assert!(ctx.ports.untouched());
}

#[tokio::test]
async fn test_fetch_cart_error_status() {
    let ctx = TestContext::signed_in().await;
    ctx.server.respond_with(StatusCode::UNAUTHORIZED);

    let result = ctx.client.fetch_cart().await;

    assert!(matches!(result, Err(CartError::Status { status: 401, .. })));
    assert!(ctx.ports.untouched());
}
