// REST handler tests: the handlers are plain async functions, so they are
// invoked directly with constructed extractors instead of a live socket.

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::Json;
use std::sync::Arc;

use butikd::catalog::NewProduct;
use butikd::config::StoreConfig;
use butikd::rest::admin::AdminToken;
use butikd::rest::routes;
use butikd::storage::Storage;
use butikd::AppContext;

const ADMIN_TOKEN: &str = "btk_test-admin-token";

async fn make_ctx() -> Arc<AppContext> {
    let storage = Arc::new(Storage::new_in_memory().await.unwrap());
    Arc::new(AppContext::new(
        Arc::new(StoreConfig::default()),
        storage,
        AdminToken::new(ADMIN_TOKEN.to_string()),
    ))
}

fn admin_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        "authorization",
        HeaderValue::from_str(&format!("Bearer {ADMIN_TOKEN}")).unwrap(),
    );
    headers
}

fn user_headers(user_id: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert("x-user-id", HeaderValue::from_str(user_id).unwrap());
    headers
}

fn sample_product(name: &str) -> NewProduct {
    NewProduct {
        name: name.to_string(),
        price: 120_000,
        category: "T-Shirt".to_string(),
        stock: 5,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_admin_routes_reject_missing_token() {
    let ctx = make_ctx().await;
    let result = routes::products::create_product(
        State(ctx.clone()),
        HeaderMap::new(),
        Json(sample_product("Kaos")),
    )
    .await;
    let (status, _) = result.unwrap_err();
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let result = routes::orders::stats(State(ctx), HeaderMap::new()).await;
    assert_eq!(result.unwrap_err().0, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_product_create_then_public_list() {
    let ctx = make_ctx().await;
    routes::products::create_product(
        State(ctx.clone()),
        admin_headers(),
        Json(sample_product("Kaos Polos")),
    )
    .await
    .unwrap();

    let Json(body) = routes::products::list_products(
        State(ctx),
        Query(routes::products::ListQuery {
            category: None,
            search: Some("polos".to_string()),
        }),
    )
    .await
    .unwrap();
    let products = body["products"].as_array().unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0]["name"], "Kaos Polos");
}

#[tokio::test]
async fn test_cart_requires_user_header() {
    let ctx = make_ctx().await;
    let result = routes::cart::list_cart(State(ctx), HeaderMap::new()).await;
    assert_eq!(result.unwrap_err().0, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_cart_add_and_list_via_handlers() {
    let ctx = make_ctx().await;
    let product = ctx.products.create(sample_product("Kaos")).await.unwrap();

    routes::cart::add_to_cart(
        State(ctx.clone()),
        user_headers("user-1"),
        Json(serde_json::from_value(serde_json::json!({
            "product_id": product.id,
            "quantity": 2,
        }))
        .unwrap()),
    )
    .await
    .unwrap();

    let Json(body) = routes::cart::list_cart(State(ctx), user_headers("user-1"))
        .await
        .unwrap();
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
    assert_eq!(body["subtotal"], 240_000);
}

#[tokio::test]
async fn test_chat_recommend_handler_returns_reply() {
    let ctx = make_ctx().await;
    ctx.products.create(sample_product("Kaos Santai")).await.unwrap();

    let Json(body) = routes::chat::recommend(
        State(ctx),
        Json(serde_json::from_value(serde_json::json!({
            "message": "mau nongkrong sama temen cowo"
        }))
        .unwrap()),
    )
    .await;
    assert_eq!(body["gender"], "male");
    assert!(!body["reply"].as_str().unwrap().is_empty());
    assert!(body["products"].as_array().unwrap().len() <= 5);
}

#[tokio::test]
async fn test_update_status_on_missing_order_is_404() {
    let ctx = make_ctx().await;
    let result = routes::orders::update_status(
        State(ctx),
        admin_headers(),
        Path("nope".to_string()),
        Json(serde_json::from_value(serde_json::json!({ "status": "confirmed" })).unwrap()),
    )
    .await;
    assert_eq!(result.unwrap_err().0, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_order_on_missing_order_is_404() {
    let ctx = make_ctx().await;
    let result = routes::orders::update_order(
        State(ctx),
        admin_headers(),
        Path("missing-id".to_string()),
        Json(butikd::orders::OrderDetailsUpdate {
            tracking_number: Some("JNE123".to_string()),
            ..Default::default()
        }),
    )
    .await;
    assert_eq!(result.unwrap_err().0, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_order_not_found_maps_to_404() {
    let ctx = make_ctx().await;
    let result = routes::orders::get_order(
        State(ctx),
        admin_headers(),
        Path("missing-id".to_string()),
    )
    .await;
    assert_eq!(result.unwrap_err().0, StatusCode::NOT_FOUND);
}
