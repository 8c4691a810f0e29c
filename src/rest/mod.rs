// rest/mod.rs — Public REST API server.
//
// Axum HTTP server, local only by default. User identity arrives in the
// `x-user-id` header set by the upstream auth proxy; admin routes require
// the server-side bearer token instead.
//
// Endpoints:
//   GET    /api/v1/health
//   GET    /api/v1/products
//   GET    /api/v1/products/{id}
//   POST   /api/v1/chat/recommend
//   GET    /api/v1/cart                 (user)
//   POST   /api/v1/cart                 (user)
//   PATCH  /api/v1/cart/{product_id}    (user)
//   DELETE /api/v1/cart/{product_id}    (user)
//   POST   /api/v1/checkout             (user)
//   GET    /api/v1/my/orders            (user)
//   POST   /api/v1/products             (admin)
//   PATCH  /api/v1/products/{id}        (admin)
//   DELETE /api/v1/products/{id}        (admin)
//   GET    /api/v1/orders               (admin)
//   GET    /api/v1/orders/{id}          (admin)
//   GET    /api/v1/orders/{id}/history  (admin)
//   POST   /api/v1/orders/{id}/status   (admin)
//   PATCH  /api/v1/orders/{id}          (admin)
//   GET    /api/v1/order-statuses       (admin)
//   GET    /api/v1/stats                (admin)

pub mod admin;
pub mod routes;

use anyhow::Result;
use axum::{
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

use crate::AppContext;

pub async fn serve(ctx: Arc<AppContext>) -> Result<()> {
    let bind = format!("{}:{}", ctx.config.bind_address, ctx.config.port);
    let addr: SocketAddr = bind.parse()?;

    let router = build_router(ctx);

    info!("REST API listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}

pub fn build_router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        // Health (no auth)
        .route("/api/v1/health", get(routes::health::health))
        // Catalog
        .route(
            "/api/v1/products",
            get(routes::products::list_products).post(routes::products::create_product),
        )
        .route(
            "/api/v1/products/{id}",
            get(routes::products::get_product)
                .patch(routes::products::update_product)
                .delete(routes::products::delete_product),
        )
        // Chat assistant
        .route("/api/v1/chat/recommend", post(routes::chat::recommend))
        // Cart + checkout
        .route(
            "/api/v1/cart",
            get(routes::cart::list_cart).post(routes::cart::add_to_cart),
        )
        .route(
            "/api/v1/cart/{product_id}",
            axum::routing::patch(routes::cart::update_line).delete(routes::cart::remove_line),
        )
        .route("/api/v1/checkout", post(routes::checkout::checkout))
        .route("/api/v1/my/orders", get(routes::orders::list_my_orders))
        // Admin order management
        .route("/api/v1/orders", get(routes::orders::list_orders))
        .route("/api/v1/orders/{id}", get(routes::orders::get_order).patch(routes::orders::update_order))
        .route("/api/v1/orders/{id}/history", get(routes::orders::order_history))
        .route("/api/v1/orders/{id}/status", post(routes::orders::update_status))
        .route("/api/v1/order-statuses", get(routes::orders::list_statuses))
        .route("/api/v1/stats", get(routes::orders::stats))
        .with_state(ctx)
}

pub type ApiError = (StatusCode, Json<Value>);

pub fn internal_error(e: anyhow::Error) -> ApiError {
    tracing::error!("request failed: {e:#}");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": e.to_string() })),
    )
}

pub fn bad_request(msg: &str) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": msg })))
}

pub fn not_found(msg: &str) -> ApiError {
    (StatusCode::NOT_FOUND, Json(json!({ "error": msg })))
}

/// Extract the user id set by the upstream auth proxy.
pub fn require_user(headers: &HeaderMap) -> Result<String, ApiError> {
    headers
        .get("x-user-id")
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or((
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "missing x-user-id header" })),
        ))
}

/// Validate the admin bearer token on admin-only routes.
pub fn require_admin(headers: &HeaderMap, ctx: &AppContext) -> Result<(), ApiError> {
    if ctx.admin.authorizes(headers) {
        Ok(())
    } else {
        Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "admin token required" })),
        ))
    }
}
