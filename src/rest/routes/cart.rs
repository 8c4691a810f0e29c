// rest/routes/cart.rs — Cart routes. All require the x-user-id header.

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::rest::{bad_request, internal_error, not_found, require_user, ApiError};
use crate::AppContext;

#[derive(Deserialize)]
pub struct AddRequest {
    pub product_id: String,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
    pub size: Option<String>,
}

fn default_quantity() -> i64 {
    1
}

#[derive(Deserialize)]
pub struct UpdateRequest {
    pub quantity: i64,
}

pub async fn list_cart(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let user_id = require_user(&headers)?;
    let items = ctx.carts.list(&user_id).await.map_err(internal_error)?;
    let subtotal: i64 = items.iter().map(|i| i.product_price * i.quantity).sum();
    Ok(Json(json!({ "items": items, "subtotal": subtotal })))
}

pub async fn add_to_cart(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
    Json(body): Json<AddRequest>,
) -> Result<Json<Value>, ApiError> {
    let user_id = require_user(&headers)?;
    if body.quantity < 1 {
        return Err(bad_request("quantity must be at least 1"));
    }
    let line = ctx
        .carts
        .add(&user_id, &body.product_id, body.quantity, body.size.as_deref())
        .await
        .map_err(internal_error)?;
    Ok(Json(json!({ "item": line })))
}

pub async fn update_line(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
    Path(product_id): Path<String>,
    Json(body): Json<UpdateRequest>,
) -> Result<Json<Value>, ApiError> {
    let user_id = require_user(&headers)?;
    if body.quantity < 1 {
        return Err(bad_request("quantity must be at least 1"));
    }
    let updated = ctx
        .carts
        .set_quantity(&user_id, &product_id, body.quantity)
        .await
        .map_err(internal_error)?;
    if !updated {
        return Err(not_found("Cart line not found"));
    }
    let line = ctx
        .carts
        .line(&user_id, &product_id)
        .await
        .map_err(internal_error)?;
    Ok(Json(json!({ "item": line })))
}

pub async fn remove_line(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
    Path(product_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let user_id = require_user(&headers)?;
    if ctx
        .carts
        .remove(&user_id, &product_id)
        .await
        .map_err(internal_error)?
    {
        Ok(Json(json!({ "removed": true })))
    } else {
        Err(not_found("Cart line not found"))
    }
}
