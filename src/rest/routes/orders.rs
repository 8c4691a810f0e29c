// rest/routes/orders.rs — Order management routes (admin) plus the
// customer's own order list.

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::orders::{OrderDetailsUpdate, OrderStatus, PaymentStatus, TransitionError};
use crate::rest::{bad_request, internal_error, not_found, require_admin, require_user, ApiError};
use crate::AppContext;

#[derive(Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
}

pub async fn list_orders(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>, ApiError> {
    require_admin(&headers, &ctx)?;
    let orders = match query.status.as_deref() {
        Some(raw) => {
            let status = OrderStatus::parse(raw)
                .ok_or_else(|| bad_request("unknown order status"))?;
            ctx.orders.list_by_status(status).await
        }
        None => ctx.orders.list().await,
    }
    .map_err(internal_error)?;
    Ok(Json(json!({ "orders": orders })))
}

pub async fn list_my_orders(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let user_id = require_user(&headers)?;
    let orders = ctx
        .orders
        .list_for_user(&user_id)
        .await
        .map_err(internal_error)?;
    Ok(Json(json!({ "orders": orders })))
}

pub async fn get_order(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    require_admin(&headers, &ctx)?;
    match ctx.orders.get(&id).await.map_err(internal_error)? {
        Some(order) => Ok(Json(json!({ "order": order }))),
        None => Err(not_found("Order not found")),
    }
}

pub async fn order_history(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    require_admin(&headers, &ctx)?;
    let history = ctx.orders.history(&id).await.map_err(internal_error)?;
    Ok(Json(json!({ "history": history })))
}

#[derive(Deserialize)]
pub struct StatusRequest {
    pub status: String,
    pub note: Option<String>,
}

pub async fn update_status(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<StatusRequest>,
) -> Result<Json<Value>, ApiError> {
    require_admin(&headers, &ctx)?;
    let status =
        OrderStatus::parse(&body.status).ok_or_else(|| bad_request("unknown order status"))?;
    let order = ctx
        .orders
        .update_status(&id, status, body.note.as_deref(), None)
        .await
        .map_err(|e| match e.downcast_ref::<TransitionError>() {
            Some(TransitionError::OrderNotFound) => not_found("Order not found"),
            Some(te) => bad_request(&te.to_string()),
            None => internal_error(e),
        })?;
    Ok(Json(json!({ "order": order })))
}

pub async fn update_order(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<OrderDetailsUpdate>,
) -> Result<Json<Value>, ApiError> {
    require_admin(&headers, &ctx)?;
    if let Some(ref ps) = body.payment_status {
        if PaymentStatus::parse(ps).is_none() {
            return Err(bad_request("unknown payment status"));
        }
    }
    let order = ctx
        .orders
        .update_details(&id, body)
        .await
        .map_err(|e| match e.downcast_ref::<TransitionError>() {
            Some(TransitionError::OrderNotFound) => not_found("Order not found"),
            _ => internal_error(e),
        })?;
    Ok(Json(json!({ "order": order })))
}

pub async fn list_statuses(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    require_admin(&headers, &ctx)?;
    let statuses = ctx.orders.statuses().await.map_err(internal_error)?;
    Ok(Json(json!({ "statuses": statuses })))
}

pub async fn stats(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    require_admin(&headers, &ctx)?;
    let stats = ctx.orders.stats().await.map_err(internal_error)?;
    let product_count = ctx.products.count().await.map_err(internal_error)?;
    Ok(Json(json!({ "stats": stats, "products": product_count })))
}
