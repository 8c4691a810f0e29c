// rest/routes/products.rs — Catalog routes (public browse + admin CRUD).

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::catalog::{NewProduct, ProductUpdate};
use crate::rest::{internal_error, not_found, require_admin, ApiError};
use crate::AppContext;

#[derive(Deserialize)]
pub struct ListQuery {
    pub category: Option<String>,
    pub search: Option<String>,
}

pub async fn list_products(
    State(ctx): State<Arc<AppContext>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>, ApiError> {
    let products = ctx
        .products
        .list(query.category.as_deref(), query.search.as_deref())
        .await
        .map_err(internal_error)?;
    Ok(Json(json!({ "products": products })))
}

pub async fn get_product(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    match ctx.products.get(&id).await.map_err(internal_error)? {
        Some(product) => Ok(Json(json!({ "product": product }))),
        None => Err(not_found("Product not found")),
    }
}

pub async fn create_product(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
    Json(body): Json<NewProduct>,
) -> Result<Json<Value>, ApiError> {
    require_admin(&headers, &ctx)?;
    let product = ctx.products.create(body).await.map_err(internal_error)?;
    Ok(Json(json!({ "product": product })))
}

pub async fn update_product(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<ProductUpdate>,
) -> Result<Json<Value>, ApiError> {
    require_admin(&headers, &ctx)?;
    match ctx.products.update(&id, body).await.map_err(internal_error)? {
        Some(product) => Ok(Json(json!({ "product": product }))),
        None => Err(not_found("Product not found")),
    }
}

pub async fn delete_product(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    require_admin(&headers, &ctx)?;
    if ctx.products.deactivate(&id).await.map_err(internal_error)? {
        Ok(Json(json!({ "deactivated": true })))
    } else {
        Err(not_found("Product not found"))
    }
}
