// rest/routes/checkout.rs — Create an order from the user's cart.

use axum::{extract::State, http::HeaderMap, Json};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::orders::CheckoutRequest;
use crate::rest::{bad_request, internal_error, require_user, ApiError};
use crate::AppContext;

pub async fn checkout(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
    Json(body): Json<CheckoutRequest>,
) -> Result<Json<Value>, ApiError> {
    let user_id = require_user(&headers)?;
    if body.name.is_empty() || body.phone.is_empty() || body.address.is_empty() {
        return Err(bad_request("name, phone, and address are required"));
    }
    let order = ctx
        .orders
        .checkout(&user_id, body)
        .await
        .map_err(internal_error)?;
    Ok(Json(json!({ "order": order })))
}
