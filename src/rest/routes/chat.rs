// rest/routes/chat.rs — Outfit assistant route.
//
// The engine never errors: a storage problem degrades to an empty product
// list and an apology reply, so this handler is infallible.

use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::chat::intent::Gender;
use crate::AppContext;

#[derive(Deserialize)]
pub struct RecommendRequest {
    pub message: String,
}

pub async fn recommend(
    State(ctx): State<Arc<AppContext>>,
    Json(body): Json<RecommendRequest>,
) -> Json<Value> {
    let rec = ctx.chat.recommend(&body.message).await;
    let gender = match rec.gender {
        Gender::Male => "male",
        Gender::Female => "female",
        Gender::Neutral => "neutral",
    };
    Json(json!({
        "reply": rec.reply,
        "products": rec.products,
        "gender": gender,
    }))
}
