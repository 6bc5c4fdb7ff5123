use axum::{Json, extract::State};
use serde_json::{Value, json};

use crate::{AppState, error::AppResult};

pub async fn list_tags(State(state): State<AppState>) -> AppResult<Json<Value>> {
    let tags = state.article_service.tags().await?;

    Ok(Json(json!({ "tags": tags })))
}
