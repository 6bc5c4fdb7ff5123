use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde_json::{Value, json};

use crate::{
    AppState,
    error::AppResult,
    middleware::{AuthUser, OptionalAuthUser},
    models::{CommentBody, CommentResponse, CommentsResponse},
    validation::ValidatedJson,
};

pub async fn add_comment(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(slug): Path<String>,
    ValidatedJson(body): ValidatedJson<CommentBody>,
) -> AppResult<(StatusCode, Json<CommentResponse>)> {
    let response = state
        .comment_service
        .create(&slug, user.id, body.comment)
        .await?;

    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn list_comments(
    State(state): State<AppState>,
    viewer: OptionalAuthUser,
    Path(slug): Path<String>,
) -> AppResult<Json<CommentsResponse>> {
    let response = state.comment_service.list(&slug, viewer.id()).await?;

    Ok(Json(response))
}

/// The id stays a string so a non-numeric segment maps to the comment 404.
pub async fn delete_comment(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path((slug, id)): Path<(String, String)>,
) -> AppResult<Json<Value>> {
    state.comment_service.delete(&slug, &id, user.id).await?;

    Ok(Json(json!({ "comment": "Delete success" })))
}
