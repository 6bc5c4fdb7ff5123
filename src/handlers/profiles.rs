use axum::{
    Json,
    extract::{Path, State},
};

use crate::{
    AppState,
    error::AppResult,
    middleware::{AuthUser, OptionalAuthUser},
    models::ProfileResponse,
};

pub async fn get_profile(
    State(state): State<AppState>,
    viewer: OptionalAuthUser,
    Path(username): Path<String>,
) -> AppResult<Json<ProfileResponse>> {
    let response = state.profile_service.get(&username, viewer.id()).await?;

    Ok(Json(response))
}

pub async fn follow_user(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(username): Path<String>,
) -> AppResult<Json<ProfileResponse>> {
    let response = state.profile_service.follow(&username, user.id).await?;

    Ok(Json(response))
}

pub async fn unfollow_user(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(username): Path<String>,
) -> AppResult<Json<ProfileResponse>> {
    let response = state.profile_service.unfollow(&username, user.id).await?;

    Ok(Json(response))
}
