use axum::{Json, extract::State, http::StatusCode};

use crate::{
    AppState,
    error::AppResult,
    middleware::AuthUser,
    models::{LoginInput, RegisterInput, UpdateUserInput, UserBody, UserResponse},
    validation::ValidatedJson,
};

pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<UserBody<RegisterInput>>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    let user = state.auth_service.register(body.user).await?;

    Ok((StatusCode::CREATED, Json(UserResponse { user })))
}

pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<UserBody<LoginInput>>,
) -> AppResult<Json<UserResponse>> {
    let user = state.auth_service.login(body.user).await?;

    Ok(Json(UserResponse { user }))
}

pub async fn current_user(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> AppResult<Json<UserResponse>> {
    let user = state.auth_service.current(&user)?;

    Ok(Json(UserResponse { user }))
}

pub async fn update_user(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidatedJson(body): ValidatedJson<UserBody<UpdateUserInput>>,
) -> AppResult<Json<UserResponse>> {
    let user = state.auth_service.update(&user, body.user).await?;

    Ok(Json(UserResponse { user }))
}
