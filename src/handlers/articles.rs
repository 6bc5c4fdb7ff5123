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
    models::{
        ArticleBody, ArticleResponse, ArticlesResponse, CreateArticleInput, FeedQuery,
        ListArticlesQuery, UpdateArticleInput,
    },
    validation::{QueryParams, ValidatedJson},
};

pub async fn create_article(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidatedJson(body): ValidatedJson<ArticleBody<CreateArticleInput>>,
) -> AppResult<(StatusCode, Json<ArticleResponse>)> {
    let response = state.article_service.create(user.id, body.article).await?;

    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn get_article(
    State(state): State<AppState>,
    viewer: OptionalAuthUser,
    Path(slug): Path<String>,
) -> AppResult<Json<ArticleResponse>> {
    let response = state.article_service.get(&slug, viewer.id()).await?;

    Ok(Json(response))
}

pub async fn list_articles(
    State(state): State<AppState>,
    viewer: OptionalAuthUser,
    QueryParams(query): QueryParams<ListArticlesQuery>,
) -> AppResult<Json<ArticlesResponse>> {
    let response = state.article_service.list(query, viewer.id()).await?;

    Ok(Json(response))
}

pub async fn feed_articles(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    QueryParams(query): QueryParams<FeedQuery>,
) -> AppResult<Json<ArticlesResponse>> {
    let response = state.article_service.feed(query, user.id).await?;

    Ok(Json(response))
}

pub async fn update_article(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(slug): Path<String>,
    ValidatedJson(body): ValidatedJson<ArticleBody<UpdateArticleInput>>,
) -> AppResult<Json<ArticleResponse>> {
    let response = state
        .article_service
        .update(&slug, user.id, body.article)
        .await?;

    Ok(Json(response))
}

pub async fn delete_article(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(slug): Path<String>,
) -> AppResult<Json<Value>> {
    state.article_service.delete(&slug, user.id).await?;

    Ok(Json(json!({ "article": "Delete success" })))
}

pub async fn favorite_article(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(slug): Path<String>,
) -> AppResult<Json<ArticleResponse>> {
    let response = state.article_service.favorite(&slug, user.id).await?;

    Ok(Json(response))
}

pub async fn unfavorite_article(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(slug): Path<String>,
) -> AppResult<Json<ArticleResponse>> {
    let response = state.article_service.unfavorite(&slug, user.id).await?;

    Ok(Json(response))
}
