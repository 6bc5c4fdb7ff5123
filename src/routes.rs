use std::time::Duration;

use axum::{
    Router,
    http::StatusCode,
    routing::{delete, get, post, put},
};
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::{
    AppState, handlers,
    middleware::{HttpMakeSpan, HttpOnResponse, X_REQUEST_ID},
};

/// Router wrapped in the HTTP middleware stack the server runs with.
pub fn create_app(state: AppState) -> Router {
    // Outermost first: CORS, timeout, request id, tracing, id propagation.
    // Layers are applied individually (innermost first) so each boundary
    // goes through axum's body type, which satisfies CORS/timeout bounds.
    create_router(state)
        .layer(PropagateRequestIdLayer::new(X_REQUEST_ID.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(HttpMakeSpan)
                .on_response(HttpOnResponse),
        )
        .layer(SetRequestIdLayer::new(X_REQUEST_ID.clone(), MakeRequestUuid))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health_check))
        .route("/api/users", post(handlers::register))
        .route("/api/users/login", post(handlers::login))
        .route("/api/user", get(handlers::current_user))
        .route("/api/user", put(handlers::update_user))
        .route("/api/profiles/{username}", get(handlers::get_profile))
        .route(
            "/api/profiles/{username}/follow",
            post(handlers::follow_user),
        )
        .route(
            "/api/profiles/{username}/follow",
            delete(handlers::unfollow_user),
        )
        .route("/api/articles", get(handlers::list_articles))
        .route("/api/articles", post(handlers::create_article))
        .route("/api/articles/feed", get(handlers::feed_articles))
        .route("/api/articles/{slug}", get(handlers::get_article))
        .route("/api/articles/{slug}", put(handlers::update_article))
        .route("/api/articles/{slug}", delete(handlers::delete_article))
        .route(
            "/api/articles/{slug}/favorite",
            post(handlers::favorite_article),
        )
        .route(
            "/api/articles/{slug}/favorite",
            delete(handlers::unfavorite_article),
        )
        .route(
            "/api/articles/{slug}/comments",
            get(handlers::list_comments),
        )
        .route(
            "/api/articles/{slug}/comments",
            post(handlers::add_comment),
        )
        .route(
            "/api/articles/{slug}/comments/{id}",
            delete(handlers::delete_comment),
        )
        .route("/api/tags", get(handlers::list_tags))
        .with_state(state)
}
