pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repository;
pub mod routes;
pub mod services;
pub mod telemetry;
pub mod validation;

pub use config::Config;

use repository::{
    ArticleRepository, CommentRepository, FavoriteRepository, FollowRepository, TagRepository,
    UserRepository,
};
use services::{ArticleService, AuthService, CommentService, ProfileService};
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub auth_service: AuthService,
    pub profile_service: ProfileService,
    pub article_service: ArticleService,
    pub comment_service: CommentService,
}

impl AppState {
    pub fn new(pool: PgPool, config: &Config) -> Self {
        let user_repo = UserRepository::new(pool.clone());
        let follow_repo = FollowRepository::new(pool.clone());
        let article_repo = ArticleRepository::new(pool.clone());
        let favorite_repo = FavoriteRepository::new(pool.clone());
        let tag_repo = TagRepository::new(pool.clone());
        let comment_repo = CommentRepository::new(pool.clone());

        Self {
            auth_service: AuthService::new(user_repo.clone(), config),
            profile_service: ProfileService::new(user_repo, follow_repo),
            article_service: ArticleService::new(article_repo.clone(), favorite_repo, tag_repo),
            comment_service: CommentService::new(article_repo, comment_repo),
            pool,
        }
    }
}
