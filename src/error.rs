use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Map, Value, json};
use thiserror::Error;

use crate::{database::unique_violation, validation::ValidationErrors};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Forbidden: not the author of this {0}")]
    Forbidden(&'static str),

    #[error("Not found: {key} ({message})")]
    NotFound {
        key: &'static str,
        message: &'static str,
    },

    #[error("Validation error: {0}")]
    Validation(ValidationErrors),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn article_not_found() -> Self {
        AppError::NotFound {
            key: "article",
            message: "Invalid slug",
        }
    }

    pub fn comment_not_found() -> Self {
        AppError::NotFound {
            key: "comment",
            message: "Invalid id",
        }
    }

    pub fn profile_not_found() -> Self {
        AppError::NotFound {
            key: "profile",
            message: "Invalid username",
        }
    }

    /// Maps a failed insert/update: unique-constraint violations become a 422
    /// on the offending field (`users_email_key` -> `email`).
    pub fn from_write(err: sqlx::Error) -> Self {
        match unique_violation(&err) {
            Some(constraint) => {
                let field = constraint
                    .strip_suffix("_key")
                    .and_then(|c| c.split_once('_'))
                    .map(|(_, field)| field)
                    .unwrap_or("database");
                tracing::warn!(constraint, "Unique constraint violated");
                AppError::Validation(ValidationErrors::single(field, "has already been taken"))
            }
            None => AppError::Database(err),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized | AppError::Jwt(_) => StatusCode::UNAUTHORIZED,
            AppError::InvalidCredentials | AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn errors(&self) -> Map<String, Value> {
        let mut errors = Map::new();

        match self {
            AppError::Unauthorized => {
                errors.insert("authorization".into(), "missing or invalid token".into());
            }
            AppError::Jwt(e) => {
                tracing::warn!(error = %e, "JWT error");
                errors.insert("authorization".into(), "invalid token".into());
            }
            AppError::InvalidCredentials => {
                tracing::warn!("Login attempt with invalid credentials");
                errors.insert(
                    "login".into(),
                    "Not Registered email or invalid password".into(),
                );
            }
            AppError::Forbidden(resource) => {
                tracing::warn!(resource, "Forbidden");
                errors.insert((*resource).into(), "you are not the author".into());
            }
            AppError::NotFound { key, message } => {
                errors.insert((*key).into(), (*message).into());
            }
            AppError::Validation(fields) => {
                for (field, message) in fields.iter() {
                    errors.insert(field.into(), message.into());
                }
            }
            AppError::Database(e) => {
                tracing::error!(error = %e, "Database error");
                errors.insert("database".into(), "internal server error".into());
            }
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                errors.insert("server".into(), "internal server error".into());
            }
        }

        errors
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        AppError::Validation(errors)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = json!({ "errors": self.errors() });

        (status, Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(error: AppError) -> (StatusCode, Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should be readable");
        let json = serde_json::from_slice(&bytes).expect("body should be JSON");
        (status, json)
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(AppError::Unauthorized.to_string(), "Authentication required");
        assert_eq!(AppError::InvalidCredentials.to_string(), "Invalid credentials");
        assert_eq!(
            AppError::Forbidden("article").to_string(),
            "Forbidden: not the author of this article"
        );
        assert_eq!(
            AppError::article_not_found().to_string(),
            "Not found: article (Invalid slug)"
        );
        assert_eq!(
            AppError::Internal("Something went wrong".to_string()).to_string(),
            "Internal error: Something went wrong"
        );
    }

    #[test]
    fn test_error_status_codes() {
        let test_cases = vec![
            (AppError::Unauthorized, StatusCode::UNAUTHORIZED),
            (AppError::InvalidCredentials, StatusCode::FORBIDDEN),
            (AppError::Forbidden("comment"), StatusCode::FORBIDDEN),
            (AppError::comment_not_found(), StatusCode::NOT_FOUND),
            (AppError::profile_not_found(), StatusCode::NOT_FOUND),
            (
                AppError::Validation(ValidationErrors::single("title", "{min: 4}")),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                AppError::Internal("test".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                AppError::Database(sqlx::Error::RowNotFound),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected_status) in test_cases {
            assert_eq!(error.status_code(), expected_status);
        }
    }

    #[test]
    fn test_from_write_passes_through_other_errors() {
        let error = AppError::from_write(sqlx::Error::RowNotFound);
        assert!(matches!(error, AppError::Database(_)));
    }

    #[tokio::test]
    async fn test_validation_response_lists_every_field() {
        let mut fields = ValidationErrors::new();
        fields.add("title", "{min: 4}");
        fields.add("body", "{key: required}");

        let (status, json) = body_json(AppError::Validation(fields)).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            json,
            json!({ "errors": { "title": "{min: 4}", "body": "{key: required}" } })
        );
    }

    #[tokio::test]
    async fn test_not_found_response_shape() {
        let (status, json) = body_json(AppError::article_not_found()).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json, json!({ "errors": { "article": "Invalid slug" } }));
    }

    #[tokio::test]
    async fn test_login_failure_response_shape() {
        let (status, json) = body_json(AppError::InvalidCredentials).await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(
            json["errors"]["login"],
            "Not Registered email or invalid password"
        );
    }

    #[tokio::test]
    async fn test_database_error_hides_details() {
        let (status, json) = body_json(AppError::Database(sqlx::Error::PoolTimedOut)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json, json!({ "errors": { "database": "internal server error" } }));
    }
}
