use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
};

use crate::{AppState, error::AppError, models::User};

const TOKEN_SCHEMES: [&str; 2] = ["Token ", "Bearer "];

/// Requires a valid token that resolves to an existing user.
pub struct AuthUser(pub User);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_token(&parts.headers).ok_or(AppError::Unauthorized)?;
        let user = state.auth_service.authenticate(token).await?;
        Ok(AuthUser(user))
    }
}

/// Anonymous when the header is missing or the token does not check out.
pub struct OptionalAuthUser(pub Option<User>);

impl FromRequestParts<AppState> for OptionalAuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = extract_token(&parts.headers) else {
            return Ok(OptionalAuthUser(None));
        };

        match state.auth_service.authenticate(token).await {
            Ok(user) => Ok(OptionalAuthUser(Some(user))),
            Err(AppError::Database(e)) => Err(AppError::Database(e)),
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring invalid token on optional route");
                Ok(OptionalAuthUser(None))
            }
        }
    }
}

impl OptionalAuthUser {
    pub fn id(&self) -> Option<i32> {
        self.0.as_ref().map(|user| user.id)
    }
}

fn extract_token(headers: &HeaderMap) -> Option<&str> {
    let auth_header = headers.get(AUTHORIZATION)?.to_str().ok()?;

    TOKEN_SCHEMES
        .iter()
        .find_map(|scheme| auth_header.strip_prefix(scheme))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_extract_token_scheme() {
        assert_eq!(extract_token(&headers("Token abc.def.ghi")), Some("abc.def.ghi"));
    }

    #[test]
    fn test_extract_bearer_scheme() {
        assert_eq!(extract_token(&headers("Bearer abc.def.ghi")), Some("abc.def.ghi"));
    }

    #[test]
    fn test_extract_rejects_unknown_scheme() {
        assert_eq!(extract_token(&headers("Basic dXNlcjpwYXNz")), None);
        assert_eq!(extract_token(&headers("abc.def.ghi")), None);
    }

    #[test]
    fn test_extract_rejects_empty_token() {
        assert_eq!(extract_token(&headers("Token ")), None);
    }

    #[test]
    fn test_extract_missing_header() {
        assert_eq!(extract_token(&HeaderMap::new()), None);
    }
}
