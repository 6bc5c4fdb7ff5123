use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use tracing::instrument;

use crate::{
    config::Config,
    error::{AppError, AppResult},
    models::{LoginInput, RegisterInput, UpdateUserInput, User, UserWithToken},
    repository::{UserChanges, UserRepository},
    telemetry::USERS_REGISTERED,
    validation::submitted,
};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i32,
    pub exp: i64,
    pub iat: i64,
}

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    jwt_secret: String,
    jwt_expires_in_hours: i64,
}

impl AuthService {
    pub fn new(user_repo: UserRepository, config: &Config) -> Self {
        Self {
            user_repo,
            jwt_secret: config.jwt_secret.clone(),
            jwt_expires_in_hours: config.jwt_expires_in_hours,
        }
    }

    #[instrument(name = "auth.register", skip(self, input), fields(username = ?input.username))]
    pub async fn register(&self, input: RegisterInput) -> AppResult<UserWithToken> {
        let password_hash = hash_password(input.password.as_deref().unwrap_or_default())?;

        let user = self
            .user_repo
            .create(
                input.username.as_deref().unwrap_or_default(),
                input.email.as_deref().unwrap_or_default(),
                &password_hash,
            )
            .await
            .map_err(AppError::from_write)?;

        let token = self.generate_token(user.id)?;

        USERS_REGISTERED.add(1, &[]);

        tracing::info!(user_id = user.id, "User registered");

        Ok(UserWithToken::from_user(&user, token))
    }

    #[instrument(name = "auth.login", skip(self, input))]
    pub async fn login(&self, input: LoginInput) -> AppResult<UserWithToken> {
        let user = self
            .user_repo
            .find_by_email(input.email.as_deref().unwrap_or_default())
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        verify_password(
            input.password.as_deref().unwrap_or_default(),
            &user.password_hash,
        )?;

        let token = self.generate_token(user.id)?;

        tracing::info!(user_id = user.id, "User logged in");

        Ok(UserWithToken::from_user(&user, token))
    }

    /// Current user with a freshly issued token.
    pub fn current(&self, user: &User) -> AppResult<UserWithToken> {
        let token = self.generate_token(user.id)?;
        Ok(UserWithToken::from_user(user, token))
    }

    #[instrument(name = "auth.update", skip(self, user, input), fields(user_id = user.id))]
    pub async fn update(&self, user: &User, input: UpdateUserInput) -> AppResult<UserWithToken> {
        let password_hash = submitted(&input.password).map(hash_password).transpose()?;

        let changes = UserChanges {
            username: submitted(&input.username),
            email: submitted(&input.email),
            password_hash: password_hash.as_deref(),
            bio: submitted(&input.bio),
            image: submitted(&input.image),
        };

        let updated = self
            .user_repo
            .update(user.id, changes)
            .await
            .map_err(AppError::from_write)?;

        tracing::info!(user_id = user.id, "User updated");

        self.current(&updated)
    }

    /// Resolves a bearer token to a stored user.
    #[instrument(name = "auth.authenticate", skip(self, token))]
    pub async fn authenticate(&self, token: &str) -> AppResult<User> {
        let user_id = self.validate_token(token)?;

        self.user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::Unauthorized)
    }

    pub fn validate_token(&self, token: &str) -> AppResult<i32> {
        verify_token(&self.jwt_secret, token)
    }

    fn generate_token(&self, user_id: i32) -> AppResult<String> {
        issue_token(&self.jwt_secret, user_id, self.jwt_expires_in_hours)
    }
}

pub fn issue_token(secret: &str, user_id: i32, expires_in_hours: i64) -> AppResult<String> {
    let now = OffsetDateTime::now_utc();
    let exp = now + Duration::hours(expires_in_hours);

    let claims = Claims {
        sub: user_id,
        exp: exp.unix_timestamp(),
        iat: now.unix_timestamp(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

pub fn verify_token(secret: &str, token: &str) -> AppResult<i32> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;

    Ok(token_data.claims.sub)
}

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
}

pub fn verify_password(password: &str, hash: &str) -> AppResult<()> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {}", e)))?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AppError::InvalidCredentials)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    const SECRET: &str = "test-secret-key-for-jwt";

    #[test]
    fn test_issued_token_round_trips() {
        let token = assert_ok!(issue_token(SECRET, 42, 24));

        assert_eq!(token.split('.').count(), 3);
        assert!(!token.contains(' '));
        assert_eq!(assert_ok!(verify_token(SECRET, &token)), 42);
    }

    #[test]
    fn test_tokens_differ_per_user() {
        let first = assert_ok!(issue_token(SECRET, 1, 24));
        let second = assert_ok!(issue_token(SECRET, 2, 24));

        assert_ne!(first, second);
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let token = assert_ok!(issue_token(SECRET, 42, -1));

        let err = assert_err!(verify_token(SECRET, &token));
        assert!(matches!(err, AppError::Jwt(_)));
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = assert_ok!(issue_token(SECRET, 42, 24));

        assert_err!(verify_token("wrong-secret", &token));
    }

    #[test]
    fn test_garbage_token_is_rejected() {
        assert_err!(verify_token(SECRET, "not.a.jwt"));
        assert_err!(verify_token(SECRET, ""));
    }

    #[test]
    fn test_password_hash_and_verify() {
        let hash = assert_ok!(hash_password("secure_password_123"));

        assert!(hash.starts_with("$argon2"));
        assert_ok!(verify_password("secure_password_123", &hash));
    }

    #[test]
    fn test_password_hash_is_salted() {
        let first = assert_ok!(hash_password("same_password"));
        let second = assert_ok!(hash_password("same_password"));

        assert_ne!(first, second);
    }

    #[test]
    fn test_password_verify_wrong_password() {
        let hash = assert_ok!(hash_password("secure_password_123"));

        let err = assert_err!(verify_password("wrong_password", &hash));
        assert!(matches!(err, AppError::InvalidCredentials));
    }

    #[test]
    fn test_claims_serialization() {
        let claims = Claims {
            sub: 42,
            exp: 1_700_086_400,
            iat: 1_700_000_000,
        };
        let json = serde_json::to_string(&claims).expect("serialization should succeed");
        let parsed: Claims = serde_json::from_str(&json).expect("deserialization should succeed");

        assert_eq!(claims.sub, parsed.sub);
        assert_eq!(claims.exp, parsed.exp);
        assert_eq!(claims.iat, parsed.iat);
    }
}
