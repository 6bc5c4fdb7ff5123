use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

use crate::validation::{Rules, Validate, ValidationErrors, submitted};

/// Stored account row. Never serialized directly; responses go through
/// [`UserWithToken`] and [`Profile`].
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub bio: String,
    pub image: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// `{"user": {...}}` request envelope.
#[derive(Debug, Deserialize)]
pub struct UserBody<T> {
    pub user: T,
}

impl<T: Validate> Validate for UserBody<T> {
    fn validate(&self) -> Result<(), ValidationErrors> {
        self.user.validate()
    }
}

#[derive(Debug, Deserialize)]
pub struct RegisterInput {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl Validate for RegisterInput {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        Rules::field(&mut errors, "username", self.username.as_deref())
            .required()
            .alphanumeric()
            .min_chars(4)
            .max_chars(255);
        Rules::field(&mut errors, "email", self.email.as_deref())
            .required()
            .email();
        Rules::field(&mut errors, "password", self.password.as_deref())
            .required()
            .min_chars(8)
            .max_chars(255);

        errors.into_result()
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginInput {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl Validate for LoginInput {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        Rules::field(&mut errors, "email", self.email.as_deref())
            .required()
            .email();
        Rules::field(&mut errors, "password", self.password.as_deref())
            .required()
            .min_chars(8)
            .max_chars(255);

        errors.into_result()
    }
}

/// Partial update; empty strings leave the stored value untouched.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserInput {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub bio: Option<String>,
    pub image: Option<String>,
}

impl Validate for UpdateUserInput {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        Rules::field(&mut errors, "username", submitted(&self.username))
            .alphanumeric()
            .min_chars(4)
            .max_chars(255);
        Rules::field(&mut errors, "email", submitted(&self.email)).email();
        Rules::field(&mut errors, "password", submitted(&self.password))
            .min_chars(8)
            .max_chars(255);
        Rules::field(&mut errors, "bio", submitted(&self.bio)).max_chars(1024);
        Rules::field(&mut errors, "image", submitted(&self.image)).url();

        errors.into_result()
    }
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: UserWithToken,
}

#[derive(Debug, Serialize)]
pub struct UserWithToken {
    pub email: String,
    pub token: String,
    pub username: String,
    pub bio: String,
    pub image: Option<String>,
}

impl UserWithToken {
    pub fn from_user(user: &User, token: String) -> Self {
        Self {
            email: user.email.clone(),
            token,
            username: user.username.clone(),
            bio: user.bio.clone(),
            image: user.image.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub profile: Profile,
}

/// Public view of a user, relative to the viewer.
#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    pub username: String,
    pub bio: String,
    pub image: Option<String>,
    pub following: bool,
}

impl Profile {
    pub fn from_user(user: User, following: bool) -> Self {
        Self {
            username: user.username,
            bio: user.bio,
            image: user.image,
            following,
        }
    }
}
