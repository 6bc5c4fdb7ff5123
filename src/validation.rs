//! Request-body validation.
//!
//! Payloads implement [`Validate`] and are bound through [`ValidatedJson`],
//! which turns both malformed JSON and rule violations into a single
//! `field -> message` map rendered as a 422 response.

use std::collections::BTreeMap;
use std::fmt;

use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::request::Parts,
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Serialize, de::DeserializeOwned};

use crate::error::AppError;

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, String>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a map holding a single violation.
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    /// Records a violation. The first message reported for a field wins.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_insert_with(|| message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|(k, v)| format!("{k}: {v}")).collect();
        write!(f, "{}", parts.join(", "))
    }
}

pub trait Validate {
    fn validate(&self) -> Result<(), ValidationErrors>;
}

/// JSON body extractor that runs [`Validate`] before the handler sees the value.
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|rejection| {
            AppError::Validation(ValidationErrors::single("body", rejection.body_text()))
        })?;

        value.validate()?;

        Ok(Self(value))
    }
}

/// Query-string extractor whose rejections share the `{"errors": {...}}`
/// shape of every other failure.
pub struct QueryParams<T>(pub T);

impl<S, T> FromRequestParts<S> for QueryParams<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| {
                AppError::Validation(ValidationErrors::single("query", rejection.body_text()))
            })?;

        Ok(Self(value))
    }
}

/// Field-rule checker. Messages follow the `{key: rule}` / `{min: n}` format.
pub struct Rules<'a> {
    errors: &'a mut ValidationErrors,
    field: &'static str,
    value: Option<&'a str>,
}

impl<'a> Rules<'a> {
    pub fn field(
        errors: &'a mut ValidationErrors,
        field: &'static str,
        value: Option<&'a str>,
    ) -> Self {
        Self { errors, field, value }
    }

    fn fail(&mut self, message: String) {
        self.errors.add(self.field, message);
        self.value = None;
    }

    pub fn required(mut self) -> Self {
        if self.value.is_none_or(|v| v.trim().is_empty()) {
            self.fail("{key: required}".to_string());
        }
        self
    }

    pub fn min_chars(mut self, min: usize) -> Self {
        if let Some(v) = self.value {
            if v.trim().chars().count() < min {
                self.fail(format!("{{min: {min}}}"));
            }
        }
        self
    }

    pub fn max_chars(mut self, max: usize) -> Self {
        if let Some(v) = self.value {
            if v.chars().count() > max {
                self.fail(format!("{{max: {max}}}"));
            }
        }
        self
    }

    pub fn alphanumeric(mut self) -> Self {
        if let Some(v) = self.value {
            if !v.chars().all(|c| c.is_ascii_alphanumeric()) {
                self.fail("{key: alphanum}".to_string());
            }
        }
        self
    }

    pub fn email(mut self) -> Self {
        if let Some(v) = self.value {
            if !is_email(v) {
                self.fail("{key: email}".to_string());
            }
        }
        self
    }

    pub fn url(mut self) -> Self {
        if let Some(v) = self.value {
            if !is_url(v) {
                self.fail("{key: url}".to_string());
            }
        }
        self
    }
}

/// Treats empty and whitespace-only values as "not submitted"; partial
/// updates only overwrite fields carrying text.
pub fn submitted(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)\A[a-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[a-z0-9!#$%&'*+/=?^_`{|}~-]+)*@(?:[a-z0-9](?:[a-z0-9-]*[a-z0-9])?\.)+[a-z0-9](?:[a-z0-9-]*[a-z0-9])?\z"#,
    )
    .expect("email pattern compiles")
});

static URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\Ahttps?://[^\s/?#]+[^\s]*\z").expect("url pattern compiles"));

fn is_email(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}

fn is_url(value: &str) -> bool {
    URL_RE.is_match(value)
}
