use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

use super::Profile;
use crate::validation::{Rules, Validate, ValidationErrors};

#[derive(Debug, Clone, FromRow)]
pub struct Comment {
    pub id: i32,
    pub body: String,
    pub article_id: i32,
    pub author_id: i32,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, FromRow)]
pub struct CommentView {
    pub id: i32,
    pub body: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    pub author_username: String,
    pub author_bio: String,
    pub author_image: Option<String>,
    pub author_following: bool,
}

#[derive(Debug, Serialize)]
pub struct CommentResponse {
    pub comment: CommentDto,
}

#[derive(Debug, Serialize)]
pub struct CommentsResponse {
    pub comments: Vec<CommentDto>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentDto {
    pub id: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    pub body: String,
    pub author: Profile,
}

impl From<CommentView> for CommentDto {
    fn from(comment: CommentView) -> Self {
        Self {
            id: comment.id,
            created_at: comment.created_at,
            updated_at: comment.updated_at,
            body: comment.body,
            author: Profile {
                username: comment.author_username,
                bio: comment.author_bio,
                image: comment.author_image,
                following: comment.author_following,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CommentBody {
    pub comment: CreateCommentInput,
}

impl Validate for CommentBody {
    fn validate(&self) -> Result<(), ValidationErrors> {
        self.comment.validate()
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateCommentInput {
    pub body: Option<String>,
}

impl Validate for CreateCommentInput {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        Rules::field(&mut errors, "body", self.body.as_deref())
            .required()
            .max_chars(2048);

        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn test_comment_dto_wire_shape() {
        let view = CommentView {
            id: 1,
            body: "It takes a Jacobian".to_string(),
            created_at: datetime!(2016-02-18 03:22:56 UTC),
            updated_at: datetime!(2016-02-18 03:22:56 UTC),
            author_username: "jake".to_string(),
            author_bio: String::new(),
            author_image: None,
            author_following: true,
        };

        let json = serde_json::to_value(CommentResponse {
            comment: CommentDto::from(view),
        })
        .expect("serialization should succeed");

        assert_eq!(json["comment"]["id"], 1);
        assert_eq!(json["comment"]["body"], "It takes a Jacobian");
        assert_eq!(json["comment"]["updatedAt"], "2016-02-18T03:22:56Z");
        assert_eq!(json["comment"]["author"]["following"], true);
    }

    #[test]
    fn test_comment_validation() {
        let body: CommentBody = serde_json::from_str(r#"{"comment": {"body": ""}}"#)
            .expect("deserialization should succeed");
        let errors = body.validate().expect_err("validation should fail");
        assert_eq!(errors.get("body"), Some("{key: required}"));

        let input = CreateCommentInput {
            body: Some("x".repeat(2049)),
        };
        let errors = input.validate().expect_err("validation should fail");
        assert_eq!(errors.get("body"), Some("{max: 2048}"));
    }
}
