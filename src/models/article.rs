use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

use super::Profile;
use crate::validation::{Rules, Validate, ValidationErrors, submitted};

pub const DEFAULT_LIMIT: i64 = 20;
pub const DEFAULT_OFFSET: i64 = 0;

#[derive(Debug, Clone, FromRow)]
pub struct Article {
    pub id: i32,
    pub slug: String,
    pub title: String,
    pub description: String,
    pub body: String,
    pub author_id: i32,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Article joined with its author, tags and the viewer-relative flags.
#[derive(Debug, Clone, FromRow)]
pub struct ArticleView {
    pub id: i32,
    pub slug: String,
    pub title: String,
    pub description: String,
    pub body: String,
    pub author_id: i32,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    pub tag_list: Vec<String>,
    pub favorites_count: i64,
    pub favorited: bool,
    pub author_username: String,
    pub author_bio: String,
    pub author_image: Option<String>,
    pub author_following: bool,
}

#[derive(Debug, Serialize)]
pub struct ArticleResponse {
    pub article: ArticleDto,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticlesResponse {
    pub articles: Vec<ArticleDto>,
    pub articles_count: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleDto {
    pub slug: String,
    pub title: String,
    pub description: String,
    pub body: String,
    pub tag_list: Vec<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    pub favorited: bool,
    pub favorites_count: i64,
    pub author: Profile,
}

impl From<ArticleView> for ArticleDto {
    fn from(article: ArticleView) -> Self {
        Self {
            slug: article.slug,
            title: article.title,
            description: article.description,
            body: article.body,
            tag_list: article.tag_list,
            created_at: article.created_at,
            updated_at: article.updated_at,
            favorited: article.favorited,
            favorites_count: article.favorites_count,
            author: Profile {
                username: article.author_username,
                bio: article.author_bio,
                image: article.author_image,
                following: article.author_following,
            },
        }
    }
}

/// `{"article": {...}}` request envelope.
#[derive(Debug, Deserialize)]
pub struct ArticleBody<T> {
    pub article: T,
}

impl<T: Validate> Validate for ArticleBody<T> {
    fn validate(&self) -> Result<(), ValidationErrors> {
        self.article.validate()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateArticleInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub body: Option<String>,
    #[serde(default)]
    pub tag_list: Vec<String>,
}

impl Validate for CreateArticleInput {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        Rules::field(&mut errors, "title", self.title.as_deref())
            .required()
            .min_chars(4)
            .max_chars(255);
        Rules::field(&mut errors, "description", self.description.as_deref()).max_chars(2048);
        Rules::field(&mut errors, "body", self.body.as_deref())
            .required()
            .max_chars(2048);
        validate_tags(&mut errors, &self.tag_list);

        errors.into_result()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateArticleInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub body: Option<String>,
    pub tag_list: Option<Vec<String>>,
}

impl Validate for UpdateArticleInput {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        Rules::field(&mut errors, "title", submitted(&self.title))
            .min_chars(4)
            .max_chars(255);
        Rules::field(&mut errors, "description", submitted(&self.description)).max_chars(2048);
        Rules::field(&mut errors, "body", submitted(&self.body)).max_chars(2048);
        if let Some(tags) = &self.tag_list {
            validate_tags(&mut errors, tags);
        }

        errors.into_result()
    }
}

fn validate_tags(errors: &mut ValidationErrors, tags: &[String]) {
    if tags.iter().any(|tag| tag.trim().is_empty()) {
        errors.add("tagList", "{key: required}");
    }
}

/// Trims, drops duplicates and keeps first-seen order.
pub fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags.iter().map(|t| t.trim()).filter(|t| !t.is_empty()) {
        if !normalized.iter().any(|existing| existing == tag) {
            normalized.push(tag.to_string());
        }
    }
    normalized
}

/// Raw query string; numbers stay strings so bad input falls back to defaults
/// instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct ListArticlesQuery {
    pub tag: Option<String>,
    pub author: Option<String>,
    pub favorited: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

impl ListArticlesQuery {
    pub fn filter(&self) -> ArticleFilter {
        ArticleFilter {
            tag: non_blank(&self.tag),
            author: non_blank(&self.author),
            favorited: non_blank(&self.favorited),
        }
    }

    pub fn pagination(&self) -> Pagination {
        Pagination::parse(self.limit.as_deref(), self.offset.as_deref())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct FeedQuery {
    pub limit: Option<String>,
    pub offset: Option<String>,
}

impl FeedQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::parse(self.limit.as_deref(), self.offset.as_deref())
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ArticleFilter {
    pub tag: Option<String>,
    pub author: Option<String>,
    pub favorited: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub limit: i64,
    pub offset: i64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: DEFAULT_OFFSET,
        }
    }
}

impl Pagination {
    pub fn parse(limit: Option<&str>, offset: Option<&str>) -> Self {
        Self {
            limit: parse_non_negative(limit).unwrap_or(DEFAULT_LIMIT),
            offset: parse_non_negative(offset).unwrap_or(DEFAULT_OFFSET),
        }
    }
}

fn parse_non_negative(value: Option<&str>) -> Option<i64> {
    value
        .and_then(|v| v.trim().parse::<i64>().ok())
        .filter(|v| *v >= 0)
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn create_test_view() -> ArticleView {
        ArticleView {
            id: 7,
            slug: "how-to-train-your-dragon".to_string(),
            title: "How to train your dragon".to_string(),
            description: "Ever wonder how?".to_string(),
            body: "You have to believe".to_string(),
            author_id: 3,
            created_at: datetime!(2016-02-18 03:22:56 UTC),
            updated_at: datetime!(2016-02-18 03:48:35 UTC),
            tag_list: vec!["dragons".to_string(), "training".to_string()],
            favorites_count: 2,
            favorited: true,
            author_username: "jake".to_string(),
            author_bio: "I work at statefarm".to_string(),
            author_image: Some("https://i.stack.imgur.com/xHWG8.jpg".to_string()),
            author_following: false,
        }
    }

    #[test]
    fn test_article_dto_wire_shape() {
        let dto = ArticleDto::from(create_test_view());
        let json = serde_json::to_value(ArticleResponse { article: dto })
            .expect("serialization should succeed");

        let article = &json["article"];
        assert_eq!(article["slug"], "how-to-train-your-dragon");
        assert_eq!(article["tagList"], serde_json::json!(["dragons", "training"]));
        assert_eq!(article["createdAt"], "2016-02-18T03:22:56Z");
        assert_eq!(article["favorited"], true);
        assert_eq!(article["favoritesCount"], 2);
        assert_eq!(article["author"]["username"], "jake");
        assert_eq!(article["author"]["following"], false);
        assert!(article.get("id").is_none());
        assert!(article.get("author_id").is_none());
    }

    #[test]
    fn test_articles_response_count_key() {
        let response = ArticlesResponse {
            articles: vec![],
            articles_count: 0,
        };
        let json = serde_json::to_value(&response).expect("serialization should succeed");
        assert_eq!(json, serde_json::json!({ "articles": [], "articlesCount": 0 }));
    }

    #[test]
    fn test_create_article_short_title_is_rejected() {
        let input = CreateArticleInput {
            title: Some("ab".to_string()),
            description: None,
            body: Some("body".to_string()),
            tag_list: vec![],
        };

        let errors = input.validate().expect_err("validation should fail");
        assert_eq!(errors.get("title"), Some("{min: 4}"));
        assert_eq!(errors.get("body"), None);
    }

    #[test]
    fn test_create_article_requires_body_and_title() {
        let body: ArticleBody<CreateArticleInput> =
            serde_json::from_str(r#"{"article": {"description": "d"}}"#)
                .expect("deserialization should succeed");

        let errors = body.validate().expect_err("validation should fail");
        assert_eq!(errors.get("title"), Some("{key: required}"));
        assert_eq!(errors.get("body"), Some("{key: required}"));
    }

    #[test]
    fn test_create_article_rejects_blank_tag() {
        let input = CreateArticleInput {
            title: Some("Valid title".to_string()),
            description: None,
            body: Some("body".to_string()),
            tag_list: vec!["rust".to_string(), "  ".to_string()],
        };

        let errors = input.validate().expect_err("validation should fail");
        assert_eq!(errors.get("tagList"), Some("{key: required}"));
    }

    #[test]
    fn test_update_article_accepts_partial_body() {
        let body: ArticleBody<UpdateArticleInput> =
            serde_json::from_str(r#"{"article": {"title": "", "body": "new body"}}"#)
                .expect("deserialization should succeed");
        assert!(body.validate().is_ok());

        let input = UpdateArticleInput {
            title: Some("abc".to_string()),
            ..Default::default()
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_update_article_blank_fields_are_not_written() {
        let input = UpdateArticleInput {
            title: Some("     ".to_string()),
            body: Some("   ".to_string()),
            description: Some("\t".to_string()),
            ..Default::default()
        };

        assert!(input.validate().is_ok());
        assert_eq!(submitted(&input.title), None);
        assert_eq!(submitted(&input.body), None);
        assert_eq!(submitted(&input.description), None);
    }

    #[test]
    fn test_title_padding_does_not_count_towards_minimum() {
        let input = UpdateArticleInput {
            title: Some("  ab  ".to_string()),
            ..Default::default()
        };
        let errors = input.validate().expect_err("validation should fail");
        assert_eq!(errors.get("title"), Some("{min: 4}"));
    }

    #[test]
    fn test_normalize_tags() {
        let tags = vec![
            " rust ".to_string(),
            "axum".to_string(),
            "rust".to_string(),
            "".to_string(),
        ];
        assert_eq!(normalize_tags(&tags), vec!["rust", "axum"]);
    }

    #[test]
    fn test_pagination_defaults_and_fallbacks() {
        assert_eq!(Pagination::parse(None, None), Pagination::default());
        assert_eq!(
            Pagination::parse(Some("2"), Some("4")),
            Pagination { limit: 2, offset: 4 }
        );
        assert_eq!(
            Pagination::parse(Some("abc"), Some("1.5")),
            Pagination { limit: 20, offset: 0 }
        );
        assert_eq!(
            Pagination::parse(Some("-1"), Some("-10")),
            Pagination { limit: 20, offset: 0 }
        );
    }

    #[test]
    fn test_list_query_filter_drops_blank_values() {
        let query: ListArticlesQuery = serde_json::from_value(serde_json::json!({
            "tag": "dragons",
            "author": "  ",
            "limit": "5",
        }))
        .expect("deserialization should succeed");

        assert_eq!(
            query.filter(),
            ArticleFilter {
                tag: Some("dragons".to_string()),
                author: None,
                favorited: None,
            }
        );
        assert_eq!(query.pagination(), Pagination { limit: 5, offset: 0 });
    }
}
