use slug::slugify;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        Article, ArticleDto, ArticleResponse, ArticlesResponse, CreateArticleInput, FeedQuery,
        ListArticlesQuery, UpdateArticleInput, normalize_tags,
    },
    repository::{ArticleChanges, ArticleRepository, FavoriteRepository, TagRepository},
    telemetry::{
        ARTICLES_CREATED, ARTICLES_DELETED, ARTICLES_UPDATED, FAVORITES_ADDED, FAVORITES_REMOVED,
    },
    validation::submitted,
};

#[derive(Clone)]
pub struct ArticleService {
    article_repo: ArticleRepository,
    favorite_repo: FavoriteRepository,
    tag_repo: TagRepository,
}

impl ArticleService {
    pub fn new(
        article_repo: ArticleRepository,
        favorite_repo: FavoriteRepository,
        tag_repo: TagRepository,
    ) -> Self {
        Self {
            article_repo,
            favorite_repo,
            tag_repo,
        }
    }

    #[instrument(name = "article.create", skip(self, input))]
    pub async fn create(
        &self,
        author_id: i32,
        input: CreateArticleInput,
    ) -> AppResult<ArticleResponse> {
        let title = input.title.as_deref().unwrap_or_default();
        let slug = self.unique_slug(title).await?;
        let tags = normalize_tags(&input.tag_list);

        let article = self
            .article_repo
            .create(
                &slug,
                title,
                input.description.as_deref().unwrap_or_default(),
                input.body.as_deref().unwrap_or_default(),
                author_id,
                &tags,
            )
            .await
            .map_err(AppError::from_write)?;

        ARTICLES_CREATED.add(1, &[]);

        tracing::info!(article_id = article.id, slug = %article.slug, "Article created");

        self.view(article.id, Some(author_id)).await
    }

    #[instrument(name = "article.get", skip(self))]
    pub async fn get(&self, slug: &str, viewer_id: Option<i32>) -> AppResult<ArticleResponse> {
        let article = self
            .article_repo
            .find_view_by_slug(slug, viewer_id)
            .await?
            .ok_or_else(AppError::article_not_found)?;

        Ok(ArticleResponse {
            article: ArticleDto::from(article),
        })
    }

    #[instrument(name = "article.list", skip(self))]
    pub async fn list(
        &self,
        query: ListArticlesQuery,
        viewer_id: Option<i32>,
    ) -> AppResult<ArticlesResponse> {
        let filter = query.filter();
        let pagination = query.pagination();

        let articles = self
            .article_repo
            .list(&filter, pagination, viewer_id)
            .await?;
        let articles_count = self.article_repo.count(&filter).await?;

        Ok(ArticlesResponse {
            articles: articles.into_iter().map(ArticleDto::from).collect(),
            articles_count,
        })
    }

    #[instrument(name = "article.feed", skip(self))]
    pub async fn feed(&self, query: FeedQuery, user_id: i32) -> AppResult<ArticlesResponse> {
        let articles = self.article_repo.feed(user_id, query.pagination()).await?;
        let articles_count = self.article_repo.feed_count(user_id).await?;

        Ok(ArticlesResponse {
            articles: articles.into_iter().map(ArticleDto::from).collect(),
            articles_count,
        })
    }

    #[instrument(name = "article.update", skip(self, input))]
    pub async fn update(
        &self,
        slug: &str,
        user_id: i32,
        input: UpdateArticleInput,
    ) -> AppResult<ArticleResponse> {
        let article = self
            .article_repo
            .find_by_slug(slug)
            .await?
            .ok_or_else(AppError::article_not_found)?;

        if article.author_id != user_id {
            return Err(AppError::Forbidden("article"));
        }

        let title = submitted(&input.title);
        let new_slug = match title {
            Some(title) if needs_new_slug(&article, title) => Some(self.unique_slug(title).await?),
            _ => None,
        };
        let tags = input
            .tag_list
            .as_deref()
            .map(normalize_tags)
            .filter(|tags| !tags.is_empty());

        let changes = ArticleChanges {
            slug: new_slug.as_deref(),
            title,
            description: submitted(&input.description),
            body: submitted(&input.body),
            tags: tags.as_deref(),
        };

        self.article_repo
            .update(article.id, changes)
            .await
            .map_err(AppError::from_write)?;

        ARTICLES_UPDATED.add(1, &[]);

        tracing::info!(article_id = article.id, "Article updated");

        self.view(article.id, Some(user_id)).await
    }

    #[instrument(name = "article.delete", skip(self))]
    pub async fn delete(&self, slug: &str, user_id: i32) -> AppResult<()> {
        let article = self
            .article_repo
            .find_by_slug(slug)
            .await?
            .ok_or_else(AppError::article_not_found)?;

        if article.author_id != user_id {
            return Err(AppError::Forbidden("article"));
        }

        self.article_repo.delete(article.id).await?;

        ARTICLES_DELETED.add(1, &[]);

        tracing::info!(article_id = article.id, "Article deleted");

        Ok(())
    }

    #[instrument(name = "article.favorite", skip(self))]
    pub async fn favorite(&self, slug: &str, user_id: i32) -> AppResult<ArticleResponse> {
        let article = self
            .article_repo
            .find_by_slug(slug)
            .await?
            .ok_or_else(AppError::article_not_found)?;

        if self.favorite_repo.create(user_id, article.id).await? {
            FAVORITES_ADDED.add(1, &[]);
            tracing::info!(article_id = article.id, user_id, "Article favorited");
        }

        self.view(article.id, Some(user_id)).await
    }

    #[instrument(name = "article.unfavorite", skip(self))]
    pub async fn unfavorite(&self, slug: &str, user_id: i32) -> AppResult<ArticleResponse> {
        let article = self
            .article_repo
            .find_by_slug(slug)
            .await?
            .ok_or_else(AppError::article_not_found)?;

        if self.favorite_repo.delete(user_id, article.id).await? {
            FAVORITES_REMOVED.add(1, &[]);
            tracing::info!(article_id = article.id, user_id, "Article unfavorited");
        }

        self.view(article.id, Some(user_id)).await
    }

    #[instrument(name = "article.tags", skip(self))]
    pub async fn tags(&self) -> AppResult<Vec<String>> {
        Ok(self.tag_repo.list().await?)
    }

    async fn view(&self, article_id: i32, viewer_id: Option<i32>) -> AppResult<ArticleResponse> {
        let article = self
            .article_repo
            .find_view_by_id(article_id, viewer_id)
            .await?
            .ok_or(AppError::Internal("Failed to fetch article".to_string()))?;

        Ok(ArticleResponse {
            article: ArticleDto::from(article),
        })
    }

    async fn unique_slug(&self, title: &str) -> AppResult<String> {
        let slug = generate_slug(title);

        if !slug.is_empty() && !self.article_repo.exists_by_slug(&slug).await? {
            return Ok(slug);
        }

        Ok(with_suffix(&slug))
    }
}

/// ASCII, lowercase, dash-separated; non-Latin letters are transliterated.
pub fn generate_slug(title: &str) -> String {
    slugify(title)
}

/// A slug is only reissued when the title actually changes to something
/// that slugifies differently; a stored collision suffix survives re-saves.
fn needs_new_slug(article: &Article, title: &str) -> bool {
    title != article.title && generate_slug(title) != article.slug
}

fn with_suffix(slug: &str) -> String {
    let suffix = &Uuid::new_v4().simple().to_string()[..8];
    if slug.is_empty() {
        suffix.to_string()
    } else {
        format!("{slug}-{suffix}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn stored_article(title: &str, slug: &str) -> Article {
        Article {
            id: 1,
            slug: slug.to_string(),
            title: title.to_string(),
            description: "description".to_string(),
            body: "body".to_string(),
            author_id: 1,
            created_at: datetime!(2024-01-15 10:30:00 UTC),
            updated_at: datetime!(2024-01-15 10:30:00 UTC),
        }
    }

    #[test]
    fn test_unchanged_title_keeps_suffixed_slug() {
        let article = stored_article("Hello World", "hello-world-1a2b3c4d");

        assert!(!needs_new_slug(&article, "Hello World"));
    }

    #[test]
    fn test_changed_title_gets_new_slug() {
        let article = stored_article("Hello World", "hello-world");

        assert!(needs_new_slug(&article, "Goodbye World"));
        assert!(!needs_new_slug(&article, "Hello, World!"));
    }

    #[test]
    fn test_generate_slug_simple() {
        assert_eq!(generate_slug("Hello World"), "hello-world");
    }

    #[test]
    fn test_generate_slug_with_special_chars() {
        assert_eq!(
            generate_slug("Hello, World! How are you?"),
            "hello-world-how-are-you"
        );
    }

    #[test]
    fn test_generate_slug_with_numbers() {
        assert_eq!(
            generate_slug("Top 10 Tips for 2024"),
            "top-10-tips-for-2024"
        );
    }

    #[test]
    fn test_generate_slug_with_multiple_spaces() {
        assert_eq!(
            generate_slug("Multiple   Spaces   Here"),
            "multiple-spaces-here"
        );
    }

    #[test]
    fn test_generate_slug_handles_leading_trailing_special_chars() {
        assert_eq!(generate_slug("---Hello World---"), "hello-world");
    }

    #[test]
    fn test_generate_slug_only_special_chars() {
        assert_eq!(generate_slug("!@#$%^&*()"), "");
    }

    #[test]
    fn test_generate_slug_transliterates_to_ascii() {
        let slug = generate_slug("Über Café Straße");

        assert_eq!(slug, "uber-cafe-strasse");
        assert!(slug.chars().all(|c| c.is_ascii_alphanumeric() || c == '-'));
    }

    #[test]
    fn test_with_suffix_appends_short_random_tail() {
        let slug = with_suffix("hello-world");
        let (base, suffix) = slug.rsplit_once('-').expect("suffix separator");

        assert_eq!(base, "hello-world");
        assert_eq!(suffix.len(), 8);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(with_suffix("hello-world"), slug);
    }

    #[test]
    fn test_with_suffix_on_empty_slug() {
        let slug = with_suffix("");
        assert_eq!(slug.len(), 8);
        assert!(!slug.starts_with('-'));
    }
}
