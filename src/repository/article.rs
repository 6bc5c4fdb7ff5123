use sqlx::{PgPool, Row};
use tracing::instrument;

use super::TagRepository;
use crate::models::{Article, ArticleFilter, ArticleView, Pagination};

const ARTICLE_COLUMNS: &str =
    "id, slug, title, description, body, author_id, created_at, updated_at";

/// Projection for [`ArticleView`]. `$1` is the viewer id (NULL when
/// anonymous); favorites count and tags are derived from the join tables.
const ARTICLE_VIEW_SELECT: &str = r#"
    SELECT
        a.id, a.slug, a.title, a.description, a.body, a.author_id,
        a.created_at, a.updated_at,
        ARRAY(
            SELECT t.name
            FROM article_tags atg
            JOIN tags t ON t.id = atg.tag_id
            WHERE atg.article_id = a.id
            ORDER BY t.name
        ) AS tag_list,
        (SELECT COUNT(*) FROM favorites f WHERE f.article_id = a.id) AS favorites_count,
        EXISTS(
            SELECT 1 FROM favorites f WHERE f.article_id = a.id AND f.user_id = $1
        ) AS favorited,
        u.username AS author_username,
        u.bio AS author_bio,
        u.image AS author_image,
        EXISTS(
            SELECT 1 FROM follows fl WHERE fl.followee_id = a.author_id AND fl.follower_id = $1
        ) AS author_following
    FROM articles a
    JOIN users u ON u.id = a.author_id
"#;

const NEWEST_FIRST: &str = "ORDER BY a.created_at DESC, a.id DESC";

const FEED_CONDITION: &str =
    "a.author_id IN (SELECT followee_id FROM follows WHERE follower_id = $1)";

/// Conjunction of the optional list filters. A NULL parameter disables its
/// condition. Parameters are numbered from `first`: tag, author, favorited.
fn filter_condition(first: usize) -> String {
    let (tag, author, favorited) = (first, first + 1, first + 2);
    format!(
        r#"
        (${tag}::text IS NULL OR EXISTS (
            SELECT 1
            FROM article_tags atg
            JOIN tags t ON t.id = atg.tag_id
            WHERE atg.article_id = a.id AND t.name = ${tag}
        ))
        AND (${author}::text IS NULL OR u.username = ${author})
        AND (${favorited}::text IS NULL OR EXISTS (
            SELECT 1
            FROM favorites f
            JOIN users fu ON fu.id = f.user_id
            WHERE f.article_id = a.id AND fu.username = ${favorited}
        ))
        "#
    )
}

/// Column changes for an article update; `None` keeps the stored value.
#[derive(Debug, Default)]
pub struct ArticleChanges<'a> {
    pub slug: Option<&'a str>,
    pub title: Option<&'a str>,
    pub description: Option<&'a str>,
    pub body: Option<&'a str>,
    pub tags: Option<&'a [String]>,
}

#[derive(Clone)]
pub struct ArticleRepository {
    pool: PgPool,
}

impl ArticleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts the article and its tag associations in one transaction.
    #[instrument(name = "db.article.create", skip(self, description, body, tags))]
    pub async fn create(
        &self,
        slug: &str,
        title: &str,
        description: &str,
        body: &str,
        author_id: i32,
        tags: &[String],
    ) -> Result<Article, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let article = sqlx::query_as::<_, Article>(&format!(
            r#"
            INSERT INTO articles (slug, title, description, body, author_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {ARTICLE_COLUMNS}
            "#
        ))
        .bind(slug)
        .bind(title)
        .bind(description)
        .bind(body)
        .bind(author_id)
        .fetch_one(&mut *tx)
        .await?;

        TagRepository::replace_for_article(&mut tx, article.id, tags).await?;

        tx.commit().await?;

        Ok(article)
    }

    #[instrument(name = "db.article.find_by_slug", skip(self))]
    pub async fn find_by_slug(&self, slug: &str) -> Result<Option<Article>, sqlx::Error> {
        sqlx::query_as::<_, Article>(&format!(
            "SELECT {ARTICLE_COLUMNS} FROM articles WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
    }

    #[instrument(name = "db.article.find_view_by_id", skip(self))]
    pub async fn find_view_by_id(
        &self,
        id: i32,
        viewer_id: Option<i32>,
    ) -> Result<Option<ArticleView>, sqlx::Error> {
        sqlx::query_as::<_, ArticleView>(&format!("{ARTICLE_VIEW_SELECT} WHERE a.id = $2"))
            .bind(viewer_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    #[instrument(name = "db.article.find_view_by_slug", skip(self))]
    pub async fn find_view_by_slug(
        &self,
        slug: &str,
        viewer_id: Option<i32>,
    ) -> Result<Option<ArticleView>, sqlx::Error> {
        sqlx::query_as::<_, ArticleView>(&format!("{ARTICLE_VIEW_SELECT} WHERE a.slug = $2"))
            .bind(viewer_id)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
    }

    #[instrument(name = "db.article.list", skip(self))]
    pub async fn list(
        &self,
        filter: &ArticleFilter,
        pagination: Pagination,
        viewer_id: Option<i32>,
    ) -> Result<Vec<ArticleView>, sqlx::Error> {
        sqlx::query_as::<_, ArticleView>(&format!(
            "{ARTICLE_VIEW_SELECT} WHERE {} {NEWEST_FIRST} LIMIT $5 OFFSET $6",
            filter_condition(2)
        ))
        .bind(viewer_id)
        .bind(filter.tag.as_deref())
        .bind(filter.author.as_deref())
        .bind(filter.favorited.as_deref())
        .bind(pagination.limit)
        .bind(pagination.offset)
        .fetch_all(&self.pool)
        .await
    }

    #[instrument(name = "db.article.count", skip(self))]
    pub async fn count(&self, filter: &ArticleFilter) -> Result<i64, sqlx::Error> {
        let row = sqlx::query(&format!(
            r#"
            SELECT COUNT(*) AS count
            FROM articles a
            JOIN users u ON u.id = a.author_id
            WHERE {}
            "#,
            filter_condition(1)
        ))
        .bind(filter.tag.as_deref())
        .bind(filter.author.as_deref())
        .bind(filter.favorited.as_deref())
        .fetch_one(&self.pool)
        .await?;

        Ok(row.get::<i64, _>("count"))
    }

    #[instrument(name = "db.article.feed", skip(self))]
    pub async fn feed(
        &self,
        user_id: i32,
        pagination: Pagination,
    ) -> Result<Vec<ArticleView>, sqlx::Error> {
        sqlx::query_as::<_, ArticleView>(&format!(
            "{ARTICLE_VIEW_SELECT} WHERE {FEED_CONDITION} {NEWEST_FIRST} LIMIT $2 OFFSET $3"
        ))
        .bind(user_id)
        .bind(pagination.limit)
        .bind(pagination.offset)
        .fetch_all(&self.pool)
        .await
    }

    #[instrument(name = "db.article.feed_count", skip(self))]
    pub async fn feed_count(&self, user_id: i32) -> Result<i64, sqlx::Error> {
        let row = sqlx::query(&format!(
            "SELECT COUNT(*) AS count FROM articles a WHERE {FEED_CONDITION}"
        ))
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.get::<i64, _>("count"))
    }

    #[instrument(name = "db.article.update", skip(self, changes), fields(article_id = id))]
    pub async fn update(&self, id: i32, changes: ArticleChanges<'_>) -> Result<Article, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let article = sqlx::query_as::<_, Article>(&format!(
            r#"
            UPDATE articles
            SET
                slug = COALESCE($2, slug),
                title = COALESCE($3, title),
                description = COALESCE($4, description),
                body = COALESCE($5, body),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {ARTICLE_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(changes.slug)
        .bind(changes.title)
        .bind(changes.description)
        .bind(changes.body)
        .fetch_one(&mut *tx)
        .await?;

        if let Some(tags) = changes.tags {
            TagRepository::replace_for_article(&mut tx, id, tags).await?;
        }

        tx.commit().await?;

        Ok(article)
    }

    /// Comments, favorites and tag links go with the article (`ON DELETE CASCADE`).
    #[instrument(name = "db.article.delete", skip(self))]
    pub async fn delete(&self, id: i32) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM articles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    #[instrument(name = "db.article.exists_by_slug", skip(self))]
    pub async fn exists_by_slug(&self, slug: &str) -> Result<bool, sqlx::Error> {
        let row = sqlx::query("SELECT EXISTS(SELECT 1 FROM articles WHERE slug = $1) as exists")
            .bind(slug)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.get::<bool, _>("exists"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_condition_numbers_parameters_from_offset() {
        let condition = filter_condition(2);

        assert!(condition.contains("$2::text IS NULL"));
        assert!(condition.contains("t.name = $2"));
        assert!(condition.contains("u.username = $3"));
        assert!(condition.contains("fu.username = $4"));
        assert!(!condition.contains("$1"));
        assert!(!condition.contains("$5"));
    }

    #[test]
    fn test_view_select_uses_viewer_parameter_only() {
        assert!(ARTICLE_VIEW_SELECT.contains("f.user_id = $1"));
        assert!(ARTICLE_VIEW_SELECT.contains("fl.follower_id = $1"));
        assert!(!ARTICLE_VIEW_SELECT.contains("$2"));
    }
}
