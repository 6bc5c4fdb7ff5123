use sqlx::PgPool;
use tracing::instrument;

use crate::models::{Comment, CommentView};

const COMMENT_COLUMNS: &str = "id, body, article_id, author_id, created_at, updated_at";

/// `$1` is the viewer id (NULL when anonymous).
const COMMENT_VIEW_SELECT: &str = r#"
    SELECT
        c.id, c.body, c.created_at, c.updated_at,
        u.username AS author_username,
        u.bio AS author_bio,
        u.image AS author_image,
        EXISTS(
            SELECT 1 FROM follows fl WHERE fl.followee_id = c.author_id AND fl.follower_id = $1
        ) AS author_following
    FROM comments c
    JOIN users u ON u.id = c.author_id
"#;

#[derive(Clone)]
pub struct CommentRepository {
    pool: PgPool,
}

impl CommentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[instrument(name = "db.comment.create", skip(self, body))]
    pub async fn create(
        &self,
        article_id: i32,
        author_id: i32,
        body: &str,
    ) -> Result<Comment, sqlx::Error> {
        sqlx::query_as::<_, Comment>(&format!(
            r#"
            INSERT INTO comments (body, article_id, author_id)
            VALUES ($1, $2, $3)
            RETURNING {COMMENT_COLUMNS}
            "#
        ))
        .bind(body)
        .bind(article_id)
        .bind(author_id)
        .fetch_one(&self.pool)
        .await
    }

    #[instrument(name = "db.comment.find_by_id", skip(self))]
    pub async fn find_by_id(&self, id: i32) -> Result<Option<Comment>, sqlx::Error> {
        sqlx::query_as::<_, Comment>(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    #[instrument(name = "db.comment.find_view_by_id", skip(self))]
    pub async fn find_view_by_id(
        &self,
        id: i32,
        viewer_id: Option<i32>,
    ) -> Result<Option<CommentView>, sqlx::Error> {
        sqlx::query_as::<_, CommentView>(&format!("{COMMENT_VIEW_SELECT} WHERE c.id = $2"))
            .bind(viewer_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    /// Oldest first.
    #[instrument(name = "db.comment.list_for_article", skip(self))]
    pub async fn list_for_article(
        &self,
        article_id: i32,
        viewer_id: Option<i32>,
    ) -> Result<Vec<CommentView>, sqlx::Error> {
        sqlx::query_as::<_, CommentView>(&format!(
            "{COMMENT_VIEW_SELECT} WHERE c.article_id = $2 ORDER BY c.created_at ASC, c.id ASC"
        ))
        .bind(viewer_id)
        .bind(article_id)
        .fetch_all(&self.pool)
        .await
    }

    #[instrument(name = "db.comment.delete", skip(self))]
    pub async fn delete(&self, id: i32) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
