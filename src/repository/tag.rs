use sqlx::{PgConnection, PgPool, Row};
use tracing::instrument;

#[derive(Clone)]
pub struct TagRepository {
    pool: PgPool,
}

impl TagRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Distinct names of tags attached to at least one article.
    #[instrument(name = "db.tag.list", skip(self))]
    pub async fn list(&self) -> Result<Vec<String>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT DISTINCT t.name
            FROM tags t
            JOIN article_tags atg ON atg.tag_id = t.id
            ORDER BY t.name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(|r| r.get::<String, _>("name")).collect())
    }

    /// Replaces the tag set of an article. Runs on the caller's connection so
    /// it can join the article write transaction.
    #[instrument(name = "db.tag.replace_for_article", skip(conn, names))]
    pub async fn replace_for_article(
        conn: &mut PgConnection,
        article_id: i32,
        names: &[String],
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM article_tags WHERE article_id = $1")
            .bind(article_id)
            .execute(&mut *conn)
            .await?;

        if names.is_empty() {
            return Ok(());
        }

        sqlx::query(
            r#"
            INSERT INTO tags (name)
            SELECT UNNEST($1::text[])
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(names)
        .execute(&mut *conn)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO article_tags (article_id, tag_id)
            SELECT $1, id FROM tags WHERE name = ANY($2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(article_id)
        .bind(names)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }
}
