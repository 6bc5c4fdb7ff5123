use tracing::instrument;

use crate::{
    error::{AppError, AppResult},
    models::{Article, CommentDto, CommentResponse, CommentsResponse, CreateCommentInput},
    repository::{ArticleRepository, CommentRepository},
    telemetry::{COMMENTS_CREATED, COMMENTS_DELETED},
};

#[derive(Clone)]
pub struct CommentService {
    article_repo: ArticleRepository,
    comment_repo: CommentRepository,
}

impl CommentService {
    pub fn new(article_repo: ArticleRepository, comment_repo: CommentRepository) -> Self {
        Self {
            article_repo,
            comment_repo,
        }
    }

    #[instrument(name = "comment.create", skip(self, input))]
    pub async fn create(
        &self,
        slug: &str,
        author_id: i32,
        input: CreateCommentInput,
    ) -> AppResult<CommentResponse> {
        let article = self.article(slug).await?;

        let comment = self
            .comment_repo
            .create(
                article.id,
                author_id,
                input.body.as_deref().unwrap_or_default(),
            )
            .await?;

        COMMENTS_CREATED.add(1, &[]);

        tracing::info!(comment_id = comment.id, article_id = article.id, "Comment created");

        let view = self
            .comment_repo
            .find_view_by_id(comment.id, Some(author_id))
            .await?
            .ok_or(AppError::Internal("Failed to fetch comment".to_string()))?;

        Ok(CommentResponse {
            comment: CommentDto::from(view),
        })
    }

    #[instrument(name = "comment.list", skip(self))]
    pub async fn list(&self, slug: &str, viewer_id: Option<i32>) -> AppResult<CommentsResponse> {
        let article = self.article(slug).await?;

        let comments = self
            .comment_repo
            .list_for_article(article.id, viewer_id)
            .await?;

        Ok(CommentsResponse {
            comments: comments.into_iter().map(CommentDto::from).collect(),
        })
    }

    /// `id` arrives as the raw path segment; anything that is not a comment
    /// of this article is reported as not found.
    #[instrument(name = "comment.delete", skip(self))]
    pub async fn delete(&self, slug: &str, id: &str, user_id: i32) -> AppResult<()> {
        let article = self.article(slug).await?;

        let id: i32 = id.parse().map_err(|_| AppError::comment_not_found())?;

        let comment = self
            .comment_repo
            .find_by_id(id)
            .await?
            .filter(|comment| comment.article_id == article.id)
            .ok_or_else(AppError::comment_not_found)?;

        if comment.author_id != user_id {
            return Err(AppError::Forbidden("comment"));
        }

        self.comment_repo.delete(comment.id).await?;

        COMMENTS_DELETED.add(1, &[]);

        tracing::info!(comment_id = comment.id, article_id = article.id, "Comment deleted");

        Ok(())
    }

    async fn article(&self, slug: &str) -> AppResult<Article> {
        self.article_repo
            .find_by_slug(slug)
            .await?
            .ok_or_else(AppError::article_not_found)
    }
}
