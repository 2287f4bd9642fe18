use async_trait::async_trait;
use uuid::Uuid;

use crate::articles::filter::{list_query, ArticleFilter};
use crate::articles::repo_types::{Article, ArticleSummary, ArticleUpdate, NewArticle};
use crate::db::{PgStore, RepoError};

const ARTICLE_COLUMNS: &str = "id, title, content, category, author_id, created_at, updated_at";

#[async_trait]
pub trait ArticleRepo: Send + Sync {
    /// Summaries matching `filter`, newest first.
    async fn list(&self, filter: &ArticleFilter) -> Result<Vec<ArticleSummary>, RepoError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Article>, RepoError>;
    /// An unknown `author_id` is reported as `ForeignKeyViolation`.
    async fn insert(&self, article: NewArticle) -> Result<Article, RepoError>;
    /// Writes every column of `update` and stamps `updated_at`. `None` when
    /// the row is gone.
    async fn update(&self, id: Uuid, update: ArticleUpdate) -> Result<Option<Article>, RepoError>;
    /// Removes the row, returning what it held.
    async fn delete(&self, id: Uuid) -> Result<Option<Article>, RepoError>;
}

#[async_trait]
impl ArticleRepo for PgStore {
    async fn list(&self, filter: &ArticleFilter) -> Result<Vec<ArticleSummary>, RepoError> {
        let mut qb = list_query(filter);
        let rows = qb
            .build_query_as::<ArticleSummary>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Article>, RepoError> {
        let row = sqlx::query_as::<_, Article>(&format!(
            "SELECT {ARTICLE_COLUMNS} FROM articles WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn insert(&self, article: NewArticle) -> Result<Article, RepoError> {
        let row = sqlx::query_as::<_, Article>(&format!(
            r#"
            INSERT INTO articles (id, title, content, category, author_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {ARTICLE_COLUMNS}
            "#
        ))
        .bind(article.id)
        .bind(&article.title)
        .bind(&article.content)
        .bind(&article.category)
        .bind(article.author_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update(&self, id: Uuid, update: ArticleUpdate) -> Result<Option<Article>, RepoError> {
        let row = sqlx::query_as::<_, Article>(&format!(
            r#"
            UPDATE articles
               SET title = $1, content = $2, category = $3, author_id = $4, updated_at = now()
             WHERE id = $5
            RETURNING {ARTICLE_COLUMNS}
            "#
        ))
        .bind(&update.title)
        .bind(&update.content)
        .bind(&update.category)
        .bind(update.author_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn delete(&self, id: Uuid) -> Result<Option<Article>, RepoError> {
        let row = sqlx::query_as::<_, Article>(&format!(
            "DELETE FROM articles WHERE id = $1 RETURNING {ARTICLE_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }
}
