use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Full row of the `articles` table.
#[derive(Debug, Clone, Serialize, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: Uuid,
    pub title: String,
    pub content: Option<String>,
    pub category: Option<String>,
    pub author_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub updated_at: Option<OffsetDateTime>,
}

/// Columns returned by the article listing.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ArticleSummary {
    pub id: Uuid,
    pub title: String,
    pub category: Option<String>,
    pub author_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<&Article> for ArticleSummary {
    fn from(a: &Article) -> Self {
        Self {
            id: a.id,
            title: a.title.clone(),
            category: a.category.clone(),
            author_id: a.author_id,
            created_at: a.created_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewArticle {
    pub id: Uuid,
    pub title: String,
    pub content: Option<String>,
    pub category: Option<String>,
    pub author_id: Uuid,
}

/// Values written by an update. Every writable column is present.
#[derive(Debug, Clone, PartialEq)]
pub struct ArticleUpdate {
    pub title: String,
    pub content: Option<String>,
    pub category: Option<String>,
    pub author_id: Uuid,
}
