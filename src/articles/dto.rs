use serde::Deserialize;
use uuid::Uuid;

use crate::articles::filter::{ArticleFilter, Predicate};
use crate::articles::repo_types::{Article, ArticleUpdate};

/// Query string of `GET /api/articles`. Empty values count as absent.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub category: Option<String>,
    pub search: Option<String>,
    pub author_id: Option<String>,
}

impl ListQuery {
    /// Builds the filter. Fails when `authorId` is not a UUID, since such a
    /// filter cannot match any row.
    pub fn to_filter(&self) -> Result<ArticleFilter, uuid::Error> {
        let present = |v: &Option<String>| v.as_deref().filter(|s| !s.is_empty()).map(str::to_owned);

        let mut filter = ArticleFilter::new();
        if let Some(category) = present(&self.category) {
            filter = filter.and(Predicate::category(&category));
        }
        if let Some(search) = present(&self.search) {
            filter = filter.and(Predicate::search(&search));
        }
        if let Some(author) = present(&self.author_id) {
            filter = filter.and(Predicate::Author(Uuid::parse_str(&author)?));
        }
        Ok(filter)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateArticleRequest {
    pub title: Option<String>,
    pub category: Option<String>,
    pub content: Option<String>,
    pub author_id: Option<String>,
}

/// Body of `PUT /api/articles/:id`. Omitted fields keep their stored value.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateArticleRequest {
    pub title: Option<String>,
    pub category: Option<String>,
    pub content: Option<String>,
    pub author_id: Option<String>,
}

impl UpdateArticleRequest {
    /// Full set of writable values: supplied fields, else the current row's.
    pub fn merge(self, current: &Article, author_id: Option<Uuid>) -> ArticleUpdate {
        ArticleUpdate {
            title: self.title.unwrap_or_else(|| current.title.clone()),
            content: self.content.or_else(|| current.content.clone()),
            category: self.category.or_else(|| current.category.clone()),
            author_id: author_id.unwrap_or(current.author_id),
        }
    }
}
