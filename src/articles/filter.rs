//! Listing filters kept as data and compiled into bound placeholders.
//!
//! A filter is a conjunction of [`Predicate`]s. [`ArticleFilter::push_where`]
//! renders it onto a `QueryBuilder`, so values only ever reach the database
//! as bind parameters. Under test, `Predicate::matches` evaluates the same
//! rules in-process for the memory store.

use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

#[cfg(test)]
use crate::articles::repo_types::Article;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Case-insensitive exact match on `category`. Holds the lowercased value.
    Category(String),
    /// Case-insensitive substring of `title` or `content`. Holds the lowercased keyword.
    Search(String),
    /// Exact match on `author_id`.
    Author(Uuid),
}

impl Predicate {
    pub fn category(value: &str) -> Self {
        Predicate::Category(value.to_lowercase())
    }

    pub fn search(keyword: &str) -> Self {
        Predicate::Search(keyword.to_lowercase())
    }

    #[cfg(test)]
    pub fn matches(&self, article: &Article) -> bool {
        let contains = |field: &Option<String>, kw: &str| {
            field
                .as_deref()
                .is_some_and(|v| v.to_lowercase().contains(kw))
        };
        match self {
            Predicate::Category(c) => article
                .category
                .as_deref()
                .is_some_and(|v| v.to_lowercase() == *c),
            Predicate::Search(kw) => {
                article.title.to_lowercase().contains(kw.as_str()) || contains(&article.content, kw.as_str())
            }
            Predicate::Author(id) => article.author_id == *id,
        }
    }
}

/// Escapes LIKE metacharacters so the keyword matches literally.
fn like_pattern(keyword: &str) -> String {
    let mut out = String::with_capacity(keyword.len() + 2);
    out.push('%');
    for ch in keyword.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push('%');
    out
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleFilter {
    predicates: Vec<Predicate>,
}

impl ArticleFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn and(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    #[cfg(test)]
    pub fn matches(&self, article: &Article) -> bool {
        self.predicates.iter().all(|p| p.matches(article))
    }

    pub fn push_where(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        for (i, predicate) in self.predicates.iter().enumerate() {
            qb.push(if i == 0 { " WHERE " } else { " AND " });
            match predicate {
                Predicate::Category(c) => {
                    qb.push("lower(category) = ").push_bind(c.clone());
                }
                Predicate::Search(kw) => {
                    let pattern = like_pattern(kw);
                    qb.push("(lower(title) LIKE ")
                        .push_bind(pattern.clone())
                        .push(" OR lower(content) LIKE ")
                        .push_bind(pattern)
                        .push(")");
                }
                Predicate::Author(id) => {
                    qb.push("author_id = ").push_bind(*id);
                }
            }
        }
    }
}

const SUMMARY_SELECT: &str = "SELECT id, title, category, author_id, created_at FROM articles";

/// Listing query: summary columns, filter, newest first.
pub fn list_query(filter: &ArticleFilter) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(SUMMARY_SELECT);
    filter.push_where(&mut qb);
    qb.push(" ORDER BY created_at DESC");
    qb
}
