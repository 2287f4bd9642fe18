//! In-memory store and request helpers for handler tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use time::OffsetDateTime;
use tower::ServiceExt;
use uuid::Uuid;

use crate::{
    accounts::{
        repo::AccountRepo,
        repo_types::{Account, NewAccount},
    },
    app::build_app,
    articles::{
        filter::ArticleFilter,
        repo::ArticleRepo,
        repo_types::{Article, ArticleSummary, ArticleUpdate, NewArticle},
    },
    db::RepoError,
    state::AppState,
};

#[derive(Default)]
struct Tables {
    accounts: Vec<Account>,
    // insertion sequence breaks created_at ties
    articles: Vec<(u64, Article)>,
    next_seq: u64,
}

/// Enforces the same email uniqueness and author reference rules as the
/// database schema, under one lock.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn account_count(&self) -> usize {
        self.tables.lock().unwrap().accounts.len()
    }

    pub fn article_count(&self) -> usize {
        self.tables.lock().unwrap().articles.len()
    }
}

impl Tables {
    fn has_account(&self, id: Uuid) -> bool {
        self.accounts.iter().any(|a| a.id == id)
    }
}

#[async_trait]
impl AccountRepo for MemoryStore {
    async fn insert(&self, account: NewAccount) -> Result<Account, RepoError> {
        let mut t = self.tables.lock().unwrap();
        if t.accounts.iter().any(|a| a.email == account.email) {
            return Err(RepoError::UniqueViolation("author_email_key".into()));
        }
        let row = Account {
            id: account.id,
            name: account.name,
            email: account.email,
            password: account.password,
            salt: account.salt,
            created_at: OffsetDateTime::now_utc(),
        };
        t.accounts.push(row.clone());
        Ok(row)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, RepoError> {
        let t = self.tables.lock().unwrap();
        Ok(t.accounts.iter().find(|a| a.email == email).cloned())
    }
}

#[async_trait]
impl ArticleRepo for MemoryStore {
    async fn list(&self, filter: &ArticleFilter) -> Result<Vec<ArticleSummary>, RepoError> {
        let t = self.tables.lock().unwrap();
        let mut rows: Vec<&(u64, Article)> =
            t.articles.iter().filter(|(_, a)| filter.matches(a)).collect();
        rows.sort_by(|(sa, a), (sb, b)| (b.created_at, sb).cmp(&(a.created_at, sa)));
        Ok(rows.into_iter().map(|(_, a)| ArticleSummary::from(a)).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Article>, RepoError> {
        let t = self.tables.lock().unwrap();
        Ok(t.articles.iter().find(|(_, a)| a.id == id).map(|(_, a)| a.clone()))
    }

    async fn insert(&self, article: NewArticle) -> Result<Article, RepoError> {
        let mut t = self.tables.lock().unwrap();
        if !t.has_account(article.author_id) {
            return Err(RepoError::ForeignKeyViolation("articles_author_id_fkey".into()));
        }
        let row = Article {
            id: article.id,
            title: article.title,
            content: article.content,
            category: article.category,
            author_id: article.author_id,
            created_at: OffsetDateTime::now_utc(),
            updated_at: None,
        };
        let seq = t.next_seq;
        t.next_seq += 1;
        t.articles.push((seq, row.clone()));
        Ok(row)
    }

    async fn update(&self, id: Uuid, update: ArticleUpdate) -> Result<Option<Article>, RepoError> {
        let mut t = self.tables.lock().unwrap();
        if !t.has_account(update.author_id) {
            return Err(RepoError::ForeignKeyViolation("articles_author_id_fkey".into()));
        }
        let Some((_, row)) = t.articles.iter_mut().find(|(_, a)| a.id == id) else {
            return Ok(None);
        };
        row.title = update.title;
        row.content = update.content;
        row.category = update.category;
        row.author_id = update.author_id;
        row.updated_at = Some(OffsetDateTime::now_utc());
        Ok(Some(row.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<Option<Article>, RepoError> {
        let mut t = self.tables.lock().unwrap();
        let pos = t.articles.iter().position(|(_, a)| a.id == id);
        Ok(pos.map(|i| t.articles.remove(i).1))
    }
}

pub fn fake_app() -> (Router, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::default());
    (build_app(AppState::fake(store.clone())), store)
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

/// Sends `body` as JSON (or nothing) and returns status plus parsed envelope.
pub async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let req = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();
    send(app, req).await
}

/// Sends a raw string labelled as JSON.
pub async fn call_raw(app: &Router, method: Method, uri: &str, raw: &'static str) -> (StatusCode, Value) {
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(raw))
        .unwrap();
    send(app, req).await
}
