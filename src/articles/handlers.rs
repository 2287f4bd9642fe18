use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    articles::{
        dto::{CreateArticleRequest, ListQuery, UpdateArticleRequest},
        repo_types::{Article, ArticleSummary, NewArticle},
    },
    db::RepoError,
    error::{AppError, AppResult},
    response::ApiResponse,
    state::AppState,
};

const ARTICLE_NOT_FOUND: &str = "article not found";
const SHORT_TITLE: &str = "Title must be at least 3 characters";
const UNKNOWN_AUTHOR: &str = "Invalid authorId: account not found";
const MIN_TITLE_CHARS: usize = 3;

pub fn article_routes() -> Router<AppState> {
    Router::new()
        .route("/api/articles", get(list_articles).post(create_article))
        .route(
            "/api/articles/:id",
            get(get_article).put(update_article).delete(delete_article),
        )
}

fn parse_article_id(raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::not_found(ARTICLE_NOT_FOUND))
}

fn parse_author_id(raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| {
        warn!(author_id = %raw, "malformed authorId");
        AppError::validation(UNKNOWN_AUTHOR)
    })
}

fn check_title(title: &str) -> AppResult<()> {
    if title.chars().count() < MIN_TITLE_CHARS {
        warn!("title too short");
        return Err(AppError::validation(SHORT_TITLE));
    }
    Ok(())
}

fn author_violation(e: RepoError) -> AppError {
    match e {
        RepoError::ForeignKeyViolation(_) => {
            warn!("authorId does not reference an account");
            AppError::validation(UNKNOWN_AUTHOR)
        }
        other => other.into(),
    }
}

#[instrument(skip(state))]
pub async fn list_articles(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> AppResult<ApiResponse<Vec<ArticleSummary>>> {
    let Query(query) = query?;
    let rows = match query.to_filter() {
        Ok(filter) => state.articles.list(&filter).await?,
        Err(e) => {
            warn!(error = %e, "authorId filter is not a uuid");
            Vec::new()
        }
    };

    if rows.is_empty() {
        return Ok(ApiResponse::with_status(
            StatusCode::NOT_FOUND,
            "Get articles failed",
            None,
        ));
    }
    Ok(ApiResponse::ok("Get articles successful", rows))
}

#[instrument(skip(state))]
pub async fn get_article(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<Article>> {
    let id = parse_article_id(&id)?;
    let article = state
        .articles
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found(ARTICLE_NOT_FOUND))?;
    Ok(ApiResponse::ok("Get article successful", article))
}

#[instrument(skip(state, payload))]
pub async fn create_article(
    State(state): State<AppState>,
    payload: Result<Json<CreateArticleRequest>, JsonRejection>,
) -> AppResult<ApiResponse<Article>> {
    let Json(payload) = payload?;

    let title = payload.title.unwrap_or_default();
    check_title(&title)?;
    let author_id = parse_author_id(payload.author_id.as_deref().unwrap_or_default())?;

    // The foreign key on author_id is the existence check.
    let article = state
        .articles
        .insert(NewArticle {
            id: Uuid::new_v4(),
            title,
            content: payload.content,
            category: payload.category,
            author_id,
        })
        .await
        .map_err(author_violation)?;

    info!(article_id = %article.id, author_id = %article.author_id, "article created");
    Ok(ApiResponse::created("Create article successful", article))
}

#[instrument(skip(state, payload))]
pub async fn update_article(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateArticleRequest>, JsonRejection>,
) -> AppResult<ApiResponse<Article>> {
    let id = parse_article_id(&id)?;

    let current = state
        .articles
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found(ARTICLE_NOT_FOUND))?;

    let Json(payload) = payload?;

    if let Some(title) = payload.title.as_deref() {
        check_title(title)?;
    }
    let author_id = payload
        .author_id
        .as_deref()
        .map(parse_author_id)
        .transpose()?;

    let update = payload.merge(&current, author_id);
    let article = state
        .articles
        .update(id, update)
        .await
        .map_err(author_violation)?
        .ok_or_else(|| AppError::not_found(ARTICLE_NOT_FOUND))?;

    info!(article_id = %article.id, "article updated");
    Ok(ApiResponse::ok("Update article successful", article))
}

#[instrument(skip(state))]
pub async fn delete_article(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<Article>> {
    let id = parse_article_id(&id)?;
    let article = state
        .articles
        .delete(id)
        .await?
        .ok_or_else(|| AppError::not_found(ARTICLE_NOT_FOUND))?;

    info!(article_id = %article.id, "article deleted");
    Ok(ApiResponse::ok("Delete article successful", article))
}
