use axum::{
    extract::{rejection::JsonRejection, FromRef, State},
    routing::post,
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    accounts::{
        dto::{LoginRequest, LoginResponse, PublicAccount, RegisterRequest},
        password::{hash_password, verify_password},
        repo_types::NewAccount,
        token::JwtKeys,
    },
    db::RepoError,
    error::{AppError, AppResult},
    response::ApiResponse,
    state::AppState,
};

pub fn account_routes() -> Router<AppState> {
    Router::new().route("/api/accounts", post(register).get(login))
}

fn required(value: Option<String>, field: &str) -> AppResult<String> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => {
            warn!(field, "missing required field");
            Err(AppError::validation(format!("{field} cannot be empty")))
        }
    }
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> AppResult<ApiResponse<PublicAccount>> {
    let Json(payload) = payload?;

    let name = match payload.name {
        Some(n) if !n.trim().is_empty() => n,
        _ => {
            warn!("empty name");
            return Err(AppError::validation("Name cannot be empty"));
        }
    };
    let email = required(payload.email, "Email")?;
    let password = required(payload.password, "Password")?;

    let digest = hash_password(&password)?;

    let account = NewAccount {
        id: Uuid::new_v4(),
        name,
        email,
        password: digest.hash,
        salt: digest.salt,
    };

    // The unique constraint on email is the uniqueness check.
    let account = match state.accounts.insert(account).await {
        Ok(a) => a,
        Err(RepoError::UniqueViolation(_)) => {
            warn!("email already registered");
            return Err(AppError::Conflict("Email already registered".into()));
        }
        Err(e) => return Err(e.into()),
    };

    info!(account_id = %account.id, "account registered");
    Ok(ApiResponse::created(
        "Register successful",
        PublicAccount::from(account),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> AppResult<ApiResponse<LoginResponse>> {
    let Json(payload) = payload?;
    let email = payload.email.unwrap_or_default();
    let password = payload.password.unwrap_or_default();

    let account = state
        .accounts
        .find_by_email(&email)
        .await?
        .ok_or_else(|| {
            warn!("login unknown email");
            AppError::not_found("Email not found")
        })?;

    if !verify_password(&password, &account.password, &account.salt) {
        warn!(account_id = %account.id, "login invalid password");
        return Err(AppError::InvalidCredentials("Invalid password".into()));
    }

    let token = JwtKeys::from_ref(&state).sign(account.id)?;

    info!(account_id = %account.id, "account logged in");
    Ok(ApiResponse::ok(
        "Login successful",
        LoginResponse {
            user: PublicAccount::from(account),
            token,
        },
    ))
}
