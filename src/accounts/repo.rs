use async_trait::async_trait;

use crate::accounts::repo_types::{Account, NewAccount};
use crate::db::{PgStore, RepoError};

#[async_trait]
pub trait AccountRepo: Send + Sync {
    /// Insert a new account. A taken email is reported as `UniqueViolation`.
    async fn insert(&self, account: NewAccount) -> Result<Account, RepoError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, RepoError>;
}

#[async_trait]
impl AccountRepo for PgStore {
    async fn insert(&self, account: NewAccount) -> Result<Account, RepoError> {
        let row = sqlx::query_as::<_, Account>(
            r#"
            INSERT INTO author (id, name, email, password, salt, created_at)
            VALUES ($1, $2, $3, $4, $5, now())
            RETURNING id, name, email, password, salt, created_at
            "#,
        )
        .bind(account.id)
        .bind(&account.name)
        .bind(&account.email)
        .bind(&account.password)
        .bind(&account.salt)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, RepoError> {
        let row = sqlx::query_as::<_, Account>(
            r#"
            SELECT id, name, email, password, salt, created_at
            FROM author
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }
}
