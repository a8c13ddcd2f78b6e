use async_trait::async_trait;
use sqlx::PgPool;

use crate::auth::repo_types::{Account, AccountRef, AccountSummary, NewAccount, Profile};

/// Queries against `users_login`.
#[async_trait]
pub trait AccountRepo: Send + Sync {
    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<Account>>;

    async fn find_by_id(&self, id: i32) -> anyhow::Result<Option<Account>>;

    /// True when any row (active or not) already holds the username or the email.
    async fn username_or_email_taken(
        &self,
        username: &str,
        email: Option<&str>,
    ) -> anyhow::Result<bool>;

    /// Returns `None` when the insert loses a race on a unique column.
    async fn create_account(&self, new: NewAccount<'_>) -> anyhow::Result<Option<AccountSummary>>;

    async fn record_login(&self, id: i32) -> anyhow::Result<()>;

    async fn active_profile(&self, username: &str) -> anyhow::Result<Option<Profile>>;

    /// Returns the username of the updated row, `None` if nothing matched.
    async fn update_password(&self, id: i32, password: &str) -> anyhow::Result<Option<String>>;

    /// Single-statement update restricted to active accounts.
    async fn reset_active_password(
        &self,
        id: i32,
        password: &str,
    ) -> anyhow::Result<Option<AccountRef>>;
}

#[async_trait]
impl AccountRepo for PgPool {
    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<Account>> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            SELECT id, username, password, name, email, is_active
            FROM users_login
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(self)
        .await?;
        Ok(account)
    }

    async fn find_by_id(&self, id: i32) -> anyhow::Result<Option<Account>> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            SELECT id, username, password, name, email, is_active
            FROM users_login
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self)
        .await?;
        Ok(account)
    }

    async fn username_or_email_taken(
        &self,
        username: &str,
        email: Option<&str>,
    ) -> anyhow::Result<bool> {
        let existing = sqlx::query_scalar::<_, String>(
            r#"
            SELECT username
            FROM users_login
            WHERE username = $1 OR email = $2
            LIMIT 1
            "#,
        )
        .bind(username)
        .bind(email)
        .fetch_optional(self)
        .await?;
        Ok(existing.is_some())
    }

    async fn create_account(&self, new: NewAccount<'_>) -> anyhow::Result<Option<AccountSummary>> {
        let res = sqlx::query_as::<_, AccountSummary>(
            r#"
            INSERT INTO users_login (username, password, name, email)
            VALUES ($1, $2, $3, $4)
            RETURNING id, username, name, email
            "#,
        )
        .bind(new.username)
        .bind(new.password)
        .bind(new.name)
        .bind(new.email)
        .fetch_one(self)
        .await;

        match res {
            Ok(account) => Ok(Some(account)),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn record_login(&self, id: i32) -> anyhow::Result<()> {
        sqlx::query("UPDATE users_login SET last_login = NOW() WHERE id = $1")
            .bind(id)
            .execute(self)
            .await?;
        Ok(())
    }

    async fn active_profile(&self, username: &str) -> anyhow::Result<Option<Profile>> {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            SELECT id, username, name, email, created_at, last_login
            FROM users_login
            WHERE username = $1 AND is_active = true
            "#,
        )
        .bind(username)
        .fetch_optional(self)
        .await?;
        Ok(profile)
    }

    async fn update_password(&self, id: i32, password: &str) -> anyhow::Result<Option<String>> {
        let username = sqlx::query_scalar::<_, String>(
            r#"
            UPDATE users_login
            SET password = $1, updated_at = NOW()
            WHERE id = $2
            RETURNING username
            "#,
        )
        .bind(password)
        .bind(id)
        .fetch_optional(self)
        .await?;
        Ok(username)
    }

    async fn reset_active_password(
        &self,
        id: i32,
        password: &str,
    ) -> anyhow::Result<Option<AccountRef>> {
        let account = sqlx::query_as::<_, AccountRef>(
            r#"
            UPDATE users_login
            SET password = $1, updated_at = NOW()
            WHERE id = $2 AND is_active = true
            RETURNING id, username
            "#,
        )
        .bind(password)
        .bind(id)
        .fetch_optional(self)
        .await?;
        Ok(account)
    }
}
