use async_trait::async_trait;
use sqlx::PgPool;

use crate::users::repo_types::GenericUser;

/// Queries against the example `users` table.
#[async_trait]
pub trait UserRepo: Send + Sync {
    /// Newest id first.
    async fn list_users(&self) -> anyhow::Result<Vec<GenericUser>>;

    async fn create_user(
        &self,
        name: Option<&str>,
        email: Option<&str>,
    ) -> anyhow::Result<GenericUser>;

    async fn find_user(&self, id: i32) -> anyhow::Result<Option<GenericUser>>;
}

#[async_trait]
impl UserRepo for PgPool {
    async fn list_users(&self) -> anyhow::Result<Vec<GenericUser>> {
        let rows = sqlx::query_as::<_, GenericUser>(
            r#"
            SELECT id, name, email, created_at
            FROM users
            ORDER BY id DESC
            "#,
        )
        .fetch_all(self)
        .await?;
        Ok(rows)
    }

    async fn create_user(
        &self,
        name: Option<&str>,
        email: Option<&str>,
    ) -> anyhow::Result<GenericUser> {
        let user = sqlx::query_as::<_, GenericUser>(
            r#"
            INSERT INTO users (name, email, created_at)
            VALUES ($1, $2, NOW())
            RETURNING id, name, email, created_at
            "#,
        )
        .bind(name)
        .bind(email)
        .fetch_one(self)
        .await?;
        Ok(user)
    }

    async fn find_user(&self, id: i32) -> anyhow::Result<Option<GenericUser>> {
        let user = sqlx::query_as::<_, GenericUser>(
            r#"
            SELECT id, name, email, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self)
        .await?;
        Ok(user)
    }
}
