use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;

/// Row of the example `users` table. Name and email are not validated on insert.
#[derive(Debug, Clone, Serialize, FromRow, PartialEq, Eq)]
pub struct GenericUser {
    pub id: i32,
    pub name: Option<String>,
    pub email: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}
