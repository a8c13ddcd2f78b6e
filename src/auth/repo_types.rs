use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;

/// Full `users_login` row needed for credential checks. Never serialized.
#[derive(Debug, Clone, FromRow)]
pub struct Account {
    pub id: i32,
    pub username: String,
    pub password: String, // plain text, see services::password_matches
    pub name: String,
    pub email: Option<String>,
    pub is_active: bool,
}

/// Public part of an account returned by login and registration.
#[derive(Debug, Clone, Serialize, FromRow, PartialEq, Eq)]
pub struct AccountSummary {
    pub id: i32,
    pub username: String,
    pub name: String,
    pub email: Option<String>,
}

impl From<Account> for AccountSummary {
    fn from(a: Account) -> Self {
        Self {
            id: a.id,
            username: a.username,
            name: a.name,
            email: a.email,
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Profile {
    pub id: i32,
    pub username: String,
    pub name: String,
    pub email: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_login: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, Serialize, FromRow, PartialEq, Eq)]
pub struct AccountRef {
    pub id: i32,
    pub username: String,
}

/// Values for a registration insert.
#[derive(Debug, Clone, Copy)]
pub struct NewAccount<'a> {
    pub username: &'a str,
    pub password: &'a str,
    pub name: &'a str,
    pub email: Option<&'a str>,
}
