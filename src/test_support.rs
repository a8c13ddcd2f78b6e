//! In-memory stand-ins for the Postgres repositories and helpers for driving the router.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use time::OffsetDateTime;
use tower::ServiceExt;

use crate::{
    app::build_app,
    auth::{
        repo::AccountRepo,
        repo_types::{Account, AccountRef, AccountSummary, NewAccount, Profile},
    },
    db::ServerClock,
    state::AppState,
    users::{repo::UserRepo, repo_types::GenericUser},
};

struct StoredAccount {
    account: Account,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
    last_login: Option<OffsetDateTime>,
}

#[derive(Default)]
struct Tables {
    accounts: Vec<StoredAccount>,
    users: Vec<GenericUser>,
}

/// Mirrors the `users_login` / `users` tables, including unique constraints.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    failing: AtomicBool,
    skip_precheck: AtomicBool,
    vanish_on_update: AtomicBool,
}

impl MemoryStore {
    /// Makes every subsequent query fail as if the database went away.
    pub fn fail_queries(&self, on: bool) {
        self.failing.store(on, Ordering::SeqCst);
    }

    /// Makes the registration pre-check always report "free", so only the
    /// unique constraint on insert can catch a duplicate.
    pub fn skip_precheck(&self, on: bool) {
        self.skip_precheck.store(on, Ordering::SeqCst);
    }

    /// Makes `update_password` match no rows, as if the account vanished
    /// between the lookup and the update.
    pub fn vanish_on_update(&self, on: bool) {
        self.vanish_on_update.store(on, Ordering::SeqCst);
    }

    pub fn deactivate(&self, username: &str) {
        let mut t = self.tables.lock().expect("memory store poisoned");
        if let Some(row) = t
            .accounts
            .iter_mut()
            .find(|r| r.account.username == username)
        {
            row.account.is_active = false;
        }
    }

    pub fn password_of(&self, username: &str) -> Option<String> {
        self.with_account(username, |r| r.account.password.clone())
    }

    pub fn last_login_of(&self, username: &str) -> Option<OffsetDateTime> {
        self.with_account(username, |r| r.last_login).flatten()
    }

    pub fn updated_at_of(&self, username: &str) -> Option<OffsetDateTime> {
        self.with_account(username, |r| r.updated_at)
    }

    fn with_account<T>(&self, username: &str, f: impl FnOnce(&StoredAccount) -> T) -> Option<T> {
        let t = self.tables.lock().expect("memory store poisoned");
        t.accounts
            .iter()
            .find(|r| r.account.username == username)
            .map(f)
    }

    fn check(&self) -> anyhow::Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            anyhow::bail!("connection refused");
        }
        Ok(())
    }

    fn tables(&self) -> anyhow::Result<std::sync::MutexGuard<'_, Tables>> {
        self.check()?;
        self.tables
            .lock()
            .map_err(|_| anyhow::anyhow!("memory store poisoned"))
    }
}

#[async_trait]
impl AccountRepo for MemoryStore {
    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<Account>> {
        let t = self.tables()?;
        Ok(t.accounts
            .iter()
            .find(|r| r.account.username == username)
            .map(|r| r.account.clone()))
    }

    async fn find_by_id(&self, id: i32) -> anyhow::Result<Option<Account>> {
        let t = self.tables()?;
        Ok(t.accounts
            .iter()
            .find(|r| r.account.id == id)
            .map(|r| r.account.clone()))
    }

    async fn username_or_email_taken(
        &self,
        username: &str,
        email: Option<&str>,
    ) -> anyhow::Result<bool> {
        let t = self.tables()?;
        if self.skip_precheck.load(Ordering::SeqCst) {
            return Ok(false);
        }
        Ok(t.accounts.iter().any(|r| {
            r.account.username == username
                || (email.is_some() && r.account.email.as_deref() == email)
        }))
    }

    async fn create_account(&self, new: NewAccount<'_>) -> anyhow::Result<Option<AccountSummary>> {
        let mut t = self.tables()?;
        let clash = t.accounts.iter().any(|r| {
            r.account.username == new.username
                || (new.email.is_some() && r.account.email.as_deref() == new.email)
        });
        if clash {
            return Ok(None);
        }
        let now = OffsetDateTime::now_utc();
        let account = Account {
            id: t.accounts.len() as i32 + 1,
            username: new.username.to_owned(),
            password: new.password.to_owned(),
            name: new.name.to_owned(),
            email: new.email.map(str::to_owned),
            is_active: true,
        };
        let summary = AccountSummary::from(account.clone());
        t.accounts.push(StoredAccount {
            account,
            created_at: now,
            updated_at: now,
            last_login: None,
        });
        Ok(Some(summary))
    }

    async fn record_login(&self, id: i32) -> anyhow::Result<()> {
        let mut t = self.tables()?;
        if let Some(row) = t.accounts.iter_mut().find(|r| r.account.id == id) {
            row.last_login = Some(OffsetDateTime::now_utc());
        }
        Ok(())
    }

    async fn active_profile(&self, username: &str) -> anyhow::Result<Option<Profile>> {
        let t = self.tables()?;
        Ok(t.accounts
            .iter()
            .find(|r| r.account.username == username && r.account.is_active)
            .map(|r| Profile {
                id: r.account.id,
                username: r.account.username.clone(),
                name: r.account.name.clone(),
                email: r.account.email.clone(),
                created_at: r.created_at,
                last_login: r.last_login,
            }))
    }

    async fn update_password(&self, id: i32, password: &str) -> anyhow::Result<Option<String>> {
        let mut t = self.tables()?;
        if self.vanish_on_update.load(Ordering::SeqCst) {
            return Ok(None);
        }
        Ok(t.accounts
            .iter_mut()
            .find(|r| r.account.id == id)
            .map(|r| {
                r.account.password = password.to_owned();
                r.updated_at = OffsetDateTime::now_utc();
                r.account.username.clone()
            }))
    }

    async fn reset_active_password(
        &self,
        id: i32,
        password: &str,
    ) -> anyhow::Result<Option<AccountRef>> {
        let mut t = self.tables()?;
        Ok(t.accounts
            .iter_mut()
            .find(|r| r.account.id == id && r.account.is_active)
            .map(|r| {
                r.account.password = password.to_owned();
                r.updated_at = OffsetDateTime::now_utc();
                AccountRef {
                    id: r.account.id,
                    username: r.account.username.clone(),
                }
            }))
    }
}

#[async_trait]
impl UserRepo for MemoryStore {
    async fn list_users(&self) -> anyhow::Result<Vec<GenericUser>> {
        let t = self.tables()?;
        let mut users = t.users.clone();
        users.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(users)
    }

    async fn create_user(
        &self,
        name: Option<&str>,
        email: Option<&str>,
    ) -> anyhow::Result<GenericUser> {
        let mut t = self.tables()?;
        let user = GenericUser {
            id: t.users.len() as i32 + 1,
            name: name.map(str::to_owned),
            email: email.map(str::to_owned),
            created_at: OffsetDateTime::now_utc(),
        };
        t.users.push(user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: i32) -> anyhow::Result<Option<GenericUser>> {
        let t = self.tables()?;
        Ok(t.users.iter().find(|u| u.id == id).cloned())
    }
}

#[async_trait]
impl ServerClock for MemoryStore {
    async fn server_time(&self) -> anyhow::Result<OffsetDateTime> {
        self.check()?;
        Ok(OffsetDateTime::now_utc())
    }
}

pub fn memory_state() -> (AppState, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::default());
    let state = AppState::from_parts(store.clone(), store.clone(), store.clone());
    (state, store)
}

/// Full router (layers included) over a fresh in-memory store.
pub fn test_app() -> (Router, Arc<MemoryStore>) {
    let (state, store) = memory_state();
    (build_app(state), store)
}

pub async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            req = req.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    let res = app
        .clone()
        .oneshot(req.body(body).expect("valid request"))
        .await
        .expect("router is infallible");
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .expect("readable body");
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

pub async fn register(app: &Router, username: &str, password: &str, email: &str) -> Value {
    let (status, body) = send(
        app,
        Method::POST,
        "/auth/register",
        Some(serde_json::json!({
            "username": username,
            "password": password,
            "name": username.to_uppercase(),
            "email": email,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
    body
}
