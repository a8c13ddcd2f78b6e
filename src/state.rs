use std::sync::Arc;

use sqlx::PgPool;

use crate::{auth::repo::AccountRepo, db::ServerClock, users::repo::UserRepo};

/// Shared handles injected into every handler. Cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    pub accounts: Arc<dyn AccountRepo>,
    pub users: Arc<dyn UserRepo>,
    pub clock: Arc<dyn ServerClock>,
}

impl AppState {
    pub fn from_pool(db: PgPool) -> Self {
        Self::from_parts(Arc::new(db.clone()), Arc::new(db.clone()), Arc::new(db))
    }

    pub fn from_parts(
        accounts: Arc<dyn AccountRepo>,
        users: Arc<dyn UserRepo>,
        clock: Arc<dyn ServerClock>,
    ) -> Self {
        Self {
            accounts,
            users,
            clock,
        }
    }
}
