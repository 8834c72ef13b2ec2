//! Persistence Module
//!
//! Repository traits for permissions and users, with two implementations:
//!
//! - **`memory`** - `HashMap`s behind a tokio `RwLock`, used by tests and when
//!   `DATABASE_URL` is not set
//! - **`postgres`** - sqlx queries against Postgres, schema from `migrations/`
//!
//! # Optimistic Versions
//!
//! `update` takes the entity with its *new* audit fields plus the version the
//! caller read. The write only happens when the stored version still equals
//! `expected_version`; otherwise `Ok(None)` comes back and the caller decides
//! whether the row is gone or was changed underneath it.
//!
//! # Uniqueness
//!
//! Permission names and user emails are unique. Both stores report a clash as
//! `StoreError::Duplicate`.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::shared::page::PageRequest;
use crate::shared::{Permission, User};

/// In-memory store
pub mod memory;

/// Postgres store
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Repository errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Unique key violation
    #[error("{0}")]
    Duplicate(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

#[async_trait]
pub trait PermissionRepository: Send + Sync {
    async fn find_page(&self, page: &PageRequest) -> Result<Vec<Permission>, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Permission>, StoreError>;

    /// Every permission whose id is in `ids`; unknown ids are skipped
    async fn find_by_ids(&self, ids: &BTreeSet<Uuid>) -> Result<Vec<Permission>, StoreError>;

    async fn insert(&self, permission: Permission) -> Result<Permission, StoreError>;

    async fn update(
        &self,
        permission: Permission,
        expected_version: i64,
    ) -> Result<Option<Permission>, StoreError>;

    /// Returns whether a row was removed
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_page(&self, page: &PageRequest) -> Result<Vec<User>, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    async fn insert(&self, user: User) -> Result<User, StoreError>;

    async fn update(&self, user: User, expected_version: i64) -> Result<Option<User>, StoreError>;

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;

    async fn count(&self) -> Result<u64, StoreError>;
}

/// Handles to both repositories, backed by the same store
#[derive(Clone)]
pub struct Store {
    pub permissions: Arc<dyn PermissionRepository>,
    pub users: Arc<dyn UserRepository>,
}

impl Store {
    pub fn memory() -> Self {
        let store = Arc::new(MemoryStore::default());
        Self {
            permissions: store.clone(),
            users: store,
        }
    }

    pub fn postgres(pool: sqlx::PgPool) -> Self {
        let store = Arc::new(PgStore::new(pool));
        Self {
            permissions: store.clone(),
            users: store,
        }
    }
}

pub(crate) fn duplicate_permission(name: &str) -> StoreError {
    StoreError::Duplicate(format!("Permission with name '{}' already exists", name))
}

pub(crate) fn duplicate_user(email: &str) -> StoreError {
    StoreError::Duplicate(format!("User with email '{}' already exists", email))
}
