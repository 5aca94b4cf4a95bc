//! Persistence boundary for users and roles.
//!
//! The rest of the crate only sees these traits; which backend sits behind
//! them (in-memory or Postgres) is decided at wiring time.

use async_trait::async_trait;
use thiserror::Error;

use rolegate_auth::{Role, RoleName, User};
use rolegate_core::UserId;

pub mod in_memory;
pub mod postgres;

pub use in_memory::{InMemoryRoleStore, InMemoryUserStore};
pub use postgres::PostgresStore;

/// Storage operation error.
///
/// - **Conflict**: a uniqueness constraint rejected the write (role name, username)
/// - **Backend**: anything else the storage layer reported
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("uniqueness conflict: {0}")]
    Conflict(String),

    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Role records, unique by name.
#[async_trait]
pub trait RoleStore: Send + Sync {
    /// The earliest stored role with exactly this name, if any.
    async fn find_by_name(&self, name: &RoleName) -> Result<Option<Role>, StoreError>;

    /// Insert a new role. Fails with `Conflict` if the name is already taken.
    async fn insert(&self, role: &Role) -> Result<(), StoreError>;

    /// Every role, in creation order.
    async fn list(&self) -> Result<Vec<Role>, StoreError>;
}

/// User accounts and their role grants.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new user together with its current roles. Fails with
    /// `Conflict` if the username is already taken.
    async fn insert(&self, user: &User) -> Result<(), StoreError>;

    async fn get(&self, id: UserId) -> Result<Option<User>, StoreError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    /// Record that `user_id` holds `role`. Granting a held role is a no-op.
    async fn add_role(&self, user_id: UserId, role: &Role) -> Result<(), StoreError>;
}
