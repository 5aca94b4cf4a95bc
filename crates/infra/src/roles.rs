//! Role lookup with lazy creation.

use std::sync::Arc;

use tracing::{debug, info, instrument};

use rolegate_auth::{Role, RoleName};

use crate::store::{RoleStore, StoreError};

/// Resolves role names to role records, creating them on first reference.
#[derive(Clone)]
pub struct RoleDirectory {
    store: Arc<dyn RoleStore>,
}

impl RoleDirectory {
    pub fn new(store: Arc<dyn RoleStore>) -> Self {
        Self { store }
    }

    /// Return the role named `name`, creating it if no record exists.
    ///
    /// Inserts at most one record. When a concurrent caller inserts the same
    /// name first, the store reports a conflict and the winner's record is
    /// returned instead, so every caller sees the same role id.
    #[instrument(skip(self), fields(role = %name), err)]
    pub async fn find_or_create(&self, name: &RoleName) -> Result<Role, StoreError> {
        if let Some(existing) = self.store.find_by_name(name).await? {
            return Ok(existing);
        }

        let candidate = Role::new(name.clone());
        match self.store.insert(&candidate).await {
            Ok(()) => {
                info!(role_id = %candidate.id, "created role");
                Ok(candidate)
            }
            Err(StoreError::Conflict(reason)) => {
                debug!(%reason, "role was created concurrently; reloading");
                self.store.find_by_name(name).await?.ok_or_else(|| {
                    StoreError::Backend(format!(
                        "role '{name}' conflicted on insert but could not be reloaded"
                    ))
                })
            }
            Err(e) => Err(e),
        }
    }

    pub async fn list(&self) -> Result<Vec<Role>, StoreError> {
        self.store.list().await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::store::InMemoryRoleStore;

    fn directory() -> (RoleDirectory, Arc<InMemoryRoleStore>) {
        let store = Arc::new(InMemoryRoleStore::new());
        (RoleDirectory::new(store.clone()), store)
    }

    #[tokio::test]
    async fn first_call_creates_exactly_one_role() {
        let (dir, store) = directory();
        let name = RoleName::parse("AUDITOR").unwrap();

        let role = dir.find_or_create(&name).await.unwrap();

        assert_eq!(role.name, name);
        assert_eq!(store.list().await.unwrap(), vec![role]);
    }

    #[tokio::test]
    async fn repeated_calls_return_the_same_record() {
        let (dir, store) = directory();

        let first = dir.find_or_create(&RoleName::USER).await.unwrap();
        let second = dir.find_or_create(&RoleName::USER).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn distinct_names_get_distinct_records() {
        let (dir, _store) = directory();

        let user = dir.find_or_create(&RoleName::USER).await.unwrap();
        let admin = dir.find_or_create(&RoleName::ADMIN).await.unwrap();

        assert_ne!(user.id, admin.id);
        assert_eq!(dir.list().await.unwrap().len(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn parallel_first_use_yields_a_single_record() {
        let (dir, store) = directory();
        let name = RoleName::parse("RACE").unwrap();

        let handles: Vec<_> = (0..64)
            .map(|_| {
                let dir = dir.clone();
                let name = name.clone();
                tokio::spawn(async move { dir.find_or_create(&name).await })
            })
            .collect();

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap().unwrap().id);
        }

        let stored = store.list().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert!(ids.iter().all(|id| *id == stored[0].id));
    }

    /// Store that hides an existing row from the first lookup, forcing the
    /// insert path to hit the uniqueness conflict.
    struct LateVisibilityStore {
        inner: InMemoryRoleStore,
        hidden_once: AtomicBool,
    }

    #[async_trait]
    impl RoleStore for LateVisibilityStore {
        async fn find_by_name(&self, name: &RoleName) -> Result<Option<Role>, StoreError> {
            if !self.hidden_once.swap(true, Ordering::SeqCst) {
                return Ok(None);
            }
            self.inner.find_by_name(name).await
        }

        async fn insert(&self, role: &Role) -> Result<(), StoreError> {
            self.inner.insert(role).await
        }

        async fn list(&self) -> Result<Vec<Role>, StoreError> {
            self.inner.list().await
        }
    }

    #[tokio::test]
    async fn conflict_on_insert_returns_the_winner() {
        let inner = InMemoryRoleStore::new();
        let winner = Role::new(RoleName::ADMIN);
        inner.insert(&winner).await.unwrap();

        let dir = RoleDirectory::new(Arc::new(LateVisibilityStore {
            inner,
            hidden_once: AtomicBool::new(false),
        }));

        let resolved = dir.find_or_create(&RoleName::ADMIN).await.unwrap();
        assert_eq!(resolved.id, winner.id);
        assert_eq!(dir.list().await.unwrap().len(), 1);
    }

    struct BrokenStore;

    #[async_trait]
    impl RoleStore for BrokenStore {
        async fn find_by_name(&self, _name: &RoleName) -> Result<Option<Role>, StoreError> {
            Err(StoreError::Backend("connection refused".to_string()))
        }

        async fn insert(&self, _role: &Role) -> Result<(), StoreError> {
            Err(StoreError::Backend("connection refused".to_string()))
        }

        async fn list(&self) -> Result<Vec<Role>, StoreError> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn storage_failures_propagate() {
        let dir = RoleDirectory::new(Arc::new(BrokenStore));
        let err = dir.find_or_create(&RoleName::USER).await.unwrap_err();
        assert_eq!(err, StoreError::Backend("connection refused".to_string()));
    }
}
