use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use rolegate_auth::{Role, RoleName, User};
use rolegate_core::{Entity, UserId};

use super::{RoleStore, StoreError, UserStore};

fn poisoned() -> StoreError {
    StoreError::Backend("lock poisoned".to_string())
}

/// In-memory role table for tests/dev.
///
/// The name check and the insert happen under one write lock, which is what
/// makes concurrent first use of a name produce a single record.
#[derive(Debug, Default)]
pub struct InMemoryRoleStore {
    roles: RwLock<Vec<Role>>,
}

impl InMemoryRoleStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RoleStore for InMemoryRoleStore {
    async fn find_by_name(&self, name: &RoleName) -> Result<Option<Role>, StoreError> {
        let roles = self.roles.read().map_err(|_| poisoned())?;
        Ok(roles.iter().find(|r| &r.name == name).cloned())
    }

    async fn insert(&self, role: &Role) -> Result<(), StoreError> {
        let mut roles = self.roles.write().map_err(|_| poisoned())?;
        if roles.iter().any(|r| r.name == role.name) {
            return Err(StoreError::Conflict(format!("role '{}' already exists", role.name)));
        }
        if roles.iter().any(|r| r.same_entity(role)) {
            return Err(StoreError::Conflict(format!("role id {} already exists", role.id)));
        }
        roles.push(role.clone());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Role>, StoreError> {
        Ok(self.roles.read().map_err(|_| poisoned())?.clone())
    }
}

/// In-memory user table for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<UserId, User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn insert(&self, user: &User) -> Result<(), StoreError> {
        let mut users = self.users.write().map_err(|_| poisoned())?;
        if users.values().any(|u| u.username == user.username) {
            return Err(StoreError::Conflict(format!(
                "username '{}' already exists",
                user.username
            )));
        }
        if users.contains_key(&user.id) {
            return Err(StoreError::Conflict(format!("user id {} already exists", user.id)));
        }
        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn get(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let users = self.users.read().map_err(|_| poisoned())?;
        Ok(users.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.read().map_err(|_| poisoned())?;
        Ok(users.values().find(|u| u.username == username).cloned())
    }

    async fn add_role(&self, user_id: UserId, role: &Role) -> Result<(), StoreError> {
        let mut users = self.users.write().map_err(|_| poisoned())?;
        let user = users
            .get_mut(&user_id)
            .ok_or_else(|| StoreError::Backend(format!("user {user_id} does not exist")))?;
        user.grant(role.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(name: &str) -> User {
        User::new(name, "$argon2id$stub", Role::new(RoleName::USER)).unwrap()
    }

    #[tokio::test]
    async fn role_names_are_unique() {
        let store = InMemoryRoleStore::new();
        store.insert(&Role::new(RoleName::ADMIN)).await.unwrap();

        let err = store.insert(&Role::new(RoleName::ADMIN)).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn role_lookup_is_exact() {
        let store = InMemoryRoleStore::new();
        store.insert(&Role::new(RoleName::ADMIN)).await.unwrap();

        let lower = RoleName::parse("admin").unwrap();
        assert!(store.find_by_name(&lower).await.unwrap().is_none());
        assert!(store.find_by_name(&RoleName::ADMIN).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn usernames_are_unique() {
        let store = InMemoryUserStore::new();
        store.insert(&user("alice")).await.unwrap();

        let err = store.insert(&user("alice")).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn add_role_is_idempotent() {
        let store = InMemoryUserStore::new();
        let alice = user("alice");
        store.insert(&alice).await.unwrap();

        let admin = Role::new(RoleName::ADMIN);
        store.add_role(alice.id, &admin).await.unwrap();
        store.add_role(alice.id, &admin).await.unwrap();

        let stored = store.get(alice.id).await.unwrap().unwrap();
        assert_eq!(stored.role_names(), vec![RoleName::USER, RoleName::ADMIN]);
    }

    #[tokio::test]
    async fn add_role_to_unknown_user_fails() {
        let store = InMemoryUserStore::new();
        let err = store
            .add_role(UserId::new(), &Role::new(RoleName::ADMIN))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Backend(_)));
    }

    #[tokio::test]
    async fn find_by_username_returns_the_stored_copy() {
        let store = InMemoryUserStore::new();
        let bob = user("bob");
        store.insert(&bob).await.unwrap();

        let found = store.find_by_username("bob").await.unwrap().unwrap();
        assert_eq!(found, bob);
        assert!(store.find_by_username("nobody").await.unwrap().is_none());
    }
}
