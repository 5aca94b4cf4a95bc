//! User accounts.
//!
//! A user is created once at registration and afterwards only ever gains
//! roles. The username never changes and the plaintext password is never held.

use rolegate_core::{DomainError, DomainResult, Entity, UserId};

use crate::{Role, RoleName};

/// A registered account.
///
/// # Invariants
/// - `password_hash` is a non-empty, self-describing hash string.
/// - `roles` holds each role record at most once (compared by role id) and
///   keeps the order in which roles were granted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub password_hash: String,
    pub roles: Vec<Role>,
}

impl User {
    /// Build a not-yet-stored account holding a single initial role.
    pub fn new(
        username: impl Into<String>,
        password_hash: impl Into<String>,
        initial_role: Role,
    ) -> DomainResult<Self> {
        let username = validate_username(&username.into())?;
        let password_hash = password_hash.into();
        if password_hash.is_empty() {
            return Err(DomainError::validation("password hash cannot be empty"));
        }

        Ok(Self {
            id: UserId::new(),
            username,
            password_hash,
            roles: vec![initial_role],
        })
    }

    /// Add `role` unless a record with the same id is already held.
    ///
    /// Returns `true` when the role set changed.
    pub fn grant(&mut self, role: Role) -> bool {
        if self.roles.iter().any(|r| r.same_entity(&role)) {
            return false;
        }
        self.roles.push(role);
        true
    }

    pub fn has_role(&self, name: &RoleName) -> bool {
        self.roles.iter().any(|r| &r.name == name)
    }

    pub fn role_names(&self) -> Vec<RoleName> {
        self.roles.iter().map(|r| r.name.clone()).collect()
    }
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Trim and check a username, returning the form that gets stored.
pub fn validate_username(raw: &str) -> DomainResult<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation("username cannot be empty"));
    }
    if trimmed.contains(':') {
        // Basic credentials split on the first ':'.
        return Err(DomainError::validation("username cannot contain ':'"));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_role() -> Role {
        Role::new(RoleName::USER)
    }

    #[test]
    fn new_user_holds_only_its_initial_role() {
        let user = User::new("alice", "$argon2id$stub", user_role()).unwrap();
        assert_eq!(user.role_names(), vec![RoleName::USER]);
        assert!(user.has_role(&RoleName::USER));
        assert!(!user.has_role(&RoleName::ADMIN));
    }

    #[test]
    fn username_is_trimmed() {
        let user = User::new("  bob ", "$argon2id$stub", user_role()).unwrap();
        assert_eq!(user.username, "bob");
    }

    #[test]
    fn blank_username_is_rejected() {
        let err = User::new("   ", "$argon2id$stub", user_role()).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn colon_in_username_is_rejected() {
        assert!(validate_username("a:b").is_err());
    }

    #[test]
    fn empty_hash_is_rejected() {
        assert!(User::new("carol", "", user_role()).is_err());
    }

    #[test]
    fn granting_same_role_twice_is_a_no_op() {
        let mut user = User::new("dave", "$argon2id$stub", user_role()).unwrap();
        let admin = Role::new(RoleName::ADMIN);

        assert!(user.grant(admin.clone()));
        assert!(!user.grant(admin));
        assert_eq!(user.role_names(), vec![RoleName::USER, RoleName::ADMIN]);
    }

    #[test]
    fn grant_compares_by_role_identity() {
        let mut user = User::new("erin", "$argon2id$stub", user_role()).unwrap();
        let existing = user.roles[0].clone();

        // Same id, so it is the same record even if looked up again.
        assert!(!user.grant(Role {
            id: existing.id,
            name: existing.name,
        }));
        assert_eq!(user.roles.len(), 1);
    }
}
