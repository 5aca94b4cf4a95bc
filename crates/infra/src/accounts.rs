//! Account workflows: registration, role elevation and credential checks.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use rolegate_auth::{
    CredentialHasher, HashError, Principal, RoleName, User, validate_username, verify_password,
};
use rolegate_core::{DomainError, UserId};

use crate::roles::RoleDirectory;
use crate::store::{StoreError, UserStore};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccountError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("user {0} not found")]
    NotFound(UserId),

    #[error("username '{0}' is already taken")]
    UsernameTaken(String),

    #[error(transparent)]
    Hashing(#[from] HashError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<DomainError> for AccountError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) | DomainError::InvalidId(msg) => Self::Validation(msg),
        }
    }
}

const DECOY_PASSWORD: &str = "rolegate-decoy-password";

/// Orchestrates user creation and role elevation.
///
/// Holds no mutable state of its own; the stores are the only shared state.
#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserStore>,
    roles: RoleDirectory,
    hasher: CredentialHasher,
    /// Verified against when the username is unknown, so that path costs
    /// as much as a wrong password.
    decoy_hash: Arc<str>,
}

impl AccountService {
    pub fn new(
        users: Arc<dyn UserStore>,
        roles: RoleDirectory,
        hasher: CredentialHasher,
    ) -> Result<Self, HashError> {
        let decoy_hash = hasher.hash(DECOY_PASSWORD)?;
        debug!(params = ?hasher.params(), "account service ready");
        Ok(Self {
            users,
            roles,
            hasher,
            decoy_hash: decoy_hash.into(),
        })
    }

    pub fn roles(&self) -> &RoleDirectory {
        &self.roles
    }

    /// Create an account holding only the `USER` role.
    #[instrument(skip(self, password), err)]
    pub async fn register_user(&self, username: &str, password: &str) -> Result<User, AccountError> {
        let username = validate_username(username)?;
        if password.is_empty() {
            return Err(AccountError::Validation("password cannot be empty".into()));
        }

        // Cheap early exit; the store's unique constraint still decides.
        if self.users.find_by_username(&username).await?.is_some() {
            return Err(AccountError::UsernameTaken(username));
        }

        let password_hash = self.hash_password(password).await?;
        let role = self.roles.find_or_create(&RoleName::USER).await?;
        let user = User::new(username, password_hash, role)?;

        match self.users.insert(&user).await {
            Ok(()) => {}
            Err(StoreError::Conflict(_)) => return Err(AccountError::UsernameTaken(user.username)),
            Err(e) => return Err(e.into()),
        }

        info!(user_id = %user.id, username = %user.username, "registered user");
        Ok(user)
    }

    /// Add the `ADMIN` role to an existing account.
    pub async fn promote_to_admin(&self, user_id: UserId) -> Result<User, AccountError> {
        self.grant_role(user_id, &RoleName::ADMIN).await
    }

    /// Add `role` to an existing account. Granting a held role changes nothing.
    #[instrument(skip(self, role), fields(role = %role), err)]
    pub async fn grant_role(&self, user_id: UserId, role: &RoleName) -> Result<User, AccountError> {
        let mut user = self
            .users
            .get(user_id)
            .await?
            .ok_or(AccountError::NotFound(user_id))?;

        let record = self.roles.find_or_create(role).await?;
        if user.grant(record.clone()) {
            self.users.add_role(user_id, &record).await?;
            info!(%user_id, "granted role");
        } else {
            debug!(%user_id, "role already held");
        }

        Ok(user)
    }

    /// Check a username/password pair against the stored hash.
    ///
    /// Returns `None` for an unknown user or a wrong password; callers must
    /// not be able to tell the two apart.
    #[instrument(skip(self, password), err)]
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<Principal>, AccountError> {
        let Some(user) = self.users.find_by_username(username).await? else {
            // Pay for a full verification anyway; the outcome is irrelevant.
            let _ = self.verify(password, self.decoy_hash.to_string()).await;
            debug!("unknown username");
            return Ok(None);
        };

        if !self.verify(password, user.password_hash.clone()).await? {
            warn!(user_id = %user.id, "password mismatch");
            return Ok(None);
        }
        Ok(Some(Principal::from(&user)))
    }

    /// Make sure `username` exists and holds `ADMIN`.
    ///
    /// Used at startup so a fresh deployment has someone able to promote.
    /// An existing account keeps its current password.
    #[instrument(skip(self, password), err)]
    pub async fn ensure_admin(&self, username: &str, password: &str) -> Result<User, AccountError> {
        let existing = self
            .users
            .find_by_username(validate_username(username)?.as_str())
            .await?;
        let user = match existing {
            Some(user) => user,
            None => match self.register_user(username, password).await {
                Ok(user) => user,
                // Another instance seeded it first.
                Err(AccountError::UsernameTaken(name)) => {
                    let seeded = self.users.find_by_username(&name).await?;
                    seeded.ok_or(AccountError::UsernameTaken(name))?
                }
                Err(e) => return Err(e),
            },
        };
        self.promote_to_admin(user.id).await
    }

    async fn verify(&self, password: &str, stored: String) -> Result<bool, AccountError> {
        let password = password.to_owned();
        let matches = tokio::task::spawn_blocking(move || verify_password(&password, &stored))
            .await
            .map_err(|e| HashError::Hashing(format!("verification task failed: {e}")))??;
        Ok(matches)
    }

    async fn hash_password(&self, password: &str) -> Result<String, AccountError> {
        let hasher = self.hasher.clone();
        let password = password.to_owned();
        let hash = tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| HashError::Hashing(format!("hashing task failed: {e}")))??;
        Ok(hash)
    }
}
