use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use rolegate_auth::{AccessPolicy, CredentialHasher, HashError, HashParams};
use rolegate_infra::{
    AccountService, AppConfig, InMemoryRoleStore, InMemoryUserStore, PostgresStore,
    RoleDirectory, StoreError,
};

#[derive(Debug, Error)]
pub enum ServiceInitError {
    #[error(transparent)]
    Hash(#[from] HashError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Everything a request handler may need, shared behind one `Arc`.
#[derive(Clone)]
pub struct AppServices {
    pub accounts: AccountService,
    pub policy: AccessPolicy,
}

impl AppServices {
    pub fn new(accounts: AccountService, policy: AccessPolicy) -> Self {
        Self { accounts, policy }
    }

    /// Process-local stores with the standard policy. Data is lost on exit.
    pub fn in_memory(hash: HashParams) -> Result<Self, ServiceInitError> {
        let accounts = AccountService::new(
            Arc::new(InMemoryUserStore::new()),
            RoleDirectory::new(Arc::new(InMemoryRoleStore::new())),
            CredentialHasher::new(hash)?,
        )?;
        Ok(Self::new(accounts, AccessPolicy::standard()))
    }

    /// Postgres when `DATABASE_URL` is configured, in-memory otherwise.
    pub async fn from_config(config: &AppConfig) -> Result<Self, ServiceInitError> {
        let Some(url) = config.database_url.as_deref() else {
            info!("DATABASE_URL not set; using in-memory stores");
            return Self::in_memory(config.hash);
        };

        let store = PostgresStore::connect(url).await?;
        store.migrate().await?;
        info!("connected to postgres");

        let store = Arc::new(store);
        let accounts = AccountService::new(
            store.clone(),
            RoleDirectory::new(store),
            CredentialHasher::new(config.hash)?,
        )?;
        Ok(Self::new(accounts, AccessPolicy::standard()))
    }
}
