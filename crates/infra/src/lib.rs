//! Infrastructure layer: persistence, account workflows and configuration.

pub mod accounts;
pub mod config;
pub mod roles;
pub mod store;

pub use accounts::{AccountError, AccountService};
pub use config::{AdminCredentials, AppConfig, ConfigError};
pub use roles::RoleDirectory;
pub use store::{
    InMemoryRoleStore, InMemoryUserStore, PostgresStore, RoleStore, StoreError, UserStore,
};
