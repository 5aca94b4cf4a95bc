//! `rolegate-auth`: users, roles, credentials and access rules.
//!
//! This crate is decoupled from HTTP and storage: it describes *who* may do
//! *what*, and how passwords are turned into storable hashes.

pub mod authorize;
pub mod password;
pub mod policy;
pub mod principal;
pub mod roles;
pub mod user;

pub use authorize::{AuthzError, authorize};
pub use password::{CredentialHasher, HashError, HashParams, verify_password};
pub use policy::{AccessPolicy, AccessRule, PathPattern, Requirement};
pub use principal::Principal;
pub use roles::{Role, RoleName};
pub use user::{User, validate_username};
