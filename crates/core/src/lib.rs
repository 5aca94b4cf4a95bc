//! `rolegate-core`: identifiers and error primitives shared by every crate.
//!
//! Nothing in here knows about HTTP, storage, or hashing.

pub mod entity;
pub mod error;
pub mod id;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{RoleId, UserId};
