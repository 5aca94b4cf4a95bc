use thiserror::Error;

use crate::{Principal, Requirement, RoleName};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("authentication required")]
    Unauthenticated,

    #[error("forbidden: missing role '{0}'")]
    MissingRole(RoleName),
}

/// Decide whether an (optionally authenticated) caller meets `requirement`.
///
/// - No IO
/// - No panics
pub fn authorize(principal: Option<&Principal>, requirement: &Requirement) -> Result<(), AuthzError> {
    match requirement {
        Requirement::Public => Ok(()),
        Requirement::Authenticated => principal.map(|_| ()).ok_or(AuthzError::Unauthenticated),
        Requirement::Role(role) => principal
            .ok_or(AuthzError::Unauthenticated)?
            .require_role(role),
    }
}
