use rolegate_auth::{AuthzError, Principal, RoleName};
use rolegate_core::UserId;

/// Authenticated caller for a request.
///
/// Inserted into request extensions by the auth middleware; absent on
/// public routes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    principal: Principal,
}

impl PrincipalContext {
    pub fn new(principal: Principal) -> Self {
        Self { principal }
    }

    pub fn user_id(&self) -> UserId {
        self.principal.user_id
    }

    pub fn username(&self) -> &str {
        &self.principal.username
    }

    pub fn require_role(&self, role: &RoleName) -> Result<(), AuthzError> {
        self.principal.require_role(role)
    }
}
