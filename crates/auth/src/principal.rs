use rolegate_core::UserId;

use crate::{AuthzError, RoleName, User};

/// The authenticated identity behind a request.
///
/// Built fresh from the stored account on every request (no sessions).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: UserId,
    pub username: String,
    pub roles: Vec<RoleName>,
}

impl Principal {
    pub fn has_role(&self, role: &RoleName) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// Fail with `MissingRole` unless the principal holds `role`.
    pub fn require_role(&self, role: &RoleName) -> Result<(), AuthzError> {
        if self.has_role(role) {
            Ok(())
        } else {
            Err(AuthzError::MissingRole(role.clone()))
        }
    }
}

impl From<&User> for Principal {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            username: user.username.clone(),
            roles: user.role_names(),
        }
    }
}
