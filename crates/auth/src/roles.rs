use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use rolegate_core::{DomainError, DomainResult, Entity, RoleId};

/// Name of a role, e.g. `USER` or `ADMIN`.
///
/// Names are compared exactly as stored (case-sensitive). A valid name is
/// non-empty and contains no whitespace.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoleName(Cow<'static, str>);

impl RoleName {
    /// Granted to every account at registration.
    pub const USER: RoleName = RoleName(Cow::Borrowed("USER"));

    /// Required to promote other accounts.
    pub const ADMIN: RoleName = RoleName(Cow::Borrowed("ADMIN"));

    pub fn parse(name: impl Into<Cow<'static, str>>) -> DomainResult<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(DomainError::validation("role name cannot be empty"));
        }
        if name.chars().any(char::is_whitespace) {
            return Err(DomainError::validation(format!(
                "role name '{name}' must not contain whitespace"
            )));
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for RoleName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for RoleName {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<RoleName> for String {
    fn from(value: RoleName) -> Self {
        value.0.into_owned()
    }
}

/// A persisted role record.
///
/// Created lazily the first time its name is referenced and never changed
/// afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: RoleId,
    pub name: RoleName,
}

impl Role {
    /// A role record that has not been stored yet.
    pub fn new(name: RoleName) -> Self {
        Self {
            id: RoleId::new(),
            name,
        }
    }
}

impl Entity for Role {
    type Id = RoleId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
