//! Administrator user entity and its roles.

use serde::{Deserialize, Serialize};

/// Role granted to an administrator. Read-only reference data.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Role {
    pub id: i64,
    /// Role code, e.g. `Admin`
    pub name: String,
    /// Display label, e.g. `管理者`
    pub description: String,
}

impl Role {
    pub fn new(id: i64, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: description.into(),
        }
    }
}

/// Administrator account. `email` is unique across users.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Option<i64>,
    pub email: String,
    /// Argon2 hash; never rendered
    #[serde(skip_serializing, default)]
    pub password: String,
    /// Display name
    pub name: String,
    pub disabled: bool,
    /// Granted roles, unique by id and ordered by id
    pub roles: Vec<Role>,
}

impl User {
    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }

    /// Ids of the granted roles
    pub fn role_ids(&self) -> Vec<i64> {
        self.roles.iter().map(|r| r.id).collect()
    }

    /// Replace the granted roles, dropping duplicates.
    pub fn set_roles(&mut self, mut roles: Vec<Role>) {
        roles.sort_by_key(|r| r.id);
        roles.dedup_by_key(|r| r.id);
        self.roles = roles;
    }

    pub fn has_role(&self, name: &str) -> bool {
        self.roles.iter().any(|r| r.name == name)
    }
}
