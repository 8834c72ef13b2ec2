/**
 * Permission Domain Types
 *
 * A permission is a named capability (`ROLE_ADMIN`, `users:write`, ...) that
 * users reference by id. Names are unique across the store.
 */
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::audit::AuditFields;
use crate::shared::error::{require_not_blank, SharedError};

/// Stored permission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permission {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub audit: AuditFields,
}

/// Create/update payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PermissionModifyCommand {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Required on update, ignored on create
    #[serde(default)]
    pub version: Option<i64>,
}

impl PermissionModifyCommand {
    pub fn validate(&self) -> Result<(), SharedError> {
        require_not_blank("name", &self.name)
    }
}

/// Wire representation of a permission
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PermissionDto {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub description: String,
    #[serde(flatten)]
    pub audit: AuditFields,
}

impl From<Permission> for PermissionDto {
    fn from(permission: Permission) -> Self {
        Self {
            id: permission.id,
            name: permission.name,
            description: permission.description,
            audit: permission.audit,
        }
    }
}
