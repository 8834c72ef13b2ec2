/**
 * User Domain Types
 *
 * Users hold a set of permission ids. The write payload names that set
 * `role` and accepts either a single id or an array of ids. Reads resolve
 * the ids back into full permissions.
 */
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::audit::AuditFields;
use crate::shared::error::{require_not_blank, SharedError};
use crate::shared::permission::{Permission, PermissionDto};

/// Stored user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub permissions: BTreeSet<Uuid>,
    pub audit: AuditFields,
}

/// `role` as sent by clients: one id or many
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

fn one_or_many<'de, D>(deserializer: D) -> Result<BTreeSet<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(id) => BTreeSet::from([id]),
        OneOrMany::Many(ids) => ids.into_iter().collect(),
    })
}

/// Create/update payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserModifyCommand {
    pub name: String,
    pub email: String,
    /// Permission ids, kept as strings so an unknown or malformed id can be
    /// reported as a missing permission
    #[serde(rename = "role", default, deserialize_with = "one_or_many")]
    pub permission_ids: BTreeSet<String>,
    #[serde(default)]
    pub version: Option<i64>,
}

impl UserModifyCommand {
    pub fn validate(&self) -> Result<(), SharedError> {
        require_not_blank("name", &self.name)?;
        require_not_blank("email", &self.email)?;
        Ok(())
    }
}

/// A user together with its resolved permissions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedUser {
    pub user: User,
    pub permissions: Vec<Permission>,
}

/// Wire representation of a user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserDto {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(rename = "role")]
    pub permissions: Vec<PermissionDto>,
    #[serde(flatten)]
    pub audit: AuditFields,
}

impl From<ResolvedUser> for UserDto {
    fn from(resolved: ResolvedUser) -> Self {
        let ResolvedUser { user, permissions } = resolved;
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            permissions: permissions.into_iter().map(PermissionDto::from).collect(),
            audit: user.audit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::audit::Auditor;
    use chrono::Utc;

    #[test]
    fn test_role_accepts_single_value() {
        let cmd: UserModifyCommand =
            serde_json::from_str(r#"{"name":"Ann","email":"ann@x.io","role":"p1"}"#).unwrap();
        assert_eq!(cmd.permission_ids, BTreeSet::from(["p1".to_string()]));
    }

    #[test]
    fn test_role_accepts_array_and_dedups() {
        let cmd: UserModifyCommand = serde_json::from_str(
            r#"{"name":"Ann","email":"ann@x.io","role":["p2","p1","p2"],"version":3}"#,
        )
        .unwrap();
        assert_eq!(cmd.permission_ids.len(), 2);
        assert_eq!(cmd.version, Some(3));
    }

    #[test]
    fn test_role_defaults_to_empty() {
        let cmd: UserModifyCommand =
            serde_json::from_str(r#"{"name":"Ann","email":"ann@x.io"}"#).unwrap();
        assert!(cmd.permission_ids.is_empty());
        assert!(cmd.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_blank_email() {
        let cmd: UserModifyCommand =
            serde_json::from_str(r#"{"name":"Ann","email":""}"#).unwrap();
        assert!(cmd.validate().is_err());
    }

    #[test]
    fn test_dto_embeds_permissions_under_role() {
        let auditor = Auditor::anonymous();
        let permission = Permission {
            id: Uuid::new_v4(),
            name: "ROLE_USER".to_string(),
            description: String::new(),
            audit: AuditFields::created(&auditor, Utc::now()),
        };
        let user = User {
            id: Uuid::new_v4(),
            name: "Ann".to_string(),
            email: "ann@x.io".to_string(),
            permissions: BTreeSet::from([permission.id]),
            audit: AuditFields::created(&auditor, Utc::now()),
        };

        let json = serde_json::to_value(UserDto::from(ResolvedUser {
            user,
            permissions: vec![permission],
        }))
        .unwrap();

        assert_eq!(json["role"][0]["name"], "ROLE_USER");
        assert_eq!(json["createdBy"], "anonymous");
        assert!(json.get("_id").is_some());
    }
}
