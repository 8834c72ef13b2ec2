/**
 * Auditing Fields
 *
 * Every persisted entity carries the same bookkeeping: who created it and
 * when, who touched it last and when, and an optimistic-lock version.
 *
 * The version starts at 0 on insert and is bumped by exactly one on every
 * successful update. Writers must present the version they read; the store
 * only applies an update when the stored version still matches.
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identity recorded when nobody is authenticated
pub const ANONYMOUS: &str = "anonymous";

/// The identity responsible for a write (JWT `sub`, or `anonymous`)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Auditor(String);

impl Auditor {
    pub fn new(subject: impl Into<String>) -> Self {
        Self(subject.into())
    }

    pub fn anonymous() -> Self {
        Self(ANONYMOUS.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Auditor {
    fn default() -> Self {
        Self::anonymous()
    }
}

/// Audit columns shared by permissions and users
///
/// Serialized flat into DTOs as `version`, `createdBy`, `createdDate`,
/// `modifiedBy` and `modifiedDate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditFields {
    pub version: i64,
    pub created_by: String,
    pub created_date: DateTime<Utc>,
    pub modified_by: String,
    pub modified_date: DateTime<Utc>,
}

impl AuditFields {
    /// Audit fields for a freshly inserted entity (version 0)
    pub fn created(auditor: &Auditor, now: DateTime<Utc>) -> Self {
        Self {
            version: 0,
            created_by: auditor.as_str().to_string(),
            created_date: now,
            modified_by: auditor.as_str().to_string(),
            modified_date: now,
        }
    }

    /// Audit fields after a successful update by `auditor`
    pub fn touched(&self, auditor: &Auditor, now: DateTime<Utc>) -> Self {
        Self {
            version: self.version + 1,
            created_by: self.created_by.clone(),
            created_date: self.created_date,
            modified_by: auditor.as_str().to_string(),
            modified_date: now,
        }
    }
}
