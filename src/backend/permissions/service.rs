/**
 * Permission Service
 *
 * # Versioning
 *
 * Inserts start at version 0. An update must carry the version the client
 * read:
 *
 * 1. no version: `VersionMissing` (400)
 * 2. unknown id, or the stored version differs: `PermissionNotFound` (404)
 *
 * A stale version is reported like a missing row: the pair (id, version)
 * the client named does not exist. The store re-checks the version
 * atomically, so two writers racing on the same version cannot both win.
 */

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::backend::error::BackendError;
use crate::backend::store::PermissionRepository;
use crate::shared::audit::{AuditFields, Auditor};
use crate::shared::page::PageRequest;
use crate::shared::{Permission, PermissionModifyCommand};

/// Path ids that are not UUIDs cannot name a stored row
pub(crate) fn parse_id(id: &str) -> Option<Uuid> {
    Uuid::parse_str(id.trim()).ok()
}

#[derive(Clone)]
pub struct PermissionService {
    repo: Arc<dyn PermissionRepository>,
}

impl PermissionService {
    pub fn new(repo: Arc<dyn PermissionRepository>) -> Self {
        Self { repo }
    }

    pub async fn get_all(&self, page: PageRequest) -> Result<Vec<Permission>, BackendError> {
        Ok(self.repo.find_page(&page).await?)
    }

    pub async fn get(&self, id: &str) -> Result<Permission, BackendError> {
        let uuid = parse_id(id).ok_or_else(|| BackendError::permission_not_found(id))?;
        self.repo
            .find_by_id(uuid)
            .await?
            .ok_or_else(|| BackendError::permission_not_found(id))
    }

    /// Known permissions among `ids`, ordered by id
    pub async fn get_many(&self, ids: &BTreeSet<Uuid>) -> Result<Vec<Permission>, BackendError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut found = self.repo.find_by_ids(ids).await?;
        found.sort_by_key(|permission| permission.id);
        Ok(found)
    }

    /// Resolve client-supplied ids; every one of them must exist
    pub async fn resolve(&self, ids: &BTreeSet<String>) -> Result<Vec<Permission>, BackendError> {
        let mut uuids = BTreeSet::new();
        for id in ids {
            let uuid = parse_id(id).ok_or_else(|| BackendError::permission_not_found(id))?;
            uuids.insert(uuid);
        }

        let found = self.get_many(&uuids).await?;
        if found.len() < uuids.len() {
            let known: BTreeSet<Uuid> = found.iter().map(|p| p.id).collect();
            if let Some(missing) = uuids.difference(&known).next() {
                return Err(BackendError::permission_not_found(missing));
            }
        }
        Ok(found)
    }

    pub async fn create(
        &self,
        command: PermissionModifyCommand,
        auditor: &Auditor,
    ) -> Result<Permission, BackendError> {
        command.validate()?;

        let permission = Permission {
            id: Uuid::new_v4(),
            name: command.name,
            description: command.description,
            audit: AuditFields::created(auditor, Utc::now()),
        };
        let saved = self.repo.insert(permission).await?;
        tracing::info!("Permission created: {} ({})", saved.name, saved.id);
        Ok(saved)
    }

    pub async fn update(
        &self,
        id: &str,
        command: PermissionModifyCommand,
        auditor: &Auditor,
    ) -> Result<Permission, BackendError> {
        let expected = command.version.ok_or(BackendError::VersionMissing)?;
        command.validate()?;

        let existing = self.get(id).await?;
        if existing.audit.version != expected {
            tracing::debug!(
                "Stale permission update for {}: stored {}, got {}",
                existing.id,
                existing.audit.version,
                expected
            );
            return Err(BackendError::permission_not_found(id));
        }

        let updated = Permission {
            id: existing.id,
            name: command.name,
            description: command.description,
            audit: existing.audit.touched(auditor, Utc::now()),
        };

        let saved = self
            .repo
            .update(updated, expected)
            .await?
            .ok_or_else(|| BackendError::permission_not_found(id))?;
        tracing::info!("Permission updated: {} (version {})", saved.id, saved.audit.version);
        Ok(saved)
    }

    /// Idempotent: unknown ids succeed
    pub async fn delete(&self, id: &str) -> Result<(), BackendError> {
        let Some(uuid) = parse_id(id) else {
            tracing::debug!("Ignoring delete of non-uuid permission id {}", id);
            return Ok(());
        };
        if self.repo.delete(uuid).await? {
            tracing::info!("Permission deleted: {}", uuid);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::store::Store;
    use assert_matches::assert_matches;

    fn service() -> PermissionService {
        PermissionService::new(Store::memory().permissions)
    }

    fn command(name: &str, version: Option<i64>) -> PermissionModifyCommand {
        PermissionModifyCommand {
            name: name.to_string(),
            description: format!("{} description", name),
            version,
        }
    }

    #[tokio::test]
    async fn test_create_starts_at_version_zero() {
        let service = service();
        let auditor = Auditor::new("alice");
        let created = service.create(command("ROLE_ADMIN", None), &auditor).await.unwrap();

        assert_eq!(created.audit.version, 0);
        assert_eq!(created.audit.created_by, "alice");
        assert_eq!(service.get(&created.id.to_string()).await.unwrap(), created);
    }

    #[tokio::test]
    async fn test_create_rejects_blank_name_and_duplicates() {
        let service = service();
        let auditor = Auditor::anonymous();
        assert_matches!(
            service.create(command("  ", None), &auditor).await,
            Err(BackendError::SharedError(_))
        );

        service.create(command("ROLE_USER", None), &auditor).await.unwrap();
        assert_matches!(
            service.create(command("ROLE_USER", None), &auditor).await,
            Err(BackendError::Duplicate(_))
        );
    }

    #[tokio::test]
    async fn test_update_version_rules() {
        let service = service();
        let auditor = Auditor::new("bob");
        let created = service.create(command("perm", None), &auditor).await.unwrap();
        let id = created.id.to_string();

        assert_matches!(
            service.update(&id, command("perm", None), &auditor).await,
            Err(BackendError::VersionMissing)
        );
        assert_matches!(
            service.update(&id, command("perm", Some(7)), &auditor).await,
            Err(BackendError::PermissionNotFound(stale)) if stale == id
        );

        let updated = service
            .update(&id, command("renamed", Some(0)), &Auditor::new("carol"))
            .await
            .unwrap();
        assert_eq!(updated.audit.version, 1);
        assert_eq!(updated.audit.created_by, "bob");
        assert_eq!(updated.audit.modified_by, "carol");

        // the old version is now stale
        let stale = service
            .update(&id, command("again", Some(0)), &auditor)
            .await
            .unwrap_err();
        assert_eq!(stale.message(), format!("Permission not found with id: {}", id));
        assert_eq!(stale.error_code(), "E001");
    }

    #[tokio::test]
    async fn test_update_unknown_is_not_found() {
        let service = service();
        let auditor = Auditor::anonymous();
        assert_matches!(
            service.update(&Uuid::new_v4().to_string(), command("x", Some(0)), &auditor).await,
            Err(BackendError::PermissionNotFound(_))
        );
        assert_matches!(
            service.update("not-a-uuid", command("x", Some(0)), &auditor).await,
            Err(BackendError::PermissionNotFound(id)) if id == "not-a-uuid"
        );
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let service = service();
        let created = service
            .create(command("temp", None), &Auditor::anonymous())
            .await
            .unwrap();
        let id = created.id.to_string();

        service.delete(&id).await.unwrap();
        service.delete(&id).await.unwrap();
        service.delete("garbage").await.unwrap();
        assert_matches!(service.get(&id).await, Err(BackendError::PermissionNotFound(_)));
    }

    #[tokio::test]
    async fn test_resolve_reports_first_missing_id() {
        let service = service();
        let known = service
            .create(command("known", None), &Auditor::anonymous())
            .await
            .unwrap();
        let unknown = Uuid::new_v4();

        let ids = BTreeSet::from([known.id.to_string(), unknown.to_string()]);
        assert_matches!(
            service.resolve(&ids).await,
            Err(BackendError::PermissionNotFound(id)) if id == unknown.to_string()
        );

        let ids = BTreeSet::from([known.id.to_string()]);
        assert_eq!(service.resolve(&ids).await.unwrap(), vec![known]);
        assert!(service.resolve(&BTreeSet::new()).await.unwrap().is_empty());
    }
}
