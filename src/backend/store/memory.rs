/**
 * In-Memory Store
 *
 * Keeps permissions and users in `HashMap`s guarded by tokio `RwLock`s.
 * Paging sorts a snapshot of the map on every call, which is fine for the
 * data sizes this store is meant for (tests and local runs).
 */
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    duplicate_permission, duplicate_user, PermissionRepository, StoreError, UserRepository,
};
use crate::shared::audit::AuditFields;
use crate::shared::page::{Direction, PageRequest, SortField};
use crate::shared::{Permission, User};

#[derive(Debug, Default)]
pub struct MemoryStore {
    permissions: RwLock<HashMap<Uuid, Permission>>,
    users: RwLock<HashMap<Uuid, User>>,
}

fn compare_audit(a: &AuditFields, b: &AuditFields, field: SortField) -> Option<Ordering> {
    match field {
        SortField::Version => Some(a.version.cmp(&b.version)),
        SortField::CreatedDate => Some(a.created_date.cmp(&b.created_date)),
        SortField::ModifiedDate => Some(a.modified_date.cmp(&b.modified_date)),
        _ => None,
    }
}

fn compare_permissions(a: &Permission, b: &Permission, field: SortField) -> Ordering {
    let primary = match field {
        SortField::Name => a.name.cmp(&b.name),
        SortField::Description => a.description.cmp(&b.description),
        _ => compare_audit(&a.audit, &b.audit, field).unwrap_or(Ordering::Equal),
    };
    primary.then_with(|| a.id.cmp(&b.id))
}

fn compare_users(a: &User, b: &User, field: SortField) -> Ordering {
    let primary = match field {
        SortField::Name => a.name.cmp(&b.name),
        SortField::Email => a.email.cmp(&b.email),
        _ => compare_audit(&a.audit, &b.audit, field).unwrap_or(Ordering::Equal),
    };
    primary.then_with(|| a.id.cmp(&b.id))
}

fn page_of<T, F>(mut items: Vec<T>, page: &PageRequest, compare: F) -> Vec<T>
where
    F: Fn(&T, &T) -> Ordering,
{
    items.sort_by(|a, b| match page.direction {
        Direction::Asc => compare(a, b),
        Direction::Desc => compare(b, a),
    });
    items
        .into_iter()
        .skip(page.offset() as usize)
        .take(page.size as usize)
        .collect()
}

#[async_trait]
impl PermissionRepository for MemoryStore {
    async fn find_page(&self, page: &PageRequest) -> Result<Vec<Permission>, StoreError> {
        let snapshot: Vec<Permission> = self.permissions.read().await.values().cloned().collect();
        Ok(page_of(snapshot, page, |a, b| compare_permissions(a, b, page.sort)))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Permission>, StoreError> {
        Ok(self.permissions.read().await.get(&id).cloned())
    }

    async fn find_by_ids(&self, ids: &BTreeSet<Uuid>) -> Result<Vec<Permission>, StoreError> {
        let permissions = self.permissions.read().await;
        Ok(ids.iter().filter_map(|id| permissions.get(id).cloned()).collect())
    }

    async fn insert(&self, permission: Permission) -> Result<Permission, StoreError> {
        let mut permissions = self.permissions.write().await;
        if permissions.values().any(|p| p.name == permission.name) {
            return Err(duplicate_permission(&permission.name));
        }
        permissions.insert(permission.id, permission.clone());
        Ok(permission)
    }

    async fn update(
        &self,
        permission: Permission,
        expected_version: i64,
    ) -> Result<Option<Permission>, StoreError> {
        let mut permissions = self.permissions.write().await;
        match permissions.get(&permission.id) {
            Some(stored) if stored.audit.version == expected_version => {}
            _ => return Ok(None),
        }
        if permissions
            .values()
            .any(|p| p.id != permission.id && p.name == permission.name)
        {
            return Err(duplicate_permission(&permission.name));
        }
        permissions.insert(permission.id, permission.clone());
        Ok(Some(permission))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.permissions.write().await.remove(&id).is_some())
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_page(&self, page: &PageRequest) -> Result<Vec<User>, StoreError> {
        let snapshot: Vec<User> = self.users.read().await.values().cloned().collect();
        Ok(page_of(snapshot, page, |a, b| compare_users(a, b, page.sort)))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn insert(&self, user: User) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(duplicate_user(&user.email));
        }
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update(&self, user: User, expected_version: i64) -> Result<Option<User>, StoreError> {
        let mut users = self.users.write().await;
        match users.get(&user.id) {
            Some(stored) if stored.audit.version == expected_version => {}
            _ => return Ok(None),
        }
        if users.values().any(|u| u.id != user.id && u.email == user.email) {
            return Err(duplicate_user(&user.email));
        }
        users.insert(user.id, user.clone());
        Ok(Some(user))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.users.write().await.remove(&id).is_some())
    }

    async fn count(&self) -> Result<u64, StoreError> {
        Ok(self.users.read().await.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::audit::Auditor;
    use chrono::{Duration, Utc};

    fn permission(name: &str) -> Permission {
        Permission {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: format!("{} description", name),
            audit: AuditFields::created(&Auditor::anonymous(), Utc::now()),
        }
    }

    fn user(email: &str) -> User {
        User {
            id: Uuid::new_v4(),
            name: email.split('@').next().unwrap_or_default().to_string(),
            email: email.to_string(),
            permissions: BTreeSet::new(),
            audit: AuditFields::created(&Auditor::anonymous(), Utc::now()),
        }
    }

    #[tokio::test]
    async fn test_permission_name_is_unique() {
        let store = MemoryStore::default();
        PermissionRepository::insert(&store, permission("ROLE_ADMIN")).await.unwrap();

        let err = PermissionRepository::insert(&store, permission("ROLE_ADMIN"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(_)));
    }

    #[tokio::test]
    async fn test_update_checks_version() {
        let store = MemoryStore::default();
        let created = PermissionRepository::insert(&store, permission("ROLE_A")).await.unwrap();

        let mut next = created.clone();
        next.description = "changed".to_string();
        next.audit = created.audit.touched(&Auditor::new("bob"), Utc::now());

        let stale = PermissionRepository::update(&store, next.clone(), 5).await.unwrap();
        assert!(stale.is_none());

        let applied = PermissionRepository::update(&store, next, 0).await.unwrap().unwrap();
        assert_eq!(applied.audit.version, 1);
        assert_eq!(applied.description, "changed");

        let stored = PermissionRepository::find_by_id(&store, created.id).await.unwrap().unwrap();
        assert_eq!(stored.audit.version, 1);
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_none() {
        let store = MemoryStore::default();
        let missing = permission("ROLE_GHOST");
        assert!(PermissionRepository::update(&store, missing, 0).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_by_ids_skips_unknown() {
        let store = MemoryStore::default();
        let a = PermissionRepository::insert(&store, permission("A")).await.unwrap();
        let ids = BTreeSet::from([a.id, Uuid::new_v4()]);

        let found = store.find_by_ids(&ids).await.unwrap();
        assert_eq!(found, vec![a]);
    }

    #[tokio::test]
    async fn test_paging_and_sorting() {
        let store = MemoryStore::default();
        for name in ["charlie", "alpha", "bravo"] {
            PermissionRepository::insert(&store, permission(name)).await.unwrap();
        }

        let first = PageRequest {
            page: 0,
            size: 2,
            sort: SortField::Name,
            direction: Direction::Asc,
        };
        let names: Vec<String> = PermissionRepository::find_page(&store, &first)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["alpha", "bravo"]);

        let desc = PageRequest {
            page: 1,
            direction: Direction::Desc,
            ..first
        };
        let names: Vec<String> = PermissionRepository::find_page(&store, &desc)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["alpha"]);
    }

    #[tokio::test]
    async fn test_users_sorted_by_created_date() {
        let store = MemoryStore::default();
        let mut older = user("old@x.io");
        older.audit.created_date = Utc::now() - Duration::hours(1);
        let newer = user("new@x.io");
        UserRepository::insert(&store, newer.clone()).await.unwrap();
        UserRepository::insert(&store, older.clone()).await.unwrap();

        let page = PageRequest {
            sort: SortField::CreatedDate,
            ..PageRequest::default()
        };
        let users = UserRepository::find_page(&store, &page).await.unwrap();
        assert_eq!(users[0].id, older.id);
        assert_eq!(users[1].id, newer.id);
    }

    #[tokio::test]
    async fn test_user_email_unique_on_update() {
        let store = MemoryStore::default();
        UserRepository::insert(&store, user("a@x.io")).await.unwrap();
        let b = UserRepository::insert(&store, user("b@x.io")).await.unwrap();

        let mut clash = b.clone();
        clash.email = "a@x.io".to_string();
        let err = UserRepository::update(&store, clash, 0).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(_)));
    }

    #[tokio::test]
    async fn test_user_delete_and_count() {
        let store = MemoryStore::default();
        let u = UserRepository::insert(&store, user("a@x.io")).await.unwrap();
        assert_eq!(store.count().await.unwrap(), 1);

        assert!(UserRepository::delete(&store, u.id).await.unwrap());
        assert!(!UserRepository::delete(&store, u.id).await.unwrap());
        assert_eq!(store.count().await.unwrap(), 0);
    }
}
