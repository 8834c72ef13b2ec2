/**
 * User Service
 *
 * Users reference permissions by id. On write every referenced id must name
 * an existing permission. On read the ids are resolved back into full
 * permissions, skipping ids whose permission has since been deleted.
 *
 * Listing a page costs one user query plus one `find_by_ids` for the union
 * of all permission ids on that page.
 */

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::backend::error::BackendError;
use crate::backend::permissions::service::parse_id;
use crate::backend::permissions::PermissionService;
use crate::backend::realtime::{current_trace, EventPublisher};
use crate::backend::store::UserRepository;
use crate::shared::audit::{AuditFields, Auditor};
use crate::shared::page::PageRequest;
use crate::shared::{AppEvent, Permission, ResolvedUser, User, UserModifyCommand};

#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UserRepository>,
    permissions: PermissionService,
    events: EventPublisher,
}

impl UserService {
    pub fn new(
        repo: Arc<dyn UserRepository>,
        permissions: PermissionService,
        events: EventPublisher,
    ) -> Self {
        Self {
            repo,
            permissions,
            events,
        }
    }

    pub async fn get_all(&self, page: PageRequest) -> Result<Vec<ResolvedUser>, BackendError> {
        let users = self.repo.find_page(&page).await?;

        let ids: BTreeSet<Uuid> = users
            .iter()
            .flat_map(|user| user.permissions.iter().copied())
            .collect();
        let by_id: HashMap<Uuid, Permission> = self
            .permissions
            .get_many(&ids)
            .await?
            .into_iter()
            .map(|permission| (permission.id, permission))
            .collect();

        Ok(users
            .into_iter()
            .map(|user| {
                let permissions = user
                    .permissions
                    .iter()
                    .filter_map(|id| by_id.get(id).cloned())
                    .collect();
                ResolvedUser { user, permissions }
            })
            .collect())
    }

    pub async fn get(&self, id: &str) -> Result<ResolvedUser, BackendError> {
        let user = self.find(id).await?;
        let permissions = self.permissions.get_many(&user.permissions).await?;
        Ok(ResolvedUser { user, permissions })
    }

    pub async fn create(
        &self,
        command: UserModifyCommand,
        auditor: &Auditor,
    ) -> Result<ResolvedUser, BackendError> {
        command.validate()?;
        let permissions = self.permissions.resolve(&command.permission_ids).await?;

        let user = User {
            id: Uuid::new_v4(),
            name: command.name,
            email: command.email,
            permissions: permissions.iter().map(|p| p.id).collect(),
            audit: AuditFields::created(auditor, Utc::now()),
        };
        let saved = self.repo.insert(user).await?;
        tracing::info!("User created: {} <{}>", saved.id, saved.email);

        let event = AppEvent::user_created(saved.id);
        let event = match current_trace() {
            Some((trace_id, span_id)) => event.with_trace(trace_id, span_id),
            None => event,
        };
        self.events.publish(event);
        Ok(ResolvedUser {
            user: saved,
            permissions,
        })
    }

    pub async fn update(
        &self,
        id: &str,
        command: UserModifyCommand,
        auditor: &Auditor,
    ) -> Result<ResolvedUser, BackendError> {
        let expected = command.version.ok_or(BackendError::VersionMissing)?;
        command.validate()?;
        let permissions = self.permissions.resolve(&command.permission_ids).await?;

        // a stale version names a row that no longer exists
        let existing = self.find(id).await?;
        if existing.audit.version != expected {
            return Err(BackendError::user_not_found(id));
        }

        let updated = User {
            id: existing.id,
            name: command.name,
            email: command.email,
            permissions: permissions.iter().map(|p| p.id).collect(),
            audit: existing.audit.touched(auditor, Utc::now()),
        };

        let saved = self
            .repo
            .update(updated, expected)
            .await?
            .ok_or_else(|| BackendError::user_not_found(id))?;
        tracing::info!("User updated: {} (version {})", saved.id, saved.audit.version);
        Ok(ResolvedUser {
            user: saved,
            permissions,
        })
    }

    pub async fn delete(&self, id: &str) -> Result<(), BackendError> {
        let uuid = parse_id(id).ok_or_else(|| BackendError::user_not_found(id))?;
        if !self.repo.delete(uuid).await? {
            return Err(BackendError::user_not_found(id));
        }
        tracing::info!("User deleted: {}", uuid);
        Ok(())
    }

    pub async fn count(&self) -> Result<u64, BackendError> {
        Ok(self.repo.count().await?)
    }

    async fn find(&self, id: &str) -> Result<User, BackendError> {
        let uuid = parse_id(id).ok_or_else(|| BackendError::user_not_found(id))?;
        self.repo
            .find_by_id(uuid)
            .await?
            .ok_or_else(|| BackendError::user_not_found(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::chat::SessionRegistry;
    use crate::backend::realtime::{EventSink, UserUpdateEmitter};
    use crate::backend::store::Store;
    use crate::shared::config::ChatSettings;
    use crate::shared::PermissionModifyCommand;
    use assert_matches::assert_matches;
    use std::sync::Mutex;
    use std::time::Duration;
    use tracing::Instrument;

    #[derive(Debug, Default)]
    struct Outbox(Mutex<Vec<AppEvent>>);

    impl EventSink for Outbox {
        fn forward(&self, event: &AppEvent) {
            self.0.lock().unwrap().push(event.clone());
        }
    }

    struct Fixture {
        users: UserService,
        permissions: PermissionService,
        emitter: UserUpdateEmitter,
        outbox: Arc<Outbox>,
    }

    fn fixture() -> Fixture {
        let store = Store::memory();
        let emitter = UserUpdateEmitter::new(Duration::from_secs(10));
        let registry = SessionRegistry::new(ChatSettings {
            stale_check: false,
            ..ChatSettings::default()
        });
        let outbox = Arc::new(Outbox::default());
        let permissions = PermissionService::new(store.permissions.clone());
        let users = UserService::new(
            store.users,
            permissions.clone(),
            EventPublisher::new(registry, emitter.clone()).with_sink(outbox.clone()),
        );
        Fixture {
            users,
            permissions,
            emitter,
            outbox,
        }
    }

    async fn permission(fixture: &Fixture, name: &str) -> Permission {
        fixture
            .permissions
            .create(
                PermissionModifyCommand {
                    name: name.to_string(),
                    description: String::new(),
                    version: None,
                },
                &Auditor::anonymous(),
            )
            .await
            .unwrap()
    }

    fn command(email: &str, roles: &[&Permission], version: Option<i64>) -> UserModifyCommand {
        UserModifyCommand {
            name: "Ann".to_string(),
            email: email.to_string(),
            permission_ids: roles.iter().map(|p| p.id.to_string()).collect(),
            version,
        }
    }

    #[tokio::test]
    async fn test_create_resolves_permissions_and_publishes() {
        let fixture = fixture();
        let admin = permission(&fixture, "ROLE_ADMIN").await;
        let mut updates = fixture.emitter.subscribe();

        let created = fixture
            .users
            .create(command("ann@example.com", &[&admin], None), &Auditor::new("root"))
            .await
            .unwrap();

        assert_eq!(created.permissions, vec![admin.clone()]);
        assert_eq!(created.user.audit.version, 0);
        assert_eq!(created.user.audit.created_by, "root");

        let event = updates.recv().await.unwrap();
        assert_eq!(event.content, format!("USER_CREATED: {}", created.user.id));
        assert_eq!(fixture.users.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_created_event_carries_trace_ids() {
        let fixture = fixture();
        let _guard = tracing::subscriber::set_default(tracing_subscriber::registry());

        let request = tracing::info_span!("request");
        let request_id = request.id().unwrap().into_u64();
        let created = fixture
            .users
            .create(command("trace@example.com", &[], None), &Auditor::anonymous())
            .instrument(request)
            .await
            .unwrap();

        let events = fixture.outbox.0.lock().unwrap().clone();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].source, format!("USER_CREATED: {}", created.user.id));
        assert_eq!(events[0].trace_id, Some(format!("{:016x}", request_id)));
        assert!(events[0].span_id.is_some());
    }

    #[tokio::test]
    async fn test_create_outside_a_span_has_no_trace() {
        let fixture = fixture();
        fixture
            .users
            .create(command("plain@example.com", &[], None), &Auditor::anonymous())
            .await
            .unwrap();

        let events = fixture.outbox.0.lock().unwrap().clone();
        assert_eq!(events.len(), 1);
        assert!(events[0].trace_id.is_none());
        assert!(events[0].span_id.is_none());
    }

    #[tokio::test]
    async fn test_create_with_unknown_permission_fails() {
        let fixture = fixture();
        let mut cmd = command("ann@example.com", &[], None);
        cmd.permission_ids.insert("nope".to_string());

        assert_matches!(
            fixture.users.create(cmd, &Auditor::anonymous()).await,
            Err(BackendError::PermissionNotFound(id)) if id == "nope"
        );
        assert_eq!(fixture.users.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let fixture = fixture();
        let auditor = Auditor::anonymous();
        fixture
            .users
            .create(command("dup@example.com", &[], None), &auditor)
            .await
            .unwrap();
        assert_matches!(
            fixture
                .users
                .create(command("dup@example.com", &[], None), &auditor)
                .await,
            Err(BackendError::Duplicate(_))
        );
    }

    #[tokio::test]
    async fn test_update_and_stale_version() {
        let fixture = fixture();
        let auditor = Auditor::anonymous();
        let reader = permission(&fixture, "ROLE_READER").await;
        let created = fixture
            .users
            .create(command("ann@example.com", &[], None), &auditor)
            .await
            .unwrap();
        let id = created.user.id.to_string();

        assert_matches!(
            fixture
                .users
                .update(&id, command("ann@example.com", &[], None), &auditor)
                .await,
            Err(BackendError::VersionMissing)
        );

        let updated = fixture
            .users
            .update(&id, command("ann@example.com", &[&reader], Some(0)), &auditor)
            .await
            .unwrap();
        assert_eq!(updated.user.audit.version, 1);
        assert_eq!(updated.permissions, vec![reader]);

        assert_matches!(
            fixture
                .users
                .update(&id, command("ann@example.com", &[], Some(0)), &auditor)
                .await,
            Err(BackendError::UserNotFound(stale)) if stale == id
        );
    }

    #[tokio::test]
    async fn test_deleted_permission_is_skipped_on_read() {
        let fixture = fixture();
        let keep = permission(&fixture, "keep").await;
        let removed = permission(&fixture, "removed").await;
        let created = fixture
            .users
            .create(command("ann@example.com", &[&keep, &removed], None), &Auditor::anonymous())
            .await
            .unwrap();

        fixture.permissions.delete(&removed.id.to_string()).await.unwrap();

        let read = fixture.users.get(&created.user.id.to_string()).await.unwrap();
        assert_eq!(read.permissions, vec![keep.clone()]);
        assert_eq!(read.user.permissions.len(), 2);

        let page = fixture.users.get_all(PageRequest::default()).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].permissions, vec![keep]);
    }

    #[tokio::test]
    async fn test_delete_unknown_user_is_not_found() {
        let fixture = fixture();
        assert_matches!(
            fixture.users.delete(&Uuid::new_v4().to_string()).await,
            Err(BackendError::UserNotFound(_))
        );
        assert_matches!(
            fixture.users.delete("bad-id").await,
            Err(BackendError::UserNotFound(id)) if id == "bad-id"
        );
    }
}
