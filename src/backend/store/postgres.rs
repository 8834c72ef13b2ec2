/**
 * Postgres Store
 *
 * Runtime-checked sqlx queries against the schema in `migrations/`.
 *
 * Sort columns are interpolated into `ORDER BY`; they only ever come from
 * `SortField::column()`, never from request text. Updates carry a
 * `WHERE id = $1 AND version = $2` guard so a stale writer touches no row.
 */
use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{
    duplicate_permission, duplicate_user, PermissionRepository, StoreError, UserRepository,
};
use crate::shared::audit::AuditFields;
use crate::shared::page::PageRequest;
use crate::shared::{Permission, User};

const PERMISSION_COLUMNS: &str =
    "id, name, description, version, created_by, created_date, modified_by, modified_date";

const USER_COLUMNS: &str =
    "id, name, email, permissions, version, created_by, created_date, modified_by, modified_date";

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Apply pending migrations
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!().run(&self.pool).await?;
        Ok(())
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PermissionRow {
    id: Uuid,
    name: String,
    description: String,
    version: i64,
    created_by: String,
    created_date: DateTime<Utc>,
    modified_by: String,
    modified_date: DateTime<Utc>,
}

impl From<PermissionRow> for Permission {
    fn from(row: PermissionRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            audit: AuditFields {
                version: row.version,
                created_by: row.created_by,
                created_date: row.created_date,
                modified_by: row.modified_by,
                modified_date: row.modified_date,
            },
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    permissions: Vec<Uuid>,
    version: i64,
    created_by: String,
    created_date: DateTime<Utc>,
    modified_by: String,
    modified_date: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            email: row.email,
            permissions: row.permissions.into_iter().collect(),
            audit: AuditFields {
                version: row.version,
                created_by: row.created_by,
                created_date: row.created_date,
                modified_by: row.modified_by,
                modified_date: row.modified_date,
            },
        }
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

fn order_by(page: &PageRequest) -> String {
    format!(
        "ORDER BY {} {}, id {} LIMIT $1 OFFSET $2",
        page.sort.column(),
        page.direction.as_sql(),
        page.direction.as_sql()
    )
}

#[async_trait]
impl PermissionRepository for PgStore {
    async fn find_page(&self, page: &PageRequest) -> Result<Vec<Permission>, StoreError> {
        let sql = format!("SELECT {} FROM permissions {}", PERMISSION_COLUMNS, order_by(page));
        let rows = sqlx::query_as::<_, PermissionRow>(&sql)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Permission::from).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Permission>, StoreError> {
        let sql = format!("SELECT {} FROM permissions WHERE id = $1", PERMISSION_COLUMNS);
        let row = sqlx::query_as::<_, PermissionRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Permission::from))
    }

    async fn find_by_ids(&self, ids: &BTreeSet<Uuid>) -> Result<Vec<Permission>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = ids.iter().copied().collect();
        let sql = format!(
            "SELECT {} FROM permissions WHERE id = ANY($1) ORDER BY id",
            PERMISSION_COLUMNS
        );
        let rows = sqlx::query_as::<_, PermissionRow>(&sql)
            .bind(&ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Permission::from).collect())
    }

    async fn insert(&self, permission: Permission) -> Result<Permission, StoreError> {
        let sql = format!(
            r#"
            INSERT INTO permissions ({})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            PERMISSION_COLUMNS, PERMISSION_COLUMNS
        );
        let row = sqlx::query_as::<_, PermissionRow>(&sql)
            .bind(permission.id)
            .bind(&permission.name)
            .bind(&permission.description)
            .bind(permission.audit.version)
            .bind(&permission.audit.created_by)
            .bind(permission.audit.created_date)
            .bind(&permission.audit.modified_by)
            .bind(permission.audit.modified_date)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    duplicate_permission(&permission.name)
                } else {
                    StoreError::Database(e)
                }
            })?;
        Ok(row.into())
    }

    async fn update(
        &self,
        permission: Permission,
        expected_version: i64,
    ) -> Result<Option<Permission>, StoreError> {
        let sql = format!(
            r#"
            UPDATE permissions
            SET name = $3, description = $4, version = $5, modified_by = $6, modified_date = $7
            WHERE id = $1 AND version = $2
            RETURNING {}
            "#,
            PERMISSION_COLUMNS
        );
        let row = sqlx::query_as::<_, PermissionRow>(&sql)
            .bind(permission.id)
            .bind(expected_version)
            .bind(&permission.name)
            .bind(&permission.description)
            .bind(permission.audit.version)
            .bind(&permission.audit.modified_by)
            .bind(permission.audit.modified_date)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    duplicate_permission(&permission.name)
                } else {
                    StoreError::Database(e)
                }
            })?;
        Ok(row.map(Permission::from))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM permissions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl UserRepository for PgStore {
    async fn find_page(&self, page: &PageRequest) -> Result<Vec<User>, StoreError> {
        let sql = format!("SELECT {} FROM users {}", USER_COLUMNS, order_by(page));
        let rows = sqlx::query_as::<_, UserRow>(&sql)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(User::from))
    }

    async fn insert(&self, user: User) -> Result<User, StoreError> {
        let permissions: Vec<Uuid> = user.permissions.iter().copied().collect();
        let sql = format!(
            r#"
            INSERT INTO users ({})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {}
            "#,
            USER_COLUMNS, USER_COLUMNS
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(user.id)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&permissions)
            .bind(user.audit.version)
            .bind(&user.audit.created_by)
            .bind(user.audit.created_date)
            .bind(&user.audit.modified_by)
            .bind(user.audit.modified_date)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    duplicate_user(&user.email)
                } else {
                    StoreError::Database(e)
                }
            })?;
        Ok(row.into())
    }

    async fn update(&self, user: User, expected_version: i64) -> Result<Option<User>, StoreError> {
        let permissions: Vec<Uuid> = user.permissions.iter().copied().collect();
        let sql = format!(
            r#"
            UPDATE users
            SET name = $3, email = $4, permissions = $5, version = $6, modified_by = $7, modified_date = $8
            WHERE id = $1 AND version = $2
            RETURNING {}
            "#,
            USER_COLUMNS
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(user.id)
            .bind(expected_version)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&permissions)
            .bind(user.audit.version)
            .bind(&user.audit.modified_by)
            .bind(user.audit.modified_date)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    duplicate_user(&user.email)
                } else {
                    StoreError::Database(e)
                }
            })?;
        Ok(row.map(User::from))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> Result<u64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count.max(0) as u64)
    }
}
