//! Postgres-backed user and role store.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError | Scenario |
//! |------------|----------------------|------------|----------|
//! | Database (unique violation) | `23505` | `Conflict` | Role name or username already taken |
//! | Database (other) | Any other | `Backend` | Check/foreign-key violations, etc. |
//! | Other | N/A | `Backend` | Pool closed, network errors, decode failures |
//!
//! ## Uniqueness
//!
//! `roles.name` and `users.username` carry `UNIQUE` constraints. A concurrent
//! insert of the same name fails with 23505 here and the caller re-reads the
//! winning row, so no in-process locking is needed.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

use rolegate_auth::{Role, RoleName, User};
use rolegate_core::{RoleId, UserId};

use super::{RoleStore, StoreError, UserStore};

const SCHEMA: &str = include_str!("../../migrations/0001_users_roles.sql");

/// Postgres store implementing both `RoleStore` and `UserStore`.
///
/// `PgPool` is internally reference counted, so cloning the store is cheap
/// and every clone shares the same connections.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPool::connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Create the tables if they do not exist yet.
    #[instrument(skip(self), err)]
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::raw_sql(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("migrate", e))?;
        Ok(())
    }

    async fn roles_of(&self, user_id: Uuid) -> Result<Vec<Role>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT r.id, r.name
            FROM user_roles ur
            JOIN roles r ON r.id = ur.role_id
            WHERE ur.user_id = $1
            ORDER BY ur.granted_at ASC, r.id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("load_user_roles", e))?;

        rows.iter().map(role_from_row).collect()
    }

    async fn hydrate(&self, row: Option<PgRow>) -> Result<Option<User>, StoreError> {
        let Some(row) = row else {
            return Ok(None);
        };

        let id: Uuid = row.try_get("id").map_err(|e| map_sqlx_error("decode_user", e))?;
        let username: String = row
            .try_get("username")
            .map_err(|e| map_sqlx_error("decode_user", e))?;
        let password_hash: String = row
            .try_get("password_hash")
            .map_err(|e| map_sqlx_error("decode_user", e))?;
        let roles = self.roles_of(id).await?;

        Ok(Some(User {
            id: UserId::from_uuid(id),
            username,
            password_hash,
            roles,
        }))
    }
}

#[async_trait]
impl RoleStore for PostgresStore {
    #[instrument(skip(self), fields(role = %name), err)]
    async fn find_by_name(&self, name: &RoleName) -> Result<Option<Role>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, name
            FROM roles
            WHERE name = $1
            ORDER BY created_at ASC, id ASC
            LIMIT 1
            "#,
        )
        .bind(name.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_role_by_name", e))?;

        row.as_ref().map(role_from_row).transpose()
    }

    #[instrument(skip(self, role), fields(role = %role.name, role_id = %role.id), err)]
    async fn insert(&self, role: &Role) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO roles (id, name) VALUES ($1, $2)")
            .bind(role.id.as_uuid())
            .bind(role.name.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("insert_role", e))?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Role>, StoreError> {
        let rows = sqlx::query("SELECT id, name FROM roles ORDER BY created_at ASC, id ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_roles", e))?;

        rows.iter().map(role_from_row).collect()
    }
}

#[async_trait]
impl UserStore for PostgresStore {
    #[instrument(skip(self, user), fields(user_id = %user.id, username = %user.username), err)]
    async fn insert(&self, user: &User) -> Result<(), StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        sqlx::query("INSERT INTO users (id, username, password_hash) VALUES ($1, $2, $3)")
            .bind(user.id.as_uuid())
            .bind(&user.username)
            .bind(&user.password_hash)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("insert_user", e))?;

        for role in &user.roles {
            sqlx::query("INSERT INTO user_roles (user_id, role_id) VALUES ($1, $2)")
                .bind(user.id.as_uuid())
                .bind(role.id.as_uuid())
                .execute(&mut *tx)
                .await
                .map_err(|e| map_sqlx_error("insert_user_role", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;
        Ok(())
    }

    #[instrument(skip(self), err)]
    async fn get(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let row = sqlx::query("SELECT id, username, password_hash FROM users WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_user", e))?;

        self.hydrate(row).await
    }

    #[instrument(skip(self), err)]
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query("SELECT id, username, password_hash FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_user_by_username", e))?;

        self.hydrate(row).await
    }

    #[instrument(skip(self, role), fields(role = %role.name), err)]
    async fn add_role(&self, user_id: UserId, role: &Role) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO user_roles (user_id, role_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, role_id) DO NOTHING
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(role.id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("add_user_role", e))?;
        Ok(())
    }
}

fn role_from_row(row: &PgRow) -> Result<Role, StoreError> {
    let id: Uuid = row.try_get("id").map_err(|e| map_sqlx_error("decode_role", e))?;
    let name: String = row.try_get("name").map_err(|e| map_sqlx_error("decode_role", e))?;
    let name = RoleName::parse(name)
        .map_err(|e| StoreError::Backend(format!("stored role {id} is invalid: {e}")))?;

    Ok(Role {
        id: RoleId::from_uuid(id),
        name,
    })
}

/// Map SQLx errors to store errors.
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code() {
                Some(code) if code.as_ref() == "23505" => StoreError::Conflict(msg),
                _ => StoreError::Backend(msg),
            }
        }
        sqlx::Error::PoolClosed => {
            StoreError::Backend(format!("connection pool closed in {}", operation))
        }
        _ => StoreError::Backend(format!("sqlx error in {}: {}", operation, err)),
    }
}
