//! Postgres user storage through Diesel.
//!
//! An r2d2 pool is opened once at startup, the embedded migrations create
//! the `users` table, and every repository call checks out one connection
//! on the blocking thread pool and runs one statement. A failure is
//! returned to the caller as-is; nothing is retried.
//!
//! ## Configuration
//!
//! Environment variables:
//! - `DATABASE_URL` or `PG_DATABASE_URL`: Connection string (required)
//! - `PG_POOL_MAX`: Maximum pool size (default: 10)
//! - `PG_POOL_MIN`: Idle connections kept open (default: 1)
//! - `PG_CONN_TIMEOUT_SEC`: Checkout timeout in seconds (default: 30)
//! - `PG_IDLE_TIMEOUT_SEC`: Idle connection lifetime in seconds (default: 600)

use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sql_query;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::time::Duration;
use tokio::task;

use crate::api::{NewUser, User, UserChanges, UserId};
use crate::db::repository::{RepositoryError, RepositoryResult, UserRepository};

mod models;
mod schema;

use models::{NewUserRow, UserChangeset, UserRow};
use schema::users;

type PgPool = Pool<ConnectionManager<PgConnection>>;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("src/db/repositories/postgres/migrations");

/// Connection and pool settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostgresConfig {
    pub database_url: String,
    pub max_pool_size: u32,
    pub min_pool_size: u32,
    pub connection_timeout_sec: u64,
    pub idle_timeout_sec: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            max_pool_size: 10,
            min_pool_size: 1,
            connection_timeout_sec: 30,
            idle_timeout_sec: 600,
        }
    }
}

/// Parsed value of `key`, or `fallback` when unset or malformed.
fn env_parse<T: std::str::FromStr>(key: &str, fallback: T) -> T {
    match std::env::var(key).map(|raw| raw.parse::<T>()) {
        Ok(Ok(value)) => value,
        Ok(Err(_)) => {
            log::warn!("Ignoring unparsable {}", key);
            fallback
        }
        Err(_) => fallback,
    }
}

impl PostgresConfig {
    /// Read the settings listed in the module docs. Only the connection
    /// string is required.
    pub fn from_env() -> Result<Self, String> {
        let database_url = ["DATABASE_URL", "PG_DATABASE_URL"]
            .iter()
            .find_map(|key| std::env::var(key).ok())
            .ok_or_else(|| "DATABASE_URL or PG_DATABASE_URL must be set".to_string())?;

        let base = Self::with_url(database_url);
        Ok(Self {
            max_pool_size: env_parse("PG_POOL_MAX", base.max_pool_size),
            min_pool_size: env_parse("PG_POOL_MIN", base.min_pool_size),
            connection_timeout_sec: env_parse("PG_CONN_TIMEOUT_SEC", base.connection_timeout_sec),
            idle_timeout_sec: env_parse("PG_IDLE_TIMEOUT_SEC", base.idle_timeout_sec),
            ..base
        })
    }

    pub fn with_url(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            ..Default::default()
        }
    }
}

/// Diesel-backed user repository.
///
/// The pool is opened in [`PostgresRepository::new`] and closed when the
/// last clone is dropped.
#[derive(Clone, Debug)]
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Open the pool and apply pending migrations. Blocks on network I/O.
    pub fn new(config: PostgresConfig) -> RepositoryResult<Self> {
        let pool = Pool::builder()
            .max_size(config.max_pool_size)
            .min_idle(Some(config.min_pool_size))
            .connection_timeout(Duration::from_secs(config.connection_timeout_sec))
            .idle_timeout(Some(Duration::from_secs(config.idle_timeout_sec)))
            .test_on_check_out(true)
            .build(ConnectionManager::<PgConnection>::new(&config.database_url))
            .map_err(|e| {
                RepositoryError::connection(e.to_string()).with_operation("open_pool")
            })?;

        let mut conn = pool.get().map_err(|e| {
            RepositoryError::connection(e.to_string()).with_operation("migrate")
        })?;
        conn.run_pending_migrations(MIGRATIONS).map_err(|e| {
            RepositoryError::internal(format!("Migration failed: {}", e)).with_operation("migrate")
        })?;
        drop(conn);

        log::info!(
            "Postgres pool ready ({}..{} connections)",
            config.min_pool_size,
            config.max_pool_size
        );
        Ok(Self { pool })
    }

    /// Run `query` once on a pooled connection, off the async runtime.
    async fn run<T, F>(&self, operation: &'static str, query: F) -> RepositoryResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> RepositoryResult<T> + Send + 'static,
    {
        let pool = self.pool.clone();
        task::spawn_blocking(move || {
            let mut conn = pool.get().map_err(|e| {
                RepositoryError::connection(e.to_string()).with_operation(operation)
            })?;
            query(&mut conn)
        })
        .await
        .map_err(|e| {
            RepositoryError::internal(format!("Query task failed: {}", e)).with_operation(operation)
        })?
    }
}

/// Convert a Diesel error, tagging it with the operation and user.
fn db_error(
    operation: &'static str,
    id: Option<UserId>,
) -> impl Fn(diesel::result::Error) -> RepositoryError {
    move |err| {
        let error = RepositoryError::from(err).with_operation(operation);
        match id {
            Some(id) => error.with_user(id),
            None => error,
        }
    }
}

#[async_trait]
impl UserRepository for PostgresRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        self.run("health_check", |conn| {
            sql_query("SELECT 1")
                .execute(conn)
                .map(|_| true)
                .map_err(db_error("health_check", None))
        })
        .await
    }

    async fn list_users(&self) -> RepositoryResult<Vec<User>> {
        self.run("list_users", |conn| {
            users::table
                .select(UserRow::as_select())
                .order((users::created_at.desc(), users::id.desc()))
                .load::<UserRow>(conn)
                .map(|rows| rows.into_iter().map(User::from).collect())
                .map_err(db_error("list_users", None))
        })
        .await
    }

    async fn get_user(&self, id: UserId) -> RepositoryResult<User> {
        self.run("get_user", move |conn| {
            users::table
                .find(id.value())
                .select(UserRow::as_select())
                .first::<UserRow>(conn)
                .optional()
                .map_err(db_error("get_user", Some(id)))?
                .map(User::from)
                .ok_or_else(|| RepositoryError::user_not_found("get_user", id))
        })
        .await
    }

    async fn create_user(&self, user: &NewUser) -> RepositoryResult<User> {
        let row = NewUserRow::from(user);
        self.run("create_user", move |conn| {
            diesel::insert_into(users::table)
                .values(&row)
                .returning(UserRow::as_returning())
                .get_result::<UserRow>(conn)
                .map(User::from)
                .map_err(db_error("create_user", None))
        })
        .await
    }

    async fn update_user(&self, id: UserId, changes: &UserChanges) -> RepositoryResult<User> {
        // An empty SET clause is a Diesel error.
        if changes.is_empty() {
            return self.get_user(id).await;
        }

        let changeset = UserChangeset::from(changes);
        self.run("update_user", move |conn| {
            diesel::update(users::table.find(id.value()))
                .set(&changeset)
                .returning(UserRow::as_returning())
                .get_result::<UserRow>(conn)
                .optional()
                .map_err(db_error("update_user", Some(id)))?
                .map(User::from)
                .ok_or_else(|| RepositoryError::user_not_found("update_user", id))
        })
        .await
    }

    async fn delete_user(&self, id: UserId) -> RepositoryResult<()> {
        self.run("delete_user", move |conn| {
            match diesel::delete(users::table.find(id.value()))
                .execute(conn)
                .map_err(db_error("delete_user", Some(id)))?
            {
                0 => Err(RepositoryError::user_not_found("delete_user", id)),
                _ => Ok(()),
            }
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diesel::result::{DatabaseErrorKind, Error};

    #[test]
    fn test_with_url_keeps_pool_defaults() {
        let config = PostgresConfig::with_url("postgres://localhost/users");
        assert_eq!(config.database_url, "postgres://localhost/users");
        assert_eq!(config.max_pool_size, 10);
        assert_eq!(config.min_pool_size, 1);
        assert_eq!(config.connection_timeout_sec, 30);
    }

    #[test]
    fn test_unique_violation_is_email_conflict() {
        let err = Error::DatabaseError(
            DatabaseErrorKind::UniqueViolation,
            Box::new("duplicate key value violates unique constraint".to_string()),
        );
        let mapped = db_error("create_user", None)(err);
        assert!(mapped.is_conflict());
        assert_eq!(mapped.message(), "Email already exists");
        assert_eq!(mapped.context().operation.as_deref(), Some("create_user"));
    }

    #[test]
    fn test_missing_row_names_the_user() {
        let mapped = db_error("get_user", Some(UserId::new(3)))(Error::NotFound);
        assert!(mapped.is_not_found());
        assert_eq!(mapped.context().user_id, Some(UserId::new(3)));
    }

    #[test]
    fn test_other_database_errors_are_query_errors() {
        let err = Error::DatabaseError(
            DatabaseErrorKind::ForeignKeyViolation,
            Box::new("violates foreign key".to_string()),
        );
        let mapped = db_error("delete_user", Some(UserId::new(1)))(err);
        assert_eq!(mapped.kind(), crate::db::repository::ErrorKind::Query);
    }
}
