//! Backend selection.
//!
//! The server asks [`RepositoryFactory`] for an `Arc<dyn UserRepository>`
//! and never names a concrete backend. The choice comes from, in order of
//! precedence: a `repository.toml` file, `REPOSITORY_TYPE`, or the presence
//! of a database URL.

use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use super::repo_config::RepositoryConfig;
use super::repositories::LocalRepository;
#[cfg(feature = "postgres-repo")]
use super::repositories::PostgresRepository;
use super::repository::{RepositoryError, RepositoryResult, UserRepository};
use super::PostgresConfig;

/// Which storage backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryType {
    /// Postgres through Diesel (`postgres-repo` feature)
    Postgres,
    /// In-memory, lost on exit
    Local,
}

impl FromStr for RepositoryType {
    type Err = String;

    /// Accepts `postgres`, `pg` or `local`, in any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "pg" => Ok(Self::Postgres),
            "local" => Ok(Self::Local),
            other => Err(format!("Unknown repository type: {}", other)),
        }
    }
}

impl RepositoryType {
    /// `REPOSITORY_TYPE` when set (unknown values fall back to Local),
    /// otherwise Postgres if `DATABASE_URL` or `PG_DATABASE_URL` is set.
    pub fn from_env() -> Self {
        match std::env::var("REPOSITORY_TYPE") {
            Ok(raw) => raw.parse().unwrap_or_else(|e| {
                log::warn!("{}; using the local repository", e);
                Self::Local
            }),
            Err(_) if has_database_url() => Self::Postgres,
            Err(_) => Self::Local,
        }
    }
}

fn has_database_url() -> bool {
    ["DATABASE_URL", "PG_DATABASE_URL"]
        .iter()
        .any(|key| std::env::var_os(key).is_some())
}

/// Builds the repository the server runs against.
///
/// ```
/// use user_registry::db::{RepositoryFactory, RepositoryType};
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let repo = RepositoryFactory::create(RepositoryType::Local, None).await.unwrap();
/// assert!(repo.health_check().await.unwrap());
/// # });
/// ```
pub struct RepositoryFactory;

impl RepositoryFactory {
    /// `postgres` is required for [`RepositoryType::Postgres`] and ignored
    /// otherwise.
    pub async fn create(
        repo_type: RepositoryType,
        postgres: Option<&PostgresConfig>,
    ) -> RepositoryResult<Arc<dyn UserRepository>> {
        match repo_type {
            RepositoryType::Local => Ok(Self::create_local()),
            RepositoryType::Postgres => Self::open_postgres(postgres).await,
        }
    }

    pub fn create_local() -> Arc<dyn UserRepository> {
        log::info!("Using in-memory user repository");
        Arc::new(LocalRepository::new())
    }

    #[cfg(feature = "postgres-repo")]
    async fn open_postgres(
        config: Option<&PostgresConfig>,
    ) -> RepositoryResult<Arc<dyn UserRepository>> {
        let config = config.cloned().ok_or_else(|| {
            RepositoryError::configuration("Postgres repository requires PostgresConfig")
        })?;

        let repo = tokio::task::spawn_blocking(move || PostgresRepository::new(config))
            .await
            .map_err(|e| RepositoryError::internal(format!("Pool setup task failed: {}", e)))??;
        Ok(Arc::new(repo))
    }

    #[cfg(not(feature = "postgres-repo"))]
    async fn open_postgres(
        _config: Option<&PostgresConfig>,
    ) -> RepositoryResult<Arc<dyn UserRepository>> {
        Err(RepositoryError::configuration(
            "Postgres repository feature not enabled",
        ))
    }

    /// Select and open a backend from environment variables.
    pub async fn from_env() -> RepositoryResult<Arc<dyn UserRepository>> {
        let repo_type = RepositoryType::from_env();
        let postgres = match repo_type {
            RepositoryType::Postgres => Some(postgres_config_from_env()?),
            RepositoryType::Local => None,
        };
        Self::create(repo_type, postgres.as_ref()).await
    }

    /// Select and open a backend from a `repository.toml` file.
    pub async fn from_config_file<P: AsRef<Path>>(
        path: P,
    ) -> RepositoryResult<Arc<dyn UserRepository>> {
        let config = RepositoryConfig::from_file(path)?;
        let repo_type = config
            .repository_type()
            .map_err(RepositoryError::configuration)?;
        Self::create(repo_type, config.to_postgres_config()?.as_ref()).await
    }
}

#[cfg(feature = "postgres-repo")]
fn postgres_config_from_env() -> RepositoryResult<PostgresConfig> {
    PostgresConfig::from_env().map_err(RepositoryError::configuration)
}

#[cfg(not(feature = "postgres-repo"))]
fn postgres_config_from_env() -> RepositoryResult<PostgresConfig> {
    Err(RepositoryError::configuration(
        "Postgres repository feature not enabled",
    ))
}
