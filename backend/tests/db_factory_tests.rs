//! Tests for db::factory - repository selection and construction.

mod support;

use std::io::Write;
use std::str::FromStr;

use user_registry::db::factory::{RepositoryFactory, RepositoryType};
use user_registry::db::{ErrorKind, RepositoryConfig, UserRepository};

#[test]
fn test_repository_type_from_str() {
    assert_eq!(RepositoryType::from_str("POSTGRES").unwrap(), RepositoryType::Postgres);
    assert_eq!(RepositoryType::from_str("pg").unwrap(), RepositoryType::Postgres);
    assert_eq!(RepositoryType::from_str("Local").unwrap(), RepositoryType::Local);

    let err = RepositoryType::from_str("mongo").unwrap_err();
    assert!(err.contains("Unknown repository type"));
}

#[test]
fn test_repository_type_from_env_default() {
    support::with_scoped_env(
        &[
            ("REPOSITORY_TYPE", None),
            ("DATABASE_URL", None),
            ("PG_DATABASE_URL", None),
        ],
        || assert_eq!(RepositoryType::from_env(), RepositoryType::Local),
    );
}

#[test]
fn test_repository_type_from_env_with_database_url() {
    support::with_scoped_env(
        &[
            ("REPOSITORY_TYPE", None),
            ("DATABASE_URL", Some("postgres://localhost/users")),
        ],
        || assert_eq!(RepositoryType::from_env(), RepositoryType::Postgres),
    );
}

#[test]
fn test_repository_type_from_env_with_pg_database_url() {
    support::with_scoped_env(
        &[
            ("REPOSITORY_TYPE", None),
            ("DATABASE_URL", None),
            ("PG_DATABASE_URL", Some("postgres://localhost/users")),
        ],
        || assert_eq!(RepositoryType::from_env(), RepositoryType::Postgres),
    );
}

#[test]
fn test_explicit_type_wins_over_database_url() {
    support::with_scoped_env(
        &[
            ("REPOSITORY_TYPE", Some("local")),
            ("DATABASE_URL", Some("postgres://localhost/users")),
        ],
        || assert_eq!(RepositoryType::from_env(), RepositoryType::Local),
    );
}

#[test]
fn test_invalid_type_defaults_to_local() {
    support::with_scoped_env(&[("REPOSITORY_TYPE", Some("invalid"))], || {
        assert_eq!(RepositoryType::from_env(), RepositoryType::Local)
    });
}

#[tokio::test]
async fn test_create_local_via_factory() {
    let repo = RepositoryFactory::create(RepositoryType::Local, None)
        .await
        .unwrap();
    assert!(repo.health_check().await.unwrap());
    assert!(repo.list_users().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_factory_from_env_local() {
    let selected = support::with_scoped_env(
        &[
            ("REPOSITORY_TYPE", Some("local")),
            ("DATABASE_URL", None),
            ("PG_DATABASE_URL", None),
        ],
        RepositoryType::from_env,
    );
    assert_eq!(selected, RepositoryType::Local);

    let repo = RepositoryFactory::create(selected, None).await.unwrap();
    assert!(repo.health_check().await.unwrap());
}

#[cfg(not(feature = "postgres-repo"))]
#[tokio::test]
async fn test_create_postgres_without_feature_fails() {
    match RepositoryFactory::create(RepositoryType::Postgres, None).await {
        Err(err) => assert!(err.to_string().contains("feature not enabled")),
        Ok(_) => panic!("postgres backend should be unavailable"),
    }
}

#[cfg(feature = "postgres-repo")]
#[tokio::test]
async fn test_create_postgres_without_config_fails() {
    match RepositoryFactory::create(RepositoryType::Postgres, None).await {
        Err(err) => assert!(err.to_string().contains("requires PostgresConfig")),
        Ok(_) => panic!("postgres backend needs a config"),
    }
}

#[tokio::test]
async fn test_from_config_file_local() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[repository]\ntype = \"local\"").unwrap();

    let config = RepositoryConfig::from_file(file.path()).unwrap();
    assert_eq!(config.repository_type().unwrap(), RepositoryType::Local);

    let repo = RepositoryFactory::from_config_file(file.path()).await.unwrap();
    assert!(repo.health_check().await.unwrap());
}

#[tokio::test]
async fn test_from_missing_config_file_fails() {
    let result = RepositoryFactory::from_config_file("/nonexistent/repository.toml").await;
    match result {
        Err(e) => assert_eq!(e.kind(), ErrorKind::Configuration),
        Ok(_) => panic!("missing file should not open a repository"),
    }
}

#[test]
fn test_config_path_from_env() {
    support::with_scoped_env(&[("REPOSITORY_CONFIG", Some("/etc/users/repository.toml"))], || {
        let path = RepositoryConfig::path_from_env().unwrap();
        assert_eq!(path.to_str(), Some("/etc/users/repository.toml"));
    });
    support::with_scoped_env(&[("REPOSITORY_CONFIG", None)], || {
        assert!(RepositoryConfig::path_from_env().is_none());
    });
}
