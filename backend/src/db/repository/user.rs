//! Core user repository trait.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::api::{NewUser, User, UserChanges, UserId};

/// Repository trait for user CRUD operations.
///
/// Each method is a single atomic request against the datastore. Uniqueness
/// of `email` is enforced by the implementation and reported as
/// [`ErrorKind::Conflict`](super::ErrorKind::Conflict).
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Check if the datastore is reachable.
    ///
    /// # Returns
    /// - `Ok(true)` if connection is healthy
    /// - `Ok(false)` if connection is unhealthy but no error occurred
    /// - `Err(RepositoryError)` if an error occurred during the check
    async fn health_check(&self) -> RepositoryResult<bool>;

    /// List every user, newest first (`created_at` descending, then `id`
    /// descending).
    async fn list_users(&self) -> RepositoryResult<Vec<User>>;

    /// Fetch a single user.
    ///
    /// # Returns
    /// * `ErrorKind::NotFound` - If no user has this id
    async fn get_user(&self, id: UserId) -> RepositoryResult<User>;

    /// Persist a new user, assigning `id` and `created_at`.
    ///
    /// # Returns
    /// * `Ok(User)` - The stored record
    /// * `ErrorKind::Conflict` - If the email is already taken
    async fn create_user(&self, user: &NewUser) -> RepositoryResult<User>;

    /// Apply `changes` to an existing user and return the updated record.
    ///
    /// # Returns
    /// * `ErrorKind::NotFound` - If no user has this id
    /// * `ErrorKind::Conflict` - If the new email belongs to another user
    async fn update_user(&self, id: UserId, changes: &UserChanges) -> RepositoryResult<User>;

    /// Remove a user.
    ///
    /// # Returns
    /// * `ErrorKind::NotFound` - If no user has this id
    async fn delete_user(&self, id: UserId) -> RepositoryResult<()>;
}
