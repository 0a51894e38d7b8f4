//! High-level database service layer.
//!
//! Repository-agnostic user operations. Input validation lives here so every
//! backend rejects the same requests with the same messages.
//!
//! # Usage
//!
//! ```no_run
//! use user_registry::api::NewUser;
//! use user_registry::db::{services, repositories::LocalRepository};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let repo = LocalRepository::new();
//!     services::create_user(&repo, NewUser::new("Ada", "ada@example.com")).await?;
//!
//!     let users = services::list_users(&repo).await?;
//!     println!("Found {} users", users.len());
//!     Ok(())
//! }
//! ```

use log::{debug, info, warn};

use super::repository::{RepositoryError, RepositoryResult, UserRepository};
use crate::api::{NewUser, User, UserChanges, UserId};

/// Message returned when a required field is absent or blank.
pub const REQUIRED_FIELDS_MESSAGE: &str = "Name and email are required";

fn blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Validate and normalize a creation request.
///
/// `name` and `email` must be non-blank; surrounding whitespace is trimmed.
pub fn validate_new_user(user: NewUser) -> RepositoryResult<NewUser> {
    if blank(&user.name) || blank(&user.email) {
        return Err(RepositoryError::validation(REQUIRED_FIELDS_MESSAGE)
            .with_operation("create_user"));
    }

    Ok(NewUser {
        name: user.name.trim().to_string(),
        email: user.email.trim().to_string(),
        age: user.age,
    })
}

/// Validate and normalize an update request.
///
/// Supplied `name`/`email` values must be non-blank.
pub fn validate_changes(changes: UserChanges) -> RepositoryResult<UserChanges> {
    let supplied_blank = |field: &Option<String>| field.as_deref().map(blank).unwrap_or(false);

    if supplied_blank(&changes.name) || supplied_blank(&changes.email) {
        return Err(RepositoryError::validation("Name and email cannot be empty")
            .with_operation("update_user"));
    }

    Ok(UserChanges {
        name: changes.name.map(|n| n.trim().to_string()),
        email: changes.email.map(|e| e.trim().to_string()),
        age: changes.age,
    })
}

// ==================== Health ====================

/// Check if the datastore is reachable.
pub async fn health_check<R: UserRepository + ?Sized>(repo: &R) -> RepositoryResult<bool> {
    repo.health_check().await
}

// ==================== User Operations ====================

/// List all users, newest first.
pub async fn list_users<R: UserRepository + ?Sized>(repo: &R) -> RepositoryResult<Vec<User>> {
    let users = repo.list_users().await?;
    debug!("Listed {} users", users.len());
    Ok(users)
}

/// Fetch a single user by id.
pub async fn get_user<R: UserRepository + ?Sized>(repo: &R, id: UserId) -> RepositoryResult<User> {
    repo.get_user(id).await
}

/// Validate and store a new user.
///
/// # Returns
/// * `ErrorKind::Validation` - If `name` or `email` is blank; nothing is stored
/// * `ErrorKind::Conflict` - If the email is already taken
pub async fn create_user<R: UserRepository + ?Sized>(
    repo: &R,
    user: NewUser,
) -> RepositoryResult<User> {
    let user = validate_new_user(user)?;
    let created = repo.create_user(&user).await?;
    info!("Created user {}", created.id);
    Ok(created)
}

/// Validate and apply a partial update.
pub async fn update_user<R: UserRepository + ?Sized>(
    repo: &R,
    id: UserId,
    changes: UserChanges,
) -> RepositoryResult<User> {
    let changes = validate_changes(changes)?;
    if changes.is_empty() {
        warn!("Update for user {} carries no changes", id);
    }
    let updated = repo.update_user(id, &changes).await?;
    info!("Updated user {}", id);
    Ok(updated)
}

/// Delete a user.
pub async fn delete_user<R: UserRepository + ?Sized>(repo: &R, id: UserId) -> RepositoryResult<()> {
    repo.delete_user(id).await?;
    info!("Deleted user {}", id);
    Ok(())
}
