//! In-memory local repository implementation.
//!
//! Suitable for unit testing and local development. Users live in a
//! `HashMap` behind a single lock, so the email uniqueness check and the
//! write that follows it happen atomically, just as a unique index would
//! guarantee in a real datastore.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use crate::api::{NewUser, User, UserChanges, UserId};
use crate::db::repository::{RepositoryError, RepositoryResult, UserRepository};

/// In-memory local repository.
///
/// # Example
/// ```
/// use user_registry::api::NewUser;
/// use user_registry::db::repositories::LocalRepository;
/// use user_registry::db::UserRepository;
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let repo = LocalRepository::new();
/// repo.create_user(&NewUser::new("Ada", "ada@example.com")).await.unwrap();
///
/// let users = repo.list_users().await.unwrap();
/// assert_eq!(users.len(), 1);
/// # });
/// ```
#[derive(Clone)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
}

struct LocalData {
    users: HashMap<UserId, User>,
    next_user_id: i64,
    is_healthy: bool,
}

impl Default for LocalData {
    fn default() -> Self {
        Self {
            users: HashMap::new(),
            next_user_id: 1,
            is_healthy: true,
        }
    }
}

impl LocalData {
    fn email_taken(&self, email: &str, except: Option<UserId>) -> bool {
        self.users
            .values()
            .any(|u| u.email == email && Some(u.id) != except)
    }
}

impl LocalRepository {
    /// Create a new empty local repository.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(LocalData::default())),
        }
    }

    /// Set the health status for testing connection failures.
    pub fn set_healthy(&self, healthy: bool) {
        self.data.write().is_healthy = healthy;
    }

    /// Clear all data from the repository. Ids restart at 1.
    pub fn clear(&self) {
        let mut data = self.data.write();
        *data = LocalData {
            is_healthy: data.is_healthy,
            ..Default::default()
        };
    }

    /// Get the number of users stored.
    pub fn user_count(&self) -> usize {
        self.data.read().users.len()
    }

    /// Check if a user exists.
    pub fn has_user(&self, id: UserId) -> bool {
        self.data.read().users.contains_key(&id)
    }

    fn check_health(&self) -> RepositoryResult<()> {
        if !self.data.read().is_healthy {
            return Err(RepositoryError::connection("Database is not healthy"));
        }
        Ok(())
    }
}

impl Default for LocalRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(self.data.read().is_healthy)
    }

    async fn list_users(&self) -> RepositoryResult<Vec<User>> {
        self.check_health()?;
        let data = self.data.read();

        let mut users: Vec<User> = data.users.values().cloned().collect();
        users.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(users)
    }

    async fn get_user(&self, id: UserId) -> RepositoryResult<User> {
        self.check_health()?;
        self.data
            .read()
            .users
            .get(&id)
            .cloned()
            .ok_or_else(|| RepositoryError::user_not_found("get_user", id))
    }

    async fn create_user(&self, user: &NewUser) -> RepositoryResult<User> {
        self.check_health()?;
        let mut data = self.data.write();

        if data.email_taken(&user.email, None) {
            return Err(RepositoryError::email_taken("create_user", &user.email));
        }

        let id = UserId(data.next_user_id);
        data.next_user_id += 1;

        let stored = User {
            id,
            name: user.name.clone(),
            email: user.email.clone(),
            age: user.age,
            created_at: Utc::now(),
        };
        data.users.insert(id, stored.clone());

        Ok(stored)
    }

    async fn update_user(&self, id: UserId, changes: &UserChanges) -> RepositoryResult<User> {
        self.check_health()?;
        let mut data = self.data.write();

        if !data.users.contains_key(&id) {
            return Err(RepositoryError::user_not_found("update_user", id));
        }
        if let Some(ref email) = changes.email {
            if data.email_taken(email, Some(id)) {
                return Err(RepositoryError::email_taken("update_user", email));
            }
        }

        let user = data
            .users
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::user_not_found("update_user", id))?;
        changes.apply_to(user);

        Ok(user.clone())
    }

    async fn delete_user(&self, id: UserId) -> RepositoryResult<()> {
        self.check_health()?;
        self.data
            .write()
            .users
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| RepositoryError::user_not_found("delete_user", id))
    }
}
