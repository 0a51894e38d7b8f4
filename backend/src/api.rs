//! Domain types shared by the HTTP layer and the repositories.
//!
//! `User` is the single record type stored by the registry. `NewUser` and
//! `UserChanges` are the validated inputs handed to a repository for
//! creation and partial update.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::num::ParseIntError;
use std::str::FromStr;

/// User identifier (surrogate key assigned by the datastore).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl UserId {
    pub fn new(value: i64) -> Self {
        UserId(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<UserId> for i64 {
    fn from(id: UserId) -> Self {
        id.0
    }
}

impl FromStr for UserId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<i64>().map(UserId)
    }
}

/// A stored user record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub age: Option<i32>,
    pub created_at: DateTime<Utc>,
}

/// Fields required to create a user. `id` and `created_at` are assigned by
/// the repository.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub age: Option<i32>,
}

impl NewUser {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            age: None,
        }
    }

    pub fn with_age(mut self, age: i32) -> Self {
        self.age = Some(age);
        self
    }
}

/// Partial update for an existing user.
///
/// `None` leaves the field untouched. For `age`, `Some(None)` clears the
/// stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub age: Option<Option<i32>>,
}

impl UserChanges {
    /// True when no field would change.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.age.is_none()
    }

    /// Apply the supplied fields to `user` in place.
    pub fn apply_to(&self, user: &mut User) {
        if let Some(ref name) = self.name {
            user.name = name.clone();
        }
        if let Some(ref email) = self.email {
            user.email = email.clone();
        }
        if let Some(age) = self.age {
            user.age = age;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: UserId(7),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            age: Some(36),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_user_id_from_str() {
        assert_eq!("42".parse::<UserId>().unwrap(), UserId(42));
        assert_eq!(" 5 ".parse::<UserId>().unwrap(), UserId(5));
        assert!("abc".parse::<UserId>().is_err());
        assert!("1.5".parse::<UserId>().is_err());
    }

    #[test]
    fn test_user_serializes_camel_case() {
        let value = serde_json::to_value(sample_user()).unwrap();
        assert_eq!(value["id"], 7);
        assert_eq!(value["email"], "ada@example.com");
        assert!(value.get("createdAt").is_some());
        assert!(value.get("created_at").is_none());
    }

    #[test]
    fn test_changes_apply_only_supplied_fields() {
        let mut user = sample_user();
        let changes = UserChanges {
            age: Some(Some(40)),
            ..Default::default()
        };
        changes.apply_to(&mut user);

        assert_eq!(user.age, Some(40));
        assert_eq!(user.name, "Ada");
        assert_eq!(user.email, "ada@example.com");
    }

    #[test]
    fn test_changes_can_clear_age() {
        let mut user = sample_user();
        UserChanges {
            age: Some(None),
            ..Default::default()
        }
        .apply_to(&mut user);
        assert_eq!(user.age, None);
    }

    #[test]
    fn test_empty_changes() {
        assert!(UserChanges::default().is_empty());
        assert!(!UserChanges {
            name: Some("x".into()),
            ..Default::default()
        }
        .is_empty());
    }
}
