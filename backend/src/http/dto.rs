//! Data Transfer Objects for the HTTP API.

use std::fmt;

use serde::de::{self, Unexpected, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

use crate::api::{NewUser, User, UserChanges};

/// Request body for `POST /api/users`, as JSON or a submitted form.
///
/// Fields are optional at the serde level so a missing `name` or `email`
/// reaches validation and is reported as a 400 with a JSON body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "age")]
    pub age: Option<i32>,
}

impl From<CreateUserRequest> for NewUser {
    fn from(req: CreateUserRequest) -> Self {
        NewUser {
            name: req.name.unwrap_or_default(),
            email: req.email.unwrap_or_default(),
            age: req.age,
        }
    }
}

/// Request body for `PUT /api/users/{id}`, as JSON or a submitted form.
///
/// `age`: absent leaves it unchanged, `null` or an empty string clears it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "present_age")]
    pub age: Option<Option<i32>>,
}

/// Reads an age given as an integer, a string holding an integer (form
/// fields are always strings), an empty string or `null`. The last two
/// mean "no age".
fn age<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(AgeVisitor)
}

/// Like [`age`], but keeps an explicit value apart from an absent key.
fn present_age<'de, D>(deserializer: D) -> Result<Option<Option<i32>>, D::Error>
where
    D: Deserializer<'de>,
{
    age(deserializer).map(Some)
}

struct AgeVisitor;

impl<'de> Visitor<'de> for AgeVisitor {
    type Value = Option<i32>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an integer age, an integer string or null")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        i32::try_from(v)
            .map(Some)
            .map_err(|_| E::invalid_value(Unexpected::Signed(v), &self))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        i32::try_from(v)
            .map(Some)
            .map_err(|_| E::invalid_value(Unexpected::Unsigned(v), &self))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        let v = v.trim();
        if v.is_empty() {
            return Ok(None);
        }
        v.parse::<i32>()
            .map(Some)
            .map_err(|_| E::invalid_value(Unexpected::Str(v), &self))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_any(self)
    }
}

impl From<UpdateUserRequest> for UserChanges {
    fn from(req: UpdateUserRequest) -> Self {
        UserChanges {
            name: req.name,
            email: req.email,
            age: req.age,
        }
    }
}

/// A user record with a confirmation message merged into the same object.
#[derive(Debug, Clone, Serialize)]
pub struct UserMessageResponse {
    #[serde(flatten)]
    pub user: User,
    pub message: String,
}

/// Bare confirmation message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub database: String,
}
