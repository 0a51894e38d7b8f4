//! # User Registry
//!
//! A small HTTP service exposing create, read, update and delete operations
//! over user records stored in a relational datastore.
//!
//! ## Architecture
//!
//! - [`api`]: Domain types (`User`, `NewUser`, `UserChanges`)
//! - [`db`]: Repository pattern, service layer and storage backends
//!   (in-memory, or Postgres through Diesel)
//! - [`http`]: Axum router, handlers and JSON error mapping
//! - [`config`]: Server bind address from the environment
//!
//! ## Errors
//!
//! Storage failures surface as [`db::RepositoryError`]. The HTTP layer maps
//! them to status codes: validation and unique-email conflicts become 400,
//! a missing record 404, anything else 500.

pub mod api;
pub mod config;
pub mod db;

#[cfg(feature = "http-server")]
pub mod http;
