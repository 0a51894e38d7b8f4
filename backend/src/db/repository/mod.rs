//! Repository trait definitions for user storage.
//!
//! - [`error`]: Error types for repository operations
//! - [`user`]: CRUD operations over user records
//!
//! Implementations live in [`crate::db::repositories`].

pub mod error;
pub mod user;

pub use error::{ErrorContext, ErrorKind, RepositoryError, RepositoryResult};
pub use user::UserRepository;
