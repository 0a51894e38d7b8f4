//! Error types for repository operations.
//!
//! A [`RepositoryError`] is a kind, a client-safe message and an
//! [`ErrorContext`] describing which operation on which user failed. The
//! HTTP layer decides the status code from [`ErrorKind`] alone.

use std::fmt;

use crate::api::UserId;

/// Result type for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Message reported when no user matches an id.
pub const USER_NOT_FOUND: &str = "User not found";

/// Message reported when an email is already registered.
pub const EMAIL_TAKEN: &str = "Email already exists";

/// Where a repository error happened.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorContext {
    /// Repository operation, e.g. `create_user`
    pub operation: Option<String>,
    /// The user the operation targeted
    pub user_id: Option<UserId>,
    /// Free-form detail such as a violated constraint
    pub details: Option<String>,
}

impl ErrorContext {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: Some(operation.into()),
            ..Default::default()
        }
    }

    pub fn with_user(mut self, id: UserId) -> Self {
        self.user_id = Some(id);
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    fn is_empty(&self) -> bool {
        self.operation.is_none() && self.user_id.is_none() && self.details.is_none()
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return Ok(());
        }

        let fields = [
            self.operation.as_ref().map(|op| format!("op={}", op)),
            self.user_id.map(|id| format!("user={}", id)),
            self.details.clone(),
        ];
        let fields: Vec<String> = fields.into_iter().flatten().collect();
        write!(f, "({})", fields.join(" "))
    }
}

/// Classification of a repository failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The datastore could not be reached.
    Connection,
    /// The datastore rejected or failed a statement.
    Query,
    /// No user with the requested id.
    NotFound,
    /// Input rejected before reaching the datastore.
    Validation,
    /// The email is already registered.
    Conflict,
    /// Backend selection or settings are unusable.
    Configuration,
    /// Anything else.
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ErrorKind::Connection => "connection error",
            ErrorKind::Query => "query error",
            ErrorKind::NotFound => "not found",
            ErrorKind::Validation => "validation error",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Configuration => "configuration error",
            ErrorKind::Internal => "internal error",
        })
    }
}

/// Error type for repository operations
#[derive(Debug, thiserror::Error)]
#[error("{kind}: {message} {context}")]
pub struct RepositoryError {
    kind: ErrorKind,
    message: String,
    context: ErrorContext,
}

impl RepositoryError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn connection(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Connection, message)
    }

    pub fn query(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Query, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// No user has `id`.
    pub fn user_not_found(operation: &str, id: UserId) -> Self {
        Self::not_found(USER_NOT_FOUND).with_context(ErrorContext::new(operation).with_user(id))
    }

    /// `email` already belongs to a user.
    pub fn email_taken(operation: &str, email: &str) -> Self {
        Self::conflict(EMAIL_TAKEN)
            .with_context(ErrorContext::new(operation).with_details(format!("email={}", email)))
    }

    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = context;
        self
    }

    /// Set the operation, keeping the rest of the context.
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.context.operation = Some(operation.into());
        self
    }

    /// Attach the targeted user, keeping the rest of the context.
    pub fn with_user(mut self, id: UserId) -> Self {
        self.context.user_id = Some(id);
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The bare message, without kind or context.
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn context(&self) -> &ErrorContext {
        &self.context
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == ErrorKind::NotFound
    }

    pub fn is_conflict(&self) -> bool {
        self.kind == ErrorKind::Conflict
    }

    pub fn is_validation(&self) -> bool {
        self.kind == ErrorKind::Validation
    }
}

#[cfg(feature = "postgres-repo")]
impl From<diesel::result::Error> for RepositoryError {
    fn from(err: diesel::result::Error) -> Self {
        use diesel::result::{DatabaseErrorKind, Error};

        match err {
            Error::NotFound => RepositoryError::not_found(USER_NOT_FOUND),
            Error::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                let error = RepositoryError::conflict(EMAIL_TAKEN);
                match info.constraint_name() {
                    Some(constraint) => error.with_context(
                        ErrorContext::default().with_details(format!("constraint={}", constraint)),
                    ),
                    None => error,
                }
            }
            Error::DatabaseError(DatabaseErrorKind::ClosedConnection, info) => {
                RepositoryError::connection(info.message())
            }
            Error::DatabaseError(_, info) => RepositoryError::query(info.message()),
            Error::DeserializationError(e) => {
                RepositoryError::internal(format!("Unreadable row: {}", e))
            }
            other => RepositoryError::query(other.to_string()),
        }
    }
}
