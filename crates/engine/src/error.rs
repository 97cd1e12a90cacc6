//! The module contains the errors the engine can return.
//!
//! Every variant maps to one class of the HTTP error taxonomy:
//!
//! - [`InvalidInput`] and [`InvalidRating`]: malformed input.
//! - [`InvalidCredentials`]: a password did not verify.
//! - [`Forbidden`]: the caller's role or identity does not allow the action.
//! - [`KeyNotFound`]: a referenced row is absent.
//! - [`ExistingKey`]: a unique key is already taken.
//!
//!  [`InvalidInput`]: EngineError::InvalidInput
//!  [`InvalidRating`]: EngineError::InvalidRating
//!  [`InvalidCredentials`]: EngineError::InvalidCredentials
//!  [`Forbidden`]: EngineError::Forbidden
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`ExistingKey`]: EngineError::ExistingKey
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("Invalid rating: {0}")]
    InvalidRating(String),
    #[error("Invalid role: {0}")]
    InvalidRole(String),
    #[error("Invalid credentials.")]
    InvalidCredentials,
    #[error("{0}")]
    Forbidden(String),
    #[error("{0} not found.")]
    KeyNotFound(String),
    #[error("{0} already registered.")]
    ExistingKey(String),
    #[error("password hashing failed: {0}")]
    PasswordHash(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl EngineError {
    /// The single message handed to callers that are not allowed to act.
    pub(crate) fn access_denied() -> Self {
        Self::Forbidden("access denied".to_string())
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidInput(a), Self::InvalidInput(b)) => a == b,
            (Self::InvalidRating(a), Self::InvalidRating(b)) => a == b,
            (Self::InvalidRole(a), Self::InvalidRole(b)) => a == b,
            (Self::InvalidCredentials, Self::InvalidCredentials) => true,
            (Self::Forbidden(a), Self::Forbidden(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::PasswordHash(a), Self::PasswordHash(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
