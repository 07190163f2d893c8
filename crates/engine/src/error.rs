//! The module contains the error the engine can throw.
//!
//! Validation errors ([`InvalidAmount`], [`InvalidCategory`],
//! [`InvalidInput`]) are raised before anything is written. A duplicate
//! signup is reported as [`DuplicateUsername`]. Storage failures are wrapped
//! in [`Database`] and propagated untouched.
//!
//! Deleting an expense that is missing or owned by somebody else is **not**
//! an error: see [`Deletion`](crate::Deletion).
//!
//!  [`InvalidAmount`]: EngineError::InvalidAmount
//!  [`InvalidCategory`]: EngineError::InvalidCategory
//!  [`InvalidInput`]: EngineError::InvalidInput
//!  [`DuplicateUsername`]: EngineError::DuplicateUsername
//!  [`Database`]: EngineError::Database
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid category: {0}")]
    InvalidCategory(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Username \"{0}\" already exists!")]
    DuplicateUsername(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("Password error: {0}")]
    Password(String),
    #[error("Export error: {0}")]
    Export(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl EngineError {
    /// Returns `true` for malformed input rejected before any mutation.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidAmount(_) | Self::InvalidCategory(_) | Self::InvalidInput(_)
        )
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidCategory(a), Self::InvalidCategory(b)) => a == b,
            (Self::InvalidInput(a), Self::InvalidInput(b)) => a == b,
            (Self::DuplicateUsername(a), Self::DuplicateUsername(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::Password(a), Self::Password(b)) => a == b,
            (Self::Export(a), Self::Export(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
