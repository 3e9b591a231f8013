//! Domain error types.

use std::fmt;

use common::CoercionError;
use inventory_store::StoreError;
use serde::Serialize;
use serde_json::{Value, json};
use thiserror::Error;

/// Errors that can occur during domain operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A request value could not be coerced into an integer.
    #[error("Invalid {field}: {reason}")]
    InvalidArgument {
        field: &'static str,
        reason: CoercionError,
    },

    /// An error occurred in the inventory store.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl DomainError {
    pub fn invalid(field: &'static str, reason: CoercionError) -> Self {
        Self::InvalidArgument { field, reason }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            Self::Store(err) => ErrorKind::from_store(err),
        }
    }

    pub fn code(&self) -> Option<&str> {
        match self {
            Self::InvalidArgument { .. } => None,
            Self::Store(err) => err.code(),
        }
    }

    pub fn meta(&self) -> Option<Value> {
        match self {
            Self::InvalidArgument { field, .. } => Some(json!({ "field": field })),
            Self::Store(err) => err.meta(),
        }
    }
}

/// Client-facing classification of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    /// Malformed identifier, quantity or filter.
    InvalidArgument,
    /// A foreign key target or a unique-lookup target is missing.
    ReferenceNotFound,
    /// A record with the same unique key already exists.
    UniquenessViolation,
    /// A required column was left empty.
    RequiredFieldViolation,
    /// The database rejected the request for a reason with no finer kind.
    UnclassifiedStorageError,
    /// Anything else, including lost connections.
    UnknownError,
}

impl ErrorKind {
    pub fn from_store(err: &StoreError) -> Self {
        match err {
            StoreError::Validation(_) => Self::InvalidArgument,
            StoreError::NotFound { .. } | StoreError::ForeignKeyViolation { .. } => {
                Self::ReferenceNotFound
            }
            StoreError::UniqueViolation { .. } => Self::UniquenessViolation,
            StoreError::RequiredField { .. } => Self::RequiredFieldViolation,
            StoreError::Database { .. } => Self::UnclassifiedStorageError,
            StoreError::Unavailable(_) | StoreError::Internal(_) | StoreError::Migration(_) => {
                Self::UnknownError
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidArgument => "InvalidArgument",
            Self::ReferenceNotFound => "ReferenceNotFound",
            Self::UniquenessViolation => "UniquenessViolation",
            Self::RequiredFieldViolation => "RequiredFieldViolation",
            Self::UnclassifiedStorageError => "UnclassifiedStorageError",
            Self::UnknownError => "UnknownError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result type for domain operations.
pub type Result<T> = std::result::Result<T, DomainError>;
