use serde_json::{Value, json};
use thiserror::Error;

/// SQLSTATE raised by PostgreSQL for a unique constraint violation.
pub const UNIQUE_VIOLATION: &str = "23505";
/// SQLSTATE raised by PostgreSQL for a foreign key violation.
pub const FOREIGN_KEY_VIOLATION: &str = "23503";
/// SQLSTATE raised by PostgreSQL for a NOT NULL violation.
pub const NOT_NULL_VIOLATION: &str = "23502";
/// SQLSTATE raised by PostgreSQL for integer overflow.
pub const NUMERIC_VALUE_OUT_OF_RANGE: &str = "22003";

/// Errors that can occur when interacting with the inventory store.
///
/// Every backend reports failures through these variants so callers can
/// classify them without inspecting driver-specific error types.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The query or filter was malformed.
    #[error("Invalid query: {0}")]
    Validation(String),

    /// A record required by the operation does not exist.
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    /// A record with the same unique key already exists.
    #[error("Unique constraint failed on {}", .constraint.as_deref().unwrap_or("<unknown>"))]
    UniqueViolation { constraint: Option<String> },

    /// A referenced record does not exist.
    #[error("Foreign key constraint failed on {}", .constraint.as_deref().unwrap_or("<unknown>"))]
    ForeignKeyViolation { constraint: Option<String> },

    /// A required column was left empty.
    #[error("Required field is missing: {column}")]
    RequiredField { column: String },

    /// The database rejected the request for a reason not covered above.
    #[error("Database error: {message}")]
    Database {
        code: Option<String>,
        message: String,
    },

    /// The database could not be reached.
    #[error("Database unavailable: {0}")]
    Unavailable(String),

    /// Any other failure, such as a row that could not be decoded.
    #[error("Internal store error: {0}")]
    Internal(String),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl StoreError {
    /// Shorthand for a missing record.
    pub fn not_found(entity: &'static str, key: impl std::fmt::Display) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    /// Machine-readable code for the failure, when the backend supplies one.
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::UniqueViolation { .. } => Some(UNIQUE_VIOLATION),
            Self::ForeignKeyViolation { .. } => Some(FOREIGN_KEY_VIOLATION),
            Self::RequiredField { .. } => Some(NOT_NULL_VIOLATION),
            Self::Database { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    /// Structured details about the failure, safe to show to clients.
    pub fn meta(&self) -> Option<Value> {
        match self {
            Self::NotFound { entity, key } => Some(json!({ "entity": entity, "key": key })),
            Self::UniqueViolation { constraint } | Self::ForeignKeyViolation { constraint } => {
                constraint.as_ref().map(|c| json!({ "constraint": c }))
            }
            Self::RequiredField { column } => Some(json!({ "column": column })),
            _ => None,
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::not_found("record", "<unknown>"),
            sqlx::Error::Database(db_err) => {
                if db_err.is_unique_violation() {
                    return StoreError::UniqueViolation {
                        constraint: db_err.constraint().map(String::from),
                    };
                }
                if db_err.is_foreign_key_violation() {
                    return StoreError::ForeignKeyViolation {
                        constraint: db_err.constraint().map(String::from),
                    };
                }

                let code = db_err.code().map(|c| c.into_owned());
                if code.as_deref() == Some(NOT_NULL_VIOLATION) {
                    let column = db_err
                        .try_downcast_ref::<sqlx::postgres::PgDatabaseError>()
                        .and_then(|pg| pg.column())
                        .unwrap_or("<unknown>");
                    return StoreError::RequiredField {
                        column: column.to_string(),
                    };
                }

                StoreError::Database {
                    code,
                    message: db_err.message().to_string(),
                }
            }
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::WorkerCrashed => StoreError::Unavailable(err.to_string()),
            other => StoreError::Internal(other.to_string()),
        }
    }
}

/// Result type for inventory store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constraint_errors_carry_sqlstate_codes() {
        let unique = StoreError::UniqueViolation {
            constraint: Some("warehouses_pkey".to_string()),
        };
        assert_eq!(unique.code(), Some(UNIQUE_VIOLATION));
        assert_eq!(
            unique.meta(),
            Some(json!({ "constraint": "warehouses_pkey" }))
        );

        let fk = StoreError::ForeignKeyViolation { constraint: None };
        assert_eq!(fk.code(), Some(FOREIGN_KEY_VIOLATION));
        assert_eq!(fk.meta(), None);
    }

    #[test]
    fn not_found_reports_entity_and_key() {
        let err = StoreError::not_found("StockItem", 9_999_999);
        assert_eq!(err.to_string(), "StockItem not found: 9999999");
        assert_eq!(err.code(), None);
        assert_eq!(
            err.meta(),
            Some(json!({ "entity": "StockItem", "key": "9999999" }))
        );
    }

    #[test]
    fn pool_timeout_is_unavailable() {
        let err = StoreError::from(sqlx::Error::PoolTimedOut);
        assert!(matches!(err, StoreError::Unavailable(_)));
    }

    #[test]
    fn row_not_found_maps_to_not_found() {
        let err = StoreError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, StoreError::NotFound { .. }));
    }
}
