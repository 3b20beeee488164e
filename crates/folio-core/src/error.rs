//! Unified error types for all layers of the application.

use thiserror::Error;

/// Unified error type for Folio.
///
/// Cache-layer failures have their own taxonomy in `folio-service`; they only
/// become a [`FolioError::Cache`] when a caller outside the caching wrappers
/// (a readiness probe, for instance) chooses to surface them.
#[derive(Error, Debug)]
pub enum FolioError {
    // ============ Domain Errors ============
    /// Resource not found
    #[error("Resource not found: {resource_type} with id {id}")]
    NotFound {
        resource_type: &'static str,
        id: String,
    },

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Conflict error (e.g., duplicate entry)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Business rule violation
    #[error("Business rule violation: {0}")]
    BusinessRule(String),

    // ============ Authorization Errors ============
    /// Forbidden access
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Invalid credentials
    #[error("Invalid credentials")]
    InvalidCredentials,

    // ============ Infrastructure Errors ============
    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Redis/Cache error
    #[error("Cache error: {code} - {message}")]
    Cache { code: &'static str, message: String },

    // ============ Internal Errors ============
    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Generic error wrapper
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FolioError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::NotFound { .. } => 404,
            Self::Validation(_) | Self::BusinessRule(_) => 400,
            Self::Conflict(_) => 409,
            Self::InvalidCredentials => 401,
            Self::Forbidden(_) => 403,
            Self::Cache { .. } => 503,
            Self::Database(_) | Self::Configuration(_) | Self::Internal(_) | Self::Other(_) => 500,
        }
    }

    /// Returns a machine-readable error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Conflict(_) => "CONFLICT",
            Self::BusinessRule(_) => "BUSINESS_RULE_VIOLATION",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::Cache { code, .. } => *code,
            Self::Internal(_) | Self::Other(_) => "INTERNAL_ERROR",
        }
    }

    /// Creates a not found error for a resource.
    #[must_use]
    pub fn not_found<T: ToString>(resource_type: &'static str, id: T) -> Self {
        Self::NotFound {
            resource_type,
            id: id.to_string(),
        }
    }

    /// Creates a validation error.
    #[must_use]
    pub fn validation<T: Into<String>>(message: T) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a conflict error.
    #[must_use]
    pub fn conflict<T: Into<String>>(message: T) -> Self {
        Self::Conflict(message.into())
    }

    /// Creates a business rule error.
    #[must_use]
    pub fn business_rule<T: Into<String>>(message: T) -> Self {
        Self::BusinessRule(message.into())
    }

    /// Creates a forbidden error.
    #[must_use]
    pub fn forbidden<T: Into<String>>(message: T) -> Self {
        Self::Forbidden(message.into())
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal<T: Into<String>>(message: T) -> Self {
        Self::Internal(message.into())
    }

    /// Checks if this error is retriable.
    #[must_use]
    pub const fn is_retriable(&self) -> bool {
        matches!(self, Self::Database(_) | Self::Cache { .. })
    }
}

#[cfg(feature = "sqlx")]
impl From<sqlx::Error> for FolioError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => Self::NotFound {
                resource_type: "database_row",
                id: "unknown".to_string(),
            },
            sqlx::Error::Database(db_err) => {
                // PostgreSQL unique violation
                if db_err.code().is_some_and(|code| code == "23505") {
                    return Self::Conflict(db_err.message().to_string());
                }
                Self::Database(err.to_string())
            }
            _ => Self::Database(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for FolioError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(format!("JSON serialization error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(FolioError::not_found("Book", 1).status_code(), 404);
        assert_eq!(FolioError::validation("rating required").status_code(), 400);
        assert_eq!(FolioError::business_rule("category in use").status_code(), 400);
        assert_eq!(FolioError::forbidden("not yours").status_code(), 403);
        assert_eq!(FolioError::conflict("duplicate").status_code(), 409);
        assert_eq!(FolioError::InvalidCredentials.status_code(), 401);
        assert_eq!(FolioError::Database("db error".to_string()).status_code(), 500);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(FolioError::not_found("Book", 1).error_code(), "NOT_FOUND");
        assert_eq!(FolioError::validation("bad input").error_code(), "VALIDATION_ERROR");
        assert_eq!(FolioError::conflict("duplicate").error_code(), "CONFLICT");
        assert_eq!(
            FolioError::business_rule("in use").error_code(),
            "BUSINESS_RULE_VIOLATION"
        );
        assert_eq!(FolioError::forbidden("no").error_code(), "FORBIDDEN");
        assert_eq!(FolioError::internal("err").error_code(), "INTERNAL_ERROR");
    }

    #[test]
    fn test_cache_error_keeps_code() {
        let err = FolioError::Cache {
            code: "CACHE_BACKEND_UNAVAILABLE",
            message: "connection refused".to_string(),
        };
        assert_eq!(err.error_code(), "CACHE_BACKEND_UNAVAILABLE");
        assert_eq!(err.status_code(), 503);
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn test_retriable_errors() {
        assert!(FolioError::Database("connection lost".to_string()).is_retriable());
        assert!(!FolioError::not_found("User", 1).is_retriable());
        assert!(!FolioError::conflict("dup").is_retriable());
        assert!(!FolioError::InvalidCredentials.is_retriable());
    }

    #[test]
    fn test_error_constructors() {
        let not_found = FolioError::not_found("Category", "42");
        assert!(not_found.to_string().contains("Category"));
        assert!(not_found.to_string().contains("42"));

        let conflict = FolioError::conflict("Category name already exists");
        assert!(conflict.to_string().contains("already exists"));
    }

    #[test]
    fn test_from_serde_json_error() {
        let err = serde_json::from_str::<u32>("not json").unwrap_err();
        let folio: FolioError = err.into();
        assert_eq!(folio.error_code(), "INTERNAL_ERROR");
    }
}
