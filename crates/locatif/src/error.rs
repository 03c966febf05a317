//! Error types for locatif.
//!
//! This module defines all error types used throughout the locatif crate,
//! providing detailed context for debugging and user-friendly error messages.

use std::path::PathBuf;
use thiserror::Error;

use crate::forms::FieldErrors;
use crate::model::Month;

/// The main error type for locatif operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Domain Errors ===
    /// A referenced record does not exist.
    #[error("{entity} {id} not found")]
    NotFound {
        /// Kind of record that was looked up.
        entity: &'static str,
        /// Identifier that was looked up.
        id: i64,
    },

    /// A tenant has no payment recorded for the requested month.
    #[error("no payment recorded for tenant {tenant_id} in {month}")]
    NoPayments {
        /// The tenant the receipt was requested for.
        tenant_id: i64,
        /// The requested month.
        month: Month,
    },

    /// Submitted input failed validation.
    #[error("invalid input: {0}")]
    Invalid(FieldErrors),

    // === Rendering Errors ===
    /// A page template failed to render.
    #[error("template error: {0}")]
    Template(#[from] handlebars::RenderError),

    /// A page template failed to compile.
    #[error("template registration failed: {0}")]
    TemplateRegistration(Box<handlebars::TemplateError>),

    /// The receipt document could not be written.
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    // === Server Errors ===
    /// No port in the configured range could be bound.
    #[error("no free port between {first} and {last}")]
    NoFreePort {
        /// First port tried.
        first: u16,
        /// Last port tried.
        last: u16,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for locatif operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl From<handlebars::TemplateError> for Error {
    fn from(err: handlebars::TemplateError) -> Self {
        Self::TemplateRegistration(Box::new(err))
    }
}

impl From<FieldErrors> for Error {
    fn from(errors: FieldErrors) -> Self {
        Self::Invalid(errors)
    }
}

impl Error {
    /// Create a not-found error for the given record kind.
    #[must_use]
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        Self::NotFound { entity, id }
    }

    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this error means the requested record or document is absent.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::NoPayments { .. })
    }

    /// Check if this error was caused by invalid user input.
    #[must_use]
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::Invalid(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = Error::not_found("tenant", 42);
        assert_eq!(err.to_string(), "tenant 42 not found");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_no_payments_display() {
        let err = Error::NoPayments {
            tenant_id: 3,
            month: Month::new(2024, 3).unwrap(),
        };
        assert_eq!(
            err.to_string(),
            "no payment recorded for tenant 3 in 2024-03"
        );
        assert!(err.is_not_found());
    }

    #[test]
    fn test_invalid_input() {
        let mut errors = FieldErrors::default();
        errors.add("amount", "Le montant doit être un nombre positif.");
        let err: Error = errors.into();
        assert!(err.is_invalid_input());
        assert!(!err.is_not_found());
        assert!(err.to_string().contains("amount"));
    }

    #[test]
    fn test_internal_error() {
        let err = Error::internal("something went wrong");
        assert_eq!(err.to_string(), "internal error: something went wrong");
    }

    #[test]
    fn test_no_free_port_display() {
        let err = Error::NoFreePort {
            first: 5000,
            last: 5099,
        };
        let msg = err.to_string();
        assert!(msg.contains("5000"));
        assert!(msg.contains("5099"));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_from_rusqlite_error() {
        let result = rusqlite::Connection::open_with_flags(
            "/nonexistent/path/db.sqlite",
            rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY,
        );
        if let Err(sqlite_err) = result {
            let err: Error = sqlite_err.into();
            assert!(matches!(err, Error::DatabaseQuery(_)));
        }
    }

    #[test]
    fn test_database_migration_error_display() {
        let err = Error::DatabaseMigration {
            message: "version mismatch".to_string(),
        };
        assert!(err.to_string().contains("version mismatch"));
    }

    #[test]
    fn test_config_validation_error_display() {
        let err = Error::ConfigValidation {
            message: "invalid host".to_string(),
        };
        assert!(err.to_string().contains("invalid host"));
    }

    #[test]
    fn test_directory_create_error_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = Error::DirectoryCreate {
            path: PathBuf::from("/root/forbidden"),
            source: io_err,
        };
        assert!(err.to_string().contains("/root/forbidden"));
    }
}
