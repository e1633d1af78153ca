//! Typed data-access errors
//!
//! Storage failures are classified here, once, into a `DataErrorKind` with a
//! stable machine-readable code. Callers branch on the kind and never
//! inspect driver messages.

use super::validation::ValidationError;
use rusqlite::ffi;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification of a data-access failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataErrorKind {
    /// A unique constraint rejected the write
    Uniqueness,
    /// A referenced row does not exist
    ForeignKey,
    /// The caller's access policy rejected the operation
    PolicyDenied,
    /// Input failed field validation
    Validation,
    /// The requested record does not exist or is not visible
    NotFound,
    /// No database connection could be acquired
    Connection,
    /// Any other database failure
    Query,
}

impl DataErrorKind {
    /// Machine-readable code carried on the wire
    pub fn code(&self) -> &'static str {
        match self {
            DataErrorKind::Uniqueness => "P2002",
            DataErrorKind::ForeignKey => "P2003",
            DataErrorKind::PolicyDenied => "P2004",
            DataErrorKind::Validation => "P2007",
            DataErrorKind::NotFound => "P2025",
            DataErrorKind::Connection => "P1001",
            DataErrorKind::Query => "P2010",
        }
    }

    /// Reverse of [`DataErrorKind::code`]
    pub fn from_code(code: &str) -> Option<Self> {
        let kind = match code {
            "P2002" => DataErrorKind::Uniqueness,
            "P2003" => DataErrorKind::ForeignKey,
            "P2004" => DataErrorKind::PolicyDenied,
            "P2007" => DataErrorKind::Validation,
            "P2025" => DataErrorKind::NotFound,
            "P1001" => DataErrorKind::Connection,
            "P2010" => DataErrorKind::Query,
            _ => return None,
        };
        Some(kind)
    }

    /// HTTP status a gateway should answer with
    pub fn http_status(&self) -> u16 {
        match self {
            DataErrorKind::Uniqueness => 409,
            DataErrorKind::ForeignKey | DataErrorKind::Validation => 400,
            DataErrorKind::PolicyDenied => 403,
            DataErrorKind::NotFound => 404,
            DataErrorKind::Connection | DataErrorKind::Query => 500,
        }
    }
}

impl fmt::Display for DataErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A classified data-access failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct DataError {
    pub kind: DataErrorKind,
    pub message: String,
    /// Column or constraint the failure refers to, when known
    pub target: Option<String>,
}

impl DataError {
    pub fn new(kind: DataErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            target: None,
        }
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn not_found(what: impl fmt::Display) -> Self {
        Self::new(DataErrorKind::NotFound, format!("{} not found", what))
    }

    pub fn policy_denied(reason: impl Into<String>) -> Self {
        Self::new(
            DataErrorKind::PolicyDenied,
            format!("denied by policy: {}", reason.into()),
        )
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn is_uniqueness(&self) -> bool {
        self.kind == DataErrorKind::Uniqueness
    }
}

impl From<ValidationError> for DataError {
    fn from(err: ValidationError) -> Self {
        let field = err.field();
        DataError::new(DataErrorKind::Validation, err.to_string()).with_target(field)
    }
}

impl From<r2d2::Error> for DataError {
    fn from(err: r2d2::Error) -> Self {
        DataError::new(
            DataErrorKind::Connection,
            format!("Failed to get connection: {}", err),
        )
    }
}

impl From<rusqlite::Error> for DataError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::QueryReturnedNoRows => {
                DataError::new(DataErrorKind::NotFound, "Record not found")
            }
            rusqlite::Error::SqliteFailure(failure, message) => {
                let detail = message.clone().unwrap_or_else(|| failure.to_string());
                let kind = match failure.extended_code {
                    ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
                        DataErrorKind::Uniqueness
                    }
                    ffi::SQLITE_CONSTRAINT_FOREIGNKEY => DataErrorKind::ForeignKey,
                    ffi::SQLITE_CONSTRAINT_CHECK | ffi::SQLITE_CONSTRAINT_NOTNULL => {
                        DataErrorKind::Validation
                    }
                    _ => DataErrorKind::Query,
                };

                let error = DataError::new(kind, detail.clone());
                match constraint_target(&detail) {
                    Some(target) if kind != DataErrorKind::Query => error.with_target(target),
                    _ => error,
                }
            }
            _ => DataError::new(DataErrorKind::Query, err.to_string()),
        }
    }
}

/// Extract `slug` from messages like `UNIQUE constraint failed: spaces.slug`
fn constraint_target(message: &str) -> Option<String> {
    let (_, columns) = message.split_once("constraint failed: ")?;
    let first = columns.split(',').next()?.trim();
    let column = first.rsplit('.').next()?;
    (!column.is_empty()).then(|| column.to_string())
}
