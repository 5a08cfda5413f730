use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClinicError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Database error: {0}")]
    Database(#[from] eyre::Report),
}

/// Stable classification of a [`ClinicError`].
///
/// The transport layer maps each kind to exactly one status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    Validation,
    Conflict,
    Forbidden,
    Internal,
}

impl ClinicError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClinicError::NotFound(_) => ErrorKind::NotFound,
            ClinicError::Validation(_) => ErrorKind::Validation,
            ClinicError::Conflict(_) => ErrorKind::Conflict,
            ClinicError::Forbidden(_) => ErrorKind::Forbidden,
            ClinicError::Database(_) => ErrorKind::Internal,
        }
    }

    /// Message without the kind prefix added by `Display`.
    pub fn message(&self) -> String {
        match self {
            ClinicError::NotFound(msg)
            | ClinicError::Validation(msg)
            | ClinicError::Conflict(msg)
            | ClinicError::Forbidden(msg) => msg.clone(),
            ClinicError::Database(report) => report.to_string(),
        }
    }

    pub fn slot_taken() -> Self {
        ClinicError::Conflict("slot already taken".to_string())
    }

    pub fn already_cancelled(appointment_id: i64) -> Self {
        ClinicError::Conflict(format!(
            "appointment id {} is already cancelled",
            appointment_id
        ))
    }
}

pub type ClinicResult<T> = Result<T, ClinicError>;
