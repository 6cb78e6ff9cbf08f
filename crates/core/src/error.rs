use serde::{Deserialize, Serialize};

use crate::types::JobId;

/// Domain-level error taxonomy.
///
/// `Validation` and `Conflict` are reported synchronously to the submitter
/// and never reach the engine. `Solver`, `Internal`, and `Timeout` describe
/// terminal job failures that are reported asynchronously via callback.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: job {0} is already in flight")]
    Conflict(JobId),

    #[error("Solver error: {0}")]
    Solver(String),

    #[error("Solver exceeded the configured timeout of {0} s")]
    Timeout(u64),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Failure classification carried in the failure callback payload.
///
/// The wire names match what the job manager expects to branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    #[serde(rename = "SolverError")]
    Solver,
    #[serde(rename = "InternalError")]
    Internal,
    #[serde(rename = "TimeoutError")]
    Timeout,
}

/// Terminal failure description attached to a failed job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub kind: ErrorKind,
    pub message: String,
}

impl ErrorInfo {
    pub fn solver(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Solver,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Internal,
            message: message.into(),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Timeout,
            message: message.into(),
        }
    }
}

impl From<&CoreError> for ErrorInfo {
    fn from(err: &CoreError) -> Self {
        match err {
            CoreError::Solver(_) => ErrorInfo::solver(err.to_string()),
            CoreError::Timeout(_) => ErrorInfo::timeout(err.to_string()),
            other => ErrorInfo::internal(other.to_string()),
        }
    }
}
