use crate::reconcile::NotFound;
use planner::query::{keyset::PlanError, page::ReconcileError};
use std::fmt;
use thiserror::Error;

/// Errors raised while loading or validating pagination settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to parse pagination settings: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("page size must be greater than zero")]
    ZeroPageSize,

    #[error("default page size {page_size} exceeds max page size {max}")]
    PageSizeOverMax { page_size: u32, max: u32 },

    #[error("empty column name in {0}")]
    EmptyColumnName(String),
}

/// Errors surfaced by a list or describe call.
#[derive(Debug, Error)]
pub enum ListError {
    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error("reconcile page: {0}")]
    Reconcile(#[from] ReconcileError),

    #[error(transparent)]
    NotFound(#[from] NotFound),

    #[error("row source: {0}")]
    Source(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Rows that were found but could not be mapped, as `(id, error)`.
    #[error("failed to map {} row(s): {}", failures.len(), join_failures(failures))]
    Mapping { failures: Vec<(String, String)> },
}

fn join_failures(failures: &[(String, String)]) -> String {
    failures
        .iter()
        .map(|(id, error)| format!("{id}: {error}"))
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    InvalidArgument,
    NotFound,
    Internal,
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StatusCode::InvalidArgument => "INVALID_ARGUMENT",
            StatusCode::NotFound => "NOT_FOUND",
            StatusCode::Internal => "INTERNAL",
        };
        f.write_str(name)
    }
}

/// Transport-neutral status a service layer can forward to its clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub code: StatusCode,
    pub message: String,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl ListError {
    pub fn code(&self) -> StatusCode {
        match self {
            ListError::Plan(_) => StatusCode::InvalidArgument,
            ListError::NotFound(_) => StatusCode::NotFound,
            ListError::Reconcile(_) | ListError::Source(_) | ListError::Mapping { .. } => {
                StatusCode::Internal
            }
        }
    }

    pub fn status(&self) -> Status {
        Status {
            code: self.code(),
            message: self.to_string(),
        }
    }
}
