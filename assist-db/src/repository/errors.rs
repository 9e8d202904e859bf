//! Repository-facing error type, kept separate from the core's `CoreError`
//! so a storage failure can be given context before the service layer
//! decides how to fold it into a `CoreError` — the orchestrator recovers
//! fee-lookup and retrieval failures into fallbacks and never propagates
//! them raw.

use std::fmt;

#[derive(Debug)]
pub enum RepositoryError {
    NotFound,
    UniqueViolation(String),
    OverlapViolation(String),
    Backend(String),
}

impl fmt::Display for RepositoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepositoryError::NotFound => write!(f, "not found"),
            RepositoryError::UniqueViolation(msg) => write!(f, "unique constraint violated: {msg}"),
            RepositoryError::OverlapViolation(msg) => write!(f, "effective-range overlap: {msg}"),
            RepositoryError::Backend(msg) => write!(f, "storage backend error: {msg}"),
        }
    }
}

impl std::error::Error for RepositoryError {}
