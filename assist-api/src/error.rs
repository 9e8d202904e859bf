use thiserror::Error;

pub type CoreResult<T> = Result<T, CoreError>;

/// Error kinds surfaced by the orchestration and fee-calculation core.
///
/// `Classification` is never user-visible (classification cannot fail by
/// construction — `Unknown` is a valid routing decision); it exists so a
/// classifier implementation that does hit an unexpected internal state
/// has somewhere to report it, and so the orchestrator has a single match
/// arm that absorbs it rather than three call sites improvising.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("classification error: {0}")]
    Classification(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("disambiguation required")]
    Ambiguous {
        token: String,
        options: Vec<crate::domain::fee::DisambiguationOption>,
    },

    #[error("deferred to note {note_reference}")]
    NoteDeferred { note_reference: String },

    #[error("upstream failure: {0}")]
    Upstream(String),

    #[error("temporarily unavailable")]
    RateLimited,

    #[error("context length exceeded: {0}")]
    ContextTooLong(String),

    #[error("request cancelled")]
    Cancelled,

    #[error("validation failed: {0}")]
    ValidationFailed(String),

    #[error("repository error: {0}")]
    Repository(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub fn is_user_visible(&self) -> bool {
        !matches!(self, CoreError::Classification(_) | CoreError::Cancelled)
    }
}
