use thiserror::Error;

/// Engine-level failure taxonomy surfaced to callers of the analytics and
/// recommendation facades.
///
/// Aggregation and scoring never produce these: they are total over any
/// record set, including the empty one. Errors arise only at the store
/// boundary or from malformed request parameters.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    /// The record store could not be reached or timed out. Retryable by the
    /// caller; the engine itself never retries.
    #[error("record store unavailable: {0}")]
    StoreUnavailable(String),
    /// A request parameter was rejected before the store was queried.
    #[error("invalid filter: {0}")]
    InvalidFilter(String),
    /// An identifier-based lookup resolved to nothing.
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },
}

impl EngineError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound { kind, id: id.into() }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            Self::StoreUnavailable(_) => {
                "The record store is temporarily unavailable. Please retry shortly."
            }
            Self::InvalidFilter(_) => "The request could not be processed. Check inputs and try again.",
            Self::NotFound { .. } => "The requested record does not exist.",
        }
    }
}
