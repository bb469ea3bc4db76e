use thiserror::Error;

/// Failures surfaced by core operations.
///
/// Every operation validates before it mutates, so an error always means the
/// store is unchanged.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Actor is unauthenticated or lacks the membership/ownership required.
    #[error("access denied: {0}")]
    AccessDenied(String),

    /// Malformed or out-of-range input, or a state precondition that failed.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Unknown channel, message or user id. Reported to clients as an input error.
    #[error("not found: {0}")]
    NotFound(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub fn denied(msg: impl Into<String>) -> Self {
        Self::AccessDenied(msg.into())
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// True for the input-error family (`InvalidArgument` and `NotFound`).
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::InvalidArgument(_) | Self::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
