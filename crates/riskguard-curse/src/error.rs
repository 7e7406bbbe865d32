//! Error types for the curse registry.

use thiserror::Error;

use crate::subject::CurseSubject;

/// Errors that can occur while cursing or uncursing subjects.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CurseError {
    /// The subject is already cursed, or appears twice in one curse call.
    #[error("subject {0} is already cursed")]
    AlreadyCursed(CurseSubject),

    /// The subject is not cursed, or appears twice in one uncurse call.
    #[error("subject {0} is not cursed")]
    NotCursed(CurseSubject),
}

/// Result type for curse operations.
pub type Result<T> = std::result::Result<T, CurseError>;
