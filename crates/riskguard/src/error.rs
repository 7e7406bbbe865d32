//! Error types for the Guard.

use riskguard_core::{Address, ConfigError, VerifyError};
use riskguard_curse::CurseError;
use riskguard_store::StoreError;
use thiserror::Error;

/// Errors that can occur during Guard operations.
#[derive(Debug, Error)]
pub enum GuardError {
    /// A proposed config was rejected.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// A batch failed signature verification.
    #[error("verification error: {0}")]
    Verify(#[from] VerifyError),

    /// A curse or uncurse call was rejected.
    #[error("curse error: {0}")]
    Curse(#[from] CurseError),

    /// Storage error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// A mutating operation was called by someone other than the owner.
    #[error("only callable by owner, caller {caller}")]
    OnlyCallableByOwner { caller: Address },

    /// `accept_ownership` was called by someone other than the proposed owner.
    #[error("must be proposed owner, caller {caller}")]
    MustBeProposedOwner { caller: Address },

    /// The owner proposed itself as the next owner.
    #[error("cannot transfer to self")]
    CannotTransferToSelf,

    /// A fresh guard was opened without an initial owner.
    #[error("cannot set owner to zero")]
    ZeroOwner,

    /// The task running a mutation panicked or was aborted.
    #[error("mutation task failed: {0}")]
    Task(String),
}

/// Result type for Guard operations.
pub type Result<T> = std::result::Result<T, GuardError>;
