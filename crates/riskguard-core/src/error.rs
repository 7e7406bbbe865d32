//! Error types for Riskguard Core.

use thiserror::Error;

use crate::types::Address;

/// Low-level errors from cryptography and the binary codec.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    #[error("malformed signature scalars")]
    MalformedSignature,

    #[error("signature s value is not in the lower half of the curve order")]
    MalleableSignature,

    #[error("invalid recovery id: {0}")]
    InvalidRecoveryId(u8),

    #[error("public key recovery failed")]
    RecoveryFailed,

    #[error("invalid secret key")]
    InvalidSecretKey,

    #[error("signing failed")]
    SigningFailed,

    #[error("truncated input: needed {needed} bytes, {remaining} remaining")]
    Truncated { needed: usize, remaining: usize },

    #[error("{0} trailing bytes after decoded value")]
    TrailingBytes(usize),

    #[error("invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),
}

/// Rejections from installing a signer configuration.
///
/// Checks run in declaration order; the first failing check wins.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("config digest must not be zero")]
    ZeroValueNotAllowed,

    #[error("not enough signers: {signers} signers cannot tolerate f = {f}")]
    NotEnoughSigners { signers: usize, f: u64 },

    #[error("signer at index {index} is not ordered by public key")]
    InvalidSignerOrder { index: usize },

    #[error("duplicate onchain public key {0}")]
    DuplicateOnchainPublicKey(Address),

    #[error("config version counter exhausted")]
    VersionOverflow,
}

/// Rejections from verifying a signed batch of commitments.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum VerifyError {
    #[error("no signer config has been installed")]
    ConfigNotSet,

    #[error("invalid signature at index {index}: {reason}")]
    InvalidSignature { index: usize, reason: CoreError },

    #[error("signature at index {index} is out of order or duplicated")]
    OutOfOrderSignatures { index: usize },

    #[error("signature at index {index} recovered unexpected signer {signer}")]
    UnexpectedSigner { index: usize, signer: Address },

    #[error("threshold not met: {valid} valid signatures, {required} required")]
    ThresholdNotMet { valid: usize, required: u64 },
}
