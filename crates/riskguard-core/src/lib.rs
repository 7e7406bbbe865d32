//! # Riskguard Core
//!
//! Pure primitives for Riskguard: signer configurations, report digests and
//! quorum signature verification.
//!
//! This crate contains no I/O, no storage, no locking. It is pure computation
//! over cryptographic data structures.
//!
//! ## Key Types
//!
//! - [`Config`] / [`VersionedConfig`] - A signer set with fault tolerance `f`
//! - [`ConfigStore`] - The single slot holding the installed config
//! - [`SignatureVerifier`] - Checks that a batch carries `f + 1` ordered signatures
//! - [`MerkleRoot`] - One commitment in a signed batch
//! - [`Address`] - 20-byte signer / caller identity
//!
//! ## Canonicalization
//!
//! Configs and signatures have a fixed binary layout, and the report digest
//! has a versioned, domain-separated encoding. See [`canonical`] module.

pub mod canonical;
pub mod config;
pub mod crypto;
pub mod error;
pub mod report;
pub mod types;
pub mod verification;

pub use canonical::{report_digest, report_domain, Canonical, Reader};
pub use config::{validate_config, Config, ConfigStore, Signer, VersionedConfig};
pub use crypto::{address_of, EcdsaSignature, Keccak256Hash, Keypair};
pub use error::{ConfigError, CoreError, VerifyError};
pub use report::{MerkleRoot, ReportHeader, REPORT_DOMAIN_LABEL};
pub use types::{Address, ChainSelector, ConfigDigest};
pub use verification::SignatureVerifier;
