//! Quorum signature verification over a batch of commitments.
//!
//! Signatures must be supplied in strictly increasing order of their
//! recovered signer address. That single comparison against the previous
//! signer rejects both reordered and duplicated signatures, so the hot path
//! needs no sort and no seen-set. Membership uses a binary search over the
//! config's signer list, which is sorted at install time.

use crate::canonical::report_digest;
use crate::config::VersionedConfig;
use crate::crypto::{EcdsaSignature, Keccak256Hash};
use crate::error::VerifyError;
use crate::report::{MerkleRoot, ReportHeader};
use crate::types::Address;

/// Stateless verifier bound to one guard instance's report header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignatureVerifier {
    header: ReportHeader,
}

impl SignatureVerifier {
    pub const fn new(header: ReportHeader) -> Self {
        Self { header }
    }

    /// The header bound into every digest this verifier checks.
    pub const fn header(&self) -> &ReportHeader {
        &self.header
    }

    /// The digest signers must sign for `caller` and `roots` under `config`.
    pub fn digest(
        &self,
        config: &VersionedConfig,
        caller: &Address,
        roots: &[MerkleRoot],
    ) -> Keccak256Hash {
        report_digest(&self.header, caller, &config.config.digest, roots)
    }

    /// Verify that `signatures` carry a quorum of the configured signers
    /// over `roots` submitted by `caller`.
    ///
    /// Checks, in order:
    /// 1. a config has been installed;
    /// 2. each signature is well formed and recovers an address;
    /// 3. recovered addresses are strictly increasing;
    /// 4. each recovered address is a configured signer;
    /// 5. at least `f + 1` signatures passed.
    pub fn verify(
        &self,
        config: &VersionedConfig,
        caller: &Address,
        roots: &[MerkleRoot],
        signatures: &[EcdsaSignature],
    ) -> Result<(), VerifyError> {
        if !config.is_set() {
            return Err(VerifyError::ConfigNotSet);
        }

        let digest = self.digest(config, caller, roots);
        let valid = count_valid_signers(config, &digest, signatures)?;

        let required = config.config.quorum();
        if (valid as u64) < required {
            return Err(VerifyError::ThresholdNotMet { valid, required });
        }

        Ok(())
    }
}

fn count_valid_signers(
    config: &VersionedConfig,
    digest: &Keccak256Hash,
    signatures: &[EcdsaSignature],
) -> Result<usize, VerifyError> {
    let mut previous: Option<Address> = None;

    for (index, signature) in signatures.iter().enumerate() {
        let signer = signature
            .recover(digest)
            .map_err(|reason| VerifyError::InvalidSignature { index, reason })?;

        if previous.is_some_and(|prev| signer <= prev) {
            return Err(VerifyError::OutOfOrderSignatures { index });
        }

        if !config.config.is_signer(&signer) {
            return Err(VerifyError::UnexpectedSigner { index, signer });
        }

        previous = Some(signer);
    }

    Ok(signatures.len())
}
