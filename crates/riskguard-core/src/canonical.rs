//! Canonical binary encoding and the report digest.
//!
//! Layouts (all integers big-endian, lengths as u64):
//!
//! - `Signer = address(20) || node_index(8)`
//! - `Config = digest(32) || count(8) || Signer* || f(8)`
//! - `VersionedConfig = version(4) || Config`
//! - `EcdsaSignature = r(32) || s(32) || v(1)`
//!
//! Decoding is strict: truncated input and trailing bytes are errors.
//!
//! The report digest is streamed straight into the hasher so that
//! verification does not allocate an encoding buffer.

use sha3::{Digest, Keccak256};

use crate::config::{Config, Signer, VersionedConfig};
use crate::crypto::{EcdsaSignature, Keccak256Hash};
use crate::error::CoreError;
use crate::report::{MerkleRoot, ReportHeader, REPORT_DOMAIN_LABEL};
use crate::types::{Address, ConfigDigest};

/// Types with a fixed, deterministic binary layout.
pub trait Canonical: Sized {
    /// Append the canonical encoding to `out`.
    fn encode_to(&self, out: &mut Vec<u8>);

    /// Decode one value from the front of `reader`.
    fn decode_from(reader: &mut Reader<'_>) -> Result<Self, CoreError>;

    /// Encode into a fresh buffer.
    fn to_canonical_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.encode_to(&mut out);
        out
    }

    /// Decode from a buffer that must contain exactly one value.
    fn from_canonical_bytes(bytes: &[u8]) -> Result<Self, CoreError> {
        let mut reader = Reader::new(bytes);
        let value = Self::decode_from(&mut reader)?;
        reader.finish()?;
        Ok(value)
    }
}

/// A forward-only cursor over an input buffer.
#[derive(Debug)]
pub struct Reader<'a> {
    buf: &'a [u8],
}

impl<'a> Reader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }

    /// Take the next `n` bytes.
    pub fn take(&mut self, n: usize) -> Result<&'a [u8], CoreError> {
        if self.buf.len() < n {
            return Err(CoreError::Truncated {
                needed: n,
                remaining: self.buf.len(),
            });
        }
        let (head, tail) = self.buf.split_at(n);
        self.buf = tail;
        Ok(head)
    }

    pub fn array<const N: usize>(&mut self) -> Result<[u8; N], CoreError> {
        let mut arr = [0u8; N];
        arr.copy_from_slice(self.take(N)?);
        Ok(arr)
    }

    pub fn u8(&mut self) -> Result<u8, CoreError> {
        Ok(self.take(1)?[0])
    }

    pub fn u32(&mut self) -> Result<u32, CoreError> {
        Ok(u32::from_be_bytes(self.array()?))
    }

    pub fn u64(&mut self) -> Result<u64, CoreError> {
        Ok(u64::from_be_bytes(self.array()?))
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.buf.len()
    }

    /// Fail if any input is left over.
    pub fn finish(self) -> Result<(), CoreError> {
        if self.buf.is_empty() {
            Ok(())
        } else {
            Err(CoreError::TrailingBytes(self.buf.len()))
        }
    }
}

impl Canonical for Signer {
    fn encode_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(self.public_key.as_bytes());
        out.extend_from_slice(&self.node_index.to_be_bytes());
    }

    fn decode_from(reader: &mut Reader<'_>) -> Result<Self, CoreError> {
        Ok(Signer {
            public_key: Address(reader.array()?),
            node_index: reader.u64()?,
        })
    }
}

impl Canonical for Config {
    fn encode_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(self.digest.as_bytes());
        out.extend_from_slice(&(self.signers.len() as u64).to_be_bytes());
        for signer in &self.signers {
            signer.encode_to(out);
        }
        out.extend_from_slice(&self.f.to_be_bytes());
    }

    fn decode_from(reader: &mut Reader<'_>) -> Result<Self, CoreError> {
        let digest = ConfigDigest(reader.array()?);
        let count = reader.u64()?;

        // Bound the allocation by what the input can actually hold.
        let needed = count.saturating_mul(Signer::ENCODED_LEN as u64);
        if needed > reader.remaining() as u64 {
            return Err(CoreError::Truncated {
                needed: usize::try_from(needed).unwrap_or(usize::MAX),
                remaining: reader.remaining(),
            });
        }

        let mut signers = Vec::with_capacity(count as usize);
        for _ in 0..count {
            signers.push(Signer::decode_from(reader)?);
        }
        let f = reader.u64()?;

        Ok(Config { digest, signers, f })
    }
}

impl Canonical for VersionedConfig {
    fn encode_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.version.to_be_bytes());
        self.config.encode_to(out);
    }

    fn decode_from(reader: &mut Reader<'_>) -> Result<Self, CoreError> {
        let version = reader.u32()?;
        let config = Config::decode_from(reader)?;
        Ok(VersionedConfig { version, config })
    }
}

impl Canonical for EcdsaSignature {
    fn encode_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.r);
        out.extend_from_slice(&self.s);
        out.push(self.v);
    }

    fn decode_from(reader: &mut Reader<'_>) -> Result<Self, CoreError> {
        Ok(EcdsaSignature {
            r: reader.array()?,
            s: reader.array()?,
            v: reader.u8()?,
        })
    }
}

/// The domain separator prefixed to every report digest.
pub fn report_domain() -> Keccak256Hash {
    Keccak256Hash::hash(REPORT_DOMAIN_LABEL)
}

/// Compute the digest signers attest to for a batch of commitments.
///
/// Binds the guard instance (via `header`), the caller submitting the batch,
/// and the digest of the config the signers were selected under, so a
/// signature cannot be replayed across guards, callers, or config epochs.
pub fn report_digest(
    header: &ReportHeader,
    caller: &Address,
    config_digest: &ConfigDigest,
    roots: &[MerkleRoot],
) -> Keccak256Hash {
    let mut hasher = Keccak256::new();
    hasher.update(report_domain().as_bytes());
    hasher.update(header.local_chain_selector.to_be_bytes());
    hasher.update(header.guard_address.as_bytes());
    hasher.update(caller.as_bytes());
    hasher.update(config_digest.as_bytes());
    hasher.update((roots.len() as u64).to_be_bytes());
    for root in roots {
        hasher.update(root.source_chain_selector.to_be_bytes());
        hasher.update((root.on_ramp_address.len() as u64).to_be_bytes());
        hasher.update(&root.on_ramp_address);
        hasher.update(root.min_seq_nr.to_be_bytes());
        hasher.update(root.max_seq_nr.to_be_bytes());
        hasher.update(root.merkle_root);
    }

    let mut out = [0u8; 32];
    out.copy_from_slice(&hasher.finalize());
    Keccak256Hash(out)
}
