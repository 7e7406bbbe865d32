//! Cryptographic primitives for Riskguard.
//!
//! Wraps secp256k1 ECDSA public key recovery and Keccak-256 hashing with
//! strong types. Signer identities are Ethereum-style addresses: the last
//! 20 bytes of the Keccak-256 hash of the uncompressed public key.

use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};
use std::fmt;

use crate::error::CoreError;
use crate::types::Address;

/// A 32-byte Keccak-256 hash.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Keccak256Hash(pub [u8; 32]);

impl Keccak256Hash {
    /// Compute the Keccak-256 hash of the given data.
    pub fn hash(data: &[u8]) -> Self {
        let mut out = [0u8; 32];
        out.copy_from_slice(&Keccak256::digest(data));
        Self(out)
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for Keccak256Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Keccak256({})", &self.to_hex()[..16])
    }
}

impl AsRef<[u8]> for Keccak256Hash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for Keccak256Hash {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

/// A recoverable secp256k1 signature over a 32-byte digest.
///
/// `v` is the recovery id, accepted either raw (`0`, `1`) or with the
/// Ethereum offset (`27`, `28`).
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EcdsaSignature {
    pub r: [u8; 32],
    pub s: [u8; 32],
    pub v: u8,
}

impl EcdsaSignature {
    /// Encoded length: r || s || v.
    pub const LEN: usize = 65;

    /// Create from parts.
    pub const fn new(r: [u8; 32], s: [u8; 32], v: u8) -> Self {
        Self { r, s, v }
    }

    /// Recover the address that produced this signature over `digest`.
    ///
    /// Rejects zero or out-of-range scalars, high-s signatures and unknown
    /// recovery ids before attempting recovery.
    pub fn recover(&self, digest: &Keccak256Hash) -> Result<Address, CoreError> {
        let recovery_id = parse_recovery_id(self.v)?;

        let mut bytes = [0u8; 64];
        bytes[..32].copy_from_slice(&self.r);
        bytes[32..].copy_from_slice(&self.s);
        let signature =
            Signature::from_slice(&bytes).map_err(|_| CoreError::MalformedSignature)?;

        if signature.normalize_s().is_some() {
            return Err(CoreError::MalleableSignature);
        }

        let key = VerifyingKey::recover_from_prehash(digest.as_bytes(), &signature, recovery_id)
            .map_err(|_| CoreError::RecoveryFailed)?;

        Ok(address_of(&key))
    }

    /// Convert to hex string (r || s || v).
    pub fn to_hex(&self) -> String {
        let mut buf = Vec::with_capacity(Self::LEN);
        buf.extend_from_slice(&self.r);
        buf.extend_from_slice(&self.s);
        buf.push(self.v);
        hex::encode(buf)
    }
}

impl fmt::Debug for EcdsaSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EcdsaSig({}...)", &self.to_hex()[..16])
    }
}

fn parse_recovery_id(v: u8) -> Result<RecoveryId, CoreError> {
    let normalized = match v {
        0 | 27 => 0,
        1 | 28 => 1,
        other => return Err(CoreError::InvalidRecoveryId(other)),
    };
    RecoveryId::from_byte(normalized).ok_or(CoreError::InvalidRecoveryId(v))
}

/// Derive the address of a secp256k1 public key.
pub fn address_of(key: &VerifyingKey) -> Address {
    let point = key.to_encoded_point(false);
    // Skip the 0x04 uncompressed-point tag.
    let hash = Keccak256Hash::hash(&point.as_bytes()[1..]);
    let mut address = [0u8; 20];
    address.copy_from_slice(&hash.0[12..]);
    Address(address)
}

/// A secp256k1 keypair for producing report signatures.
///
/// Production signer keys live outside this crate; this type exists for
/// fixtures, tooling and tests.
#[derive(Clone)]
pub struct Keypair {
    signing_key: SigningKey,
}

impl Keypair {
    /// Generate a new random keypair.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        Self {
            signing_key: SigningKey::random(&mut rng),
        }
    }

    /// Create from a 32-byte secret scalar.
    ///
    /// Fails if the seed is zero or not below the curve order.
    pub fn from_seed(seed: &[u8; 32]) -> Result<Self, CoreError> {
        let signing_key = SigningKey::from_slice(seed).map_err(|_| CoreError::InvalidSecretKey)?;
        Ok(Self { signing_key })
    }

    /// Get the signer address.
    pub fn address(&self) -> Address {
        address_of(self.signing_key.verifying_key())
    }

    /// Sign a 32-byte digest, producing a low-s recoverable signature.
    pub fn sign_digest(&self, digest: &Keccak256Hash) -> Result<EcdsaSignature, CoreError> {
        let (mut signature, mut recovery_id) = self
            .signing_key
            .sign_prehash_recoverable(digest.as_bytes())
            .map_err(|_| CoreError::SigningFailed)?;

        if let Some(normalized) = signature.normalize_s() {
            signature = normalized;
            recovery_id = RecoveryId::new(!recovery_id.is_y_odd(), recovery_id.is_x_reduced());
        }

        let bytes = signature.to_bytes();
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[..32]);
        s.copy_from_slice(&bytes[32..]);

        Ok(EcdsaSignature::new(r, s, 27 + recovery_id.to_byte()))
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Keypair({})", self.address())
    }
}
