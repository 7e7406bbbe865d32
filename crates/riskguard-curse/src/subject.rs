//! Curse subjects and the two reserved sentinels.

use serde::{Deserialize, Serialize};
use std::fmt;

use riskguard_core::{Canonical, ChainSelector, CoreError, Reader};

/// A 16-byte opaque scope that can be cursed.
///
/// Application subjects are usually derived from a chain selector with
/// [`CurseSubject::from_chain_selector`]. Two values are reserved, see
/// [`LEGACY_CURSE_SUBJECT`] and [`GLOBAL_CURSE_SUBJECT`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CurseSubject(pub [u8; 16]);

/// Backward-compatible whole-system halt.
///
/// Satisfies the global [`is_cursed`](crate::CurseRegistry::is_cursed)
/// check but not per-subject checks.
pub const LEGACY_CURSE_SUBJECT: CurseSubject =
    CurseSubject([0x01, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0x00]);

/// Halts everything: the global check and every per-subject check.
pub const GLOBAL_CURSE_SUBJECT: CurseSubject =
    CurseSubject([0x01, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0x01]);

impl CurseSubject {
    /// Length of a subject in bytes.
    pub const LEN: usize = 16;

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// The subject for a chain: the big-endian selector in the low 8 bytes.
    pub const fn from_chain_selector(selector: ChainSelector) -> Self {
        let be = selector.to_be_bytes();
        let mut bytes = [0u8; 16];
        let mut i = 0;
        while i < 8 {
            bytes[8 + i] = be[i];
            i += 1;
        }
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// Whether this is one of the two reserved subjects.
    pub fn is_sentinel(&self) -> bool {
        *self == GLOBAL_CURSE_SUBJECT || *self == LEGACY_CURSE_SUBJECT
    }

    /// Convert to a `0x`-prefixed hex string.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// Parse from a hex string, with or without the `0x` prefix.
    pub fn from_hex(s: &str) -> Result<Self, CoreError> {
        let bytes = hex::decode(s.trim_start_matches("0x"))?;
        let arr: [u8; 16] = bytes
            .try_into()
            .map_err(|_| hex::FromHexError::InvalidStringLength)?;
        Ok(Self(arr))
    }
}

impl fmt::Debug for CurseSubject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            GLOBAL_CURSE_SUBJECT => f.write_str("CurseSubject(GLOBAL)"),
            LEGACY_CURSE_SUBJECT => f.write_str("CurseSubject(LEGACY)"),
            _ => write!(f, "CurseSubject({})", self.to_hex()),
        }
    }
}

impl fmt::Display for CurseSubject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl From<[u8; 16]> for CurseSubject {
    fn from(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }
}

impl Canonical for CurseSubject {
    fn encode_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.0);
    }

    fn decode_from(reader: &mut Reader<'_>) -> Result<Self, CoreError> {
        Ok(Self(reader.array()?))
    }
}
