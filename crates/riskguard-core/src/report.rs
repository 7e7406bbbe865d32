//! Signed reports: the commitments a signer committee attests to.
//!
//! A report is never materialized as a struct on the wire. Signers sign the
//! digest computed by [`crate::canonical::report_digest`] over a
//! [`ReportHeader`], the caller, the active config digest and an ordered
//! slice of [`MerkleRoot`]s.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::types::{Address, ChainSelector};

/// Label hashed into the domain separator of every report digest.
///
/// Changing this label changes every digest; bump the version suffix when
/// the digest layout changes.
pub const REPORT_DOMAIN_LABEL: &[u8] = b"RISKGUARD_REPORT_V1";

/// A commitment to a contiguous range of messages from one source chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleRoot {
    /// The chain the committed messages originate from.
    pub source_chain_selector: ChainSelector,
    /// Address of the sending contract on the source chain, in that chain's
    /// native encoding.
    pub on_ramp_address: Bytes,
    /// First sequence number covered by the root (inclusive).
    pub min_seq_nr: u64,
    /// Last sequence number covered by the root (inclusive).
    pub max_seq_nr: u64,
    /// The merkle root over the message hashes.
    pub merkle_root: [u8; 32],
}

impl MerkleRoot {
    /// Create a new commitment.
    pub fn new(
        source_chain_selector: ChainSelector,
        on_ramp_address: impl Into<Bytes>,
        min_seq_nr: u64,
        max_seq_nr: u64,
        merkle_root: [u8; 32],
    ) -> Self {
        Self {
            source_chain_selector,
            on_ramp_address: on_ramp_address.into(),
            min_seq_nr,
            max_seq_nr,
            merkle_root,
        }
    }
}

/// The fixed part of every report digest for one guard instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportHeader {
    /// Selector of the chain this guard protects.
    pub local_chain_selector: ChainSelector,
    /// Identity of this guard instance.
    pub guard_address: Address,
}

impl ReportHeader {
    pub const fn new(local_chain_selector: ChainSelector, guard_address: Address) -> Self {
        Self {
            local_chain_selector,
            guard_address,
        }
    }
}
