//! Proptest generators for property-based testing.

use proptest::prelude::*;

use riskguard_core::{Address, ConfigDigest, Keypair, MerkleRoot};
use riskguard_curse::{CurseSubject, GLOBAL_CURSE_SUBJECT, LEGACY_CURSE_SUBJECT};

/// Generate a random keypair.
pub fn keypair() -> impl Strategy<Value = Keypair> {
    any::<[u8; 32]>().prop_filter_map("seed outside scalar range", |seed| {
        Keypair::from_seed(&seed).ok()
    })
}

/// Generate a random Address.
pub fn address() -> impl Strategy<Value = Address> {
    any::<[u8; 20]>().prop_map(Address::from_bytes)
}

/// Generate a non-zero ConfigDigest.
pub fn config_digest() -> impl Strategy<Value = ConfigDigest> {
    any::<[u8; 32]>()
        .prop_filter("zero digest", |b| b.iter().any(|&x| x != 0))
        .prop_map(ConfigDigest::from_bytes)
}

/// Generate a subject derived from a chain selector.
pub fn chain_subject() -> impl Strategy<Value = CurseSubject> {
    any::<u64>().prop_map(CurseSubject::from_chain_selector)
}

/// Generate any subject, including the sentinels.
pub fn subject() -> impl Strategy<Value = CurseSubject> {
    prop_oneof![
        8 => any::<[u8; 16]>().prop_map(CurseSubject::from_bytes),
        1 => Just(GLOBAL_CURSE_SUBJECT),
        1 => Just(LEGACY_CURSE_SUBJECT),
    ]
}

/// Generate a commitment with a `min <= max` sequence range.
pub fn merkle_root() -> impl Strategy<Value = MerkleRoot> {
    (
        any::<u64>(),
        prop::collection::vec(any::<u8>(), 0..=64),
        any::<u64>(),
        0u64..1_000,
        any::<[u8; 32]>(),
    )
        .prop_map(|(selector, on_ramp, min, span, root)| {
            MerkleRoot::new(selector, on_ramp, min, min.saturating_add(span), root)
        })
}

/// Generate up to `max_len` commitments.
pub fn merkle_roots(max_len: usize) -> impl Strategy<Value = Vec<MerkleRoot>> {
    prop::collection::vec(merkle_root(), 0..=max_len)
}
