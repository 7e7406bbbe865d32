//! Test fixtures and helpers.
//!
//! Common setup code for unit and integration tests.

use riskguard_core::{
    Address, Config, ConfigDigest, EcdsaSignature, Keccak256Hash, Keypair, MerkleRoot, Signer,
};
use riskguard_curse::CurseSubject;

/// A deterministic signer committee.
///
/// Member `i` (1-based) holds the secret scalar `[i; 32]`. Members are kept
/// sorted by address, so `sign` with ascending indices yields signatures in
/// the order verification requires.
#[derive(Debug, Clone)]
pub struct Committee {
    keypairs: Vec<Keypair>,
}

impl Committee {
    /// A committee of `n` members (`n` at most 255).
    pub fn new(n: u8) -> Self {
        let mut keypairs: Vec<Keypair> = (1..=n)
            .map(|i| Keypair::from_seed(&[i; 32]).expect("non-zero seed below curve order"))
            .collect();
        keypairs.sort_by_key(|k| k.address());
        Self { keypairs }
    }

    pub fn len(&self) -> usize {
        self.keypairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keypairs.is_empty()
    }

    /// The member at `index` in address order.
    pub fn keypair(&self, index: usize) -> &Keypair {
        &self.keypairs[index]
    }

    /// Member addresses, ascending.
    pub fn addresses(&self) -> Vec<Address> {
        self.keypairs.iter().map(Keypair::address).collect()
    }

    /// Members as signers, with node indexes following address order.
    pub fn signers(&self) -> Vec<Signer> {
        self.keypairs
            .iter()
            .enumerate()
            .map(|(i, k)| Signer::new(k.address(), i as u64))
            .collect()
    }

    /// A config over the whole committee with a fixed non-zero digest.
    pub fn config(&self, f: u64) -> Config {
        self.config_with_digest(ConfigDigest::from_bytes([0x5a; 32]), f)
    }

    pub fn config_with_digest(&self, digest: ConfigDigest, f: u64) -> Config {
        Config::new(digest, self.signers(), f)
    }

    /// Signatures over `digest` by the members at `indices`, in the given order.
    pub fn sign(&self, indices: &[usize], digest: &Keccak256Hash) -> Vec<EcdsaSignature> {
        indices
            .iter()
            .map(|&i| {
                self.keypairs[i]
                    .sign_digest(digest)
                    .expect("signing a prehash with a valid key")
            })
            .collect()
    }

    /// Signatures by the first `count` members, ascending.
    pub fn sign_first(&self, count: usize, digest: &Keccak256Hash) -> Vec<EcdsaSignature> {
        let indices: Vec<usize> = (0..count).collect();
        self.sign(&indices, digest)
    }
}

/// An address filled with `byte`.
pub fn address(byte: u8) -> Address {
    Address::from_bytes([byte; 20])
}

/// The curse subject for `selector`.
pub fn subject(selector: u64) -> CurseSubject {
    CurseSubject::from_chain_selector(selector)
}

/// Two commitments from different source chains.
pub fn sample_roots() -> Vec<MerkleRoot> {
    vec![
        MerkleRoot::new(16015286601757825753, vec![0x01; 20], 1, 64, [0x0d; 32]),
        MerkleRoot::new(5009297550715157269, vec![0x02; 32], 100, 120, [0x0e; 32]),
    ]
}
