//! Golden test vectors for deterministic verification.
//!
//! These vectors pin the report digest layout and the secp256k1 address
//! derivation. Any implementation producing signatures for a guard must
//! reproduce them byte for byte.

use serde::{Deserialize, Serialize};

use riskguard_core::{
    report_digest, Address, ConfigDigest, Keccak256Hash, Keypair, MerkleRoot, ReportHeader,
};

/// One commitment inside a digest vector. Byte fields are hex without prefix.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RootVector {
    pub source_chain_selector: u64,
    pub on_ramp_address: String,
    pub min_seq_nr: u64,
    pub max_seq_nr: u64,
    pub merkle_root: String,
}

/// A golden report digest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DigestVector {
    /// Human-readable name for the vector.
    pub name: String,
    pub local_chain_selector: u64,
    pub guard_address: String,
    pub caller: String,
    pub config_digest: String,
    pub roots: Vec<RootVector>,
    /// Expected digest (hex).
    pub expected_digest: String,
}

/// A golden signer address for a fixed secret scalar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignerVector {
    /// Every byte of the 32-byte secret.
    pub seed_byte: u8,
    pub expected_address: String,
}

fn root(
    selector: u64,
    on_ramp: &[u8],
    min_seq_nr: u64,
    max_seq_nr: u64,
    merkle_root: [u8; 32],
) -> RootVector {
    RootVector {
        source_chain_selector: selector,
        on_ramp_address: hex::encode(on_ramp),
        min_seq_nr,
        max_seq_nr,
        merkle_root: hex::encode(merkle_root),
    }
}

/// Get all golden digest vectors.
pub fn all_digest_vectors() -> Vec<DigestVector> {
    vec![
        DigestVector {
            name: "empty batch".into(),
            local_chain_selector: 1,
            guard_address: hex::encode([0x11; 20]),
            caller: hex::encode([0x22; 20]),
            config_digest: hex::encode([0x33; 32]),
            roots: vec![],
            expected_digest: "fb28cf8fae3b8dafbb14f24e9010613df92fb04a66d177efb7170cbea81df61d"
                .into(),
        },
        DigestVector {
            name: "single root".into(),
            local_chain_selector: 5009297550715157269,
            guard_address: hex::encode([0xaa; 20]),
            caller: hex::encode([0xbb; 20]),
            config_digest: hex::encode([0xcc; 32]),
            roots: vec![root(16015286601757825753, &[0x01; 20], 1, 100, [0x0d; 32])],
            expected_digest: "80b196ba4f8bd4d1209f85bb9852e683a190a1d35b4bbb9fd0e23c8ea73a02a6"
                .into(),
        },
        DigestVector {
            name: "two roots, empty on-ramp".into(),
            local_chain_selector: 3478487238524512106,
            guard_address: hex::encode([0x01; 20]),
            caller: hex::encode([0x02; 20]),
            config_digest: hex::encode([0x03; 32]),
            roots: vec![
                root(1, &[], 7, 7, [0xee; 32]),
                root(2, &[0xff; 32], 10, 20, [0x00; 32]),
            ],
            expected_digest: "5bfd8dab4c0a727fab89a4a460947a2733884ad1663a2d78df4508b661317a4b"
                .into(),
        },
    ]
}

/// Get all golden signer vectors.
pub fn all_signer_vectors() -> Vec<SignerVector> {
    [
        (1, "1a642f0e3c3af545e7acbd38b07251b3990914f1"),
        (2, "5050a4f4b3f9338c3472dcc01a87c76a144b3c9c"),
        (3, "3325a78425f17a7e487eb5666b2bfd93abb06c70"),
        (4, "c48b812bb43401392c037381aca934f4069c0517"),
        (5, "d09ad14080d4b257a819a4f579b8485be88f086c"),
        (6, "0cb030d11a8be48b60418857874deee61d1071e0"),
        (7, "4a62316623ad457f02cdc5d997ded67a383ec569"),
    ]
    .into_iter()
    .map(|(seed_byte, address)| SignerVector {
        seed_byte,
        expected_address: address.into(),
    })
    .collect()
}

fn decode_array<const N: usize>(field: &str, s: &str) -> Result<[u8; N], String> {
    let bytes = hex::decode(s).map_err(|e| format!("{}: {}", field, e))?;
    bytes
        .try_into()
        .map_err(|b: Vec<u8>| format!("{}: expected {} bytes, got {}", field, N, b.len()))
}

/// Compute the digest described by a vector.
pub fn compute_digest(vector: &DigestVector) -> Result<Keccak256Hash, String> {
    let header = ReportHeader::new(
        vector.local_chain_selector,
        Address::from_bytes(decode_array("guard_address", &vector.guard_address)?),
    );
    let caller = Address::from_bytes(decode_array("caller", &vector.caller)?);
    let config_digest =
        ConfigDigest::from_bytes(decode_array("config_digest", &vector.config_digest)?);

    let roots = vector
        .roots
        .iter()
        .map(|r| -> Result<MerkleRoot, String> {
            Ok(MerkleRoot::new(
                r.source_chain_selector,
                hex::decode(&r.on_ramp_address).map_err(|e| format!("on_ramp_address: {}", e))?,
                r.min_seq_nr,
                r.max_seq_nr,
                decode_array("merkle_root", &r.merkle_root)?,
            ))
        })
        .collect::<Result<Vec<_>, String>>()?;

    Ok(report_digest(&header, &caller, &config_digest, &roots))
}

/// Verify all golden vectors against the current implementation.
pub fn verify_all_vectors() -> Result<(), String> {
    for vector in all_digest_vectors() {
        let actual = hex::encode(compute_digest(&vector)?.as_bytes());
        if actual != vector.expected_digest {
            return Err(format!(
                "{}: expected {}, got {}",
                vector.name, vector.expected_digest, actual
            ));
        }
    }

    for vector in all_signer_vectors() {
        let keypair = Keypair::from_seed(&[vector.seed_byte; 32]).map_err(|e| e.to_string())?;
        let actual = hex::encode(keypair.address().as_bytes());
        if actual != vector.expected_address {
            return Err(format!(
                "seed {:#04x}: expected {}, got {}",
                vector.seed_byte, vector.expected_address, actual
            ));
        }
    }

    Ok(())
}

/// Print vectors as JSON for other implementations.
pub fn vectors_as_json() -> serde_json::Result<String> {
    serde_json::to_string_pretty(&serde_json::json!({
        "digests": all_digest_vectors(),
        "signers": all_signer_vectors(),
    }))
}
