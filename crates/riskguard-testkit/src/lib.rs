//! # Riskguard Testkit
//!
//! Testing utilities for Riskguard.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Fixtures**: deterministic signer committees and sample commitments
//! - **Generators**: Proptest strategies for property-based testing
//! - **Golden vectors**: report digests and signer addresses with known values
//!
//! ## Test Fixtures
//!
//! ```rust
//! use riskguard_core::{Address, ReportHeader, SignatureVerifier, VersionedConfig};
//! use riskguard_testkit::fixtures::{sample_roots, Committee};
//!
//! let committee = Committee::new(4);
//! let config = VersionedConfig { version: 1, config: committee.config(1) };
//! let verifier = SignatureVerifier::new(ReportHeader::new(1, Address::ZERO));
//!
//! let caller = Address::from_bytes([0x0c; 20]);
//! let digest = verifier.digest(&config, &caller, &sample_roots());
//! let signatures = committee.sign(&[0, 2], &digest);
//!
//! assert!(verifier.verify(&config, &caller, &sample_roots(), &signatures).is_ok());
//! ```
//!
//! ## Golden Vectors
//!
//! ```rust
//! use riskguard_testkit::vectors::verify_all_vectors;
//!
//! verify_all_vectors().unwrap();
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{sample_roots, Committee};
pub use vectors::{all_digest_vectors, all_signer_vectors, verify_all_vectors, DigestVector};
