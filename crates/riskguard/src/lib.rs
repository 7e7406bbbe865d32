//! # Riskguard
//!
//! The unified API for Riskguard: quorum signature verification over
//! cross-chain commitments, plus an owner-controlled curse registry.
//!
//! ## Overview
//!
//! A [`Guard`] owns three pieces of state:
//!
//! - **Signer config**: a versioned set of signer addresses with fault
//!   tolerance `f`; batches need `f + 1` valid, ordered signatures
//! - **Curses**: subjects whose traffic is halted, with GLOBAL and LEGACY
//!   sentinels for whole-system halts
//! - **Ownership**: the single address allowed to mutate the other two
//!
//! Every accepted mutation is written to a [`Store`] before it becomes
//! visible, then announced as a [`GuardEvent`].
//!
//! ## Usage
//!
//! ```rust,no_run
//! use riskguard::{Guard, GuardConfig};
//! use riskguard::core::Address;
//! use riskguard::curse::CurseSubject;
//! use riskguard::store::SqliteStore;
//!
//! async fn example() -> anyhow::Result<()> {
//!     let owner = Address::from_hex("0x7e5f4552091a69125d5dfcb7b8c2659029395bdf")?;
//!     let config = GuardConfig {
//!         local_chain_selector: 5009297550715157269,
//!         initial_owner: owner,
//!         ..Default::default()
//!     };
//!
//!     let guard = Guard::open(SqliteStore::open("guard.db")?, config).await?;
//!
//!     let source = CurseSubject::from_chain_selector(16015286601757825753);
//!     guard.curse(&owner, &[source]).await?;
//!     assert!(guard.is_subject_cursed(&source));
//!     Ok(())
//! }
//! ```
//!
//! ## Re-exports
//!
//! This crate re-exports the component crates for convenience:
//!
//! - `riskguard::core` - Configs, signatures, report digests
//! - `riskguard::curse` - Curse subjects and the registry
//! - `riskguard::store` - Storage abstraction and SQLite

pub mod access;
pub mod config;
pub mod error;
pub mod events;
pub mod guard;

// Re-export component crates
pub use riskguard_core as core;
pub use riskguard_curse as curse;
pub use riskguard_store as store;

// Re-export main types for convenience
pub use access::Ownership;
pub use config::GuardConfig;
pub use error::{GuardError, Result};
pub use events::GuardEvent;
pub use guard::{Guard, GuardState};

// Re-export commonly used component types
pub use riskguard_core::{
    Address, Config, ConfigDigest, EcdsaSignature, MerkleRoot, Signer, VersionedConfig,
};
pub use riskguard_curse::{CurseSubject, GLOBAL_CURSE_SUBJECT, LEGACY_CURSE_SUBJECT};
pub use riskguard_store::{MemoryStore, SqliteStore, Store};
