//! # Riskguard Store
//!
//! Storage abstraction for Riskguard. Provides a trait-based interface
//! for persisting guard state with SQLite and in-memory implementations.
//!
//! ## Overview
//!
//! The guard keeps three pieces of durable state: the ownership record, the
//! installed signer config and the cursed subject set. The [`Store`] trait
//! abstracts where these live. The primary implementation is
//! [`SqliteStore`], with [`MemoryStore`] for testing.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use riskguard_store::{SqliteStore, StoreExt};
//!
//! async fn example() {
//!     let store = SqliteStore::open("guard.db").unwrap();
//!     let state = store.load_state().await.unwrap();
//!     println!("{} cursed subjects", state.cursed.len());
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Validated upstream**: the guard rejects invalid mutations before they
//!   reach the store; the store only records accepted changes
//! - **Atomic writes**: multi-subject curse and uncurse run in one transaction
//! - **Canonical config**: the signer config is stored as its canonical bytes

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{OwnershipRecord, Store, StoreExt, StoredState};
