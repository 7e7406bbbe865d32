//! Store trait: the abstract interface for guard state persistence.
//!
//! This trait allows the guard to be storage-agnostic. Implementations
//! include SQLite (primary) and in-memory (for tests).

use async_trait::async_trait;
use riskguard_core::{Address, VersionedConfig};
use riskguard_curse::CurseSubject;

use crate::error::Result;

/// Persisted access-control state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OwnershipRecord {
    /// The current owner.
    pub owner: Address,
    /// An address the owner proposed, pending its acceptance.
    pub pending_owner: Option<Address>,
}

/// Everything needed to rebuild a guard after restart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoredState {
    pub ownership: Option<OwnershipRecord>,
    pub config: Option<VersionedConfig>,
    pub cursed: Vec<CurseSubject>,
}

/// The Store trait: async interface for guard state persistence.
///
/// The guard validates every mutation before calling the store, so the
/// store only records accepted changes. Each write method must be atomic:
/// either the whole change is durable or none of it is.
#[async_trait]
pub trait Store: Send + Sync {
    // ─────────────────────────────────────────────────────────────────────────
    // Ownership
    // ─────────────────────────────────────────────────────────────────────────

    /// Get the persisted ownership, if any.
    async fn get_ownership(&self) -> Result<Option<OwnershipRecord>>;

    /// Replace the persisted ownership.
    async fn put_ownership(&self, record: &OwnershipRecord) -> Result<()>;

    // ─────────────────────────────────────────────────────────────────────────
    // Signer config
    // ─────────────────────────────────────────────────────────────────────────

    /// Get the installed config, if any has been installed.
    async fn get_config(&self) -> Result<Option<VersionedConfig>>;

    /// Replace the installed config.
    async fn put_config(&self, config: &VersionedConfig) -> Result<()>;

    // ─────────────────────────────────────────────────────────────────────────
    // Curses
    // ─────────────────────────────────────────────────────────────────────────

    /// All cursed subjects, ascending.
    async fn get_cursed_subjects(&self) -> Result<Vec<CurseSubject>>;

    /// Record `subjects` as cursed.
    async fn insert_cursed(&self, subjects: &[CurseSubject]) -> Result<()>;

    /// Record `subjects` as no longer cursed.
    async fn remove_cursed(&self, subjects: &[CurseSubject]) -> Result<()>;
}

/// Extension trait for common store patterns.
pub trait StoreExt: Store {
    /// Load the full persisted state.
    fn load_state(&self) -> impl std::future::Future<Output = Result<StoredState>> + Send;
}

impl<S: Store + ?Sized> StoreExt for S {
    async fn load_state(&self) -> Result<StoredState> {
        Ok(StoredState {
            ownership: self.get_ownership().await?,
            config: self.get_config().await?,
            cursed: self.get_cursed_subjects().await?,
        })
    }
}
