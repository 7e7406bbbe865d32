//! In-memory implementation of the Store trait.
//!
//! This is primarily for testing. It has the same semantics as SQLite
//! but keeps everything in memory with no persistence.

use std::collections::BTreeSet;
use std::sync::RwLock;

use async_trait::async_trait;

use riskguard_core::VersionedConfig;
use riskguard_curse::CurseSubject;

use crate::error::{Result, StoreError};
use crate::traits::{OwnershipRecord, Store};

/// In-memory store implementation.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<MemoryStoreInner>,
}

#[derive(Default)]
struct MemoryStoreInner {
    ownership: Option<OwnershipRecord>,
    config: Option<VersionedConfig>,
    cursed: BTreeSet<CurseSubject>,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get_ownership(&self) -> Result<Option<OwnershipRecord>> {
        let inner = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        Ok(inner.ownership)
    }

    async fn put_ownership(&self, record: &OwnershipRecord) -> Result<()> {
        let mut inner = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        inner.ownership = Some(*record);
        Ok(())
    }

    async fn get_config(&self) -> Result<Option<VersionedConfig>> {
        let inner = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        Ok(inner.config.clone())
    }

    async fn put_config(&self, config: &VersionedConfig) -> Result<()> {
        let mut inner = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        inner.config = Some(config.clone());
        Ok(())
    }

    async fn get_cursed_subjects(&self) -> Result<Vec<CurseSubject>> {
        let inner = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        Ok(inner.cursed.iter().copied().collect())
    }

    async fn insert_cursed(&self, subjects: &[CurseSubject]) -> Result<()> {
        let mut inner = self.inner.write().map_err(|_| StoreError::Poisoned)?;

        if let Some(subject) = subjects.iter().find(|s| inner.cursed.contains(s)) {
            return Err(StoreError::InvalidData(format!(
                "subject {} already recorded as cursed",
                subject
            )));
        }

        inner.cursed.extend(subjects.iter().copied());
        Ok(())
    }

    async fn remove_cursed(&self, subjects: &[CurseSubject]) -> Result<()> {
        let mut inner = self.inner.write().map_err(|_| StoreError::Poisoned)?;

        if let Some(subject) = subjects.iter().find(|s| !inner.cursed.contains(s)) {
            return Err(StoreError::InvalidData(format!(
                "subject {} not recorded as cursed",
                subject
            )));
        }

        for subject in subjects {
            inner.cursed.remove(subject);
        }
        Ok(())
    }
}
