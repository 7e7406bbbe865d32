//! SQLite implementation of the Store trait.
//!
//! This is the primary storage backend for Riskguard. It uses rusqlite
//! with bundled SQLite, wrapped in async via tokio::spawn_blocking.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};

use riskguard_core::{Address, Canonical, VersionedConfig};
use riskguard_curse::CurseSubject;

use crate::error::{Result, StoreError};
use crate::migration::{self, now_millis};
use crate::traits::{OwnershipRecord, Store};

/// SQLite-based store implementation.
///
/// Thread-safe via internal Mutex. All operations use spawn_blocking
/// to avoid blocking the async runtime.
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut conn = Connection::open(path)?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory SQLite database.
    ///
    /// Useful for testing.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` against the connection on the blocking pool.
    async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.conn.clone();

        tokio::task::spawn_blocking(move || {
            let mut conn = conn.lock().map_err(|_| StoreError::Poisoned)?;
            f(&mut conn)
        })
        .await
        .map_err(|e| StoreError::Task(e.to_string()))?
    }
}

fn address_from_blob(column: &str, bytes: Vec<u8>) -> Result<Address> {
    let bytes: [u8; 20] = bytes.try_into().map_err(|b: Vec<u8>| {
        StoreError::InvalidData(format!("{} has {} bytes, expected 20", column, b.len()))
    })?;
    Ok(Address::from_bytes(bytes))
}

#[async_trait]
impl Store for SqliteStore {
    async fn get_ownership(&self) -> Result<Option<OwnershipRecord>> {
        self.run(|conn| {
            let row: Option<(Vec<u8>, Option<Vec<u8>>)> = conn
                .query_row(
                    "SELECT owner, pending_owner FROM guard_owner WHERE id = 0",
                    [],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()?;

            row.map(|(owner, pending)| -> Result<OwnershipRecord> {
                Ok(OwnershipRecord {
                    owner: address_from_blob("owner", owner)?,
                    pending_owner: pending
                        .map(|p| address_from_blob("pending_owner", p))
                        .transpose()?,
                })
            })
            .transpose()
        })
        .await
    }

    async fn put_ownership(&self, record: &OwnershipRecord) -> Result<()> {
        let record = *record;

        self.run(move |conn| {
            conn.execute(
                "INSERT INTO guard_owner (id, owner, pending_owner, updated_at)
                 VALUES (0, ?1, ?2, ?3)
                 ON CONFLICT(id) DO UPDATE SET
                    owner = excluded.owner,
                    pending_owner = excluded.pending_owner,
                    updated_at = excluded.updated_at",
                params![
                    record.owner.as_bytes().as_slice(),
                    record.pending_owner.as_ref().map(|p| p.as_bytes().as_slice()),
                    now_millis(),
                ],
            )?;
            Ok(())
        })
        .await
    }

    async fn get_config(&self) -> Result<Option<VersionedConfig>> {
        self.run(|conn| {
            let row: Option<(u32, Vec<u8>)> = conn
                .query_row(
                    "SELECT version, config FROM guard_config WHERE id = 0",
                    [],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()?;

            let Some((version, bytes)) = row else {
                return Ok(None);
            };

            let config = VersionedConfig::from_canonical_bytes(&bytes)?;
            if config.version != version {
                return Err(StoreError::InvalidData(format!(
                    "config row version {} does not match encoded version {}",
                    version, config.version
                )));
            }
            Ok(Some(config))
        })
        .await
    }

    async fn put_config(&self, config: &VersionedConfig) -> Result<()> {
        let version = config.version;
        let bytes = config.to_canonical_bytes();

        self.run(move |conn| {
            conn.execute(
                "INSERT INTO guard_config (id, version, config, installed_at)
                 VALUES (0, ?1, ?2, ?3)
                 ON CONFLICT(id) DO UPDATE SET
                    version = excluded.version,
                    config = excluded.config,
                    installed_at = excluded.installed_at",
                params![version, bytes, now_millis()],
            )?;
            Ok(())
        })
        .await
    }

    async fn get_cursed_subjects(&self) -> Result<Vec<CurseSubject>> {
        self.run(|conn| {
            let mut stmt = conn.prepare("SELECT subject FROM cursed_subjects ORDER BY subject")?;
            let blobs = stmt
                .query_map([], |row| row.get::<_, Vec<u8>>(0))?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            blobs
                .iter()
                .map(|blob| CurseSubject::from_canonical_bytes(blob).map_err(StoreError::from))
                .collect()
        })
        .await
    }

    async fn insert_cursed(&self, subjects: &[CurseSubject]) -> Result<()> {
        let subjects = subjects.to_vec();

        self.run(move |conn| {
            let tx = conn.transaction()?;
            let at = now_millis();

            for subject in &subjects {
                tx.execute(
                    "INSERT INTO cursed_subjects (subject, cursed_at) VALUES (?1, ?2)",
                    params![subject.as_bytes().as_slice(), at],
                )?;
            }

            tx.commit()?;
            Ok(())
        })
        .await
    }

    async fn remove_cursed(&self, subjects: &[CurseSubject]) -> Result<()> {
        let subjects = subjects.to_vec();

        self.run(move |conn| {
            let tx = conn.transaction()?;

            for subject in &subjects {
                let removed = tx.execute(
                    "DELETE FROM cursed_subjects WHERE subject = ?1",
                    params![subject.as_bytes().as_slice()],
                )?;
                if removed == 0 {
                    return Err(StoreError::InvalidData(format!(
                        "subject {} not recorded as cursed",
                        subject
                    )));
                }
            }

            tx.commit()?;
            Ok(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::StoreExt;
    use riskguard_core::{Config, ConfigDigest, Signer};
    use riskguard_curse::GLOBAL_CURSE_SUBJECT;

    fn make_config(version: u32) -> VersionedConfig {
        let signers = (1..=4u8)
            .map(|i| Signer::new(Address::from_bytes([i; 20]), i as u64))
            .collect();
        VersionedConfig {
            version,
            config: Config::new(ConfigDigest::from_bytes([0xcd; 32]), signers, 1),
        }
    }

    #[tokio::test]
    async fn test_config_roundtrip() {
        let store = SqliteStore::open_memory().unwrap();
        assert_eq!(store.get_config().await.unwrap(), None);

        store.put_config(&make_config(1)).await.unwrap();
        store.put_config(&make_config(2)).await.unwrap();

        assert_eq!(store.get_config().await.unwrap(), Some(make_config(2)));
    }

    #[tokio::test]
    async fn test_ownership_roundtrip() {
        let store = SqliteStore::open_memory().unwrap();
        let owner = Address::from_bytes([0x11; 20]);
        let proposed = Address::from_bytes([0x22; 20]);

        let record = OwnershipRecord {
            owner,
            pending_owner: Some(proposed),
        };
        store.put_ownership(&record).await.unwrap();
        assert_eq!(store.get_ownership().await.unwrap(), Some(record));

        let accepted = OwnershipRecord {
            owner: proposed,
            pending_owner: None,
        };
        store.put_ownership(&accepted).await.unwrap();
        assert_eq!(store.get_ownership().await.unwrap(), Some(accepted));
    }

    #[tokio::test]
    async fn test_cursed_subjects_sorted() {
        let store = SqliteStore::open_memory().unwrap();
        let a = CurseSubject::from_chain_selector(7);
        let b = CurseSubject::from_chain_selector(3);

        store
            .insert_cursed(&[GLOBAL_CURSE_SUBJECT, a, b])
            .await
            .unwrap();

        assert_eq!(
            store.get_cursed_subjects().await.unwrap(),
            vec![b, a, GLOBAL_CURSE_SUBJECT]
        );
    }

    #[tokio::test]
    async fn test_insert_conflict_rolls_back() {
        let store = SqliteStore::open_memory().unwrap();
        let a = CurseSubject::from_chain_selector(1);
        let b = CurseSubject::from_chain_selector(2);

        store.insert_cursed(&[a]).await.unwrap();
        assert!(store.insert_cursed(&[b, a]).await.is_err());

        assert_eq!(store.get_cursed_subjects().await.unwrap(), vec![a]);
    }

    #[tokio::test]
    async fn test_remove_missing_rolls_back() {
        let store = SqliteStore::open_memory().unwrap();
        let a = CurseSubject::from_chain_selector(1);
        let b = CurseSubject::from_chain_selector(2);

        store.insert_cursed(&[a]).await.unwrap();
        let result = store.remove_cursed(&[a, b]).await;

        assert!(matches!(result, Err(StoreError::InvalidData(_))));
        assert_eq!(store.get_cursed_subjects().await.unwrap(), vec![a]);
    }

    #[tokio::test]
    async fn test_state_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("guard.db");
        let subject = CurseSubject::from_chain_selector(99);
        let owner = OwnershipRecord {
            owner: Address::from_bytes([0x42; 20]),
            pending_owner: None,
        };

        {
            let store = SqliteStore::open(&path).unwrap();
            store.put_ownership(&owner).await.unwrap();
            store.put_config(&make_config(3)).await.unwrap();
            store.insert_cursed(&[subject]).await.unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        let state = store.load_state().await.unwrap();
        assert_eq!(state.ownership, Some(owner));
        assert_eq!(state.config, Some(make_config(3)));
        assert_eq!(state.cursed, vec![subject]);
    }

    #[tokio::test]
    async fn test_corrupt_config_is_reported() {
        let store = SqliteStore::open_memory().unwrap();
        store
            .run(|conn| {
                conn.execute(
                    "INSERT INTO guard_config (id, version, config, installed_at)
                     VALUES (0, 1, x'0000', 0)",
                    [],
                )?;
                Ok(())
            })
            .await
            .unwrap();

        assert!(matches!(
            store.get_config().await,
            Err(StoreError::Codec(_))
        ));
    }
}
