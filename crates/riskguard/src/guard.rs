//! The Guard: unified API for Riskguard.
//!
//! The Guard brings together the signer config, the curse registry and owner
//! access control behind one writer, persists every accepted mutation, and
//! serves reads from immutable snapshots.

use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

use riskguard_core::{
    validate_config, Address, Config, ConfigStore, EcdsaSignature, Keccak256Hash, MerkleRoot,
    ReportHeader, SignatureVerifier, VersionedConfig,
};
use riskguard_curse::{CurseRegistry, CurseSubject, GLOBAL_CURSE_SUBJECT};
use riskguard_store::{Store, StoreExt};

use crate::access::Ownership;
use crate::config::GuardConfig;
use crate::error::{GuardError, Result};
use crate::events::GuardEvent;

/// All guard state at one point in the mutation order.
///
/// Snapshots are never modified after publication.
#[derive(Debug, Clone)]
pub struct GuardState {
    ownership: Ownership,
    config: ConfigStore,
    curses: CurseRegistry,
}

impl GuardState {
    pub fn ownership(&self) -> &Ownership {
        &self.ownership
    }

    pub fn versioned_config(&self) -> Arc<VersionedConfig> {
        self.config.versioned_config()
    }

    pub fn curses(&self) -> &CurseRegistry {
        &self.curses
    }
}

/// The main Guard struct.
///
/// Provides a unified API for:
/// - Installing versioned signer configs
/// - Verifying quorum-signed batches of commitments
/// - Cursing and uncursing subjects
/// - Two-step ownership transfer
///
/// Mutations are serialized and all-or-nothing: each one is validated on a
/// private copy of the state, written to the store, and only then published.
/// A mutation runs on its own task, so dropping the returned future does not
/// stop it between the store write and the publish.
/// Reads never wait on a mutation in progress.
pub struct Guard<S: Store> {
    shared: Arc<Shared<S>>,
}

struct Shared<S> {
    /// The storage backend.
    store: S,
    /// Verifier bound to this guard's report header.
    verifier: SignatureVerifier,
    /// The published snapshot.
    state: RwLock<Arc<GuardState>>,
    /// Serializes mutations.
    writer: Mutex<()>,
    events: broadcast::Sender<GuardEvent>,
}

impl<S: Store + 'static> Guard<S> {
    /// Open a guard over `store`, restoring any persisted state.
    ///
    /// On a store with no ownership record, `config.initial_owner` becomes
    /// the owner and is persisted immediately.
    pub async fn open(store: S, config: GuardConfig) -> Result<Self> {
        let stored = store.load_state().await?;

        let ownership = match stored.ownership {
            Some(record) => Ownership::from(record),
            None => {
                let ownership = Ownership::new(config.initial_owner)?;
                store.put_ownership(&ownership.record()).await?;
                ownership
            }
        };

        let signer_config = match stored.config {
            Some(versioned) => {
                if versioned.is_set() {
                    validate_config(&versioned.config)?;
                }
                ConfigStore::restore(versioned)
            }
            None => ConfigStore::new(),
        };

        let curses = CurseRegistry::restore(stored.cursed);

        info!(
            owner = %ownership.owner(),
            version = signer_config.current().version,
            cursed = curses.len(),
            "guard opened"
        );

        let (events, _) = broadcast::channel(config.event_capacity.max(1));

        Ok(Self {
            shared: Arc::new(Shared {
                store,
                verifier: SignatureVerifier::new(config.report_header()),
                state: RwLock::new(Arc::new(GuardState {
                    ownership,
                    config: signer_config,
                    curses,
                })),
                writer: Mutex::new(()),
                events,
            }),
        })
    }

    /// Get the store reference.
    pub fn store(&self) -> &S {
        &self.shared.store
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Reads
    // ─────────────────────────────────────────────────────────────────────────

    /// The current published snapshot.
    pub fn snapshot(&self) -> Arc<GuardState> {
        self.shared.snapshot()
    }

    /// The installed config; version 0 if none has been installed.
    pub fn get_versioned_config(&self) -> Arc<VersionedConfig> {
        self.snapshot().versioned_config()
    }

    pub fn owner(&self) -> Address {
        self.snapshot().ownership.owner()
    }

    pub fn pending_owner(&self) -> Option<Address> {
        self.snapshot().ownership.pending_owner()
    }

    /// All cursed subjects in ascending byte order.
    pub fn cursed_subjects(&self) -> Vec<CurseSubject> {
        self.snapshot().curses.cursed_subjects()
    }

    /// Whether GLOBAL or LEGACY is cursed.
    pub fn is_cursed(&self) -> bool {
        self.snapshot().curses.is_cursed()
    }

    /// Whether `subject` is cursed itself or GLOBAL is cursed.
    pub fn is_subject_cursed(&self, subject: &CurseSubject) -> bool {
        self.snapshot().curses.is_subject_cursed(subject)
    }

    /// The chain selector and guard identity bound into every digest.
    pub fn report_digest_header(&self) -> ReportHeader {
        *self.shared.verifier.header()
    }

    /// The digest signers must sign for `caller` and `roots` under the
    /// installed config.
    pub fn report_digest(&self, caller: &Address, roots: &[MerkleRoot]) -> Keccak256Hash {
        self.shared
            .verifier
            .digest(&self.get_versioned_config(), caller, roots)
    }

    /// Verify that `signatures` carry a quorum of the installed signers over
    /// `roots` submitted by `caller`.
    ///
    /// Curse state is not consulted; callers query it separately.
    pub fn verify(
        &self,
        caller: &Address,
        roots: &[MerkleRoot],
        signatures: &[EcdsaSignature],
    ) -> Result<()> {
        let config = self.get_versioned_config();

        match self.shared.verifier.verify(&config, caller, roots, signatures) {
            Ok(()) => {
                debug!(
                    version = config.version,
                    roots = roots.len(),
                    signatures = signatures.len(),
                    "batch verified"
                );
                Ok(())
            }
            Err(err) => {
                debug!(version = config.version, error = %err, "batch rejected");
                Err(err.into())
            }
        }
    }

    /// Subscribe to events for mutations accepted from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<GuardEvent> {
        self.shared.events.subscribe()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────────

    /// Validate `config` and install it as the next version.
    pub async fn set_config(
        &self,
        caller: &Address,
        config: Config,
    ) -> Result<Arc<VersionedConfig>> {
        let caller = *caller;
        self.detached(move |shared| async move { shared.set_config(&caller, config).await })
            .await
    }

    /// Curse every subject in `subjects`, or none of them.
    pub async fn curse(&self, caller: &Address, subjects: &[CurseSubject]) -> Result<()> {
        let caller = *caller;
        let subjects = subjects.to_vec();
        self.detached(move |shared| async move { shared.curse(&caller, subjects).await })
            .await
    }

    /// Uncurse every subject in `subjects`, or none of them.
    pub async fn uncurse(&self, caller: &Address, subjects: &[CurseSubject]) -> Result<()> {
        let caller = *caller;
        let subjects = subjects.to_vec();
        self.detached(move |shared| async move { shared.uncurse(&caller, subjects).await })
            .await
    }

    /// Propose `to` as the next owner. Only the owner may call this.
    pub async fn transfer_ownership(&self, caller: &Address, to: Address) -> Result<()> {
        let caller = *caller;
        self.detached(move |shared| async move { shared.transfer_ownership(&caller, to).await })
            .await
    }

    /// Accept a pending transfer. Only the proposed owner may call this.
    pub async fn accept_ownership(&self, caller: &Address) -> Result<()> {
        let caller = *caller;
        self.detached(move |shared| async move { shared.accept_ownership(&caller).await })
            .await
    }

    /// Run a mutation on its own task and wait for its result.
    ///
    /// The task holds its own handle on the shared state and runs to
    /// completion even if this future is dropped.
    async fn detached<F, Fut, T>(&self, mutation: F) -> Result<T>
    where
        F: FnOnce(Arc<Shared<S>>) -> Fut,
        Fut: Future<Output = Result<T>> + Send + 'static,
        T: Send + 'static,
    {
        tokio::spawn(mutation(Arc::clone(&self.shared)))
            .await
            .map_err(|e| GuardError::Task(e.to_string()))?
    }
}

impl<S: Store> Shared<S> {
    fn snapshot(&self) -> Arc<GuardState> {
        Arc::clone(&self.state.read().unwrap_or_else(PoisonError::into_inner))
    }

    async fn set_config(&self, caller: &Address, config: Config) -> Result<Arc<VersionedConfig>> {
        let _writer = self.writer.lock().await;
        let mut next = self.stage_owned(caller, "set_config")?;

        let installed = next
            .config
            .set_config(config)
            .map_err(|e| rejected("set_config", e))?;

        self.store
            .put_config(&installed)
            .await
            .map_err(|e| rejected("set_config", e))?;

        info!(
            version = installed.version,
            signers = installed.config.signers.len(),
            f = installed.config.f,
            digest = %installed.config.digest,
            "config set"
        );

        self.publish(
            next,
            GuardEvent::ConfigSet {
                version: installed.version,
                config: installed.config.clone(),
            },
        );
        Ok(installed)
    }

    async fn curse(&self, caller: &Address, subjects: Vec<CurseSubject>) -> Result<()> {
        let _writer = self.writer.lock().await;
        let mut next = self.stage_owned(caller, "curse")?;

        next.curses
            .curse(&subjects)
            .map_err(|e| rejected("curse", e))?;

        self.store
            .insert_cursed(&subjects)
            .await
            .map_err(|e| rejected("curse", e))?;

        if subjects.contains(&GLOBAL_CURSE_SUBJECT) {
            warn!("global curse active");
        }
        info!(count = subjects.len(), total = next.curses.len(), "subjects cursed");

        self.publish(next, GuardEvent::Cursed(subjects));
        Ok(())
    }

    async fn uncurse(&self, caller: &Address, subjects: Vec<CurseSubject>) -> Result<()> {
        let _writer = self.writer.lock().await;
        let mut next = self.stage_owned(caller, "uncurse")?;

        next.curses
            .uncurse(&subjects)
            .map_err(|e| rejected("uncurse", e))?;

        self.store
            .remove_cursed(&subjects)
            .await
            .map_err(|e| rejected("uncurse", e))?;

        info!(count = subjects.len(), total = next.curses.len(), "subjects uncursed");

        self.publish(next, GuardEvent::Uncursed(subjects));
        Ok(())
    }

    async fn transfer_ownership(&self, caller: &Address, to: Address) -> Result<()> {
        let _writer = self.writer.lock().await;
        let mut next = GuardState::clone(&self.snapshot());

        next.ownership
            .propose(caller, to)
            .map_err(|e| rejected("transfer_ownership", e))?;

        self.store
            .put_ownership(&next.ownership.record())
            .await
            .map_err(|e| rejected("transfer_ownership", e))?;

        info!(from = %caller, to = %to, "ownership transfer requested");

        self.publish(
            next,
            GuardEvent::OwnershipTransferRequested { from: *caller, to },
        );
        Ok(())
    }

    async fn accept_ownership(&self, caller: &Address) -> Result<()> {
        let _writer = self.writer.lock().await;
        let mut next = GuardState::clone(&self.snapshot());

        let previous = next
            .ownership
            .accept(caller)
            .map_err(|e| rejected("accept_ownership", e))?;

        self.store
            .put_ownership(&next.ownership.record())
            .await
            .map_err(|e| rejected("accept_ownership", e))?;

        info!(from = %previous, to = %caller, "ownership transferred");

        self.publish(
            next,
            GuardEvent::OwnershipTransferred {
                from: previous,
                to: *caller,
            },
        );
        Ok(())
    }

    /// Copy the current state for a mutation only the owner may make.
    fn stage_owned(&self, caller: &Address, op: &'static str) -> Result<GuardState> {
        let next = GuardState::clone(&self.snapshot());
        next.ownership
            .ensure_owner(caller)
            .map_err(|e| rejected(op, e))?;
        Ok(next)
    }

    /// Swap in `next` and announce it. Caller must hold the writer lock and
    /// have persisted `next`.
    fn publish(&self, next: GuardState, event: GuardEvent) {
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(next);

        // Err only means nobody is subscribed.
        let _ = self.events.send(event);
    }
}

fn rejected(op: &'static str, err: impl Into<GuardError>) -> GuardError {
    let err = err.into();
    warn!(op, error = %err, "mutation rejected");
    err
}
