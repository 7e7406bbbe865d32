//! End-to-end behavior of the Guard over an in-memory store.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::broadcast::error::TryRecvError;

use riskguard::core::{ConfigError, Keypair, VerifyError};
use riskguard::curse::CurseError;
use riskguard::store::{OwnershipRecord, StoreError};
use riskguard::{
    ConfigDigest, CurseSubject, Guard, GuardConfig, GuardError, GuardEvent, MemoryStore,
    Store, VersionedConfig, GLOBAL_CURSE_SUBJECT, LEGACY_CURSE_SUBJECT,
};
use riskguard_testkit::fixtures::{address, sample_roots, subject, Committee};

const OWNER: u8 = 0x0a;

fn guard_config() -> GuardConfig {
    GuardConfig {
        local_chain_selector: 16015286601757825753,
        guard_address: address(0xee),
        initial_owner: address(OWNER),
        ..Default::default()
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("riskguard=debug")
        .with_test_writer()
        .try_init();
}

async fn open_guard() -> Guard<MemoryStore> {
    init_tracing();
    Guard::open(MemoryStore::new(), guard_config()).await.unwrap()
}

async fn guard_with_committee(n: u8, f: u64) -> (Guard<MemoryStore>, Committee) {
    let guard = open_guard().await;
    let committee = Committee::new(n);
    guard
        .set_config(&address(OWNER), committee.config(f))
        .await
        .unwrap();
    (guard, committee)
}

// ─────────────────────────────────────────────────────────────────────────────
// Config
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_config_arithmetic() {
    let guard = open_guard().await;
    let owner = address(OWNER);
    let committee = Committee::new(7);

    let signers = committee.signers();
    let result = guard
        .set_config(&owner, committee.config_with_digest(ConfigDigest::from_bytes([1; 32]), 4))
        .await;
    assert!(matches!(
        result,
        Err(GuardError::Config(ConfigError::NotEnoughSigners { signers: 7, f: 4 }))
    ));

    let installed = guard.set_config(&owner, committee.config(3)).await.unwrap();
    assert_eq!(installed.config.signers, signers);
    assert_eq!(installed.config.quorum(), 4);
}

#[tokio::test]
async fn test_config_rejects_zero_digest() {
    let guard = open_guard().await;
    let owner = address(OWNER);
    let committee = Committee::new(4);

    assert!(matches!(
        guard
            .set_config(&owner, committee.config_with_digest(ConfigDigest::ZERO, 1))
            .await,
        Err(GuardError::Config(ConfigError::ZeroValueNotAllowed))
    ));
    assert_eq!(guard.get_versioned_config().version, 0);

    let installed = guard.set_config(&owner, committee.config(0)).await.unwrap();
    assert_eq!(installed.config.quorum(), 1);
}

#[tokio::test]
async fn test_config_ordering_and_duplicates() {
    let guard = open_guard().await;
    let owner = address(OWNER);
    let committee = Committee::new(4);

    let mut reversed = committee.config(1);
    reversed.signers.reverse();
    assert!(matches!(
        guard.set_config(&owner, reversed).await,
        Err(GuardError::Config(ConfigError::InvalidSignerOrder { index: 1 }))
    ));

    let mut duplicated = committee.config(1);
    duplicated.signers[2] = duplicated.signers[1];
    let key = duplicated.signers[1].public_key;
    assert!(matches!(
        guard.set_config(&owner, duplicated).await,
        Err(GuardError::Config(ConfigError::DuplicateOnchainPublicKey(k))) if k == key
    ));
}

// ─────────────────────────────────────────────────────────────────────────────
// Verification
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_quorum_with_f_three() {
    let (guard, committee) = guard_with_committee(7, 3).await;
    let caller = address(0xca);
    let roots = sample_roots();
    let digest = guard.report_digest(&caller, &roots);

    for count in 4..=7 {
        let signatures = committee.sign_first(count, &digest);
        guard.verify(&caller, &roots, &signatures).unwrap();
    }

    for count in 0..4 {
        let signatures = committee.sign_first(count, &digest);
        assert!(matches!(
            guard.verify(&caller, &roots, &signatures),
            Err(GuardError::Verify(VerifyError::ThresholdNotMet { required: 4, .. }))
        ));
    }
}

#[tokio::test]
async fn test_out_of_order_signatures() {
    let (guard, committee) = guard_with_committee(7, 3).await;
    let caller = address(0xca);
    let roots = sample_roots();
    let digest = guard.report_digest(&caller, &roots);

    let signatures = committee.sign(&[0, 1, 3, 2], &digest);
    assert!(matches!(
        guard.verify(&caller, &roots, &signatures),
        Err(GuardError::Verify(VerifyError::OutOfOrderSignatures { index: 3 }))
    ));
}

#[tokio::test]
async fn test_duplicate_signature() {
    let (guard, committee) = guard_with_committee(7, 3).await;
    let caller = address(0xca);
    let roots = sample_roots();
    let digest = guard.report_digest(&caller, &roots);

    let signatures = committee.sign(&[0, 1, 2, 2], &digest);
    assert!(matches!(
        guard.verify(&caller, &roots, &signatures),
        Err(GuardError::Verify(VerifyError::OutOfOrderSignatures { index: 3 }))
    ));
}

#[tokio::test]
async fn test_unexpected_signer() {
    let (guard, committee) = guard_with_committee(4, 1).await;
    let caller = address(0xca);
    let roots = sample_roots();
    let digest = guard.report_digest(&caller, &roots);

    let outsider = Keypair::generate();
    assert!(!committee.addresses().contains(&outsider.address()));

    let signatures = vec![outsider.sign_digest(&digest).unwrap()];
    assert!(matches!(
        guard.verify(&caller, &roots, &signatures),
        Err(GuardError::Verify(VerifyError::UnexpectedSigner { index: 0, signer }))
            if signer == outsider.address()
    ));
}

#[tokio::test]
async fn test_signatures_bound_to_caller() {
    let (guard, committee) = guard_with_committee(4, 1).await;
    let roots = sample_roots();
    let digest = guard.report_digest(&address(0xca), &roots);
    let signatures = committee.sign_first(2, &digest);

    assert!(matches!(
        guard.verify(&address(0xcb), &roots, &signatures),
        Err(GuardError::Verify(VerifyError::UnexpectedSigner { index: 0, .. }))
    ));
}

#[tokio::test]
async fn test_signatures_bound_to_config_digest() {
    let (guard, committee) = guard_with_committee(4, 1).await;
    let caller = address(0xca);
    let roots = sample_roots();
    let digest = guard.report_digest(&caller, &roots);
    let signatures = committee.sign_first(2, &digest);
    guard.verify(&caller, &roots, &signatures).unwrap();

    guard
        .set_config(
            &address(OWNER),
            committee.config_with_digest(ConfigDigest::from_bytes([0x77; 32]), 1),
        )
        .await
        .unwrap();

    assert!(matches!(
        guard.verify(&caller, &roots, &signatures),
        Err(GuardError::Verify(VerifyError::UnexpectedSigner { .. }))
    ));
}

#[tokio::test]
async fn test_verification_ignores_curses() {
    let (guard, committee) = guard_with_committee(4, 1).await;
    guard
        .curse(&address(OWNER), &[GLOBAL_CURSE_SUBJECT])
        .await
        .unwrap();

    let caller = address(0xca);
    let roots = sample_roots();
    let digest = guard.report_digest(&caller, &roots);
    guard
        .verify(&caller, &roots, &committee.sign_first(2, &digest))
        .unwrap();
}

// ─────────────────────────────────────────────────────────────────────────────
// Curses
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_double_curse_and_uncurse() {
    let guard = open_guard().await;
    let owner = address(OWNER);

    guard.curse(&owner, &[subject(1)]).await.unwrap();
    assert!(matches!(
        guard.curse(&owner, &[subject(1)]).await,
        Err(GuardError::Curse(CurseError::AlreadyCursed(s))) if s == subject(1)
    ));

    guard.uncurse(&owner, &[subject(1)]).await.unwrap();
    assert!(matches!(
        guard.uncurse(&owner, &[subject(1)]).await,
        Err(GuardError::Curse(CurseError::NotCursed(s))) if s == subject(1)
    ));
}

#[tokio::test]
async fn test_sentinel_truth_table() {
    let guard = open_guard().await;
    let owner = address(OWNER);
    let x = subject(42);

    guard.curse(&owner, &[x]).await.unwrap();
    assert!(!guard.is_cursed());
    assert!(guard.is_subject_cursed(&x));
    guard.uncurse(&owner, &[x]).await.unwrap();

    guard.curse(&owner, &[LEGACY_CURSE_SUBJECT]).await.unwrap();
    assert!(guard.is_cursed());
    assert!(!guard.is_subject_cursed(&x));
    assert!(guard.is_subject_cursed(&LEGACY_CURSE_SUBJECT));
    guard.uncurse(&owner, &[LEGACY_CURSE_SUBJECT]).await.unwrap();

    guard.curse(&owner, &[GLOBAL_CURSE_SUBJECT]).await.unwrap();
    assert!(guard.is_cursed());
    assert!(guard.is_subject_cursed(&x));
    assert!(guard.is_subject_cursed(&LEGACY_CURSE_SUBJECT));
}

#[tokio::test]
async fn test_curse_set_roundtrip() {
    let guard = open_guard().await;
    let owner = address(OWNER);
    let subjects = [subject(3), GLOBAL_CURSE_SUBJECT, subject(1), LEGACY_CURSE_SUBJECT];

    guard.curse(&owner, &subjects).await.unwrap();

    let mut expected = subjects.to_vec();
    expected.sort();
    assert_eq!(guard.cursed_subjects(), expected);

    guard.uncurse(&owner, &subjects).await.unwrap();
    assert!(guard.cursed_subjects().is_empty());
    assert!(!guard.is_cursed());
}

// ─────────────────────────────────────────────────────────────────────────────
// Ownership
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_ownership_handover() {
    let guard = open_guard().await;
    let old = address(OWNER);
    let new = address(0x0b);
    let mut events = guard.subscribe();

    guard.transfer_ownership(&old, new).await.unwrap();
    assert_eq!(guard.owner(), old);
    assert_eq!(guard.pending_owner(), Some(new));

    assert!(matches!(
        guard.accept_ownership(&address(0x0c)).await,
        Err(GuardError::MustBeProposedOwner { .. })
    ));

    guard.accept_ownership(&new).await.unwrap();
    assert_eq!(guard.owner(), new);
    assert_eq!(guard.pending_owner(), None);

    assert!(matches!(
        guard.curse(&old, &[subject(1)]).await,
        Err(GuardError::OnlyCallableByOwner { .. })
    ));
    guard.curse(&new, &[subject(1)]).await.unwrap();

    assert_eq!(
        events.try_recv().unwrap(),
        GuardEvent::OwnershipTransferRequested { from: old, to: new }
    );
    assert_eq!(
        events.try_recv().unwrap(),
        GuardEvent::OwnershipTransferred { from: old, to: new }
    );
    assert_eq!(events.try_recv().unwrap(), GuardEvent::Cursed(vec![subject(1)]));
}

#[tokio::test]
async fn test_cannot_transfer_to_self() {
    let guard = open_guard().await;
    assert!(matches!(
        guard
            .transfer_ownership(&address(OWNER), address(OWNER))
            .await,
        Err(GuardError::CannotTransferToSelf)
    ));
}

// ─────────────────────────────────────────────────────────────────────────────
// Events
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_events_follow_mutation_order() {
    let guard = open_guard().await;
    let owner = address(OWNER);
    let committee = Committee::new(4);
    let mut events = guard.subscribe();

    guard.set_config(&owner, committee.config(1)).await.unwrap();
    guard.curse(&owner, &[subject(2), subject(1)]).await.unwrap();
    guard.uncurse(&owner, &[subject(1)]).await.unwrap();

    assert_eq!(
        events.try_recv().unwrap(),
        GuardEvent::ConfigSet {
            version: 1,
            config: committee.config(1)
        }
    );
    assert_eq!(
        events.try_recv().unwrap(),
        GuardEvent::Cursed(vec![subject(2), subject(1)])
    );
    assert_eq!(
        events.try_recv().unwrap(),
        GuardEvent::Uncursed(vec![subject(1)])
    );
    assert_eq!(events.try_recv(), Err(TryRecvError::Empty));
}

#[tokio::test]
async fn test_failed_mutation_emits_nothing() {
    let guard = open_guard().await;
    let owner = address(OWNER);
    let mut events = guard.subscribe();
    let before = guard.get_versioned_config();

    let _ = guard.set_config(&owner, Committee::new(2).config(1)).await;
    let _ = guard.uncurse(&owner, &[subject(9)]).await;
    let _ = guard.curse(&address(0x66), &[subject(9)]).await;
    let _ = guard.accept_ownership(&address(0x66)).await;

    assert_eq!(events.try_recv(), Err(TryRecvError::Empty));
    assert_eq!(guard.get_versioned_config(), before);
    assert!(guard.cursed_subjects().is_empty());
}

// ─────────────────────────────────────────────────────────────────────────────
// Store failures
// ─────────────────────────────────────────────────────────────────────────────

/// A memory store whose writes can be made to fail.
#[derive(Default)]
struct FlakyStore {
    inner: MemoryStore,
    fail_writes: AtomicBool,
}

impl FlakyStore {
    fn check(&self) -> riskguard::store::Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::InvalidData("injected write failure".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl Store for FlakyStore {
    async fn get_ownership(&self) -> riskguard::store::Result<Option<OwnershipRecord>> {
        self.inner.get_ownership().await
    }

    async fn put_ownership(&self, record: &OwnershipRecord) -> riskguard::store::Result<()> {
        self.check()?;
        self.inner.put_ownership(record).await
    }

    async fn get_config(&self) -> riskguard::store::Result<Option<VersionedConfig>> {
        self.inner.get_config().await
    }

    async fn put_config(&self, config: &VersionedConfig) -> riskguard::store::Result<()> {
        self.check()?;
        self.inner.put_config(config).await
    }

    async fn get_cursed_subjects(&self) -> riskguard::store::Result<Vec<CurseSubject>> {
        self.inner.get_cursed_subjects().await
    }

    async fn insert_cursed(&self, subjects: &[CurseSubject]) -> riskguard::store::Result<()> {
        self.check()?;
        self.inner.insert_cursed(subjects).await
    }

    async fn remove_cursed(&self, subjects: &[CurseSubject]) -> riskguard::store::Result<()> {
        self.check()?;
        self.inner.remove_cursed(subjects).await
    }
}

#[tokio::test]
async fn test_store_failure_leaves_state_unchanged() {
    let guard = Guard::open(FlakyStore::default(), guard_config())
        .await
        .unwrap();
    let owner = address(OWNER);
    let committee = Committee::new(4);
    guard.curse(&owner, &[subject(1)]).await.unwrap();

    let mut events = guard.subscribe();
    guard.store().fail_writes.store(true, Ordering::SeqCst);

    assert!(matches!(
        guard.set_config(&owner, committee.config(1)).await,
        Err(GuardError::Store(_))
    ));
    assert!(matches!(
        guard.curse(&owner, &[subject(2)]).await,
        Err(GuardError::Store(_))
    ));
    assert!(matches!(
        guard.uncurse(&owner, &[subject(1)]).await,
        Err(GuardError::Store(_))
    ));
    assert!(matches!(
        guard.transfer_ownership(&owner, address(0x0b)).await,
        Err(GuardError::Store(_))
    ));

    assert_eq!(guard.get_versioned_config().version, 0);
    assert_eq!(guard.cursed_subjects(), vec![subject(1)]);
    assert_eq!(guard.pending_owner(), None);
    assert_eq!(events.try_recv(), Err(TryRecvError::Empty));

    guard.store().fail_writes.store(false, Ordering::SeqCst);
    let installed = guard.set_config(&owner, committee.config(1)).await.unwrap();
    assert_eq!(installed.version, 1);
}

#[tokio::test]
async fn test_dropped_set_config_completes() {
    let guard = open_guard().await;
    let owner = address(OWNER);
    let committee = Committee::new(4);
    let mut events = guard.subscribe();

    let pending = guard.set_config(&owner, committee.config(1));
    let _ = tokio::time::timeout(Duration::ZERO, pending).await;

    for _ in 0..200 {
        if guard.get_versioned_config().version == 1 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    assert_eq!(guard.get_versioned_config().version, 1);
    assert_eq!(
        guard.store().get_config().await.unwrap().map(|c| c.version),
        Some(1)
    );
    assert!(matches!(events.try_recv(), Ok(GuardEvent::ConfigSet { version: 1, .. })));

    let next = guard.set_config(&owner, committee.config(1)).await.unwrap();
    assert_eq!(next.version, 2);
}

// ─────────────────────────────────────────────────────────────────────────────
// Concurrency
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_curses_serialize() {
    let guard = Arc::new(open_guard().await);
    let owner = address(OWNER);
    let mut events = guard.subscribe();

    let tasks: Vec<_> = (0..32u64)
        .map(|i| {
            let guard = Arc::clone(&guard);
            tokio::spawn(async move { guard.curse(&owner, &[subject(i)]).await })
        })
        .collect();

    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let expected: Vec<CurseSubject> = (0..32u64).map(subject).collect();
    assert_eq!(guard.cursed_subjects(), expected);

    let mut seen = Vec::new();
    while let Ok(GuardEvent::Cursed(subjects)) = events.try_recv() {
        seen.extend(subjects);
    }
    seen.sort();
    assert_eq!(seen, expected);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_config_versions_are_dense() {
    let guard = Arc::new(open_guard().await);
    let committee = Arc::new(Committee::new(4));

    let tasks: Vec<_> = (0..16)
        .map(|_| {
            let guard = Arc::clone(&guard);
            let committee = Arc::clone(&committee);
            tokio::spawn(async move {
                guard
                    .set_config(&address(OWNER), committee.config(1))
                    .await
                    .map(|installed| installed.version)
            })
        })
        .collect();

    let mut versions = Vec::new();
    for task in tasks {
        versions.push(task.await.unwrap().unwrap());
    }
    versions.sort();

    assert_eq!(versions, (1..=16).collect::<Vec<u32>>());
    assert_eq!(guard.get_versioned_config().version, 16);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_readers_see_whole_configs() {
    let guard = Arc::new(open_guard().await);
    let small = Committee::new(4);
    let large = Committee::new(7);
    let owner = address(OWNER);

    let writer = {
        let guard = Arc::clone(&guard);
        tokio::spawn(async move {
            for round in 0..20 {
                let config = if round % 2 == 0 { small.config(1) } else { large.config(2) };
                guard.set_config(&owner, config).await.unwrap();
            }
        })
    };

    for _ in 0..200 {
        let snapshot = guard.get_versioned_config();
        if snapshot.is_set() {
            let n = snapshot.config.signers.len() as u64;
            assert!(n >= 2 * snapshot.config.f + 1);
            assert!((n == 4 && snapshot.config.f == 1) || (n == 7 && snapshot.config.f == 2));
        }
        tokio::task::yield_now().await;
    }

    writer.await.unwrap();
    assert_eq!(guard.get_versioned_config().version, 20);
}
