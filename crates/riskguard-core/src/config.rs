//! Signer configuration and the versioned config slot.
//!
//! A [`Config`] is never edited in place. [`ConfigStore::set_config`]
//! validates a candidate and swaps a new [`VersionedConfig`] into its single
//! slot; readers holding the previous `Arc` keep a consistent view.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::ConfigError;
use crate::types::{Address, ConfigDigest};

/// An authorized report signer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Signer {
    /// Address recovered from this signer's report signatures.
    pub public_key: Address,
    /// Opaque identifier of the node in the external node directory.
    pub node_index: u64,
}

impl Signer {
    /// Encoded length: address(20) || node_index(8).
    pub const ENCODED_LEN: usize = Address::LEN + 8;

    pub const fn new(public_key: Address, node_index: u64) -> Self {
        Self {
            public_key,
            node_index,
        }
    }
}

/// A signer set with its fault tolerance.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Config {
    /// Commitment to the off-chain selection of this signer set.
    pub digest: ConfigDigest,
    /// Signers, strictly increasing by public key.
    pub signers: Vec<Signer>,
    /// Maximum number of faulty signers tolerated.
    pub f: u64,
}

impl Config {
    pub fn new(digest: ConfigDigest, signers: Vec<Signer>, f: u64) -> Self {
        Self { digest, signers, f }
    }

    /// Number of valid signatures a report needs: `f + 1`.
    pub fn quorum(&self) -> u64 {
        self.f.saturating_add(1)
    }

    /// Minimum number of signers for this `f`: `2f + 1`, or `None` on
    /// overflow.
    pub fn min_signers(&self) -> Option<u64> {
        self.f.checked_mul(2).and_then(|n| n.checked_add(1))
    }

    /// Whether `address` is one of the configured signers.
    ///
    /// Relies on the installation-time ordering invariant.
    pub fn is_signer(&self, address: &Address) -> bool {
        self.signers
            .binary_search_by(|signer| signer.public_key.cmp(address))
            .is_ok()
    }
}

/// Check a candidate config.
///
/// The checks run in a fixed order and the first failure is returned:
/// zero digest, too few signers for `f`, a signer key smaller than its
/// predecessor, then a signer key equal to its predecessor. Together the
/// last two enforce strictly increasing keys while keeping both failure
/// kinds observable.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.digest.is_zero() {
        return Err(ConfigError::ZeroValueNotAllowed);
    }

    let enough = config
        .min_signers()
        .is_some_and(|min| config.signers.len() as u64 >= min);
    if !enough {
        return Err(ConfigError::NotEnoughSigners {
            signers: config.signers.len(),
            f: config.f,
        });
    }

    for (index, pair) in config.signers.windows(2).enumerate() {
        if pair[1].public_key < pair[0].public_key {
            return Err(ConfigError::InvalidSignerOrder { index: index + 1 });
        }
    }

    for pair in config.signers.windows(2) {
        if pair[1].public_key == pair[0].public_key {
            return Err(ConfigError::DuplicateOnchainPublicKey(pair[1].public_key));
        }
    }

    Ok(())
}

/// A config together with the number of times a config has been installed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VersionedConfig {
    /// 0 before any config is installed, then incremented per install.
    pub version: u32,
    pub config: Config,
}

impl VersionedConfig {
    /// Whether a config has ever been installed.
    pub fn is_set(&self) -> bool {
        self.version != 0
    }
}

/// The single owned slot holding the current [`VersionedConfig`].
///
/// Cloning is cheap and yields an independent slot that shares the current
/// snapshot.
#[derive(Debug, Clone, Default)]
pub struct ConfigStore {
    current: Arc<VersionedConfig>,
}

impl ConfigStore {
    /// An empty store: version 0, no signers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore a previously installed config.
    pub fn restore(versioned: VersionedConfig) -> Self {
        Self {
            current: Arc::new(versioned),
        }
    }

    /// Validate `candidate` and install it as the next version.
    ///
    /// On failure the store is unchanged.
    pub fn set_config(&mut self, candidate: Config) -> Result<Arc<VersionedConfig>, ConfigError> {
        validate_config(&candidate)?;

        let version = self
            .current
            .version
            .checked_add(1)
            .ok_or(ConfigError::VersionOverflow)?;

        self.current = Arc::new(VersionedConfig {
            version,
            config: candidate,
        });
        Ok(Arc::clone(&self.current))
    }

    /// The current snapshot.
    pub fn versioned_config(&self) -> Arc<VersionedConfig> {
        Arc::clone(&self.current)
    }

    /// Borrow the current snapshot.
    pub fn current(&self) -> &VersionedConfig {
        &self.current
    }
}
