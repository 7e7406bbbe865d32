//! Guard configuration.

use serde::{Deserialize, Serialize};

use riskguard_core::{Address, ChainSelector, ReportHeader};

/// Configuration for the Guard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    /// Selector of the chain this guard protects; bound into every digest.
    pub local_chain_selector: ChainSelector,
    /// Identity of this guard instance; bound into every digest.
    pub guard_address: Address,
    /// Owner installed when the store holds no ownership record yet.
    /// Ignored once ownership has been persisted.
    pub initial_owner: Address,
    /// Events buffered per subscriber before slow receivers lag.
    pub event_capacity: usize,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            local_chain_selector: 0,
            guard_address: Address::ZERO,
            initial_owner: Address::ZERO,
            event_capacity: 256,
        }
    }
}

impl GuardConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// The digest header signers bind their signatures to.
    pub fn report_header(&self) -> ReportHeader {
        ReportHeader::new(self.local_chain_selector, self.guard_address)
    }
}
