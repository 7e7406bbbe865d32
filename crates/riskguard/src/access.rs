//! Two-step owner access control.
//!
//! A single owner address gates every mutation. Handing over ownership takes
//! two calls: the owner proposes a successor, then the successor accepts.

use riskguard_core::Address;
use riskguard_store::OwnershipRecord;

use crate::error::{GuardError, Result};

/// The current owner and any pending successor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ownership {
    owner: Address,
    pending_owner: Option<Address>,
}

impl Ownership {
    /// Ownership held by `owner` with nothing pending.
    pub fn new(owner: Address) -> Result<Self> {
        if owner.is_zero() {
            return Err(GuardError::ZeroOwner);
        }
        Ok(Self {
            owner,
            pending_owner: None,
        })
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn pending_owner(&self) -> Option<Address> {
        self.pending_owner
    }

    /// Fail unless `caller` is the owner.
    pub fn ensure_owner(&self, caller: &Address) -> Result<()> {
        if *caller != self.owner {
            return Err(GuardError::OnlyCallableByOwner { caller: *caller });
        }
        Ok(())
    }

    /// Record `to` as the proposed next owner.
    ///
    /// A later proposal replaces an earlier one.
    pub fn propose(&mut self, caller: &Address, to: Address) -> Result<()> {
        self.ensure_owner(caller)?;
        if to == self.owner {
            return Err(GuardError::CannotTransferToSelf);
        }
        self.pending_owner = Some(to);
        Ok(())
    }

    /// Complete a transfer. Returns the previous owner.
    pub fn accept(&mut self, caller: &Address) -> Result<Address> {
        if self.pending_owner != Some(*caller) {
            return Err(GuardError::MustBeProposedOwner { caller: *caller });
        }
        let previous = self.owner;
        self.owner = *caller;
        self.pending_owner = None;
        Ok(previous)
    }

    pub fn record(&self) -> OwnershipRecord {
        OwnershipRecord {
            owner: self.owner,
            pending_owner: self.pending_owner,
        }
    }
}

impl From<OwnershipRecord> for Ownership {
    fn from(record: OwnershipRecord) -> Self {
        Self {
            owner: record.owner,
            pending_owner: record.pending_owner,
        }
    }
}
