//! Events published after each accepted mutation.

use riskguard_core::{Address, Config};
use riskguard_curse::CurseSubject;

/// A state change that has been persisted and published.
///
/// Events are emitted in mutation order. A rejected mutation emits nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardEvent {
    /// A new signer config was installed.
    ConfigSet { version: u32, config: Config },
    /// Subjects were cursed, in call order.
    Cursed(Vec<CurseSubject>),
    /// Subjects were uncursed, in call order.
    Uncursed(Vec<CurseSubject>),
    OwnershipTransferRequested { from: Address, to: Address },
    OwnershipTransferred { from: Address, to: Address },
}
