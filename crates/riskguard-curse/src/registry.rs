//! The set of currently cursed subjects.
//!
//! Curse and uncurse calls are all-or-nothing: the whole input is checked
//! against the current set before anything is inserted or removed.

use std::collections::BTreeSet;

use crate::error::{CurseError, Result};
use crate::subject::{CurseSubject, GLOBAL_CURSE_SUBJECT, LEGACY_CURSE_SUBJECT};

/// Currently cursed subjects.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CurseRegistry {
    cursed: BTreeSet<CurseSubject>,
}

impl CurseRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a registry from previously persisted subjects.
    pub fn restore(subjects: impl IntoIterator<Item = CurseSubject>) -> Self {
        Self {
            cursed: subjects.into_iter().collect(),
        }
    }

    /// Curse every subject in `subjects`.
    ///
    /// Fails with [`CurseError::AlreadyCursed`] on the first subject that is
    /// already cursed or repeated within `subjects`; nothing is applied.
    pub fn curse(&mut self, subjects: &[CurseSubject]) -> Result<()> {
        let mut pending = BTreeSet::new();
        for subject in subjects {
            if self.cursed.contains(subject) || !pending.insert(*subject) {
                return Err(CurseError::AlreadyCursed(*subject));
            }
        }

        self.cursed.extend(pending);
        Ok(())
    }

    /// Uncurse every subject in `subjects`.
    ///
    /// Fails with [`CurseError::NotCursed`] on the first subject that is not
    /// cursed or repeated within `subjects`; nothing is applied.
    pub fn uncurse(&mut self, subjects: &[CurseSubject]) -> Result<()> {
        let mut pending = BTreeSet::new();
        for subject in subjects {
            if !self.cursed.contains(subject) || !pending.insert(*subject) {
                return Err(CurseError::NotCursed(*subject));
            }
        }

        for subject in &pending {
            self.cursed.remove(subject);
        }
        Ok(())
    }

    /// Whether the whole system is halted: GLOBAL or LEGACY is cursed.
    pub fn is_cursed(&self) -> bool {
        self.cursed.contains(&GLOBAL_CURSE_SUBJECT) || self.cursed.contains(&LEGACY_CURSE_SUBJECT)
    }

    /// Whether `subject` is halted: it is cursed itself, or GLOBAL is.
    ///
    /// LEGACY does not halt individual subjects.
    pub fn is_subject_cursed(&self, subject: &CurseSubject) -> bool {
        self.cursed.contains(subject) || self.cursed.contains(&GLOBAL_CURSE_SUBJECT)
    }

    /// All cursed subjects in ascending byte order.
    pub fn cursed_subjects(&self) -> Vec<CurseSubject> {
        self.cursed.iter().copied().collect()
    }

    /// Number of cursed subjects.
    pub fn len(&self) -> usize {
        self.cursed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cursed.is_empty()
    }
}
