//! # Riskguard Curse
//!
//! The circuit breaker: an explicit set of cursed subjects.
//!
//! ## Overview
//!
//! Cursing a subject halts processing for it without touching the signer
//! configuration. Subjects are opaque 16-byte values; most are derived from
//! a source chain selector. Two reserved sentinels give whole-system halts:
//!
//! | cursed set contains | `is_cursed()` | `is_subject_cursed(x)` |
//! |---------------------|---------------|------------------------|
//! | `GLOBAL`            | true          | true for every `x`     |
//! | `LEGACY`            | true          | only for `x == LEGACY` |
//! | `x`                 | false         | true for `x`           |
//!
//! ## Usage
//!
//! ```rust
//! use riskguard_curse::{CurseRegistry, CurseSubject, GLOBAL_CURSE_SUBJECT};
//!
//! let mut registry = CurseRegistry::new();
//! let source = CurseSubject::from_chain_selector(5009297550715157269);
//!
//! registry.curse(&[source]).unwrap();
//! assert!(registry.is_subject_cursed(&source));
//! assert!(!registry.is_cursed());
//!
//! registry.curse(&[GLOBAL_CURSE_SUBJECT]).unwrap();
//! assert!(registry.is_cursed());
//! ```

pub mod error;
pub mod registry;
pub mod subject;

pub use error::{CurseError, Result};
pub use registry::CurseRegistry;
pub use subject::{CurseSubject, GLOBAL_CURSE_SUBJECT, LEGACY_CURSE_SUBJECT};
