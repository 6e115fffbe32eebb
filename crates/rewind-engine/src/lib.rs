//! # rewind-engine
//!
//! The revision lifecycle and rollback engine. One [`RevisionTracker`] per
//! record type observes lifecycle transitions, gates them through the
//! [`policy::RevisionPolicy`] and the cancelable `revisioning` hook, builds
//! snapshots with [`snapshot::SnapshotBuilder`], persists them with
//! retention eviction, and restores any prior snapshot atomically through
//! [`rollback::RollbackEngine`].
//!
//! Collaborators are injected at construction time via `Arc` references.

pub mod memory;
pub mod policy;
pub mod rollback;
pub mod snapshot;
pub mod tracker;

pub use policy::RevisionPolicy;
pub use rollback::RollbackEngine;
pub use snapshot::SnapshotBuilder;
pub use tracker::{Outcome, RevisionTracker};
