//! Collaborator traits consumed by the revision engine.
//!
//! The engine does not own record storage, revision persistence, or
//! identity resolution — it reaches all three through these seams.

pub mod identity;
pub mod record_store;
pub mod revision_store;

pub use identity::{FixedIdentity, IdentityResolver};
pub use record_store::RecordStore;
pub use revision_store::RevisionStore;
