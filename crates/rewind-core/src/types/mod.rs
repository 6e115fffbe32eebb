//! Shared domain types for the revision engine.

pub mod change;
pub mod id;
pub mod owner;
pub mod relation;
pub mod restore;
pub mod snapshot;

pub use change::{ChangeContext, TransitionKind};
pub use id::RevisionId;
pub use owner::OwnerRef;
pub use relation::{RecordDescriptor, RelationClass, RelationDescriptor, RelationKind};
pub use restore::{RecordMatch, RelationRestore, RestorePlan};
pub use snapshot::{AttributeMap, RelationState, Snapshot};
