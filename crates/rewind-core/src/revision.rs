//! Revision domain objects.
//!
//! These are the storage-agnostic shapes the engine works with. The
//! `rewind-entity` crate maps them onto the flat `revisions` table row.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::id::RevisionId;
use crate::types::owner::OwnerRef;
use crate::types::snapshot::Snapshot;

/// An immutable persisted revision of an owner record.
///
/// Once persisted a revision is never mutated — only created, or deleted by
/// retention eviction or a bulk purge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Revision {
    /// Unique revision identifier, assigned on persist.
    pub id: RevisionId,
    /// The user whose change produced this revision, if known.
    pub user_id: Option<Uuid>,
    /// The record this revision belongs to.
    pub owner: OwnerRef,
    /// The captured state.
    pub snapshot: Snapshot,
    /// When the revision was persisted. Strictly creation-ordered together
    /// with the store's insertion sequence; the eviction ordering key.
    pub created_at: DateTime<Utc>,
    /// Row update timestamp. Equal to `created_at` in practice since
    /// revisions are immutable.
    pub updated_at: DateTime<Utc>,
}

/// Data required to persist a new revision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRevision {
    /// The acting user, if any.
    pub user_id: Option<Uuid>,
    /// The record being revisioned.
    pub owner: OwnerRef,
    /// The captured state.
    pub snapshot: Snapshot,
}

impl NewRevision {
    /// Create the data for a new revision.
    pub fn new(owner: OwnerRef, user_id: Option<Uuid>, snapshot: Snapshot) -> Self {
        Self {
            user_id,
            owner,
            snapshot,
        }
    }
}
