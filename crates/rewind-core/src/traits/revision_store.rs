//! Revision persistence collaborator trait.

use async_trait::async_trait;
use uuid::Uuid;

use crate::result::AppResult;
use crate::revision::{NewRevision, Revision};
use crate::types::id::RevisionId;
use crate::types::owner::OwnerRef;

/// Persistence for [`Revision`] entities.
///
/// Implemented by the PostgreSQL repository in `rewind-database` and by the
/// in-memory store in `rewind-engine`.
#[async_trait]
pub trait RevisionStore: Send + Sync {
    /// Persist a new revision and, when `limit` is set, evict the oldest
    /// revisions beyond it — both inside one unit of work. Either the
    /// insert and the eviction are both visible or neither is.
    async fn create(&self, data: &NewRevision, limit: Option<u32>) -> AppResult<Revision>;

    /// Load a single revision by id.
    async fn find_by_id(&self, id: RevisionId) -> AppResult<Option<Revision>>;

    /// All revisions of an owner, oldest first (creation order, insertion
    /// order on timestamp ties).
    async fn find_by_owner(&self, owner: &OwnerRef) -> AppResult<Vec<Revision>>;

    /// All revisions created by the given acting user.
    async fn find_by_author(&self, user_id: Uuid) -> AppResult<Vec<Revision>>;

    /// Delete every revision of an owner. Used when the owning record is
    /// permanently destroyed. Returns the number of deleted revisions.
    async fn delete_all_for_owner(&self, owner: &OwnerRef) -> AppResult<u64>;

    /// Delete the oldest revisions of an owner beyond `limit`, ordered by
    /// `created_at` ascending with insertion-order tiebreak. No-op when the
    /// count does not exceed the limit. Returns the number deleted.
    async fn evict_excess(&self, owner: &OwnerRef, limit: u32) -> AppResult<u64>;
}
