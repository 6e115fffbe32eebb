//! Revision lifecycle orchestration.
//!
//! One [`RevisionTracker`] per revisionable record type. It observes record
//! lifecycle transitions, gates them through the policy and the cancelable
//! `revisioning` hook, builds and persists snapshots with retention
//! eviction, and drives rollbacks. While a rollback is in flight for an
//! owner, transitions observed for that owner are suppressed so the
//! restoration's own writes are not mistaken for user-driven changes;
//! rollbacks on other owners are unaffected.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, info, warn};
use uuid::Uuid;

use rewind_core::error::AppError;
use rewind_core::hooks::{HookContext, HookRegistry};
use rewind_core::options::RevisionOptions;
use rewind_core::result::AppResult;
use rewind_core::revision::{NewRevision, Revision};
use rewind_core::traits::identity::IdentityResolver;
use rewind_core::traits::record_store::RecordStore;
use rewind_core::traits::revision_store::RevisionStore;
use rewind_core::types::change::ChangeContext;
use rewind_core::types::id::RevisionId;
use rewind_core::types::owner::OwnerRef;
use rewind_core::types::snapshot::Snapshot;

use crate::policy::RevisionPolicy;
use crate::rollback::RollbackEngine;
use crate::snapshot::SnapshotBuilder;

/// The result of observing a lifecycle transition.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// A revision was persisted.
    Created(Revision),
    /// The policy decided no revision was needed. A normal outcome.
    Skipped,
    /// A `revisioning` hook cancelled the snapshot. A normal outcome.
    Cancelled,
    /// A rollback is in flight for this owner; the transition was its own
    /// restoration write.
    Suppressed,
    /// The record was permanently destroyed; all its revisions were
    /// deleted. Carries the number removed.
    Purged(u64),
}

/// Tracks revisions for one record type.
pub struct RevisionTracker {
    record_store: Arc<dyn RecordStore>,
    revisions: Arc<dyn RevisionStore>,
    identity: Arc<dyn IdentityResolver>,
    hooks: Arc<HookRegistry>,
    options: RevisionOptions,
    policy: RevisionPolicy,
    builder: SnapshotBuilder,
    engine: RollbackEngine,
    /// Owners with a rollback in flight.
    rolling_back: DashMap<Uuid, ()>,
}

impl RevisionTracker {
    /// Create a tracker. All collaborators are injected at construction.
    pub fn new(
        record_store: Arc<dyn RecordStore>,
        revisions: Arc<dyn RevisionStore>,
        identity: Arc<dyn IdentityResolver>,
        hooks: Arc<HookRegistry>,
        options: RevisionOptions,
    ) -> Self {
        let policy = RevisionPolicy::new(
            options.clone(),
            record_store.descriptor().soft_delete_field.clone(),
        );
        let builder = SnapshotBuilder::new(Arc::clone(&record_store), options.clone());
        let engine = RollbackEngine::new(Arc::clone(&record_store));

        Self {
            record_store,
            revisions,
            identity,
            hooks,
            options,
            policy,
            builder,
            engine,
            rolling_back: DashMap::new(),
        }
    }

    /// The type tag of the record type this tracker manages.
    pub fn type_tag(&self) -> &str {
        &self.record_store.descriptor().type_tag
    }

    fn owner(&self, id: Uuid) -> OwnerRef {
        OwnerRef::new(self.type_tag(), id)
    }

    /// Observe a lifecycle transition on a record.
    ///
    /// Permanent destruction purges all revisions of the owner. Every other
    /// transition runs the policy, then the cancelable `revisioning` hook,
    /// then builds and persists a snapshot (with retention eviction) and
    /// fires `revisioned`.
    ///
    /// For updates, call this while the record store still holds the
    /// pre-change state: a revision preserves the state being superseded,
    /// which is what a later rollback restores. Creation snapshots capture
    /// the record's initial state, so `Created` is observed after insert.
    pub async fn observe(&self, record_id: Uuid, change: &ChangeContext) -> AppResult<Outcome> {
        let owner = self.owner(record_id);

        if change.transition == rewind_core::types::change::TransitionKind::ForceDeleted {
            let deleted = self.revisions.delete_all_for_owner(&owner).await?;
            info!(owner = %owner, deleted, "Purged revisions of destroyed record");
            return Ok(Outcome::Purged(deleted));
        }

        if self.rolling_back.contains_key(&record_id) {
            debug!(owner = %owner, "Suppressed transition during rollback");
            return Ok(Outcome::Suppressed);
        }

        if !self.policy.should_snapshot(change) {
            return Ok(Outcome::Skipped);
        }

        let ctx = HookContext {
            owner: owner.clone(),
            transition: change.transition,
        };
        if !self.hooks.fire_revisioning(&ctx) {
            debug!(owner = %owner, "Snapshot cancelled by revisioning hook");
            return Ok(Outcome::Cancelled);
        }

        let revision = self.persist_snapshot(record_id).await?;
        self.hooks.fire_revisioned(&ctx, &revision);

        Ok(Outcome::Created(revision))
    }

    /// Manually persist a snapshot of the record's current state.
    ///
    /// Bypasses the policy and the hooks; retention eviction still applies.
    pub async fn save_revision(&self, record_id: Uuid) -> AppResult<Revision> {
        self.persist_snapshot(record_id).await
    }

    async fn persist_snapshot(&self, record_id: Uuid) -> AppResult<Revision> {
        let snapshot = self.builder.build(record_id).await?;
        self.persist(record_id, snapshot).await
    }

    async fn persist(&self, record_id: Uuid, snapshot: Snapshot) -> AppResult<Revision> {
        let data = NewRevision::new(
            self.owner(record_id),
            self.identity.current_user_id(),
            snapshot,
        );

        let revision = self
            .revisions
            .create(&data, self.options.revision_limit)
            .await?;

        debug!(owner = %data.owner, revision_id = %revision.id, "Persisted revision");
        Ok(revision)
    }

    /// Roll the record back to a previously persisted revision.
    ///
    /// The target must belong to the record. While the rollback runs,
    /// transitions observed for this owner are suppressed; the guard is
    /// released on every exit path. When `create_revision_on_rollback` is
    /// set, the pre-rollback state is captured before restoring but only
    /// persisted once restoration succeeded, so a failed rollback leaves
    /// both the record and its revision history untouched. Restoration of
    /// attributes and relations is applied as one atomic unit of work.
    pub async fn rollback_to(&self, record_id: Uuid, revision: &Revision) -> AppResult<()> {
        let owner = self.owner(record_id);
        if revision.owner != owner {
            return Err(AppError::rollback_target(format!(
                "revision {} belongs to {}, not {}",
                revision.id, revision.owner, owner
            )));
        }

        let _guard = RollbackGuard::acquire(&self.rolling_back, record_id)?;

        let undo = if self.options.create_revision_on_rollback {
            Some(self.builder.build(record_id).await?)
        } else {
            None
        };

        if let Err(e) = self.engine.restore(record_id, &revision.snapshot).await {
            warn!(owner = %owner, revision_id = %revision.id, error = %e, "Rollback failed");
            return Err(e);
        }

        if let Some(snapshot) = undo {
            self.persist(record_id, snapshot).await?;
        }

        info!(owner = %owner, revision_id = %revision.id, "Rolled back to revision");
        Ok(())
    }

    /// Roll back to a revision by id, loading it from the revision store.
    pub async fn rollback_to_id(&self, record_id: Uuid, revision_id: RevisionId) -> AppResult<()> {
        let revision = self
            .revisions
            .find_by_id(revision_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("revision {revision_id} not found")))?;

        self.rollback_to(record_id, &revision).await
    }

    /// All revisions of a record, oldest first.
    pub async fn revisions_for(&self, record_id: Uuid) -> AppResult<Vec<Revision>> {
        self.revisions.find_by_owner(&self.owner(record_id)).await
    }

    /// Delete every revision of a record.
    pub async fn delete_all_revisions(&self, record_id: Uuid) -> AppResult<u64> {
        self.revisions
            .delete_all_for_owner(&self.owner(record_id))
            .await
    }
}

impl std::fmt::Debug for RevisionTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RevisionTracker")
            .field("type_tag", &self.type_tag())
            .finish_non_exhaustive()
    }
}

/// RAII suppression marker for an owner under rollback.
struct RollbackGuard<'a> {
    map: &'a DashMap<Uuid, ()>,
    id: Uuid,
}

impl<'a> RollbackGuard<'a> {
    fn acquire(map: &'a DashMap<Uuid, ()>, id: Uuid) -> AppResult<Self> {
        if map.insert(id, ()).is_some() {
            return Err(AppError::conflict(format!(
                "a rollback is already in flight for record {id}"
            )));
        }
        Ok(Self { map, id })
    }
}

impl Drop for RollbackGuard<'_> {
    fn drop(&mut self) {
        self.map.remove(&self.id);
    }
}
