//! In-memory revision store.
//!
//! Same create/evict semantics as the PostgreSQL repository: insertion and
//! retention eviction happen under one lock, ordering is `created_at`
//! ascending with a monotonic insertion sequence breaking ties.

use std::sync::Mutex;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use rewind_core::result::AppResult;
use rewind_core::revision::{NewRevision, Revision};
use rewind_core::traits::revision_store::RevisionStore;
use rewind_core::types::id::RevisionId;
use rewind_core::types::owner::OwnerRef;

#[derive(Debug, Clone)]
struct StoredRevision {
    revision: Revision,
    seq: i64,
}

/// In-memory [`RevisionStore`].
#[derive(Debug, Default)]
pub struct InMemoryRevisionStore {
    revisions: Mutex<Vec<StoredRevision>>,
    seq: AtomicI64,
}

impl InMemoryRevisionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<StoredRevision>> {
        self.revisions.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Remove the oldest revisions of `owner` beyond `limit` from the
    /// locked list. Returns the number removed.
    fn evict_locked(revisions: &mut Vec<StoredRevision>, owner: &OwnerRef, limit: u32) -> u64 {
        let mut owned: Vec<(i64, chrono::DateTime<Utc>, RevisionId)> = revisions
            .iter()
            .filter(|s| &s.revision.owner == owner)
            .map(|s| (s.seq, s.revision.created_at, s.revision.id))
            .collect();

        let excess = owned.len().saturating_sub(limit as usize);
        if excess == 0 {
            return 0;
        }

        owned.sort_by_key(|(seq, created_at, _)| (*created_at, *seq));
        let doomed: Vec<RevisionId> = owned.iter().take(excess).map(|(_, _, id)| *id).collect();
        revisions.retain(|s| !doomed.contains(&s.revision.id));
        excess as u64
    }
}

#[async_trait]
impl RevisionStore for InMemoryRevisionStore {
    async fn create(&self, data: &NewRevision, limit: Option<u32>) -> AppResult<Revision> {
        let now = Utc::now();
        let revision = Revision {
            id: RevisionId::new(),
            user_id: data.user_id,
            owner: data.owner.clone(),
            snapshot: data.snapshot.clone(),
            created_at: now,
            updated_at: now,
        };

        let mut revisions = self.lock();
        revisions.push(StoredRevision {
            revision: revision.clone(),
            seq: self.seq.fetch_add(1, Ordering::SeqCst),
        });

        if let Some(limit) = limit {
            Self::evict_locked(&mut revisions, &data.owner, limit);
        }

        Ok(revision)
    }

    async fn find_by_id(&self, id: RevisionId) -> AppResult<Option<Revision>> {
        Ok(self
            .lock()
            .iter()
            .find(|s| s.revision.id == id)
            .map(|s| s.revision.clone()))
    }

    async fn find_by_owner(&self, owner: &OwnerRef) -> AppResult<Vec<Revision>> {
        let mut owned: Vec<StoredRevision> = self
            .lock()
            .iter()
            .filter(|s| &s.revision.owner == owner)
            .cloned()
            .collect();
        owned.sort_by_key(|s| (s.revision.created_at, s.seq));
        Ok(owned.into_iter().map(|s| s.revision).collect())
    }

    async fn find_by_author(&self, user_id: Uuid) -> AppResult<Vec<Revision>> {
        let mut authored: Vec<StoredRevision> = self
            .lock()
            .iter()
            .filter(|s| s.revision.user_id == Some(user_id))
            .cloned()
            .collect();
        authored.sort_by_key(|s| (s.revision.created_at, s.seq));
        Ok(authored.into_iter().map(|s| s.revision).collect())
    }

    async fn delete_all_for_owner(&self, owner: &OwnerRef) -> AppResult<u64> {
        let mut revisions = self.lock();
        let before = revisions.len();
        revisions.retain(|s| &s.revision.owner != owner);
        Ok((before - revisions.len()) as u64)
    }

    async fn evict_excess(&self, owner: &OwnerRef, limit: u32) -> AppResult<u64> {
        let mut revisions = self.lock();
        Ok(Self::evict_locked(&mut revisions, owner, limit))
    }
}
