//! Revision row mapping for the `revisions` table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use rewind_core::error::AppError;
use rewind_core::result::AppResult;
use rewind_core::revision::{NewRevision, Revision};
use rewind_core::types::id::RevisionId;
use rewind_core::types::owner::OwnerRef;
use rewind_core::types::snapshot::Snapshot;

/// A row of the `revisions` table.
///
/// The `seq` column is a monotonically increasing insertion sequence used
/// to break `created_at` ties during retention eviction.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RevisionRow {
    /// Primary key.
    pub id: RevisionId,
    /// The acting user, if known.
    pub user_id: Option<Uuid>,
    /// Owner record id.
    pub revisionable_id: Uuid,
    /// Owner record type tag.
    pub revisionable_type: String,
    /// The serialized [`Snapshot`] payload.
    pub metadata: serde_json::Value,
    /// Insertion sequence, eviction tiebreak.
    pub seq: i64,
    /// When the revision was persisted.
    pub created_at: DateTime<Utc>,
    /// Row update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl RevisionRow {
    /// Convert the row into the domain [`Revision`], deserializing the
    /// snapshot payload.
    pub fn into_revision(self) -> AppResult<Revision> {
        let snapshot: Snapshot = serde_json::from_value(self.metadata).map_err(|e| {
            AppError::with_source(
                rewind_core::error::ErrorKind::Serialization,
                format!("Corrupt snapshot payload in revision {}", self.id),
                e,
            )
        })?;

        Ok(Revision {
            id: self.id,
            user_id: self.user_id,
            owner: OwnerRef::new(self.revisionable_type, self.revisionable_id),
            snapshot,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Serialize the snapshot of a [`NewRevision`] for the `metadata` column.
pub fn metadata_payload(data: &NewRevision) -> AppResult<serde_json::Value> {
    serde_json::to_value(&data.snapshot).map_err(AppError::from)
}
