//! Snapshot construction.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use rewind_core::error::AppError;
use rewind_core::options::RevisionOptions;
use rewind_core::result::AppResult;
use rewind_core::traits::record_store::RecordStore;
use rewind_core::types::relation::RelationClass;
use rewind_core::types::snapshot::{RelationState, Snapshot};

/// Builds immutable [`Snapshot`]s of a record and its tracked relations.
#[derive(Clone)]
pub struct SnapshotBuilder {
    store: Arc<dyn RecordStore>,
    options: RevisionOptions,
}

impl SnapshotBuilder {
    /// Create a builder for one record type.
    pub fn new(store: Arc<dyn RecordStore>, options: RevisionOptions) -> Self {
        Self { store, options }
    }

    /// Capture the record's current scalar attributes and the state of
    /// every tracked relation.
    ///
    /// The result owns all of its data; later mutation of the live record
    /// never alters a built snapshot. Tracked relations that are not
    /// declared on the record type, or whose declared kind cannot be
    /// classified, fail the whole build.
    pub async fn build(&self, id: Uuid) -> AppResult<Snapshot> {
        let attributes = self.store.attributes(id).await?;
        let mut relations = BTreeMap::new();

        for name in &self.options.relations_to_revision {
            let descriptor = self.store.descriptor().relation(name).ok_or_else(|| {
                AppError::validation(format!(
                    "tracked relation '{name}' is not declared on record type '{}'",
                    self.store.descriptor().type_tag
                ))
            })?;

            let state = match descriptor.kind.classify()? {
                RelationClass::Direct => RelationState::Direct {
                    records: self.store.related_records(id, name).await?,
                },
                RelationClass::Pivoted => RelationState::Pivoted {
                    member_ids: self.store.members(id, name).await?,
                    pivot_attributes: self.store.pivot_attributes(id, name).await?,
                },
            };

            relations.insert(name.clone(), state);
        }

        debug!(
            record_id = %id,
            relation_count = relations.len(),
            "Built snapshot"
        );

        Ok(Snapshot {
            attributes,
            relations,
        })
    }
}

impl std::fmt::Debug for SnapshotBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotBuilder")
            .field("type_tag", &self.store.descriptor().type_tag)
            .finish_non_exhaustive()
    }
}
