//! Snapshot restoration.
//!
//! Restoration is split in two: a pure diff of the target snapshot against
//! the record's current state into a [`RestorePlan`], and a single call to
//! [`RecordStore::apply_restore`] that applies the plan atomically. Direct
//! relations match rows by `id` attribute when both sides carry one and
//! pair positionally otherwise; pivoted relations are reset to exactly the
//! snapshot's membership.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use rewind_core::error::AppError;
use rewind_core::result::AppResult;
use rewind_core::traits::record_store::RecordStore;
use rewind_core::types::relation::RelationClass;
use rewind_core::types::restore::{RecordMatch, RelationRestore, RestorePlan};
use rewind_core::types::snapshot::{AttributeMap, RelationState, Snapshot, attribute_id};

/// Computes and applies restore plans for one record type.
#[derive(Clone)]
pub struct RollbackEngine {
    store: Arc<dyn RecordStore>,
}

impl RollbackEngine {
    /// Create an engine over the record type's store.
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Diff `snapshot` against the record's current state.
    ///
    /// Fails when a snapshotted relation is no longer declared on the
    /// record type, when its declared kind cannot be classified, or when
    /// the stored state's classification no longer matches the declared
    /// one (the classification of a relation is fixed per configuration).
    pub async fn plan(&self, id: Uuid, snapshot: &Snapshot) -> AppResult<RestorePlan> {
        let mut relations = Vec::new();

        for (name, state) in &snapshot.relations {
            let descriptor = self.store.descriptor().relation(name).ok_or_else(|| {
                AppError::validation(format!(
                    "snapshot tracks relation '{name}' which is not declared on '{}'",
                    self.store.descriptor().type_tag
                ))
            })?;

            let restore = match (descriptor.kind.classify()?, state) {
                (RelationClass::Direct, RelationState::Direct { records }) => {
                    let current = self.store.related_records(id, name).await?;
                    diff_direct(name, records, &current)
                }
                (
                    RelationClass::Pivoted,
                    RelationState::Pivoted {
                        member_ids,
                        pivot_attributes,
                    },
                ) => {
                    let current_members = self.store.members(id, name).await?;
                    let current_pivots = self.store.pivot_attributes(id, name).await?;
                    diff_pivoted(
                        name,
                        member_ids,
                        pivot_attributes,
                        &current_members,
                        &current_pivots,
                    )
                }
                _ => {
                    return Err(AppError::conflict(format!(
                        "snapshot state of relation '{name}' does not match its declared classification"
                    )));
                }
            };

            if !restore.is_noop() {
                relations.push(restore);
            }
        }

        Ok(RestorePlan {
            attributes: snapshot.attributes.clone(),
            relations,
        })
    }

    /// Restore the record to `snapshot` as one atomic unit of work.
    pub async fn restore(&self, id: Uuid, snapshot: &Snapshot) -> AppResult<()> {
        let plan = self.plan(id, snapshot).await?;
        debug!(
            record_id = %id,
            relation_restores = plan.relations.len(),
            "Applying restore plan"
        );
        self.store.apply_restore(id, &plan).await
    }
}

impl std::fmt::Debug for RollbackEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RollbackEngine")
            .field("type_tag", &self.store.descriptor().type_tag)
            .finish_non_exhaustive()
    }
}

/// Diff a direct relation's snapshot rows against the current rows.
///
/// Rows carrying an `id` on both sides match by id. Id-less rows pair
/// positionally in order. Snapshot rows with no counterpart are created,
/// current rows with no counterpart are deleted, and matched rows whose
/// attributes differ are updated in place.
fn diff_direct(
    relation: &str,
    snapshot_rows: &[AttributeMap],
    current_rows: &[AttributeMap],
) -> RelationRestore {
    let mut create = Vec::new();
    let mut update = Vec::new();
    let mut delete = Vec::new();

    let mut current_by_id: BTreeMap<Uuid, &AttributeMap> = BTreeMap::new();
    let mut unkeyed: VecDeque<(usize, &AttributeMap)> = VecDeque::new();
    for (position, row) in current_rows.iter().enumerate() {
        match attribute_id(row) {
            Some(id) => {
                current_by_id.insert(id, row);
            }
            None => unkeyed.push_back((position, row)),
        }
    }

    let mut matched_ids: BTreeSet<Uuid> = BTreeSet::new();

    for row in snapshot_rows {
        match attribute_id(row) {
            Some(id) => match current_by_id.get(&id) {
                Some(current) => {
                    matched_ids.insert(id);
                    if *current != row {
                        update.push((RecordMatch::ById(id), row.clone()));
                    }
                }
                // The row existed at capture time but is gone now.
                None => create.push(row.clone()),
            },
            None => match unkeyed.pop_front() {
                Some((position, current)) => {
                    if current != row {
                        update.push((RecordMatch::ByPosition(position), row.clone()));
                    }
                }
                None => create.push(row.clone()),
            },
        }
    }

    for id in current_by_id.keys() {
        if !matched_ids.contains(id) {
            delete.push(RecordMatch::ById(*id));
        }
    }
    for (position, _) in unkeyed {
        delete.push(RecordMatch::ByPosition(position));
    }

    RelationRestore::Direct {
        relation: relation.to_string(),
        create,
        update,
        delete,
    }
}

/// Diff a pivoted relation's snapshot membership against the current one.
///
/// Pivot attributes are included for every snapshot member whose join
/// attributes differ from the current ones; an empty map clears attributes
/// the snapshot did not have.
fn diff_pivoted(
    relation: &str,
    snapshot_members: &BTreeSet<Uuid>,
    snapshot_pivots: &BTreeMap<Uuid, AttributeMap>,
    current_members: &BTreeSet<Uuid>,
    current_pivots: &BTreeMap<Uuid, AttributeMap>,
) -> RelationRestore {
    let attach: BTreeSet<Uuid> = snapshot_members
        .difference(current_members)
        .copied()
        .collect();
    let detach: BTreeSet<Uuid> = current_members
        .difference(snapshot_members)
        .copied()
        .collect();

    let empty = AttributeMap::new();
    let mut pivot_attributes = BTreeMap::new();
    for member in snapshot_members {
        let wanted = snapshot_pivots.get(member).unwrap_or(&empty);
        let current = current_pivots.get(member).unwrap_or(&empty);
        if wanted != current {
            pivot_attributes.insert(*member, wanted.clone());
        }
    }

    RelationRestore::Pivoted {
        relation: relation.to_string(),
        attach,
        detach,
        pivot_attributes,
    }
}
