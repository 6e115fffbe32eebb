//! In-memory record store.
//!
//! Backs embedded use and the engine's test suites. All state for one
//! record type lives behind a single mutex; `apply_restore` resolves the
//! whole plan against a working copy and swaps it in only when every step
//! succeeded, so a failed plan leaves the store untouched.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use rewind_core::error::AppError;
use rewind_core::result::AppResult;
use rewind_core::traits::record_store::RecordStore;
use rewind_core::types::relation::RecordDescriptor;
use rewind_core::types::restore::{RecordMatch, RelationRestore, RestorePlan};
use rewind_core::types::snapshot::{AttributeMap, attribute_id};

/// Mutable state of one record and its relations.
#[derive(Debug, Clone, Default)]
struct RecordState {
    attributes: AttributeMap,
    direct: BTreeMap<String, Vec<AttributeMap>>,
    members: BTreeMap<String, BTreeSet<Uuid>>,
    pivots: BTreeMap<String, BTreeMap<Uuid, AttributeMap>>,
}

/// In-memory [`RecordStore`] for one record type.
#[derive(Debug)]
pub struct InMemoryRecordStore {
    descriptor: RecordDescriptor,
    records: Mutex<HashMap<Uuid, RecordState>>,
}

impl InMemoryRecordStore {
    /// Create an empty store for the described record type.
    pub fn new(descriptor: RecordDescriptor) -> Self {
        Self {
            descriptor,
            records: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<Uuid, RecordState>> {
        self.records.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Insert a record with the given scalar attributes.
    pub fn insert(&self, id: Uuid, attributes: AttributeMap) {
        self.lock().insert(
            id,
            RecordState {
                attributes,
                ..RecordState::default()
            },
        );
    }

    /// Overwrite one scalar attribute of a record.
    pub fn set_attribute(&self, id: Uuid, field: &str, value: serde_json::Value) {
        if let Some(state) = self.lock().get_mut(&id) {
            state.attributes.insert(field.to_string(), value);
        }
    }

    /// Replace the rows of a direct relation.
    pub fn set_direct(&self, id: Uuid, relation: &str, rows: Vec<AttributeMap>) {
        if let Some(state) = self.lock().get_mut(&id) {
            state.direct.insert(relation.to_string(), rows);
        }
    }

    /// Replace the membership of a pivoted relation.
    pub fn set_members(&self, id: Uuid, relation: &str, members: BTreeSet<Uuid>) {
        if let Some(state) = self.lock().get_mut(&id) {
            state.members.insert(relation.to_string(), members);
        }
    }

    /// Set the join attributes of one member of a pivoted relation.
    pub fn set_pivot(&self, id: Uuid, relation: &str, member: Uuid, attributes: AttributeMap) {
        if let Some(state) = self.lock().get_mut(&id) {
            state
                .pivots
                .entry(relation.to_string())
                .or_default()
                .insert(member, attributes);
        }
    }

    /// Remove a record entirely.
    pub fn remove(&self, id: Uuid) {
        self.lock().remove(&id);
    }

    fn with_record<T>(&self, id: Uuid, f: impl FnOnce(&RecordState) -> T) -> AppResult<T> {
        let records = self.lock();
        let state = records
            .get(&id)
            .ok_or_else(|| AppError::not_found(format!("record {id} not found")))?;
        Ok(f(state))
    }
}

/// Apply one relation restore to a working copy of the record state.
fn apply_relation_restore(state: &mut RecordState, restore: &RelationRestore) -> AppResult<()> {
    match restore {
        RelationRestore::Direct {
            relation,
            create,
            update,
            delete,
        } => {
            let rows = state.direct.entry(relation.clone()).or_default();

            let resolve = |rows: &[AttributeMap], m: &RecordMatch| -> AppResult<usize> {
                match m {
                    RecordMatch::ById(id) => rows
                        .iter()
                        .position(|r| attribute_id(r) == Some(*id))
                        .ok_or_else(|| {
                            AppError::not_found(format!(
                                "no row with id {id} in relation '{relation}'"
                            ))
                        }),
                    RecordMatch::ByPosition(position) => {
                        if *position < rows.len() {
                            Ok(*position)
                        } else {
                            Err(AppError::not_found(format!(
                                "no row at position {position} in relation '{relation}'"
                            )))
                        }
                    }
                }
            };

            // Updates first (they do not move rows), then deletes in
            // descending position order, then creates.
            for (m, attributes) in update {
                let position = resolve(rows, m)?;
                rows[position] = attributes.clone();
            }

            let mut positions = delete
                .iter()
                .map(|m| resolve(rows, m))
                .collect::<AppResult<Vec<_>>>()?;
            positions.sort_unstable_by(|a, b| b.cmp(a));
            positions.dedup();
            for position in positions {
                rows.remove(position);
            }

            rows.extend(create.iter().cloned());
        }
        RelationRestore::Pivoted {
            relation,
            attach,
            detach,
            pivot_attributes,
        } => {
            let members = state.members.entry(relation.clone()).or_default();
            for id in detach {
                members.remove(id);
            }
            members.extend(attach.iter().copied());

            let pivots = state.pivots.entry(relation.clone()).or_default();
            for id in detach {
                pivots.remove(id);
            }
            for (id, attributes) in pivot_attributes {
                if attributes.is_empty() {
                    pivots.remove(id);
                } else {
                    pivots.insert(*id, attributes.clone());
                }
            }
        }
    }
    Ok(())
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    fn descriptor(&self) -> &RecordDescriptor {
        &self.descriptor
    }

    async fn attributes(&self, id: Uuid) -> AppResult<AttributeMap> {
        self.with_record(id, |state| state.attributes.clone())
    }

    async fn related_records(&self, id: Uuid, relation: &str) -> AppResult<Vec<AttributeMap>> {
        self.with_record(id, |state| {
            state.direct.get(relation).cloned().unwrap_or_default()
        })
    }

    async fn members(&self, id: Uuid, relation: &str) -> AppResult<BTreeSet<Uuid>> {
        self.with_record(id, |state| {
            state.members.get(relation).cloned().unwrap_or_default()
        })
    }

    async fn pivot_attributes(
        &self,
        id: Uuid,
        relation: &str,
    ) -> AppResult<BTreeMap<Uuid, AttributeMap>> {
        self.with_record(id, |state| {
            state.pivots.get(relation).cloned().unwrap_or_default()
        })
    }

    async fn apply_restore(&self, id: Uuid, plan: &RestorePlan) -> AppResult<()> {
        let mut records = self.lock();
        let state = records
            .get(&id)
            .ok_or_else(|| AppError::not_found(format!("record {id} not found")))?;

        // Work on a copy; commit only when the whole plan applied.
        let mut working = state.clone();
        working.attributes = plan.attributes.clone();
        for restore in &plan.relations {
            apply_relation_restore(&mut working, restore)?;
        }

        records.insert(id, working);
        Ok(())
    }
}
