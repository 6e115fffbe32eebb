//! Owning-record store collaborator trait.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use uuid::Uuid;

use crate::result::AppResult;
use crate::types::relation::RecordDescriptor;
use crate::types::restore::RestorePlan;
use crate::types::snapshot::AttributeMap;

/// Access to the persistent store of one revisionable record type.
///
/// The engine never owns record storage — it reads attribute and relation
/// state through this trait when building snapshots, and applies whole
/// [`RestorePlan`]s through it when rolling back. One implementation per
/// record type; the descriptor carries the type tag and declared relations.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Static description of the record type this store manages.
    fn descriptor(&self) -> &RecordDescriptor;

    /// Current scalar attribute values of the record.
    ///
    /// Fails with `ErrorKind::NotFound` when the record does not exist.
    async fn attributes(&self, id: Uuid) -> AppResult<AttributeMap>;

    /// Full attribute state of every row currently related through a
    /// direct relation, in a stable order.
    async fn related_records(&self, id: Uuid, relation: &str) -> AppResult<Vec<AttributeMap>>;

    /// Current membership set of a pivoted relation.
    async fn members(&self, id: Uuid, relation: &str) -> AppResult<BTreeSet<Uuid>>;

    /// Extra join-table attributes of a pivoted relation, keyed by member
    /// id. Members without extra attributes may be absent.
    async fn pivot_attributes(
        &self,
        id: Uuid,
        relation: &str,
    ) -> AppResult<BTreeMap<Uuid, AttributeMap>>;

    /// Apply a restore plan as one atomic unit of work.
    ///
    /// Either the whole plan is applied or the record and its relations are
    /// left exactly as they were; a partially applied plan must never be
    /// observable.
    async fn apply_restore(&self, id: Uuid, plan: &RestorePlan) -> AppResult<()>;
}
