//! Restore plans.
//!
//! The rollback engine never mutates the owning record directly. It diffs a
//! target snapshot against the record's current state into a [`RestorePlan`]
//! and hands the whole plan to [`crate::traits::RecordStore::apply_restore`],
//! which applies it as one atomic unit of work. Keeping the diff pure makes
//! the tie-break policy testable without a backing store.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use uuid::Uuid;

use crate::types::snapshot::AttributeMap;

/// How a direct-relation row to update or delete is addressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordMatch {
    /// The row carries an `id` attribute on both sides.
    ById(Uuid),
    /// Positional pairing in capture order, for rows without ids.
    ByPosition(usize),
}

/// Restoration actions for a single tracked relation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "class", rename_all = "snake_case")]
pub enum RelationRestore {
    /// Row-level changes for a direct relation.
    Direct {
        /// Relation name.
        relation: String,
        /// Rows present in the snapshot but absent now; recreated as-is.
        create: Vec<AttributeMap>,
        /// Rows present in both; overwritten with the snapshot attributes.
        update: Vec<(RecordMatch, AttributeMap)>,
        /// Rows present now but absent from the snapshot; removed.
        delete: Vec<RecordMatch>,
    },
    /// Membership reset for a pivoted relation.
    Pivoted {
        /// Relation name.
        relation: String,
        /// Member ids to add.
        attach: BTreeSet<Uuid>,
        /// Member ids to remove.
        detach: BTreeSet<Uuid>,
        /// Join attributes to reapply, keyed by member id. An empty map
        /// clears attributes the snapshot did not have.
        pivot_attributes: BTreeMap<Uuid, AttributeMap>,
    },
}

impl RelationRestore {
    /// The name of the relation this restore targets.
    pub fn relation(&self) -> &str {
        match self {
            Self::Direct { relation, .. } | Self::Pivoted { relation, .. } => relation,
        }
    }

    /// Whether applying this restore would change nothing.
    pub fn is_noop(&self) -> bool {
        match self {
            Self::Direct {
                create,
                update,
                delete,
                ..
            } => create.is_empty() && update.is_empty() && delete.is_empty(),
            Self::Pivoted {
                attach,
                detach,
                pivot_attributes,
                ..
            } => attach.is_empty() && detach.is_empty() && pivot_attributes.is_empty(),
        }
    }
}

/// Full set of changes restoring a record to a snapshot.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RestorePlan {
    /// Scalar attributes to overwrite on the owner record.
    pub attributes: AttributeMap,
    /// Per-relation restoration actions, one entry per tracked relation
    /// present in the snapshot.
    pub relations: Vec<RelationRestore>,
}
