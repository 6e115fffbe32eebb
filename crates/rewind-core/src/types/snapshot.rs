//! Snapshot value objects.
//!
//! A [`Snapshot`] is the immutable payload stored in a revision's `metadata`
//! column: every persisted scalar attribute of the owner record plus the
//! captured state of each tracked relation. Snapshots are deep copies —
//! later mutation of the live record never alters a previously built one.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Scalar attribute values keyed by field name.
///
/// `BTreeMap` keeps serialization deterministic across captures.
pub type AttributeMap = BTreeMap<String, serde_json::Value>;

/// Captured state of one tracked relation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "class", rename_all = "snake_case")]
pub enum RelationState {
    /// Full attribute state of each directly related row, in capture order.
    Direct {
        /// One attribute map per related row, including its `id` when the
        /// row has one.
        records: Vec<AttributeMap>,
    },
    /// Membership snapshot of a many-to-many association.
    Pivoted {
        /// Identifiers of the related records.
        member_ids: BTreeSet<Uuid>,
        /// Extra join-table attributes keyed by member id.
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        pivot_attributes: BTreeMap<Uuid, AttributeMap>,
    },
}

/// Point-in-time capture of an owner record and its tracked relations.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Snapshot {
    /// All persisted scalar fields at capture time.
    pub attributes: AttributeMap,
    /// State of each relation registered for tracking. Untracked relations
    /// are never present here.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub relations: BTreeMap<String, RelationState>,
}

impl Snapshot {
    /// Create a snapshot of scalar attributes only.
    pub fn from_attributes(attributes: AttributeMap) -> Self {
        Self {
            attributes,
            relations: BTreeMap::new(),
        }
    }
}

/// Extract the `id` attribute of a related row, when present and a UUID.
///
/// Direct-relation restoration matches rows by id when both sides carry
/// one, falling back to positional pairing otherwise.
pub fn attribute_id(attributes: &AttributeMap) -> Option<Uuid> {
    attributes
        .get("id")
        .and_then(|v| v.as_str())
        .and_then(|s| Uuid::parse_str(s).ok())
}
