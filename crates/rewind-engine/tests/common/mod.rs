//! Shared test harness for the engine integration suites.

use std::sync::Arc;

use uuid::Uuid;

use rewind_core::hooks::HookRegistry;
use rewind_core::options::RevisionOptions;
use rewind_core::traits::identity::FixedIdentity;
use rewind_core::types::relation::{RecordDescriptor, RelationKind};
use rewind_core::types::snapshot::AttributeMap;
use rewind_engine::RevisionTracker;
use rewind_engine::memory::{InMemoryRecordStore, InMemoryRevisionStore};

/// A blog-post-like record type with one relation of each supported kind.
pub fn post_descriptor() -> RecordDescriptor {
    RecordDescriptor::new("post")
        .with_soft_delete_field("deleted_at")
        .with_relation("reply", RelationKind::HasOne)
        .with_relation("comments", RelationKind::HasMany)
        .with_relation("tags", RelationKind::ManyToMany)
}

pub struct Harness {
    pub records: Arc<InMemoryRecordStore>,
    pub revisions: Arc<InMemoryRevisionStore>,
    pub hooks: Arc<HookRegistry>,
    pub tracker: RevisionTracker,
}

/// Build a tracker over fresh in-memory stores for the `post` type.
pub fn harness(options: RevisionOptions) -> Harness {
    harness_as(options, None)
}

/// Same as [`harness`], acting as the given user.
pub fn harness_as(options: RevisionOptions, user_id: Option<Uuid>) -> Harness {
    harness_for(post_descriptor(), options, user_id)
}

/// Build a tracker for an arbitrary record type descriptor.
pub fn harness_for(
    descriptor: RecordDescriptor,
    options: RevisionOptions,
    user_id: Option<Uuid>,
) -> Harness {
    let records = Arc::new(InMemoryRecordStore::new(descriptor));
    let revisions = Arc::new(InMemoryRevisionStore::new());
    let hooks = Arc::new(HookRegistry::new());

    let tracker = RevisionTracker::new(
        Arc::clone(&records) as _,
        Arc::clone(&revisions) as _,
        Arc::new(FixedIdentity(user_id)),
        Arc::clone(&hooks),
        options,
    );

    Harness {
        records,
        revisions,
        hooks,
        tracker,
    }
}

pub fn attrs(pairs: &[(&str, serde_json::Value)]) -> AttributeMap {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

/// Insert a post with `name` and `views` attributes; returns its id.
pub fn insert_post(records: &InMemoryRecordStore, name: &str, views: i64) -> Uuid {
    let id = Uuid::new_v4();
    records.insert(
        id,
        attrs(&[
            ("name", serde_json::json!(name)),
            ("views", serde_json::json!(views)),
        ]),
    );
    id
}
