//! Lifecycle hook registry.
//!
//! Callers can observe snapshot creation through two hook points:
//! `revisioning` fires before a snapshot is captured and may cancel it by
//! returning `false` (a cancel is a normal outcome, not an error), and
//! `revisioned` fires after a revision was persisted. Hooks are registered
//! per record type tag and dispatched in registration order.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::revision::Revision;
use crate::types::change::TransitionKind;
use crate::types::owner::OwnerRef;

/// Context handed to every hook invocation.
#[derive(Debug, Clone)]
pub struct HookContext {
    /// The record the snapshot concerns.
    pub owner: OwnerRef,
    /// The transition that triggered the snapshot.
    pub transition: TransitionKind,
}

/// Cancelable pre-snapshot hook. Returning `false` aborts the snapshot.
pub type RevisioningHook = dyn Fn(&HookContext) -> bool + Send + Sync;

/// Post-snapshot hook, fired after the revision is persisted.
pub type RevisionedHook = dyn Fn(&HookContext, &Revision) + Send + Sync;

/// Ordered registry of lifecycle hooks keyed by record type tag.
#[derive(Default)]
pub struct HookRegistry {
    revisioning: RwLock<HashMap<String, Vec<Arc<RevisioningHook>>>>,
    revisioned: RwLock<HashMap<String, Vec<Arc<RevisionedHook>>>>,
}

impl HookRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a cancelable `revisioning` hook for a record type.
    pub fn on_revisioning<F>(&self, type_tag: impl Into<String>, hook: F)
    where
        F: Fn(&HookContext) -> bool + Send + Sync + 'static,
    {
        let mut hooks = self.revisioning.write().unwrap_or_else(|e| e.into_inner());
        hooks
            .entry(type_tag.into())
            .or_default()
            .push(Arc::new(hook));
    }

    /// Register a `revisioned` hook for a record type.
    pub fn on_revisioned<F>(&self, type_tag: impl Into<String>, hook: F)
    where
        F: Fn(&HookContext, &Revision) + Send + Sync + 'static,
    {
        let mut hooks = self.revisioned.write().unwrap_or_else(|e| e.into_inner());
        hooks
            .entry(type_tag.into())
            .or_default()
            .push(Arc::new(hook));
    }

    /// Fire `revisioning` hooks in registration order.
    ///
    /// Returns `false` as soon as any hook cancels; remaining hooks are not
    /// invoked.
    pub fn fire_revisioning(&self, ctx: &HookContext) -> bool {
        let hooks = {
            let map = self.revisioning.read().unwrap_or_else(|e| e.into_inner());
            map.get(&ctx.owner.type_tag).cloned().unwrap_or_default()
        };

        hooks.iter().all(|hook| hook(ctx))
    }

    /// Fire `revisioned` hooks in registration order. Not cancelable.
    pub fn fire_revisioned(&self, ctx: &HookContext, revision: &Revision) {
        let hooks = {
            let map = self.revisioned.read().unwrap_or_else(|e| e.into_inner());
            map.get(&ctx.owner.type_tag).cloned().unwrap_or_default()
        };

        for hook in &hooks {
            hook(ctx, revision);
        }
    }
}

impl std::fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookRegistry").finish_non_exhaustive()
    }
}
