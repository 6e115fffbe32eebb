//! Acting-user resolution.

use uuid::Uuid;

/// Supplies the id of the user performing the current change, if any.
///
/// Revision rows store this as `user_id`; anonymous or system-driven
/// changes store `NULL`.
pub trait IdentityResolver: Send + Sync {
    /// The current acting user id, or `None` when there is none.
    fn current_user_id(&self) -> Option<Uuid>;
}

/// Resolver that always returns the same identity.
///
/// Useful for request-scoped contexts that already resolved the user, and
/// for tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedIdentity(pub Option<Uuid>);

impl IdentityResolver for FixedIdentity {
    fn current_user_id(&self) -> Option<Uuid> {
        self.0
    }
}
