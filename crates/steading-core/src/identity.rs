//! The identity collaborator: who is "the current user" for an operation.

use uuid::Uuid;

/// Resolves the current authenticated user, if any.
///
/// `None` is not an error: progression operations treat it as a guest
/// context and degrade to no-ops or zero values.
pub trait Identity: Send + Sync {
  fn current_user(&self) -> Option<Uuid>;
}

/// The single tenant configured for this deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticIdentity(pub Uuid);

impl Identity for StaticIdentity {
  fn current_user(&self) -> Option<Uuid> { Some(self.0) }
}

/// No user is signed in.
#[derive(Debug, Clone, Copy, Default)]
pub struct Anonymous;

impl Identity for Anonymous {
  fn current_user(&self) -> Option<Uuid> { None }
}

impl Identity for Option<Uuid> {
  fn current_user(&self) -> Option<Uuid> { *self }
}
