//! Error types for `lobby-core`.

use thiserror::Error;
use uuid::Uuid;

use crate::{
  resolution::SearchMode,
  session::{Capability, Role},
  visit::VisitStatus,
};

#[derive(Debug, Error)]
pub enum Error {
  // ── Validation ───────────────────────────────────────────────────────────
  #[error(
    "identifier {0:?} is not valid: it must be 4 to 20 characters long and \
     contain only letters, digits, hyphens or periods"
  )]
  InvalidIdentifier(String),

  #[error("select a host to visit before registering the visit")]
  NoHostSelected,

  #[error("party size must be at least 1")]
  InvalidPartySize,

  #[error("enter {} to search for", .0.prompt())]
  EmptySearchTerm(SearchMode),

  // ── Lifecycle ────────────────────────────────────────────────────────────
  #[error("visit not found: {0}")]
  VisitNotFound(Uuid),

  #[error("visit {id} is {actual}, expected it to be {expected}")]
  InvalidTransition {
    id:       Uuid,
    expected: VisitStatus,
    actual:   VisitStatus,
  },

  // ── Session ──────────────────────────────────────────────────────────────
  #[error("role {role} is not permitted to {capability}")]
  NotPermitted { role: Role, capability: Capability },

  // ── Collaborators ────────────────────────────────────────────────────────
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Wrap a collaborator (store or roster) failure.
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }

  /// Operator input problems; the drafts are left as they were.
  pub fn is_validation(&self) -> bool {
    matches!(
      self,
      Self::InvalidIdentifier(_)
        | Self::NoHostSelected
        | Self::InvalidPartySize
        | Self::EmptySearchTerm(_)
    )
  }

  /// Illegal lifecycle moves; the store is left unchanged.
  pub fn is_lifecycle(&self) -> bool {
    matches!(self, Self::VisitNotFound(_) | Self::InvalidTransition { .. })
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
