//! The `VisitStore` and `Roster` traits and supporting query types.
//!
//! Both are implemented by storage backends (e.g. `lobby-store-sqlite`).
//! Higher layers (`lobby-api`, `lobby-server`) depend on these abstractions,
//! not on any concrete backend.

use std::future::Future;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
  directory::{HostRecord, NewHost},
  visit::{NewVisit, TransitionOutcome, VisitRecord, VisitStatus, VisitTransition},
};

// ─── Query type ──────────────────────────────────────────────────────────────

/// Parameters for [`VisitStore::query`]. All set filters must match.
///
/// The `*_like` fields are case-insensitive substring matches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisitQuery {
  pub status:          Option<VisitStatus>,
  /// Half-open `[from, until)` range on `created_at`; see
  /// [`crate::report::day_range`].
  pub created_within:  Option<(DateTime<Utc>, DateTime<Utc>)>,
  pub identifier_like: Option<String>,
  pub name_like:       Option<String>,
  pub card_like:       Option<String>,
  pub limit:           Option<usize>,
}

impl VisitQuery {
  pub fn all() -> Self { Self::default() }

  pub fn with_status(status: VisitStatus) -> Self {
    Self {
      status: Some(status),
      ..Self::default()
    }
  }
}

// ─── Traits ──────────────────────────────────────────────────────────────────

/// Abstraction over the external record store that owns visit records.
///
/// Records are never deleted through this trait. The only mutation is
/// [`VisitStore::transition`], which must be a compare-and-set on the status so
/// that the store is the single serialization point for concurrent operators.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait VisitStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Persist a composed visit and return it with its store-assigned id.
  fn create(
    &self,
    input: NewVisit,
  ) -> impl Future<Output = Result<VisitRecord, Self::Error>> + Send + '_;

  /// Retrieve a visit by id. Returns `None` if not found.
  fn get(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<VisitRecord>, Self::Error>> + Send + '_;

  /// Return matching visits in the store's natural (insertion) order.
  fn query<'a>(
    &'a self,
    query: &'a VisitQuery,
  ) -> impl Future<Output = Result<Vec<VisitRecord>, Self::Error>> + Send + 'a;

  /// Apply `transition` only if the record currently holds
  /// [`VisitTransition::from`].
  fn transition(
    &self,
    id: Uuid,
    transition: VisitTransition,
  ) -> impl Future<Output = Result<TransitionOutcome, Self::Error>> + Send + '_;
}

/// Source of the employee roster used to resolve hosts.
pub trait Roster: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// All hosts in roster order.
  fn list_hosts(
    &self,
  ) -> impl Future<Output = Result<Vec<HostRecord>, Self::Error>> + Send + '_;

  /// Append a host to the end of the roster.
  fn add_host(
    &self,
    input: NewHost,
  ) -> impl Future<Output = Result<HostRecord, Self::Error>> + Send + '_;
}
