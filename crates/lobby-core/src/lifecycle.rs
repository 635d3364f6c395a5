//! Lifecycle operations on committed visits.
//!
//! Every operation checks its precondition against the current record before
//! asking the store to mutate anything, and the mutation itself is conditional
//! on the status it checked. If another operator wins the race in between, the
//! store reports a conflict and the caller sees the same error as if the check
//! had failed.

use chrono::{FixedOffset, NaiveDate, Utc};
use uuid::Uuid;

use crate::{
  Error, Result,
  report::day_range,
  store::{VisitQuery, VisitStore},
  visit::{TransitionOutcome, VisitRecord, VisitStatus, VisitTransition},
};

/// Move a visit from `pending` to `active`.
pub async fn admit<S: VisitStore>(store: &S, id: Uuid) -> Result<VisitRecord> {
  let record = apply(store, id, VisitTransition::Admit).await?;
  tracing::info!(visit_id = %id, "visitor admitted");
  Ok(record)
}

/// Mark an `active` visit as `completed`, stamping its end time.
///
/// Blank observations are stored as none.
pub async fn discharge<S: VisitStore>(
  store: &S,
  id: Uuid,
  observations: Option<String>,
) -> Result<VisitRecord> {
  let observations = observations
    .map(|o| o.trim().to_owned())
    .filter(|o| !o.is_empty());
  let transition = VisitTransition::Discharge {
    ended_at: Utc::now(),
    observations,
  };
  let record = apply(store, id, transition).await?;
  tracing::info!(visit_id = %id, "visitor discharged");
  Ok(record)
}

async fn apply<S: VisitStore>(
  store: &S,
  id: Uuid,
  transition: VisitTransition,
) -> Result<VisitRecord> {
  let expected = transition.from();

  let current = store
    .get(id)
    .await
    .map_err(Error::store)?
    .ok_or(Error::VisitNotFound(id))?;
  if current.status != expected {
    return Err(Error::InvalidTransition {
      id,
      expected,
      actual: current.status,
    });
  }

  match store.transition(id, transition).await.map_err(Error::store)? {
    TransitionOutcome::Applied(record) => Ok(record),
    TransitionOutcome::NotFound => Err(Error::VisitNotFound(id)),
    TransitionOutcome::Conflict(actual) => {
      tracing::warn!(visit_id = %id, %actual, "lost a lifecycle race");
      Err(Error::InvalidTransition { id, expected, actual })
    }
  }
}

/// The most recently created visit. Ties on `created_at` go to the record
/// that comes first in store order.
pub async fn latest<S: VisitStore>(store: &S) -> Result<Option<VisitRecord>> {
  let records = store.query(&VisitQuery::all()).await.map_err(Error::store)?;
  Ok(most_recent(records))
}

pub(crate) fn most_recent(records: Vec<VisitRecord>) -> Option<VisitRecord> {
  records.into_iter().fold(None, |best, r| match best {
    Some(b) if b.created_at >= r.created_at => Some(b),
    _ => Some(r),
  })
}

// ─── Active board ────────────────────────────────────────────────────────────

/// Narrowing applied to the list of visitors currently on site.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardFilter {
  /// Case-insensitive substring of the badge/card number.
  pub card:       Option<String>,
  /// Case-insensitive substring of the visitor identifier.
  pub identifier: Option<String>,
}

/// Active visits created on `day` at the desk's `offset`, the candidates for
/// discharge.
pub async fn active_on<S: VisitStore>(
  store: &S,
  day: NaiveDate,
  offset: FixedOffset,
  filter: &BoardFilter,
) -> Result<Vec<VisitRecord>> {
  let non_blank = |s: &Option<String>| {
    s.as_deref()
      .map(str::trim)
      .filter(|s| !s.is_empty())
      .map(str::to_owned)
  };
  let query = VisitQuery {
    status: Some(VisitStatus::Active),
    created_within: Some(day_range(day, None, offset)),
    card_like: non_blank(&filter.card),
    identifier_like: non_blank(&filter.identifier),
    ..VisitQuery::default()
  };
  store.query(&query).await.map_err(Error::store)
}
