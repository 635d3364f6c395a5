//! Handlers for `/visits` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/visits` | Filters: `status`, `date`, `identifier`, `name`, `card`, `limit` |
//! | `POST` | `/visits` | Register a visit; body: [`RegisterBody`] |
//! | `GET`  | `/visits/active` | Today's on-site visitors; `card`, `identifier`, `date` |
//! | `GET`  | `/visits/last-host` | Host draft recalled from the latest visit, or `null` |
//! | `GET`  | `/visits/:id` | 404 if not found |
//! | `POST` | `/visits/:id/admit` | `pending` → `active` |
//! | `POST` | `/visits/:id/discharge` | `active` → `completed`; optional body: `{"observations":…}` |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::{FixedOffset, NaiveDate};
use lobby_core::{
  Error as CoreError,
  draft::{HostDraft, VisitorDraft},
  lifecycle::{self, BoardFilter},
  report::day_range,
  session::Capability,
  store::{Roster, VisitQuery, VisitStore},
  visit::{HostAssignment, VisitRecord, VisitStatus},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{ApiState, Operator, error::ApiError};

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
  pub status:     Option<VisitStatus>,
  /// Desk calendar day the visit was created on.
  pub date:       Option<NaiveDate>,
  pub identifier: Option<String>,
  pub name:       Option<String>,
  pub card:       Option<String>,
  pub limit:      Option<usize>,
}

impl ListParams {
  /// The store query, with `date` taken at the desk's `offset`.
  pub fn into_query(self, offset: FixedOffset) -> VisitQuery {
    VisitQuery {
      status:          self.status,
      created_within:  self.date.map(|d| day_range(d, None, offset)),
      identifier_like: self.identifier,
      name_like:       self.name,
      card_like:       self.card,
      limit:           self.limit,
    }
  }
}

/// `GET /visits[?status=…&date=…&identifier=…&name=…&card=…&limit=…]`
pub async fn list<S>(
  State(state): State<ApiState<S>>,
  operator: Operator,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<VisitRecord>>, ApiError>
where
  S: VisitStore + Roster,
{
  operator.require(Capability::ViewHistory)?;
  let query = params.into_query(state.desk.utc_offset);
  let visits = state.store.query(&query).await.map_err(CoreError::store)?;
  Ok(Json(visits))
}

// ─── Register ─────────────────────────────────────────────────────────────────

/// A completed desk form: the visitor half plus the host to resolve.
#[derive(Debug, Deserialize)]
pub struct RegisterBody {
  pub visitor:   VisitorDraft,
  /// Roster name of the host being visited.
  pub host_name: String,
  /// Edits to the resolved host fields, applied after resolution. The host
  /// name is always the resolved one.
  #[serde(default)]
  pub host:      Option<HostAssignment>,
}

/// `POST /visits`
pub async fn register<S>(
  State(state): State<ApiState<S>>,
  operator: Operator,
  Json(body): Json<RegisterBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: VisitStore + Roster,
{
  let session = operator.require(Capability::RegisterVisit)?;

  let mut desk = state.open_desk().await?;
  *desk.visitor_mut() = body.visitor;
  if desk.select_host(&body.host_name)
    && let Some(edited) = body.host
  {
    desk.host_mut().amend(edited);
  }

  let record = desk.submit().await?;
  tracing::debug!(visit_id = %record.visit_id, operator = %session.operator, "registered via api");
  Ok((StatusCode::CREATED, Json(record)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /visits/:id`
pub async fn get_one<S>(
  State(state): State<ApiState<S>>,
  operator: Operator,
  Path(id): Path<Uuid>,
) -> Result<Json<VisitRecord>, ApiError>
where
  S: VisitStore + Roster,
{
  operator.require(Capability::ViewHistory)?;
  let visit = state
    .store
    .get(id)
    .await
    .map_err(CoreError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("visit {id} not found")))?;
  Ok(Json(visit))
}

// ─── Lifecycle ────────────────────────────────────────────────────────────────

/// `POST /visits/:id/admit`
pub async fn admit<S>(
  State(state): State<ApiState<S>>,
  operator: Operator,
  Path(id): Path<Uuid>,
) -> Result<Json<VisitRecord>, ApiError>
where
  S: VisitStore + Roster,
{
  operator.require(Capability::DischargeVisit)?;
  let visit = lifecycle::admit(state.store.as_ref(), id).await?;
  Ok(Json(visit))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DischargeBody {
  pub observations: Option<String>,
}

/// `POST /visits/:id/discharge`
pub async fn discharge<S>(
  State(state): State<ApiState<S>>,
  operator: Operator,
  Path(id): Path<Uuid>,
  body: Option<Json<DischargeBody>>,
) -> Result<Json<VisitRecord>, ApiError>
where
  S: VisitStore + Roster,
{
  operator.require(Capability::DischargeVisit)?;
  let observations = body.and_then(|Json(b)| b.observations);
  let visit = lifecycle::discharge(state.store.as_ref(), id, observations).await?;
  Ok(Json(visit))
}

// ─── Active board ─────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct BoardParams {
  /// Defaults to the desk's today.
  pub date:       Option<NaiveDate>,
  pub card:       Option<String>,
  pub identifier: Option<String>,
}

/// `GET /visits/active[?card=…&identifier=…&date=…]`
pub async fn active<S>(
  State(state): State<ApiState<S>>,
  operator: Operator,
  Query(params): Query<BoardParams>,
) -> Result<Json<Vec<VisitRecord>>, ApiError>
where
  S: VisitStore + Roster,
{
  operator.require(Capability::DischargeVisit)?;
  let day = params.date.unwrap_or_else(|| state.desk.today());
  let filter = BoardFilter {
    card:       params.card,
    identifier: params.identifier,
  };
  let visits =
    lifecycle::active_on(state.store.as_ref(), day, state.desk.utc_offset, &filter).await?;
  Ok(Json(visits))
}

// ─── Last host ────────────────────────────────────────────────────────────────

/// `GET /visits/last-host`
pub async fn last_host<S>(
  State(state): State<ApiState<S>>,
  operator: Operator,
) -> Result<Json<Option<HostDraft>>, ApiError>
where
  S: VisitStore + Roster,
{
  operator.require(Capability::RegisterVisit)?;
  let mut desk = state.open_desk().await?;
  let recalled = desk.recall_last_visit().await?;
  Ok(Json(recalled.then(|| desk.host().clone())))
}
