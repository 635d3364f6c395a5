//! Handlers for `/history` and `/statistics`.
//!
//! Both read the whole visit log and filter it in memory by calendar day at
//! the desk's UTC offset.

use axum::{
  Json,
  extract::{Query, State},
};
use chrono::NaiveDate;
use lobby_core::{
  Error as CoreError,
  report::{self, Statistics},
  session::Capability,
  store::{Roster, VisitQuery, VisitStore},
  visit::VisitRecord,
};
use serde::Deserialize;

use crate::{ApiState, Operator, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
  pub start: NaiveDate,
  /// Inclusive. Omit for the start day alone.
  pub end:   Option<NaiveDate>,
}

/// `GET /history?start=YYYY-MM-DD[&end=YYYY-MM-DD]`: most recent first.
pub async fn history<S>(
  State(state): State<ApiState<S>>,
  operator: Operator,
  Query(params): Query<HistoryParams>,
) -> Result<Json<Vec<VisitRecord>>, ApiError>
where
  S: VisitStore + Roster,
{
  operator.require(Capability::ViewHistory)?;
  let all = state
    .store
    .query(&VisitQuery::all())
    .await
    .map_err(CoreError::store)?;
  Ok(Json(report::filter_by_date(&all, params.start, params.end, state.desk.utc_offset)))
}

#[derive(Debug, Default, Deserialize)]
pub struct StatisticsParams {
  pub start: Option<NaiveDate>,
  pub end:   Option<NaiveDate>,
}

/// `GET /statistics[?start=…[&end=…]]`: over every visit when no start is
/// given.
pub async fn statistics<S>(
  State(state): State<ApiState<S>>,
  operator: Operator,
  Query(params): Query<StatisticsParams>,
) -> Result<Json<Statistics>, ApiError>
where
  S: VisitStore + Roster,
{
  operator.require(Capability::ViewStatistics)?;
  let all = state
    .store
    .query(&VisitQuery::all())
    .await
    .map_err(CoreError::store)?;

  let records = match (params.start, params.end) {
    (Some(start), end) => report::filter_by_date(&all, start, end, state.desk.utc_offset),
    (None, None) => all,
    (None, Some(_)) => return Err(ApiError::BadRequest("end given without start".into())),
  };
  Ok(Json(report::statistics(&records, state.desk.utc_offset)))
}
