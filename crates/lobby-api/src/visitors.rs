//! `GET /visitors/search?mode=identifier|name&term=…`
//!
//! Returns one prior visit per distinct visitor identifier, first match
//! wins. An empty result is `200 []`; a blank term is `422`.

use axum::{
  Json,
  extract::{Query, State},
};
use lobby_core::{
  resolution::{self, SearchMode},
  session::Capability,
  store::{Roster, VisitStore},
  visit::VisitRecord,
};
use serde::Deserialize;

use crate::{ApiState, Operator, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct SearchParams {
  pub mode: SearchMode,
  #[serde(default)]
  pub term: String,
}

pub async fn search<S>(
  State(state): State<ApiState<S>>,
  operator: Operator,
  Query(params): Query<SearchParams>,
) -> Result<Json<Vec<VisitRecord>>, ApiError>
where
  S: VisitStore + Roster,
{
  operator.require(Capability::SearchVisitors)?;
  let visitors = resolution::search(state.store.as_ref(), params.mode, &params.term).await?;
  Ok(Json(visitors))
}
