//! Handlers for `/hosts` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/hosts` | Roster order |
//! | `POST` | `/hosts` | Requires a role that may manage the roster |
//! | `GET`  | `/hosts/options` | Distinct divisions, org units and services |

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use lobby_core::{
  Error as CoreError,
  directory::{Directory, HostOptions, HostRecord, NewHost},
  session::Capability,
  store::{Roster, VisitStore},
};

use crate::{ApiState, Operator, error::ApiError};

/// `GET /hosts`
pub async fn list<S>(State(state): State<ApiState<S>>) -> Result<Json<Vec<HostRecord>>, ApiError>
where
  S: VisitStore + Roster,
{
  let hosts = state
    .store
    .list_hosts()
    .await
    .map_err(CoreError::store)?;
  Ok(Json(hosts))
}

/// `POST /hosts`: body: a [`NewHost`]; `name` is required.
pub async fn create<S>(
  State(state): State<ApiState<S>>,
  operator: Operator,
  Json(body): Json<NewHost>,
) -> Result<impl IntoResponse, ApiError>
where
  S: VisitStore + Roster,
{
  let session = operator.require(Capability::ManageRoster)?;
  if body.name.trim().is_empty() {
    return Err(ApiError::BadRequest("host name must not be empty".into()));
  }

  let host = state
    .store
    .add_host(body)
    .await
    .map_err(CoreError::store)?;
  tracing::info!(host_id = %host.host_id, operator = %session.operator, "host added");
  Ok((StatusCode::CREATED, Json(host)))
}

/// `GET /hosts/options`
pub async fn options<S>(State(state): State<ApiState<S>>) -> Result<Json<HostOptions>, ApiError>
where
  S: VisitStore + Roster,
{
  let directory = Directory::load(state.store.as_ref()).await?;
  Ok(Json(directory.options()))
}
