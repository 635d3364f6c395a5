//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error(transparent)]
  Core(#[from] lobby_core::Error),
}

impl ApiError {
  pub fn status(&self) -> StatusCode {
    use lobby_core::Error as E;
    match self {
      Self::NotFound(_) => StatusCode::NOT_FOUND,
      Self::BadRequest(_) => StatusCode::BAD_REQUEST,
      Self::Core(e) => match e {
        E::VisitNotFound(_) => StatusCode::NOT_FOUND,
        E::InvalidTransition { .. } => StatusCode::CONFLICT,
        E::NotPermitted { .. } => StatusCode::FORBIDDEN,
        E::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::UNPROCESSABLE_ENTITY,
      },
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    if status.is_server_error() {
      tracing::error!(error = %self, "request failed");
    }
    let message = match &self {
      Self::NotFound(m) | Self::BadRequest(m) => m.clone(),
      Self::Core(e) => e.to_string(),
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
