//! Extractor for the operator [`Session`] carried in request headers.

use std::str::FromStr as _;

use axum::{extract::FromRequestParts, http::request::Parts};
use lobby_core::session::{Capability, Role, Session};

use crate::error::ApiError;

/// Header naming the operator's role: `administrator`, `receptionist` or
/// `master`.
pub const ROLE_HEADER: &str = "x-lobby-role";
/// Optional header naming the operator, used for logging.
pub const OPERATOR_HEADER: &str = "x-lobby-operator";

/// The session of whoever issued the request.
#[derive(Debug, Clone)]
pub struct Operator(pub Session);

impl Operator {
  /// Reject the request with `403` unless the role grants `capability`.
  pub fn require(&self, capability: Capability) -> Result<&Session, ApiError> {
    self.0.require(capability)?;
    Ok(&self.0)
  }
}

impl<S: Send + Sync> FromRequestParts<S> for Operator {
  type Rejection = ApiError;

  async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
    let header = |name: &str| {
      parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
    };

    let role = header(ROLE_HEADER)
      .filter(|r| !r.is_empty())
      .ok_or_else(|| ApiError::BadRequest(format!("missing {ROLE_HEADER} header")))?;
    let role =
      Role::from_str(role).map_err(|_| ApiError::BadRequest(format!("unknown role: {role}")))?;
    let operator = header(OPERATOR_HEADER).unwrap_or_default();

    Ok(Self(Session::new(operator, role)))
  }
}
