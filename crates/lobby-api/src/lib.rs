//! JSON REST API for the Lobby visit registry.
//!
//! Exposes an axum [`Router`] backed by any store implementing both
//! [`VisitStore`] and [`Roster`]. Every visit endpoint requires an
//! `x-lobby-role` header; see [`operator`]. TLS and real authentication are
//! the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", lobby_api::api_router(store.clone(), DeskConfig::default()))
//! ```

pub mod error;
pub mod hosts;
pub mod operator;
pub mod reports;
pub mod visitors;
pub mod visits;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use lobby_core::{
  desk::{DeskConfig, VisitDesk},
  directory::Directory,
  store::{Roster, VisitStore},
};

pub use error::ApiError;
pub use operator::Operator;

/// Shared state threaded through every handler.
pub struct ApiState<S> {
  pub store: Arc<S>,
  pub desk:  DeskConfig,
}

impl<S> Clone for ApiState<S> {
  fn clone(&self) -> Self {
    Self {
      store: self.store.clone(),
      desk:  self.desk,
    }
  }
}

impl<S: VisitStore + Roster> ApiState<S> {
  /// A fresh desk over the current roster, with empty drafts.
  pub async fn open_desk(&self) -> Result<VisitDesk<S>, ApiError> {
    let directory = Directory::load(self.store.as_ref()).await?;
    Ok(VisitDesk::new(self.store.clone(), directory, self.desk))
  }
}

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>, desk: DeskConfig) -> Router<()>
where
  S: VisitStore + Roster + 'static,
{
  Router::new()
    // Roster
    .route("/hosts", get(hosts::list::<S>).post(hosts::create::<S>))
    .route("/hosts/options", get(hosts::options::<S>))
    // Visits
    .route("/visits", get(visits::list::<S>).post(visits::register::<S>))
    .route("/visits/active", get(visits::active::<S>))
    .route("/visits/last-host", get(visits::last_host::<S>))
    .route("/visits/{id}", get(visits::get_one::<S>))
    .route("/visits/{id}/admit", post(visits::admit::<S>))
    .route("/visits/{id}/discharge", post(visits::discharge::<S>))
    // Visitors
    .route("/visitors/search", get(visitors::search::<S>))
    // Reports
    .route("/history", get(reports::history::<S>))
    .route("/statistics", get(reports::statistics::<S>))
    .with_state(ApiState { store, desk })
}
