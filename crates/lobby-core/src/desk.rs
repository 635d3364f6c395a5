//! The reception desk: where a visit is assembled and submitted.
//!
//! A [`VisitDesk`] owns the two drafts, a snapshot of the roster and a handle
//! to the store. Nothing reaches the store until [`VisitDesk::submit`] has
//! checked every precondition, and the drafts are only cleared once the store
//! has accepted the record.

use std::sync::Arc;

use chrono::{FixedOffset, NaiveDate, Offset as _, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  directory::Directory,
  draft::{HostDraft, VisitorDraft, compose},
  lifecycle,
  report,
  resolution::{self, SearchMode},
  store::VisitStore,
  visit::{VisitRecord, VisitStatus, VisitorIdentity},
};

/// Desk behaviour that varies between deployments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeskConfig {
  /// Status given to newly submitted visits: `pending` requires a separate
  /// admit step, `active` puts the visitor on site immediately.
  pub initial_status: VisitStatus,
  /// Offset of the desk's wall clock, written `"+01:00"`. Calendar days and
  /// weekdays in reports are taken at this offset.
  #[serde(with = "utc_offset")]
  pub utc_offset:     FixedOffset,
}

impl Default for DeskConfig {
  fn default() -> Self {
    Self {
      initial_status: VisitStatus::Active,
      utc_offset:     Utc.fix(),
    }
  }
}

impl DeskConfig {
  /// The desk's current calendar day.
  pub fn today(&self) -> NaiveDate { report::local_date(Utc::now(), self.utc_offset) }
}

/// Serde adapter for a [`FixedOffset`] written as `"+HH:MM"`.
pub mod utc_offset {
  use chrono::FixedOffset;
  use serde::{Deserialize as _, Deserializer, Serializer, de::Error as _};

  pub fn serialize<S: Serializer>(offset: &FixedOffset, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(offset)
  }

  pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<FixedOffset, D::Error> {
    let raw = String::deserialize(d)?;
    raw
      .trim()
      .parse()
      .map_err(|_| D::Error::custom(format!("invalid UTC offset {raw:?}, expected +HH:MM")))
  }
}

pub struct VisitDesk<S> {
  store:     Arc<S>,
  directory: Directory,
  config:    DeskConfig,
  visitor:   VisitorDraft,
  host:      HostDraft,
}

impl<S: VisitStore> VisitDesk<S> {
  pub fn new(store: Arc<S>, directory: Directory, config: DeskConfig) -> Self {
    Self {
      store,
      directory,
      config,
      visitor: VisitorDraft::default(),
      host: HostDraft::default(),
    }
  }

  pub fn directory(&self) -> &Directory { &self.directory }

  pub fn visitor(&self) -> &VisitorDraft { &self.visitor }

  pub fn visitor_mut(&mut self) -> &mut VisitorDraft { &mut self.visitor }

  pub fn host(&self) -> &HostDraft { &self.host }

  pub fn host_mut(&mut self) -> &mut HostDraft { &mut self.host }

  // ── Draft editing ───────────────────────────────────────────────────────

  /// Resolve `name` in the roster and copy it into the host draft. Returns
  /// `false`, leaving the draft as it was, when no host has that name.
  pub fn select_host(&mut self, name: &str) -> bool {
    let found = self.directory.resolve_into(name, &mut self.host);
    if !found {
      tracing::debug!(host = name, "host not in roster");
    }
    found
  }

  pub fn set_anonymous(&mut self, anonymous: bool) { self.visitor.set_anonymous(anonymous); }

  /// Copy a prior visitor's identity into the draft, keeping visit details.
  pub fn adopt_visitor(&mut self, identity: &VisitorIdentity) { self.visitor.adopt(identity); }

  /// Reset the visitor identity and visit details.
  pub fn cancel_visitor(&mut self) { self.visitor.clear(); }

  /// Reset the host assignment and selection.
  pub fn cancel_visit(&mut self) { self.host.clear(); }

  // ── Store-backed operations ─────────────────────────────────────────────

  /// Search prior visits for a visitor to adopt.
  pub async fn search_visitors(&self, mode: SearchMode, term: &str) -> Result<Vec<VisitRecord>> {
    resolution::search(self.store.as_ref(), mode, term).await
  }

  /// Validate the drafts, hand the composed record to the store and clear the
  /// drafts. On any failure the drafts are left untouched.
  pub async fn submit(&mut self) -> Result<VisitRecord> {
    let input = compose(&self.visitor, &self.host, self.config.initial_status, Utc::now())?;
    let record = self.store.create(input).await.map_err(Error::store)?;

    tracing::info!(
      visit_id = %record.visit_id,
      status = %record.status,
      anonymous = self.visitor.anonymous,
      host = %record.host.host_name,
      "visit registered"
    );

    self.visitor.clear();
    self.host.clear();
    Ok(record)
  }

  /// Pre-fill the host draft from the most recent visit. The host is
  /// re-selected by name when it is still in the roster. Returns `false` when
  /// the store holds no visits.
  pub async fn recall_last_visit(&mut self) -> Result<bool> {
    let Some(last) = lifecycle::latest(self.store.as_ref()).await? else {
      return Ok(false);
    };
    let host = self.directory.find(&last.host.host_name);
    tracing::debug!(
      visit_id = %last.visit_id,
      resolved = host.is_some(),
      "recalled last visit"
    );
    self.host.restore(last.host, host);
    Ok(true)
  }
}
