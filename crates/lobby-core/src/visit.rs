//! Visit types: the persisted unit of the Lobby registry.
//!
//! A visit record is composed once at the desk and handed to the store. After
//! that only its lifecycle fields (status, end time, discharge observations)
//! ever change; the visitor identity and host snapshot are frozen.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stored in place of the identifier and name of an anonymous visitor.
pub const UNKNOWN_VISITOR: &str = "unknown";

// ─── Visitor ─────────────────────────────────────────────────────────────────

/// Who is visiting. May be copied from one visit to the next.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitorIdentity {
  /// Government-ID-like string, or [`UNKNOWN_VISITOR`].
  pub identifier: String,
  pub name:       String,
  pub company:    String,
}

impl VisitorIdentity {
  /// The identity recorded for a visitor who would not or could not identify
  /// themselves. The company is kept.
  pub fn anonymous(company: impl Into<String>) -> Self {
    Self {
      identifier: UNKNOWN_VISITOR.to_owned(),
      name:       UNKNOWN_VISITOR.to_owned(),
      company:    company.into(),
    }
  }

  pub fn is_anonymous(&self) -> bool { self.identifier == UNKNOWN_VISITOR }
}

/// Per-visit information; never shared across visits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisitDetails {
  pub reason:       String,
  /// Badge or card handed out at the desk.
  pub card_number:  String,
  /// Number of people in the party; at least 1.
  pub party_size:   u32,
  /// Badge colour tag.
  pub color:        String,
  pub observations: String,
}

impl Default for VisitDetails {
  fn default() -> Self {
    Self {
      reason:       String::new(),
      card_number:  String::new(),
      party_size:   1,
      color:        String::new(),
      observations: String::new(),
    }
  }
}

// ─── Host ────────────────────────────────────────────────────────────────────

/// Snapshot of the employee being visited, copied from the roster.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostAssignment {
  pub host_name: String,
  pub division:  String,
  pub org_unit:  String,
  pub service:   String,
  pub location:  String,
  /// Phone extension.
  pub phone:     String,
}

// ─── Status ──────────────────────────────────────────────────────────────────

/// Where a visit is in its lifecycle.
///
/// ```text
/// pending ──admit──▶ active ──discharge──▶ completed
/// ```
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
  strum::AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum VisitStatus {
  /// Registered but not yet admitted.
  Pending,
  /// Visitor is on site.
  Active,
  /// Visitor has been discharged.
  Completed,
}

impl VisitStatus {
  pub fn can_transition_to(self, next: VisitStatus) -> bool {
    matches!(
      (self, next),
      (Self::Pending, Self::Active) | (Self::Active, Self::Completed)
    )
  }

  pub fn is_terminal(self) -> bool { matches!(self, Self::Completed) }
}

// ─── Record ──────────────────────────────────────────────────────────────────

/// A persisted check-in/check-out occurrence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisitRecord {
  pub visit_id:               Uuid,
  pub visitor:                VisitorIdentity,
  pub details:                VisitDetails,
  pub host:                   HostAssignment,
  /// Roster id of the host resolved at submission time.
  pub host_id:                Uuid,
  pub status:                 VisitStatus,
  /// Assigned at submission; never changes.
  pub created_at:             DateTime<Utc>,
  pub ended_at:               Option<DateTime<Utc>>,
  pub discharge_observations: Option<String>,
}

/// Input to [`crate::store::VisitStore::create`]. The store assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewVisit {
  pub visitor:    VisitorIdentity,
  pub details:    VisitDetails,
  pub host:       HostAssignment,
  pub host_id:    Uuid,
  pub status:     VisitStatus,
  pub created_at: DateTime<Utc>,
}

// ─── Transitions ─────────────────────────────────────────────────────────────

/// A lifecycle move handed to [`crate::store::VisitStore::transition`]. The
/// store applies it only if the record is still in [`Self::from`].
#[derive(Debug, Clone, PartialEq)]
pub enum VisitTransition {
  Admit,
  Discharge {
    ended_at:     DateTime<Utc>,
    observations: Option<String>,
  },
}

impl VisitTransition {
  /// The status the record must currently hold.
  pub fn from(&self) -> VisitStatus {
    match self {
      Self::Admit => VisitStatus::Pending,
      Self::Discharge { .. } => VisitStatus::Active,
    }
  }

  /// The status the record holds afterwards.
  pub fn to(&self) -> VisitStatus {
    match self {
      Self::Admit => VisitStatus::Active,
      Self::Discharge { .. } => VisitStatus::Completed,
    }
  }
}

/// What the store did with a [`VisitTransition`].
#[derive(Debug, Clone, PartialEq)]
pub enum TransitionOutcome {
  /// The record was updated; carries the new state.
  Applied(VisitRecord),
  NotFound,
  /// The record exists but holds this status instead of the expected one.
  Conflict(VisitStatus),
}
