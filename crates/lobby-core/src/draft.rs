//! Drafts: the mutable, uncommitted halves of a visit being assembled.
//!
//! A [`VisitorDraft`] and a [`HostDraft`] are edited independently at the
//! desk. [`compose`] is the only way to turn them into a [`NewVisit`]; the
//! drafts themselves are never persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  directory::HostRecord,
  identity,
  visit::{HostAssignment, NewVisit, VisitDetails, VisitStatus, VisitorIdentity},
};

// ─── Visitor half ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisitorDraft {
  pub identity:  VisitorIdentity,
  pub details:   VisitDetails,
  /// Record the visit without identifying the visitor.
  pub anonymous: bool,
}

impl VisitorDraft {
  /// Flag the visitor as anonymous. Turning the flag on discards any typed
  /// identifier and name.
  pub fn set_anonymous(&mut self, anonymous: bool) {
    self.anonymous = anonymous;
    if anonymous {
      self.identity.identifier.clear();
      self.identity.name.clear();
    }
  }

  /// Copy a known visitor's identity into the draft. Visit details are kept.
  pub fn adopt(&mut self, identity: &VisitorIdentity) {
    self.identity.identifier = identity.identifier.clone();
    self.identity.name = identity.name.clone();
    self.identity.company = identity.company.clone();
  }

  pub fn clear(&mut self) { *self = Self::default(); }

  /// The identity that will be stored: the sentinel for anonymous visitors,
  /// otherwise the validated identifier.
  pub fn committed_identity(&self) -> Result<VisitorIdentity> {
    if self.anonymous {
      return Ok(VisitorIdentity::anonymous(self.identity.company.clone()));
    }
    let identifier = identity::validate(&self.identity.identifier)?;
    Ok(VisitorIdentity {
      identifier: identifier.to_owned(),
      name:       self.identity.name.clone(),
      company:    self.identity.company.clone(),
    })
  }
}

// ─── Host half ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostDraft {
  /// Editable host fields.
  pub assignment: HostAssignment,
  /// Roster entry the assignment was resolved from.
  selected:       Option<Uuid>,
}

impl HostDraft {
  /// Replace the whole assignment with `host` and mark it selected.
  pub fn select(&mut self, host: &HostRecord) {
    self.assignment = host.assignment();
    self.selected = Some(host.host_id);
  }

  /// Replace the assignment with a snapshot, selecting `host` if one is given.
  pub fn restore(&mut self, assignment: HostAssignment, host: Option<&HostRecord>) {
    self.assignment = assignment;
    self.selected = host.map(|h| h.host_id);
  }

  /// Take the operator's edits to the host fields. The host name stays the
  /// one the selection was resolved from, so it always matches the selection.
  pub fn amend(&mut self, edited: HostAssignment) {
    let host_name = std::mem::take(&mut self.assignment.host_name);
    self.assignment = HostAssignment { host_name, ..edited };
  }

  pub fn selected(&self) -> Option<Uuid> { self.selected }

  pub fn clear(&mut self) { *self = Self::default(); }
}

// ─── Compose ─────────────────────────────────────────────────────────────────

/// Check the submission preconditions and build the record to hand to the
/// store. Identity is checked before the host selection.
pub fn compose(
  visitor: &VisitorDraft,
  host: &HostDraft,
  status: VisitStatus,
  created_at: DateTime<Utc>,
) -> Result<NewVisit> {
  let identity = visitor.committed_identity()?;
  let host_id = host.selected.ok_or(Error::NoHostSelected)?;
  if visitor.details.party_size == 0 {
    return Err(Error::InvalidPartySize);
  }

  Ok(NewVisit {
    visitor: identity,
    details: visitor.details.clone(),
    host: host.assignment.clone(),
    host_id,
    status,
    created_at,
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::visit::UNKNOWN_VISITOR;

  fn roster_host() -> HostRecord {
    HostRecord {
      host_id:  Uuid::new_v4(),
      name:     "Marc Soler".into(),
      division: "DG Economy".into(),
      org_unit: "Treasury".into(),
      service:  "Accounts".into(),
      location: "Floor 2".into(),
      phone:    "4410".into(),
    }
  }

  fn filled_visitor() -> VisitorDraft {
    VisitorDraft {
      identity:  VisitorIdentity {
        identifier: "12345678Z".into(),
        name:       "Joan Vila".into(),
        company:    "Acme".into(),
      },
      details:   VisitDetails {
        reason: "Meeting".into(),
        card_number: "C-17".into(),
        party_size: 2,
        ..VisitDetails::default()
      },
      anonymous: false,
    }
  }

  #[test]
  fn adopt_keeps_visit_details() {
    let mut draft = filled_visitor();
    let known = VisitorIdentity {
      identifier: "X1234567L".into(),
      name:       "Eva Mas".into(),
      company:    "Globex".into(),
    };

    draft.adopt(&known);

    assert_eq!(draft.identity, known);
    assert_eq!(draft.details.reason, "Meeting");
    assert_eq!(draft.details.card_number, "C-17");
    assert_eq!(draft.details.party_size, 2);
  }

  #[test]
  fn anonymous_flag_clears_identifier_and_name() {
    let mut draft = filled_visitor();
    draft.set_anonymous(true);
    assert!(draft.identity.identifier.is_empty());
    assert!(draft.identity.name.is_empty());
    assert_eq!(draft.identity.company, "Acme");

    draft.identity.identifier = "typed anyway".into();
    let stored = draft.committed_identity().unwrap();
    assert_eq!(stored.identifier, UNKNOWN_VISITOR);
    assert_eq!(stored.name, UNKNOWN_VISITOR);
  }

  #[test]
  fn compose_checks_identity_before_host() {
    let mut visitor = filled_visitor();
    visitor.identity.identifier = "AB".into();
    let err = compose(&visitor, &HostDraft::default(), VisitStatus::Active, Utc::now())
      .unwrap_err();
    assert!(matches!(err, Error::InvalidIdentifier(_)));

    let err = compose(&filled_visitor(), &HostDraft::default(), VisitStatus::Active, Utc::now())
      .unwrap_err();
    assert!(matches!(err, Error::NoHostSelected));
  }

  #[test]
  fn manually_typed_host_fields_are_not_a_selection() {
    let mut host = HostDraft::default();
    host.assignment.division = "DG Economy".into();
    host.assignment.host_name = "Marc Soler".into();
    let err = compose(&filled_visitor(), &host, VisitStatus::Active, Utc::now()).unwrap_err();
    assert!(matches!(err, Error::NoHostSelected));
  }

  #[test]
  fn compose_builds_the_record() {
    let roster = roster_host();
    let mut host = HostDraft::default();
    host.select(&roster);
    let at = Utc::now();

    let visit = compose(&filled_visitor(), &host, VisitStatus::Pending, at).unwrap();

    assert_eq!(visit.host_id, roster.host_id);
    assert_eq!(visit.host, roster.assignment());
    assert_eq!(visit.status, VisitStatus::Pending);
    assert_eq!(visit.created_at, at);
    assert_eq!(visit.visitor.identifier, "12345678Z");
  }

  #[test]
  fn amend_keeps_the_resolved_host_name() {
    let roster = roster_host();
    let mut host = HostDraft::default();
    host.select(&roster);

    host.amend(HostAssignment {
      host_name: "Someone Else".into(),
      location: "Floor 5, room 12".into(),
      phone: "4499".into(),
      ..roster.assignment()
    });

    assert_eq!(host.assignment.host_name, "Marc Soler");
    assert_eq!(host.assignment.location, "Floor 5, room 12");
    assert_eq!(host.assignment.phone, "4499");
    assert_eq!(host.selected(), Some(roster.host_id));
  }

  #[test]
  fn zero_party_size_is_rejected() {
    let mut visitor = filled_visitor();
    visitor.details.party_size = 0;
    let mut host = HostDraft::default();
    host.select(&roster_host());
    let err = compose(&visitor, &host, VisitStatus::Active, Utc::now()).unwrap_err();
    assert!(matches!(err, Error::InvalidPartySize));
  }
}
