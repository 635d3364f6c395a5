//! Host directory: resolves the employee being visited from the roster.
//!
//! Names are not guaranteed unique in the roster; lookups take the first
//! match in roster order so resolution is reproducible.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  draft::HostDraft,
  store::Roster,
  visit::HostAssignment,
};

// ─── Roster entries ──────────────────────────────────────────────────────────

/// One employee in the roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostRecord {
  pub host_id:  Uuid,
  pub name:     String,
  pub division: String,
  pub org_unit: String,
  pub service:  String,
  pub location: String,
  pub phone:    String,
}

impl HostRecord {
  /// The snapshot copied into a visit when this host is selected.
  pub fn assignment(&self) -> HostAssignment {
    HostAssignment {
      host_name: self.name.clone(),
      division:  self.division.clone(),
      org_unit:  self.org_unit.clone(),
      service:   self.service.clone(),
      location:  self.location.clone(),
      phone:     self.phone.clone(),
    }
  }
}

/// Input for adding a host to a roster backend. The backend assigns the id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewHost {
  pub name:     String,
  pub division: String,
  pub org_unit: String,
  pub service:  String,
  pub location: String,
  pub phone:    String,
}

// ─── Directory ───────────────────────────────────────────────────────────────

/// Distinct values offered in the operator's pickers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostOptions {
  pub divisions: Vec<String>,
  pub org_units: Vec<String>,
  pub services:  Vec<String>,
}

/// An in-memory snapshot of the roster.
#[derive(Debug, Clone, Default)]
pub struct Directory {
  hosts: Vec<HostRecord>,
}

impl Directory {
  pub fn new(hosts: Vec<HostRecord>) -> Self { Self { hosts } }

  /// Fetch the roster from `roster`.
  pub async fn load<R: Roster>(roster: &R) -> Result<Self> {
    let hosts = roster.list_hosts().await.map_err(Error::store)?;
    tracing::debug!(hosts = hosts.len(), "loaded roster");
    Ok(Self::new(hosts))
  }

  pub fn hosts(&self) -> &[HostRecord] { &self.hosts }

  /// First host whose name is exactly `name`.
  pub fn find(&self, name: &str) -> Option<&HostRecord> {
    self.hosts.iter().find(|h| h.name == name)
  }

  /// Resolve `name` and, on a match, replace the whole host draft with the
  /// roster entry and mark it selected. On no match the draft is untouched.
  pub fn resolve_into(&self, name: &str, draft: &mut HostDraft) -> bool {
    match self.find(name) {
      Some(host) => {
        draft.select(host);
        true
      }
      None => false,
    }
  }

  pub fn divisions(&self) -> Vec<String> { self.distinct(|h| &h.division) }

  pub fn org_units(&self) -> Vec<String> { self.distinct(|h| &h.org_unit) }

  pub fn services(&self) -> Vec<String> { self.distinct(|h| &h.service) }

  pub fn options(&self) -> HostOptions {
    HostOptions {
      divisions: self.divisions(),
      org_units: self.org_units(),
      services:  self.services(),
    }
  }

  /// Order-preserving distinct non-empty values of one field.
  fn distinct<'a>(&'a self, field: impl Fn(&'a HostRecord) -> &'a String) -> Vec<String> {
    let mut seen = HashSet::new();
    self
      .hosts
      .iter()
      .map(|h| field(h).as_str())
      .filter(|v| !v.trim().is_empty())
      .filter(|v| seen.insert(*v))
      .map(str::to_owned)
      .collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn host(name: &str, division: &str, org_unit: &str, service: &str) -> HostRecord {
    HostRecord {
      host_id:  Uuid::new_v4(),
      name:     name.into(),
      division: division.into(),
      org_unit: org_unit.into(),
      service:  service.into(),
      location: format!("{name}'s office"),
      phone:    "1234".into(),
    }
  }

  fn directory() -> Directory {
    Directory::new(vec![
      host("Anna Puig", "DG Economy", "Budget", "Accounts"),
      host("Marc Soler", "DG Economy", "Treasury", "Accounts"),
      host("Anna Puig", "DG Culture", "Museums", "Archive"),
      host("Laia Roca", "DG Culture", "", "Archive"),
    ])
  }

  #[test]
  fn first_match_wins() {
    let dir = directory();
    let found = dir.find("Anna Puig").unwrap();
    assert_eq!(found.division, "DG Economy");
    assert!(dir.find("anna puig").is_none());
  }

  #[test]
  fn resolve_copies_every_field_and_selects() {
    let dir = directory();
    let mut draft = HostDraft::default();
    draft.assignment.division = "typed by hand".into();

    assert!(dir.resolve_into("Marc Soler", &mut draft));
    assert_eq!(draft.assignment, dir.hosts()[1].assignment());
    assert_eq!(draft.selected(), Some(dir.hosts()[1].host_id));
  }

  #[test]
  fn resolve_unknown_name_is_a_no_op() {
    let dir = directory();
    let mut draft = HostDraft::default();
    dir.resolve_into("Laia Roca", &mut draft);
    let before = draft.clone();

    assert!(!dir.resolve_into("Nobody", &mut draft));
    assert_eq!(draft, before);
  }

  #[test]
  fn option_lists_are_distinct_and_ordered() {
    let opts = directory().options();
    assert_eq!(opts.divisions, vec!["DG Economy", "DG Culture"]);
    assert_eq!(opts.org_units, vec!["Budget", "Treasury", "Museums"]);
    assert_eq!(opts.services, vec!["Accounts", "Archive"]);
  }
}
