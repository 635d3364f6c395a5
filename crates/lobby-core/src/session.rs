//! Operator session and role-based capabilities.
//!
//! The role is carried explicitly by whoever invokes an operation; the core
//! operations themselves behave the same for every role.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Role {
  /// Maintains the roster and reads reports.
  Administrator,
  /// Works the desk.
  Receptionist,
  /// Everything.
  Master,
}

/// An externally invocable group of operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
  #[strum(serialize = "register visits")]
  RegisterVisit,
  #[strum(serialize = "admit or discharge visitors")]
  DischargeVisit,
  #[strum(serialize = "search visitors")]
  SearchVisitors,
  #[strum(serialize = "view visit history")]
  ViewHistory,
  #[strum(serialize = "view statistics")]
  ViewStatistics,
  #[strum(serialize = "manage the host roster")]
  ManageRoster,
}

impl Role {
  pub fn permits(self, capability: Capability) -> bool {
    use Capability::*;
    match self {
      Self::Master => true,
      Self::Administrator => matches!(capability, ManageRoster | ViewHistory | ViewStatistics),
      Self::Receptionist => !matches!(capability, ManageRoster),
    }
  }
}

/// Who is operating, and in what role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
  pub operator: String,
  pub role:     Role,
}

impl Session {
  pub fn new(operator: impl Into<String>, role: Role) -> Self {
    Self {
      operator: operator.into(),
      role,
    }
  }

  pub fn is_administrator(&self) -> bool {
    matches!(self.role, Role::Administrator | Role::Master)
  }

  pub fn permits(&self, capability: Capability) -> bool { self.role.permits(capability) }

  pub fn require(&self, capability: Capability) -> Result<()> {
    if self.permits(capability) {
      Ok(())
    } else {
      Err(Error::NotPermitted {
        role: self.role,
        capability,
      })
    }
  }
}
