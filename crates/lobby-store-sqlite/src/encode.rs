//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings (microseconds, `Z`
//! suffix) so that lexical order in SQL equals chronological order. UUIDs are
//! stored as hyphenated lowercase strings.

use std::str::FromStr as _;

use chrono::{DateTime, SecondsFormat, Utc};
use lobby_core::{
  directory::HostRecord,
  visit::{HostAssignment, VisitDetails, VisitRecord, VisitStatus, VisitorIdentity},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339_opts(SecondsFormat::Micros, true) }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── VisitStatus ──────────────────────────────────────────────────────────────

pub fn encode_status(s: VisitStatus) -> &'static str {
  match s {
    VisitStatus::Pending => "pending",
    VisitStatus::Active => "active",
    VisitStatus::Completed => "completed",
  }
}

pub fn decode_status(s: &str) -> Result<VisitStatus> {
  VisitStatus::from_str(s).map_err(|_| Error::UnknownStatus(s.to_owned()))
}

// ─── LIKE patterns ────────────────────────────────────────────────────────────

/// SQL scalar function registered on every connection; see [`fold`].
pub const FOLD_FUNCTION: &str = "lobby_fold";

/// Case folding applied to both sides of a substring match. SQLite's own
/// `LIKE` only folds ASCII, so `Àngels` would not match `àngels`.
pub fn fold(s: &str) -> String { s.to_lowercase() }

/// Substring pattern for `LIKE ... ESCAPE '\'`, with wildcards in `term`
/// matched literally.
pub fn like_pattern(term: &str) -> String {
  let mut out = String::with_capacity(term.len() + 2);
  out.push('%');
  for c in term.chars() {
    if matches!(c, '%' | '_' | '\\') {
      out.push('\\');
    }
    out.push(c);
  }
  out.push('%');
  out
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawVisit::from_row`].
pub const VISIT_COLUMNS: &str = "visit_id, identifier, visitor_name, company, reason, card_number,
   party_size, color, observations, host_id, host_name, division, org_unit,
   service, location, phone, status, created_at, ended_at, discharge_observations";

/// Raw values read directly from a `visits` row.
pub struct RawVisit {
  pub visit_id:               String,
  pub identifier:             String,
  pub visitor_name:           String,
  pub company:                String,
  pub reason:                 String,
  pub card_number:            String,
  pub party_size:             i64,
  pub color:                  String,
  pub observations:           String,
  pub host_id:                String,
  pub host_name:              String,
  pub division:               String,
  pub org_unit:               String,
  pub service:                String,
  pub location:               String,
  pub phone:                  String,
  pub status:                 String,
  pub created_at:             String,
  pub ended_at:               Option<String>,
  pub discharge_observations: Option<String>,
}

impl RawVisit {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      visit_id:               row.get(0)?,
      identifier:             row.get(1)?,
      visitor_name:           row.get(2)?,
      company:                row.get(3)?,
      reason:                 row.get(4)?,
      card_number:            row.get(5)?,
      party_size:             row.get(6)?,
      color:                  row.get(7)?,
      observations:           row.get(8)?,
      host_id:                row.get(9)?,
      host_name:              row.get(10)?,
      division:               row.get(11)?,
      org_unit:               row.get(12)?,
      service:                row.get(13)?,
      location:               row.get(14)?,
      phone:                  row.get(15)?,
      status:                 row.get(16)?,
      created_at:             row.get(17)?,
      ended_at:               row.get(18)?,
      discharge_observations: row.get(19)?,
    })
  }

  pub fn into_visit(self) -> Result<VisitRecord> {
    let party_size =
      u32::try_from(self.party_size).map_err(|_| Error::PartySize(self.party_size))?;

    Ok(VisitRecord {
      visit_id:               decode_uuid(&self.visit_id)?,
      visitor:                VisitorIdentity {
        identifier: self.identifier,
        name:       self.visitor_name,
        company:    self.company,
      },
      details:                VisitDetails {
        reason: self.reason,
        card_number: self.card_number,
        party_size,
        color: self.color,
        observations: self.observations,
      },
      host:                   HostAssignment {
        host_name: self.host_name,
        division:  self.division,
        org_unit:  self.org_unit,
        service:   self.service,
        location:  self.location,
        phone:     self.phone,
      },
      host_id:                decode_uuid(&self.host_id)?,
      status:                 decode_status(&self.status)?,
      created_at:             decode_dt(&self.created_at)?,
      ended_at:               self.ended_at.as_deref().map(decode_dt).transpose()?,
      discharge_observations: self.discharge_observations,
    })
  }
}

/// Raw values read directly from a `hosts` row.
pub struct RawHost {
  pub host_id:  String,
  pub name:     String,
  pub division: String,
  pub org_unit: String,
  pub service:  String,
  pub location: String,
  pub phone:    String,
}

impl RawHost {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      host_id:  row.get(0)?,
      name:     row.get(1)?,
      division: row.get(2)?,
      org_unit: row.get(3)?,
      service:  row.get(4)?,
      location: row.get(5)?,
      phone:    row.get(6)?,
    })
  }

  pub fn into_host(self) -> Result<HostRecord> {
    Ok(HostRecord {
      host_id:  decode_uuid(&self.host_id)?,
      name:     self.name,
      division: self.division,
      org_unit: self.org_unit,
      service:  self.service,
      location: self.location,
      phone:    self.phone,
    })
  }
}
