//! [`SqliteStore`]: the SQLite implementation of [`VisitStore`] and
//! [`Roster`].

use std::path::Path;

use chrono::SubsecRound as _;
use rusqlite::{OptionalExtension as _, functions::FunctionFlags};
use uuid::Uuid;

use lobby_core::{
  directory::{HostRecord, NewHost},
  store::{Roster, VisitQuery, VisitStore},
  visit::{NewVisit, TransitionOutcome, VisitRecord, VisitTransition},
};

use crate::{
  Result,
  encode::{
    FOLD_FUNCTION, RawHost, RawVisit, VISIT_COLUMNS, decode_status, encode_dt, encode_status, encode_uuid,
    fold, like_pattern,
  },
  error::Error,
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Lobby visit store backed by a single SQLite file.
///
/// Cloning is cheap: the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store: useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.create_scalar_function(
          FOLD_FUNCTION,
          1,
          FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
          |ctx| Ok(ctx.get::<Option<String>>(0)?.map(|s| fold(&s))),
        )?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Roster administration ─────────────────────────────────────────────────

  /// Append several hosts in one transaction, keeping their order.
  pub async fn add_hosts(&self, inputs: Vec<NewHost>) -> Result<Vec<HostRecord>> {
    let hosts: Vec<HostRecord> = inputs.into_iter().map(new_host_record).collect();
    self.insert_hosts(hosts.clone()).await?;
    Ok(hosts)
  }

  async fn insert_hosts(&self, hosts: Vec<HostRecord>) -> Result<()> {
    let count = hosts.len();
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        {
          let mut stmt = tx.prepare(
            "INSERT INTO hosts (host_id, name, division, org_unit, service, location, phone)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          )?;
          for h in &hosts {
            stmt.execute(rusqlite::params![
              encode_uuid(h.host_id),
              h.name,
              h.division,
              h.org_unit,
              h.service,
              h.location,
              h.phone,
            ])?;
          }
        }
        tx.commit()?;
        Ok(())
      })
      .await?;

    tracing::debug!(count, "hosts added to roster");
    Ok(())
  }
}

fn new_host_record(h: NewHost) -> HostRecord {
  HostRecord {
    host_id:  Uuid::new_v4(),
    name:     h.name,
    division: h.division,
    org_unit: h.org_unit,
    service:  h.service,
    location: h.location,
    phone:    h.phone,
  }
}

// ─── VisitStore impl ─────────────────────────────────────────────────────────

impl VisitStore for SqliteStore {
  type Error = Error;

  async fn create(&self, input: NewVisit) -> Result<VisitRecord> {
    // Timestamps are persisted at microsecond precision.
    let record = VisitRecord {
      visit_id:               Uuid::new_v4(),
      visitor:                input.visitor,
      details:                input.details,
      host:                   input.host,
      host_id:                input.host_id,
      status:                 input.status,
      created_at:             input.created_at.trunc_subsecs(6),
      ended_at:               None,
      discharge_observations: None,
    };

    let visit_id_str   = encode_uuid(record.visit_id);
    let host_id_str    = encode_uuid(record.host_id);
    let status_str     = encode_status(record.status).to_owned();
    let created_at_str = encode_dt(record.created_at);
    let party_size     = i64::from(record.details.party_size);
    let visitor        = record.visitor.clone();
    let details        = record.details.clone();
    let host           = record.host.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO visits (
             visit_id, identifier, visitor_name, company,
             reason, card_number, party_size, color, observations,
             host_id, host_name, division, org_unit, service, location, phone,
             status, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)",
          rusqlite::params![
            visit_id_str,
            visitor.identifier,
            visitor.name,
            visitor.company,
            details.reason,
            details.card_number,
            party_size,
            details.color,
            details.observations,
            host_id_str,
            host.host_name,
            host.division,
            host.org_unit,
            host.service,
            host.location,
            host.phone,
            status_str,
            created_at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(record)
  }

  async fn get(&self, id: Uuid) -> Result<Option<VisitRecord>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawVisit> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {VISIT_COLUMNS} FROM visits WHERE visit_id = ?1"),
            rusqlite::params![id_str],
            RawVisit::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawVisit::into_visit).transpose()
  }

  async fn query(&self, query: &VisitQuery) -> Result<Vec<VisitRecord>> {
    // Build WHERE clause dynamically; every argument is bound as text.
    let mut conds: Vec<String> = vec![];
    let mut args: Vec<String> = vec![];

    if let Some(status) = query.status {
      conds.push("status = ?".into());
      args.push(encode_status(status).to_owned());
    }
    if let Some((from, until)) = query.created_within {
      conds.push("created_at >= ? AND created_at < ?".into());
      args.push(encode_dt(from));
      args.push(encode_dt(until));
    }
    for (column, term) in [
      ("identifier", &query.identifier_like),
      ("visitor_name", &query.name_like),
      ("card_number", &query.card_like),
    ] {
      if let Some(term) = term {
        conds.push(format!(
          "{FOLD_FUNCTION}({column}) LIKE {FOLD_FUNCTION}(?) ESCAPE '\\'"
        ));
        args.push(like_pattern(term));
      }
    }

    let where_clause = if conds.is_empty() {
      String::new()
    } else {
      format!("WHERE {}", conds.join(" AND "))
    };
    // SQLite reads a LIMIT beyond i64 as REAL and rejects it.
    let limit_clause = query
      .limit
      .map(|n| format!("LIMIT {}", i64::try_from(n).unwrap_or(i64::MAX)))
      .unwrap_or_default();
    let sql = format!(
      "SELECT {VISIT_COLUMNS} FROM visits {where_clause} ORDER BY rowid {limit_clause}"
    );

    let raws: Vec<RawVisit> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(args.iter()), RawVisit::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawVisit::into_visit).collect()
  }

  async fn transition(&self, id: Uuid, transition: VisitTransition) -> Result<TransitionOutcome> {
    let id_str   = encode_uuid(id);
    let from_str = encode_status(transition.from()).to_owned();
    let to_str   = encode_status(transition.to()).to_owned();
    let (ended_at_str, observations) = match transition {
      VisitTransition::Admit => (None, None),
      VisitTransition::Discharge {
        ended_at,
        observations,
      } => (Some(encode_dt(ended_at)), observations),
    };

    let (changed, raw): (usize, Option<RawVisit>) = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        // Compare-and-set on status; a concurrent transition makes this a no-op.
        let changed = tx.execute(
          "UPDATE visits
           SET status                 = ?1,
               ended_at               = COALESCE(?2, ended_at),
               discharge_observations = COALESCE(?3, discharge_observations)
           WHERE visit_id = ?4 AND status = ?5",
          rusqlite::params![to_str, ended_at_str, observations, id_str, from_str],
        )?;
        let raw = tx
          .query_row(
            &format!("SELECT {VISIT_COLUMNS} FROM visits WHERE visit_id = ?1"),
            rusqlite::params![id_str],
            RawVisit::from_row,
          )
          .optional()?;
        tx.commit()?;
        Ok((changed, raw))
      })
      .await?;

    Ok(match (changed, raw) {
      (_, None) => TransitionOutcome::NotFound,
      (0, Some(raw)) => TransitionOutcome::Conflict(decode_status(&raw.status)?),
      (_, Some(raw)) => TransitionOutcome::Applied(raw.into_visit()?),
    })
  }
}

// ─── Roster impl ─────────────────────────────────────────────────────────────

impl Roster for SqliteStore {
  type Error = Error;

  async fn list_hosts(&self) -> Result<Vec<HostRecord>> {
    let raws: Vec<RawHost> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT host_id, name, division, org_unit, service, location, phone
           FROM hosts ORDER BY rowid",
        )?;
        let rows = stmt
          .query_map([], RawHost::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawHost::into_host).collect()
  }

  async fn add_host(&self, input: NewHost) -> Result<HostRecord> {
    let host = new_host_record(input);
    self.insert_hosts(vec![host.clone()]).await?;
    Ok(host)
  }
}
