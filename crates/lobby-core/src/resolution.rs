//! Visitor resolution: find people who have visited before.
//!
//! A search returns prior visit records, collapsed to one entry per visitor
//! identifier. The first record the store returns for an identifier is the
//! one kept, so the outcome follows the store's order.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  store::{VisitQuery, VisitStore},
  visit::VisitRecord,
};

/// Which visitor field the search term is matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SearchMode {
  #[serde(alias = "by_identifier")]
  Identifier,
  #[serde(alias = "by_name")]
  Name,
}

impl SearchMode {
  /// What the operator is asked to type when the term is empty.
  pub fn prompt(self) -> &'static str {
    match self {
      Self::Identifier => "an identifier",
      Self::Name => "a name",
    }
  }
}

/// Build the store query for a search. Blank terms are rejected here, before
/// any store call.
pub fn query_for(mode: SearchMode, term: &str) -> Result<VisitQuery> {
  let term = term.trim();
  if term.is_empty() {
    return Err(Error::EmptySearchTerm(mode));
  }
  let mut query = VisitQuery::default();
  match mode {
    SearchMode::Identifier => query.identifier_like = Some(term.to_owned()),
    SearchMode::Name => query.name_like = Some(term.to_owned()),
  }
  Ok(query)
}

/// Keep the first record for each distinct, non-empty visitor identifier.
pub fn dedupe_by_identifier(records: impl IntoIterator<Item = VisitRecord>) -> Vec<VisitRecord> {
  let mut seen = HashSet::new();
  records
    .into_iter()
    .filter(|r| !r.visitor.identifier.is_empty())
    .filter(|r| seen.insert(r.visitor.identifier.clone()))
    .collect()
}

/// Search prior visits and collapse them to one entry per visitor.
pub async fn search<S: VisitStore>(
  store: &S,
  mode: SearchMode,
  term: &str,
) -> Result<Vec<VisitRecord>> {
  let query = query_for(mode, term)?;
  let records = store.query(&query).await.map_err(Error::store)?;
  let found = records.len();
  let visitors = dedupe_by_identifier(records);
  tracing::debug!(%mode, found, distinct = visitors.len(), "visitor search");
  Ok(visitors)
}
