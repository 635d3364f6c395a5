//! History filtering and visit statistics.
//!
//! These are pure functions over a slice of records; callers fetch the records
//! from the store. Calendar days and weekdays are those of the desk, given as
//! a fixed UTC offset.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Days, FixedOffset, NaiveDate, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::visit::{VisitRecord, VisitStatus};

/// Bucket for visits whose host has no organisational unit.
pub const UNSPECIFIED_ORG_UNIT: &str = "unspecified";

const WORKDAYS: [Weekday; 5] = [
  Weekday::Mon,
  Weekday::Tue,
  Weekday::Wed,
  Weekday::Thu,
  Weekday::Fri,
];

// ─── Date range ──────────────────────────────────────────────────────────────

/// Local midnight of `day` at `offset`, as an instant.
fn start_of(day: NaiveDate, offset: FixedOffset) -> Option<DateTime<Utc>> {
  day
    .and_time(NaiveTime::MIN)
    .and_local_timezone(offset)
    .single()
    .map(|dt| dt.with_timezone(&Utc))
}

/// The calendar day `at` falls on at `offset`.
pub fn local_date(at: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
  at.with_timezone(&offset).date_naive()
}

/// Half-open instant range covering local days `start` through `end` (or just
/// `start`).
pub fn day_range(
  start: NaiveDate,
  end: Option<NaiveDate>,
  offset: FixedOffset,
) -> (DateTime<Utc>, DateTime<Utc>) {
  let last = end.unwrap_or(start);
  let from = start_of(start, offset).unwrap_or(DateTime::<Utc>::MIN_UTC);
  let until = last
    .checked_add_days(Days::new(1))
    .and_then(|d| start_of(d, offset))
    .unwrap_or(DateTime::<Utc>::MAX_UTC);
  (from, until)
}

/// Visits created between the start of `start` and the end of `end`
/// inclusive, or on `start` alone when there is no end. Most recent first.
pub fn filter_by_date(
  records: &[VisitRecord],
  start: NaiveDate,
  end: Option<NaiveDate>,
  offset: FixedOffset,
) -> Vec<VisitRecord> {
  let (from, until) = day_range(start, end, offset);
  let mut out: Vec<VisitRecord> = records
    .iter()
    .filter(|r| r.created_at >= from && r.created_at < until)
    .cloned()
    .collect();
  out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
  out
}

// ─── Weekdays ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekdayStats {
  pub weekday:    Weekday,
  pub count:      usize,
  /// Share of working-day visits.
  pub percentage: f64,
}

/// Visit counts Monday through Friday, by local weekday at `offset`. Weekend
/// visits are left out of both the counts and the denominator.
pub fn weekday_histogram(records: &[VisitRecord], offset: FixedOffset) -> Vec<WeekdayStats> {
  let mut counts = [0usize; 5];
  for r in records {
    let idx = r.created_at.with_timezone(&offset).weekday().num_days_from_monday() as usize;
    if let Some(slot) = counts.get_mut(idx) {
      *slot += 1;
    }
  }
  let total: usize = counts.iter().sum();

  WORKDAYS
    .iter()
    .zip(counts)
    .map(|(&weekday, count)| WeekdayStats {
      weekday,
      count,
      percentage: percent(count, total),
    })
    .collect()
}

// ─── Organisational units ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrgUnitStats {
  pub org_unit:   String,
  pub count:      usize,
  /// Share of all visits, not only of the units listed.
  pub percentage: f64,
}

fn org_unit_of(r: &VisitRecord) -> &str {
  let unit = r.host.org_unit.trim();
  if unit.is_empty() { UNSPECIFIED_ORG_UNIT } else { unit }
}

/// Visit counts per host organisational unit, most visited first. Units with
/// a single visit are omitted.
pub fn org_unit_histogram(records: &[VisitRecord]) -> Vec<OrgUnitStats> {
  let mut index: HashMap<&str, usize> = HashMap::new();
  let mut counts: Vec<(&str, usize)> = Vec::new();
  for r in records {
    let unit = org_unit_of(r);
    match index.get(unit) {
      Some(&i) => counts[i].1 += 1,
      None => {
        index.insert(unit, counts.len());
        counts.push((unit, 1));
      }
    }
  }

  let total = records.len();
  let mut stats: Vec<OrgUnitStats> = counts
    .into_iter()
    .filter(|&(_, count)| count > 1)
    .map(|(unit, count)| OrgUnitStats {
      org_unit: unit.to_owned(),
      count,
      percentage: percent(count, total),
    })
    .collect();
  // Stable: equal counts keep first-encounter order.
  stats.sort_by(|a, b| b.count.cmp(&a.count));
  stats
}

// ─── Summary ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
  pub total:     usize,
  /// Visitors currently on site.
  pub active:    usize,
  /// Distinct organisational units visited.
  pub org_units: usize,
}

pub fn summarize(records: &[VisitRecord]) -> Summary {
  let mut units: Vec<&str> = records.iter().map(org_unit_of).collect();
  units.sort_unstable();
  units.dedup();
  Summary {
    total:     records.len(),
    active:    records.iter().filter(|r| r.status == VisitStatus::Active).count(),
    org_units: units.len(),
  }
}

/// Everything the statistics view shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
  pub summary:   Summary,
  pub weekdays:  Vec<WeekdayStats>,
  pub org_units: Vec<OrgUnitStats>,
}

pub fn statistics(records: &[VisitRecord], offset: FixedOffset) -> Statistics {
  Statistics {
    summary:   summarize(records),
    weekdays:  weekday_histogram(records, offset),
    org_units: org_unit_histogram(records),
  }
}

fn percent(count: usize, total: usize) -> f64 {
  if total == 0 { 0.0 } else { count as f64 / total as f64 * 100.0 }
}
