use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::db::query::FilterQuery;

/// Free-text search plus an optional `created_at` window.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RangeFilter {
  pub search: Option<String>,
  pub from: Option<String>,
  pub to: Option<String>,
}

/// Returns the trimmed value when it carries any text.
pub fn non_empty(value: Option<&str>) -> Option<&str> {
  value.map(str::trim).filter(|v| !v.is_empty())
}

pub fn apply_search(query: &mut FilterQuery<'_>, search: Option<&str>, columns: &[&str]) {
  if let Some(term) = non_empty(search) {
    query.where_any_like(columns, term);
  }
}

/// Adds `created_at >= from` / `created_at <= to`, both truncated to the start of the day.
pub fn apply_range(query: &mut FilterQuery<'_>, filter: &RangeFilter, alias: &str) {
  let column = format!("{}.created_at", alias);

  for (raw, operator) in [(filter.from.as_deref(), ">="), (filter.to.as_deref(), "<=")] {
    let Some(raw) = non_empty(raw) else {
      continue;
    };

    match day_start(raw) {
      Some(bound) => {
        query.where_cmp(&column, operator, bound);
      }
      None => tracing::warn!("Ignoring unparseable date bound {:?} on {}", raw, column),
    }
  }
}

/// Parses an ISO-8601 date or date-time and returns midnight of that calendar date.
///
/// The date is taken as written; offsets are not converted.
pub fn day_start(raw: &str) -> Option<NaiveDateTime> {
  let raw = raw.trim();

  let date = DateTime::parse_from_rfc3339(raw)
    .map(|dt| dt.date_naive())
    .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").map(|dt| dt.date()))
    .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S").map(|dt| dt.date()))
    .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
    .ok()?;

  date.and_hms_opt(0, 0, 0)
}
