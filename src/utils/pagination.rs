use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_PAGE, DEFAULT_SIZE};

/// Raw `page` / `size` query parameters.
///
/// Both are kept as strings so a malformed value falls back to the default instead of rejecting the request.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PaginationParam {
  pub page: Option<String>,
  pub size: Option<String>,
}

impl PaginationParam {
  pub fn new(page: i64, size: i64) -> Self {
    Self {
      page: Some(page.to_string()),
      size: Some(size.to_string()),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
  pub page: i64,
  pub size: i64,
  pub start_index: i64,
  pub end_index: i64,
}

impl PageWindow {
  pub fn offset(&self) -> i64 {
    self.start_index
  }

  pub fn limit(&self) -> i64 {
    self.size
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct PageRef {
  pub page: i64,
  pub size: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PageMeta {
  pub total: i64,
  pub size: i64,
  pub current_page: i64,
  pub next: Option<PageRef>,
  pub previous: Option<PageRef>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PaginationResponse<T> {
  pub data: Vec<T>,
  pub pagination: PageMeta,
}

pub fn compute_window(filter: &PaginationParam) -> PageWindow {
  let page = parse_positive(filter.page.as_deref()).unwrap_or(DEFAULT_PAGE);
  let size = parse_positive(filter.size.as_deref()).unwrap_or(DEFAULT_SIZE);

  PageWindow {
    page,
    size,
    start_index: (page - 1).saturating_mul(size),
    end_index: page.saturating_mul(size),
  }
}

/// Assembles the paged envelope. `total` comes from a separate count query run by the caller.
pub fn build_page<T>(total: i64, filter: &PaginationParam, data: Vec<T>) -> PaginationResponse<T> {
  let window = compute_window(filter);

  let next = (window.end_index < total).then_some(PageRef {
    page: window.page + 1,
    size: window.size,
  });
  let previous = (window.start_index > 0).then_some(PageRef {
    page: window.page - 1,
    size: window.size,
  });

  PaginationResponse {
    data,
    pagination: PageMeta {
      total,
      size: window.size,
      current_page: window.page,
      next,
      previous,
    },
  }
}

fn parse_positive(raw: Option<&str>) -> Option<i64> {
  raw
    .and_then(|value| value.trim().parse::<i64>().ok())
    .filter(|value| *value > 0)
}
