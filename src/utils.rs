use std::sync::LazyLock;

use regex::Regex;
use validator::ValidationError;

pub mod error;
pub mod filter;
pub mod id;
pub mod jwt;
pub mod pagination;

pub const MIN_USERNAME_LENGTH: usize = 3;

static USERNAME_PATTERN: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_.]+$").expect("username pattern compiles"));

const RESERVED_USERNAMES: &[&str] = &["admin"];

pub fn validate_username(username: &str) -> Result<(), ValidationError> {
  if username.chars().count() < MIN_USERNAME_LENGTH {
    return Err(ValidationError::new("username must be at least 3 characters"));
  }

  if !USERNAME_PATTERN.is_match(username) {
    return Err(ValidationError::new(
      "username may only contain letters, digits, underscores and dots",
    ));
  }

  if RESERVED_USERNAMES.contains(&username.to_lowercase().as_str()) {
    return Err(ValidationError::new("username is reserved"));
  }

  Ok(())
}
