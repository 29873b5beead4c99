use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::utils::{filter::RangeFilter, pagination::PaginationParam};

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Deserialize, Serialize)]
pub struct User {
  pub id: String,
  pub full_name: String,
  pub first_name: Option<String>,
  pub last_name: Option<String>,
  pub username: String,
  pub email: String,
  pub email_verified: bool,
  pub image: Option<String>,
  pub created_at: NaiveDateTime,
  pub updated_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct UserCreate {
  #[validate(length(min = 1, max = 255, message = "full_name must be between 1 and 255 characters"))]
  pub full_name: String,
  pub first_name: Option<String>,
  pub last_name: Option<String>,
  #[validate(custom(function = "crate::utils::validate_username"))]
  pub username: String,
  #[validate(email(message = "email must be a valid address"))]
  pub email: String,
  pub image: Option<String>,
  pub email_verified: Option<bool>,
}

/// Partial update; `None` leaves the column untouched.
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct UserUpdate {
  #[validate(length(min = 1, max = 255, message = "full_name must be between 1 and 255 characters"))]
  pub full_name: Option<String>,
  pub first_name: Option<String>,
  pub last_name: Option<String>,
  #[validate(custom(function = "crate::utils::validate_username"))]
  pub username: Option<String>,
  #[validate(email(message = "email must be a valid address"))]
  pub email: Option<String>,
  pub image: Option<String>,
  pub email_verified: Option<bool>,
}

impl UserUpdate {
  pub fn is_empty(&self) -> bool {
    self.full_name.is_none()
      && self.first_name.is_none()
      && self.last_name.is_none()
      && self.username.is_none()
      && self.email.is_none()
      && self.image.is_none()
      && self.email_verified.is_none()
  }
}

/// Profile fields a client may change over REST.
///
/// Verification status only moves through the auth flows, and a new address starts unverified.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct UserProfileUpdate {
  pub full_name: Option<String>,
  pub first_name: Option<String>,
  pub last_name: Option<String>,
  pub username: Option<String>,
  pub email: Option<String>,
  pub image: Option<String>,
}

impl From<UserProfileUpdate> for UserUpdate {
  fn from(profile: UserProfileUpdate) -> Self {
    UserUpdate {
      email_verified: profile.email.as_ref().map(|_| false),
      full_name: profile.full_name,
      first_name: profile.first_name,
      last_name: profile.last_name,
      username: profile.username,
      email: profile.email,
      image: profile.image,
    }
  }
}

/// Query-string filter for listing users. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct UserFilter {
  pub id: Option<String>,
  pub first_name: Option<String>,
  pub last_name: Option<String>,
  pub full_name: Option<String>,
  pub email: Option<String>,
  pub email_verified: Option<bool>,
  pub search: Option<String>,
  pub from: Option<String>,
  pub to: Option<String>,
  pub page: Option<String>,
  pub size: Option<String>,
}

impl UserFilter {
  pub fn by_id(id: &str) -> Self {
    Self {
      id: Some(id.to_string()),
      ..Default::default()
    }
  }

  pub fn by_email(email: &str) -> Self {
    Self {
      email: Some(email.to_string()),
      ..Default::default()
    }
  }

  pub fn pagination(&self) -> PaginationParam {
    PaginationParam {
      page: self.page.clone(),
      size: self.size.clone(),
    }
  }

  pub fn range(&self) -> RangeFilter {
    RangeFilter {
      search: self.search.clone(),
      from: self.from.clone(),
      to: self.to.clone(),
    }
  }
}
