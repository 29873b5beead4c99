use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domains::user::model::User;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum OtpType {
  SignIn,
  EmailVerification,
  ForgetPassword,
}

impl OtpType {
  pub fn as_str(&self) -> &'static str {
    match self {
      OtpType::SignIn => "sign-in",
      OtpType::EmailVerification => "email-verification",
      OtpType::ForgetPassword => "forget-password",
    }
  }
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct SendOtpRequest {
  #[validate(email(message = "email must be a valid address"))]
  pub email: String,
  #[serde(rename = "type")]
  pub otp_type: OtpType,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct VerifyOtpRequest {
  #[validate(email(message = "email must be a valid address"))]
  pub email: String,
  #[validate(length(equal = 6, message = "otp must be 6 digits"))]
  pub otp: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct MagicLinkRequest {
  #[validate(email(message = "email must be a valid address"))]
  pub email: String,
  pub name: Option<String>,
  /// Sends the welcome email instead of the plain sign-in link.
  #[serde(default)]
  pub new_user: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct EmailRequest {
  #[validate(email(message = "email must be a valid address"))]
  pub email: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TokenQuery {
  pub token: String,
}

/// What a magic-link token resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct MagicLinkPayload {
  pub email: String,
  pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthSession {
  pub token: String,
  pub user: User,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StatusResponse {
  pub status: bool,
}

impl StatusResponse {
  pub fn ok() -> Self {
    Self { status: true }
  }
}
