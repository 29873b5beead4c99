use std::{error::Error, fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct EmailUser {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub name: Option<String>,
  pub email: String,
}

impl EmailUser {
  pub fn new(name: Option<&str>, email: &str) -> Self {
    Self {
      name: name.map(String::from),
      email: email.to_string(),
    }
  }

  /// Splits `"Name <addr@example.com>"`; anything else is taken as a bare address.
  pub fn parse(raw: &str) -> Self {
    let raw = raw.trim();

    if let (Some(start), true) = (raw.rfind('<'), raw.ends_with('>')) {
      let name = raw[..start].trim().trim_matches('"').trim();
      let email = raw[start + 1..raw.len() - 1].trim();
      return Self {
        name: (!name.is_empty()).then(|| name.to_string()),
        email: email.to_string(),
      };
    }

    Self {
      name: None,
      email: raw.to_string(),
    }
  }

  pub fn display(&self) -> String {
    match &self.name {
      Some(name) => format!("{} <{}>", name, self.email),
      None => self.email.clone(),
    }
  }
}

/// An address as callers write it: a plain string or a `{ name, email }` record.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum EmailAddress {
  Bare(String),
  Named(EmailUser),
}

impl EmailAddress {
  pub fn to_user(&self) -> EmailUser {
    match self {
      EmailAddress::Bare(raw) => EmailUser::parse(raw),
      EmailAddress::Named(user) => user.clone(),
    }
  }
}

impl From<&str> for EmailAddress {
  fn from(value: &str) -> Self {
    EmailAddress::Bare(value.to_string())
  }
}

impl From<String> for EmailAddress {
  fn from(value: String) -> Self {
    EmailAddress::Bare(value)
  }
}

impl From<EmailUser> for EmailAddress {
  fn from(value: EmailUser) -> Self {
    EmailAddress::Named(value)
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Recipients {
  One(EmailAddress),
  Many(Vec<EmailAddress>),
}

impl Recipients {
  pub fn to_users(&self) -> Vec<EmailUser> {
    match self {
      Recipients::One(address) => vec![address.to_user()],
      Recipients::Many(addresses) => addresses.iter().map(EmailAddress::to_user).collect(),
    }
  }
}

impl From<&str> for Recipients {
  fn from(value: &str) -> Self {
    Recipients::One(value.into())
  }
}

impl From<String> for Recipients {
  fn from(value: String) -> Self {
    Recipients::One(value.into())
  }
}

impl From<EmailUser> for Recipients {
  fn from(value: EmailUser) -> Self {
    Recipients::One(value.into())
  }
}

impl From<Vec<String>> for Recipients {
  fn from(value: Vec<String>) -> Self {
    Recipients::Many(value.into_iter().map(EmailAddress::from).collect())
  }
}

impl From<Vec<EmailAddress>> for Recipients {
  fn from(value: Vec<EmailAddress>) -> Self {
    Recipients::Many(value)
  }
}

/// Envelope plus body of one outbound message.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SendEmailParams {
  pub from: EmailAddress,
  pub to: Recipients,
  pub subject: String,
  pub html: Option<String>,
  pub reply_to: Option<EmailAddress>,
  pub send_at: Option<DateTime<Utc>>,
}

impl SendEmailParams {
  pub fn new(from: impl Into<EmailAddress>, to: impl Into<Recipients>, subject: impl Into<String>) -> Self {
    Self {
      from: from.into(),
      to: to.into(),
      subject: subject.into(),
      html: None,
      reply_to: None,
      send_at: None,
    }
  }

  pub fn with_reply_to(mut self, reply_to: impl Into<EmailAddress>) -> Self {
    self.reply_to = Some(reply_to.into());
    self
  }

  pub fn with_send_at(mut self, send_at: DateTime<Utc>) -> Self {
    self.send_at = Some(send_at);
    self
  }
}

/// Outbound backend selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EmailClient {
  Resend,
  #[default]
  Sendgrid,
  Brevo,
  #[serde(alias = "nodemailer")]
  Smtp,
}

impl EmailClient {
  /// Unrecognized names resolve to SMTP.
  pub fn from_name(name: &str) -> Self {
    match name.trim().to_lowercase().as_str() {
      "resend" => EmailClient::Resend,
      "sendgrid" => EmailClient::Sendgrid,
      "brevo" => EmailClient::Brevo,
      _ => EmailClient::Smtp,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      EmailClient::Resend => "resend",
      EmailClient::Sendgrid => "sendgrid",
      EmailClient::Brevo => "brevo",
      EmailClient::Smtp => "smtp",
    }
  }
}

impl fmt::Display for EmailClient {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmailKind {
  WelcomeEmail,
  VerifyEmail,
  VerifyEmailOtp,
  ForgotPassword,
  ForgotPasswordOtp,
  SignInOtp,
  MagicLink,
}

impl EmailKind {
  pub fn as_str(&self) -> &'static str {
    match self {
      EmailKind::WelcomeEmail => "welcome-email",
      EmailKind::VerifyEmail => "verify-email",
      EmailKind::VerifyEmailOtp => "verify-email-otp",
      EmailKind::ForgotPassword => "forgot-password",
      EmailKind::ForgotPasswordOtp => "forgot-password-otp",
      EmailKind::SignInOtp => "sign-in-otp",
      EmailKind::MagicLink => "magic-link",
    }
  }
}

impl FromStr for EmailKind {
  type Err = EmailError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "welcome-email" => Ok(EmailKind::WelcomeEmail),
      "verify-email" => Ok(EmailKind::VerifyEmail),
      "verify-email-otp" => Ok(EmailKind::VerifyEmailOtp),
      "forgot-password" => Ok(EmailKind::ForgotPassword),
      "forgot-password-otp" => Ok(EmailKind::ForgotPasswordOtp),
      "sign-in-otp" => Ok(EmailKind::SignInOtp),
      "magic-link" => Ok(EmailKind::MagicLink),
      other => Err(EmailError::UnknownKind(other.to_string())),
    }
  }
}

impl fmt::Display for EmailKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct UrlProps {
  pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ExpiringUrlProps {
  pub url: String,
  pub expiry: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct OtpProps {
  pub otp: String,
  pub otp_expiry: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct MagicLinkProps {
  pub link: String,
}

/// A message kind together with the parameters its template needs.
///
/// Deserializes from `{"type": "<kind>", "params": {...}}`; an unknown `type` is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "type", content = "params", rename_all = "kebab-case")]
pub enum EmailTemplate {
  WelcomeEmail(UrlProps),
  VerifyEmail(UrlProps),
  VerifyEmailOtp(OtpProps),
  ForgotPassword(ExpiringUrlProps),
  ForgotPasswordOtp(OtpProps),
  SignInOtp(OtpProps),
  MagicLink(MagicLinkProps),
}

impl EmailTemplate {
  pub fn kind(&self) -> EmailKind {
    match self {
      EmailTemplate::WelcomeEmail(_) => EmailKind::WelcomeEmail,
      EmailTemplate::VerifyEmail(_) => EmailKind::VerifyEmail,
      EmailTemplate::VerifyEmailOtp(_) => EmailKind::VerifyEmailOtp,
      EmailTemplate::ForgotPassword(_) => EmailKind::ForgotPassword,
      EmailTemplate::ForgotPasswordOtp(_) => EmailKind::ForgotPasswordOtp,
      EmailTemplate::SignInOtp(_) => EmailKind::SignInOtp,
      EmailTemplate::MagicLink(_) => EmailKind::MagicLink,
    }
  }
}

#[derive(Debug)]
pub enum EmailError {
  UnknownKind(String),
  InvalidAddress(String),
  Build(String),
  Transport(String),
  Http(String),
  Template(String),
}

impl Error for EmailError {}

impl fmt::Display for EmailError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      EmailError::UnknownKind(kind) => write!(f, "Invalid email type: {}", kind),
      EmailError::InvalidAddress(msg) => write!(f, "Invalid address: {}", msg),
      EmailError::Build(msg) => write!(f, "Failed to build email: {}", msg),
      EmailError::Transport(msg) => write!(f, "SMTP transport error: {}", msg),
      EmailError::Http(msg) => write!(f, "HTTP error: {}", msg),
      EmailError::Template(msg) => write!(f, "Template error: {}", msg),
    }
  }
}

impl From<reqwest::Error> for EmailError {
  fn from(err: reqwest::Error) -> Self {
    EmailError::Http(err.to_string())
  }
}

impl From<lettre::address::AddressError> for EmailError {
  fn from(err: lettre::address::AddressError) -> Self {
    EmailError::InvalidAddress(err.to_string())
  }
}

impl From<minijinja::Error> for EmailError {
  fn from(err: minijinja::Error) -> Self {
    EmailError::Template(err.to_string())
  }
}

impl From<lettre::error::Error> for EmailError {
  fn from(err: lettre::error::Error) -> Self {
    EmailError::Build(err.to_string())
  }
}

impl From<lettre::transport::smtp::Error> for EmailError {
  fn from(err: lettre::transport::smtp::Error) -> Self {
    EmailError::Transport(err.to_string())
  }
}
