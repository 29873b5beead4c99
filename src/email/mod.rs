//! Outbound transactional email.
//!
//! [`EmailService::send`] renders an [`EmailTemplate`] and delegates delivery to the provider picked by
//! [`EmailClient`]: the Resend, SendGrid or Brevo HTTP APIs, or plain SMTP through lettre.

pub mod providers;
mod service;
pub mod templates;
mod types;

pub use service::{EmailService, EmailServiceStore};
pub use types::{
  EmailAddress, EmailClient, EmailError, EmailKind, EmailTemplate, EmailUser, ExpiringUrlProps, MagicLinkProps,
  OtpProps, Recipients, SendEmailParams, UrlProps,
};
