mod brevo;
mod resend;
mod sendgrid;
mod smtp;

use async_trait::async_trait;

use super::types::{EmailClient, EmailError, SendEmailParams};

pub use brevo::BrevoService;
pub use resend::ResendService;
pub use sendgrid::SendgridService;
pub use smtp::SmtpService;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmailClientService: Send + Sync {
  fn client(&self) -> EmailClient;

  /// Performs exactly one outbound call. No retries.
  async fn send(&self, params: &SendEmailParams) -> Result<(), EmailError>;
}
