use std::sync::Arc;

use super::{
  providers::{BrevoService, EmailClientService, ResendService, SendgridService, SmtpService},
  templates,
  types::{EmailClient, EmailError, EmailTemplate, SendEmailParams},
};
use crate::config::Config;

/// One provider per [`EmailClient`], built once at startup.
pub struct EmailServiceStore {
  resend: Arc<dyn EmailClientService>,
  sendgrid: Arc<dyn EmailClientService>,
  brevo: Arc<dyn EmailClientService>,
  smtp: Arc<dyn EmailClientService>,
}

impl EmailServiceStore {
  pub fn new(
    resend: Arc<dyn EmailClientService>,
    sendgrid: Arc<dyn EmailClientService>,
    brevo: Arc<dyn EmailClientService>,
    smtp: Arc<dyn EmailClientService>,
  ) -> Self {
    Self {
      resend,
      sendgrid,
      brevo,
      smtp,
    }
  }

  pub fn from_config(config: &Config) -> Result<Self, EmailError> {
    let http = reqwest::Client::new();

    Ok(Self::new(
      Arc::new(ResendService::new(http.clone(), &config.resend_api_key)),
      Arc::new(SendgridService::new(http.clone(), &config.sendgrid_api_key)),
      Arc::new(BrevoService::new(http, &config.brevo_api_key)),
      Arc::new(SmtpService::new(&config.smtp)?),
    ))
  }

  /// `None` selects SendGrid.
  pub fn adapter(&self, client: Option<EmailClient>) -> &Arc<dyn EmailClientService> {
    match client.unwrap_or_default() {
      EmailClient::Resend => &self.resend,
      EmailClient::Sendgrid => &self.sendgrid,
      EmailClient::Brevo => &self.brevo,
      EmailClient::Smtp => &self.smtp,
    }
  }
}

#[derive(Clone)]
pub struct EmailService {
  store: Arc<EmailServiceStore>,
}

impl EmailService {
  pub fn new(store: EmailServiceStore) -> Self {
    Self { store: Arc::new(store) }
  }

  /// Renders `template` into `params.html` and hands the message to one provider.
  ///
  /// Delivery failures are logged and never returned.
  pub async fn send(&self, template: EmailTemplate, mut params: SendEmailParams, client: Option<EmailClient>) {
    let kind = template.kind();
    let adapter = self.store.adapter(client);

    params.html = match templates::render(&template) {
      Ok(html) => Some(html),
      Err(err) => {
        tracing::error!("{}[Render] failed to render {} email: {}", source_label(adapter.client()), kind, err);
        return;
      }
    };

    match adapter.send(&params).await {
      Ok(()) => tracing::info!(kind = %kind, client = %adapter.client(), "Email sent"),
      Err(err) => tracing::error!(
        "{}[Send] failed to deliver {} email: {}",
        source_label(adapter.client()),
        kind,
        err
      ),
    }
  }
}

fn source_label(client: EmailClient) -> &'static str {
  match client {
    EmailClient::Resend => "[ResendService]",
    EmailClient::Sendgrid => "[SendgridService]",
    EmailClient::Brevo => "[BrevoService]",
    EmailClient::Smtp => "[NodemailerService]",
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::email::providers::MockEmailClientService;
  use crate::email::types::{EmailKind, OtpProps};
  use crate::test_support::CapturedLogs;
  use tracing::Level;
  use tracing_subscriber::layer::SubscriberExt;

  fn idle() -> Arc<dyn EmailClientService> {
    Arc::new(MockEmailClientService::new())
  }

  /// Every slot except `selected` panics if used.
  fn store_with(selected: EmailClient, mock: MockEmailClientService) -> EmailServiceStore {
    let mock: Arc<dyn EmailClientService> = Arc::new(mock);
    let pick = |client: EmailClient| if client == selected { mock.clone() } else { idle() };
    EmailServiceStore::new(
      pick(EmailClient::Resend),
      pick(EmailClient::Sendgrid),
      pick(EmailClient::Brevo),
      pick(EmailClient::Smtp),
    )
  }

  fn otp_template() -> EmailTemplate {
    EmailTemplate::VerifyEmailOtp(OtpProps {
      otp: "482913".to_string(),
      otp_expiry: "60 minutes".to_string(),
    })
  }

  fn envelope() -> SendEmailParams {
    SendEmailParams::new("RemindMe <no-reply@updates.varteqar.com>", "user@example.com", "Verify Email")
  }

  #[tokio::test]
  async fn test_send_renders_template_and_calls_provider_once() {
    let mut mock = MockEmailClientService::new();
    mock.expect_client().return_const(EmailClient::Resend);
    mock
      .expect_send()
      .withf(|params| {
        params.subject == "Verify Email" && params.html.as_deref().is_some_and(|html| html.contains("482913"))
      })
      .times(1)
      .returning(|_| Ok(()));

    let service = EmailService::new(store_with(EmailClient::Resend, mock));
    service.send(otp_template(), envelope(), Some(EmailClient::Resend)).await;
  }

  #[tokio::test]
  async fn test_send_defaults_to_sendgrid() {
    let mut mock = MockEmailClientService::new();
    mock.expect_client().return_const(EmailClient::Sendgrid);
    mock.expect_send().times(1).returning(|_| Ok(()));

    let service = EmailService::new(store_with(EmailClient::Sendgrid, mock));
    service.send(otp_template(), envelope(), None).await;
  }

  #[tokio::test]
  async fn test_send_swallows_and_logs_provider_failure() {
    let logs = CapturedLogs::default();
    let _guard = tracing::subscriber::set_default(tracing_subscriber::registry().with(logs.clone()));

    let mut mock = MockEmailClientService::new();
    mock.expect_client().return_const(EmailClient::Brevo);
    mock
      .expect_send()
      .times(1)
      .returning(|_| Err(EmailError::Http("502 Bad Gateway".to_string())));

    let service = EmailService::new(store_with(EmailClient::Brevo, mock));
    service.send(otp_template(), envelope(), Some(EmailClient::Brevo)).await;

    assert!(logs.contains(Level::ERROR, "[BrevoService][Send]"));
    assert!(logs.contains(Level::ERROR, EmailKind::VerifyEmailOtp.as_str()));
  }

  #[tokio::test]
  async fn test_send_survives_unreachable_vendor() {
    let logs = CapturedLogs::default();
    let _guard = tracing::subscriber::set_default(tracing_subscriber::registry().with(logs.clone()));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let resend = ResendService::new(reqwest::Client::new(), "re_test").with_base_url(format!("http://{}", addr));
    let store = EmailServiceStore::new(Arc::new(resend), idle(), idle(), idle());

    EmailService::new(store)
      .send(otp_template(), envelope(), Some(EmailClient::Resend))
      .await;

    assert!(logs.contains(Level::ERROR, "[ResendService][Send]"));
  }

  #[test]
  fn test_adapter_selection() {
    let mut resend = MockEmailClientService::new();
    resend.expect_client().return_const(EmailClient::Resend);
    let mut sendgrid = MockEmailClientService::new();
    sendgrid.expect_client().return_const(EmailClient::Sendgrid);
    let mut brevo = MockEmailClientService::new();
    brevo.expect_client().return_const(EmailClient::Brevo);
    let mut smtp = MockEmailClientService::new();
    smtp.expect_client().return_const(EmailClient::Smtp);

    let store = EmailServiceStore::new(Arc::new(resend), Arc::new(sendgrid), Arc::new(brevo), Arc::new(smtp));

    assert_eq!(store.adapter(None).client(), EmailClient::Sendgrid);
    assert_eq!(store.adapter(Some(EmailClient::Resend)).client(), EmailClient::Resend);
    assert_eq!(store.adapter(Some(EmailClient::Brevo)).client(), EmailClient::Brevo);
    assert_eq!(
      store.adapter(Some(EmailClient::from_name("unknown"))).client(),
      EmailClient::Smtp
    );
  }
}
