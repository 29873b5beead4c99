use async_trait::async_trait;
use serde::Serialize;

use super::EmailClientService;
use crate::constants::FROM_NAME;
use crate::email::types::{EmailClient, EmailError, EmailUser, SendEmailParams};

pub const BREVO_BASE_URL: &str = "https://api.brevo.com";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrevoPayload<'a> {
  sender: EmailUser,
  to: Vec<EmailUser>,
  subject: &'a str,
  html_content: &'a str,
  #[serde(skip_serializing_if = "Option::is_none")]
  reply_to: Option<EmailUser>,
  #[serde(skip_serializing_if = "Option::is_none")]
  scheduled_at: Option<String>,
}

#[derive(Clone)]
pub struct BrevoService {
  http: reqwest::Client,
  api_key: String,
  base_url: String,
}

impl BrevoService {
  pub fn new(http: reqwest::Client, api_key: impl Into<String>) -> Self {
    Self {
      http,
      api_key: api_key.into(),
      base_url: BREVO_BASE_URL.to_string(),
    }
  }

  pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
    self.base_url = base_url.into();
    self
  }

  /// Sender and reply-to always carry a display name; Brevo rejects nameless senders.
  pub fn format_payload(params: &SendEmailParams) -> BrevoPayload<'_> {
    BrevoPayload {
      sender: with_default_name(params.from.to_user()),
      to: params.to.to_users(),
      subject: &params.subject,
      html_content: params.html.as_deref().unwrap_or_default(),
      reply_to: params.reply_to.as_ref().map(|address| with_default_name(address.to_user())),
      scheduled_at: params.send_at.map(|at| at.to_rfc3339()),
    }
  }
}

fn with_default_name(mut user: EmailUser) -> EmailUser {
  if user.name.is_none() {
    user.name = Some(FROM_NAME.to_string());
  }
  user
}

#[async_trait]
impl EmailClientService for BrevoService {
  fn client(&self) -> EmailClient {
    EmailClient::Brevo
  }

  async fn send(&self, params: &SendEmailParams) -> Result<(), EmailError> {
    self
      .http
      .post(format!("{}/v3/smtp/email", self.base_url))
      .header("api-key", &self.api_key)
      .header("accept", "application/json")
      .json(&Self::format_payload(params))
      .send()
      .await?
      .error_for_status()?;

    Ok(())
  }
}
