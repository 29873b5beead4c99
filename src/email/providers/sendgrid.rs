use async_trait::async_trait;
use serde::Serialize;

use super::EmailClientService;
use crate::email::types::{EmailClient, EmailError, EmailUser, SendEmailParams};

pub const SENDGRID_BASE_URL: &str = "https://api.sendgrid.com";

#[derive(Debug, Serialize)]
pub struct SendgridContent<'a> {
  #[serde(rename = "type")]
  content_type: &'static str,
  value: &'a str,
}

#[derive(Debug, Serialize)]
pub struct SendgridPersonalization {
  to: Vec<EmailUser>,
}

#[derive(Debug, Serialize)]
pub struct SendgridPayload<'a> {
  from: EmailUser,
  #[serde(skip_serializing_if = "Option::is_none")]
  reply_to: Option<EmailUser>,
  subject: &'a str,
  #[serde(skip_serializing_if = "Option::is_none")]
  send_at: Option<i64>,
  content: Vec<SendgridContent<'a>>,
  personalizations: Vec<SendgridPersonalization>,
}

#[derive(Clone)]
pub struct SendgridService {
  http: reqwest::Client,
  api_key: String,
  base_url: String,
}

impl SendgridService {
  pub fn new(http: reqwest::Client, api_key: impl Into<String>) -> Self {
    Self {
      http,
      api_key: api_key.into(),
      base_url: SENDGRID_BASE_URL.to_string(),
    }
  }

  pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
    self.base_url = base_url.into();
    self
  }

  pub fn format_payload(params: &SendEmailParams) -> SendgridPayload<'_> {
    SendgridPayload {
      from: params.from.to_user(),
      reply_to: params.reply_to.as_ref().map(|address| address.to_user()),
      subject: &params.subject,
      send_at: params.send_at.map(|at| at.timestamp()),
      content: vec![SendgridContent {
        content_type: "text/html",
        value: params.html.as_deref().unwrap_or_default(),
      }],
      personalizations: vec![SendgridPersonalization {
        to: params.to.to_users(),
      }],
    }
  }
}

#[async_trait]
impl EmailClientService for SendgridService {
  fn client(&self) -> EmailClient {
    EmailClient::Sendgrid
  }

  async fn send(&self, params: &SendEmailParams) -> Result<(), EmailError> {
    self
      .http
      .post(format!("{}/v3/mail/send", self.base_url))
      .bearer_auth(&self.api_key)
      .json(&Self::format_payload(params))
      .send()
      .await?
      .error_for_status()?;

    Ok(())
  }
}
