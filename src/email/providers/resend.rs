use async_trait::async_trait;
use serde::Serialize;

use super::EmailClientService;
use crate::email::types::{EmailClient, EmailError, SendEmailParams};

pub const RESEND_BASE_URL: &str = "https://api.resend.com";

#[derive(Debug, Serialize)]
pub struct ResendPayload<'a> {
  from: String,
  to: Vec<String>,
  subject: &'a str,
  html: &'a str,
  #[serde(skip_serializing_if = "Option::is_none")]
  reply_to: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  scheduled_at: Option<String>,
}

#[derive(Clone)]
pub struct ResendService {
  http: reqwest::Client,
  api_key: String,
  base_url: String,
}

impl ResendService {
  pub fn new(http: reqwest::Client, api_key: impl Into<String>) -> Self {
    Self {
      http,
      api_key: api_key.into(),
      base_url: RESEND_BASE_URL.to_string(),
    }
  }

  pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
    self.base_url = base_url.into();
    self
  }

  pub fn format_payload(params: &SendEmailParams) -> ResendPayload<'_> {
    ResendPayload {
      from: params.from.to_user().display(),
      to: params.to.to_users().iter().map(|user| user.display()).collect(),
      subject: &params.subject,
      html: params.html.as_deref().unwrap_or_default(),
      reply_to: params.reply_to.as_ref().map(|address| address.to_user().display()),
      scheduled_at: params.send_at.map(|at| at.to_rfc3339()),
    }
  }
}

#[async_trait]
impl EmailClientService for ResendService {
  fn client(&self) -> EmailClient {
    EmailClient::Resend
  }

  async fn send(&self, params: &SendEmailParams) -> Result<(), EmailError> {
    self
      .http
      .post(format!("{}/emails", self.base_url))
      .bearer_auth(&self.api_key)
      .json(&Self::format_payload(params))
      .send()
      .await?
      .error_for_status()?;

    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::email::types::EmailUser;
  use crate::test_support::spawn_mock_api;
  use axum::http::StatusCode;
  use chrono::{TimeZone, Utc};
  use serde_json::json;

  fn params() -> SendEmailParams {
    SendEmailParams::new(
      "RemindMe <no-reply@updates.varteqar.com>",
      vec!["a@example.com".to_string(), "b@example.com".to_string()],
      "Verify Email",
    )
    .with_reply_to(EmailUser::new(Some("Support"), "support@varteqar.com"))
    .with_send_at(Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap())
  }

  #[test]
  fn test_format_payload() {
    let mut params = params();
    params.html = Some("<p>hi</p>".to_string());

    let payload = serde_json::to_value(ResendService::format_payload(&params)).unwrap();
    assert_eq!(
      payload,
      json!({
        "from": "RemindMe <no-reply@updates.varteqar.com>",
        "to": ["a@example.com", "b@example.com"],
        "subject": "Verify Email",
        "html": "<p>hi</p>",
        "reply_to": "Support <support@varteqar.com>",
        "scheduled_at": "2025-01-02T03:04:05+00:00"
      })
    );
  }

  #[test]
  fn test_format_payload_omits_absent_optionals() {
    let params = SendEmailParams::new("no-reply@varteqar.com", "a@example.com", "Hello");
    let payload = serde_json::to_value(ResendService::format_payload(&params)).unwrap();
    assert_eq!(payload["to"], json!(["a@example.com"]));
    assert!(payload.get("reply_to").is_none());
    assert!(payload.get("scheduled_at").is_none());
  }

  #[tokio::test]
  async fn test_send_posts_with_bearer_token() {
    let api = spawn_mock_api("/emails", StatusCode::OK).await;
    let service = ResendService::new(reqwest::Client::new(), "re_test").with_base_url(&api.base_url);

    service.send(&params()).await.expect("send succeeds");

    let requests = api.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].authorization.as_deref(), Some("Bearer re_test"));
    assert_eq!(requests[0].body["subject"], "Verify Email");
  }

  #[tokio::test]
  async fn test_send_reports_error_status() {
    let api = spawn_mock_api("/emails", StatusCode::UNPROCESSABLE_ENTITY).await;
    let service = ResendService::new(reqwest::Client::new(), "re_test").with_base_url(&api.base_url);

    let result = service.send(&params()).await;
    assert!(matches!(result, Err(EmailError::Http(_))));
  }
}
