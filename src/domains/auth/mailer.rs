use super::model::OtpType;
use crate::constants::{APP_NAME, FROM_BASE, FROM_UPDATE, FROM_UPDATE_EMAIL, OTP_EXPIRY_DISPLAY};
use crate::email::{
  EmailClient, EmailService, EmailTemplate, ExpiringUrlProps, MagicLinkProps, OtpProps, SendEmailParams, UrlProps,
};

/// The transactional emails sent by the sign-in flows. Each one picks its own sender and provider.
#[derive(Clone)]
pub struct AuthMailer {
  email: EmailService,
  client_url: String,
}

impl AuthMailer {
  pub fn new(email: EmailService, client_url: impl Into<String>) -> Self {
    Self {
      email,
      client_url: client_url.into(),
    }
  }

  pub async fn send_verification_otp(&self, email: &str, otp: &str, otp_type: OtpType) {
    let props = OtpProps {
      otp: otp.to_string(),
      otp_expiry: OTP_EXPIRY_DISPLAY.to_string(),
    };

    let (template, params, client) = match otp_type {
      OtpType::EmailVerification => (
        EmailTemplate::VerifyEmailOtp(props),
        SendEmailParams::new(FROM_UPDATE_EMAIL, email, "Verify Email"),
        EmailClient::Resend,
      ),
      OtpType::ForgetPassword => (
        EmailTemplate::ForgotPasswordOtp(props),
        SendEmailParams::new(FROM_BASE, email, "Forgot Password?"),
        EmailClient::Sendgrid,
      ),
      OtpType::SignIn => (
        EmailTemplate::SignInOtp(props),
        SendEmailParams::new(FROM_UPDATE, email, "Sign In OTP"),
        EmailClient::Resend,
      ),
    };

    self.email.send(template, params, Some(client)).await;
  }

  pub async fn send_magic_link(&self, email: &str, token: &str, new_user: bool) {
    let link = self.link("magic", token);

    if new_user {
      self
        .email
        .send(
          EmailTemplate::WelcomeEmail(UrlProps { url: link }),
          SendEmailParams::new(FROM_UPDATE_EMAIL, email, format!("Welcome to {}", APP_NAME)),
          Some(EmailClient::Resend),
        )
        .await;
      return;
    }

    self
      .email
      .send(
        EmailTemplate::MagicLink(MagicLinkProps { link }),
        SendEmailParams::new(FROM_UPDATE_EMAIL, email, format!("Sign In To {}", APP_NAME)),
        Some(EmailClient::Resend),
      )
      .await;
  }

  /// Sends the welcome email followed by the verification link.
  pub async fn send_verification_email(&self, email: &str, token: &str) {
    self
      .email
      .send(
        EmailTemplate::WelcomeEmail(UrlProps {
          url: self.link("magic", token),
        }),
        SendEmailParams::new(FROM_UPDATE_EMAIL, email, format!("Welcome to {}", APP_NAME)),
        Some(EmailClient::Resend),
      )
      .await;

    self
      .email
      .send(
        EmailTemplate::VerifyEmail(UrlProps {
          url: self.link("auth/verify", token),
        }),
        SendEmailParams::new(FROM_UPDATE_EMAIL, email, "Verify Email"),
        Some(EmailClient::Resend),
      )
      .await;
  }

  pub async fn send_reset_password(&self, email: &str, token: &str) {
    self
      .email
      .send(
        EmailTemplate::ForgotPassword(ExpiringUrlProps {
          url: self.link("auth/reset-password", token),
          expiry: OTP_EXPIRY_DISPLAY.to_string(),
        }),
        SendEmailParams::new(FROM_UPDATE_EMAIL, email, "Forgot Password?"),
        Some(EmailClient::Resend),
      )
      .await;
  }

  fn link(&self, path: &str, token: &str) -> String {
    format!("{}/{}?token={}", self.client_url.trim_end_matches('/'), path, token)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::email::providers::{EmailClientService, MockEmailClientService};
  use crate::email::{EmailAddress, EmailServiceStore};
  use std::sync::{Arc, Mutex};

  type Sent = Arc<Mutex<Vec<(EmailClient, SendEmailParams)>>>;

  fn recording(client: EmailClient, sent: &Sent) -> Arc<dyn EmailClientService> {
    let sent = sent.clone();
    let mut mock = MockEmailClientService::new();
    mock.expect_client().return_const(client);
    mock.expect_send().returning(move |params| {
      sent.lock().unwrap().push((client, params.clone()));
      Ok(())
    });
    Arc::new(mock)
  }

  fn mailer() -> (AuthMailer, Sent) {
    let sent: Sent = Arc::default();
    let store = EmailServiceStore::new(
      recording(EmailClient::Resend, &sent),
      recording(EmailClient::Sendgrid, &sent),
      recording(EmailClient::Brevo, &sent),
      recording(EmailClient::Smtp, &sent),
    );
    (
      AuthMailer::new(EmailService::new(store), "https://client.example.com/"),
      sent,
    )
  }

  fn html(params: &SendEmailParams) -> &str {
    params.html.as_deref().unwrap_or_default()
  }

  /// Whether `url` appears as an attribute value, with or without `/` entity-escaped.
  fn links_to(params: &SendEmailParams, url: &str) -> bool {
    let html = html(params);
    let quoted = format!("\"{}\"", url);
    html.contains(&quoted) || html.contains(&quoted.replace('/', "&#x2f;"))
  }

  #[tokio::test]
  async fn test_verification_otp_routing() {
    let (mailer, sent) = mailer();

    mailer
      .send_verification_otp("a@example.com", "111111", OtpType::EmailVerification)
      .await;
    mailer
      .send_verification_otp("a@example.com", "222222", OtpType::ForgetPassword)
      .await;
    mailer.send_verification_otp("a@example.com", "333333", OtpType::SignIn).await;

    let sent = sent.lock().unwrap();
    assert_eq!(sent.len(), 3);

    let (client, params) = &sent[0];
    assert_eq!(*client, EmailClient::Resend);
    assert_eq!(params.subject, "Verify Email");
    assert_eq!(params.from, EmailAddress::from(FROM_UPDATE_EMAIL));
    assert!(html(params).contains("111111"));

    let (client, params) = &sent[1];
    assert_eq!(*client, EmailClient::Sendgrid);
    assert_eq!(params.subject, "Forgot Password?");
    assert_eq!(params.from, EmailAddress::from(FROM_BASE));
    assert!(html(params).contains("222222"));

    let (client, params) = &sent[2];
    assert_eq!(*client, EmailClient::Resend);
    assert_eq!(params.subject, "Sign In OTP");
    assert!(html(params).contains("Sign In Verification"));
  }

  #[tokio::test]
  async fn test_magic_link_for_new_and_returning_users() {
    let (mailer, sent) = mailer();

    mailer.send_magic_link("a@example.com", "tok", false).await;
    mailer.send_magic_link("b@example.com", "tok2", true).await;

    let sent = sent.lock().unwrap();
    assert_eq!(sent[0].1.subject, format!("Sign In To {}", APP_NAME));
    assert!(links_to(&sent[0].1, "https://client.example.com/magic?token=tok"));
    assert_eq!(sent[1].1.subject, format!("Welcome to {}", APP_NAME));
    assert!(links_to(&sent[1].1, "https://client.example.com/magic?token=tok2"));
  }

  #[tokio::test]
  async fn test_verification_email_sends_welcome_then_verify() {
    let (mailer, sent) = mailer();
    mailer.send_verification_email("a@example.com", "vtok").await;

    let sent = sent.lock().unwrap();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].1.subject, format!("Welcome to {}", APP_NAME));
    assert_eq!(sent[1].1.subject, "Verify Email");
    assert!(links_to(&sent[1].1, "https://client.example.com/auth/verify?token=vtok"));
  }

  #[tokio::test]
  async fn test_reset_password_link() {
    let (mailer, sent) = mailer();
    mailer.send_reset_password("a@example.com", "rtok").await;

    let sent = sent.lock().unwrap();
    assert_eq!(sent[0].0, EmailClient::Resend);
    assert!(links_to(&sent[0].1, "https://client.example.com/auth/reset-password?token=rtok"));
    assert!(html(&sent[0].1).contains("60 minutes"));
  }
}
