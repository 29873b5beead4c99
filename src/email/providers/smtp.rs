use std::time::SystemTime;

use async_trait::async_trait;
use lettre::{
  message::{header::ContentType, Mailbox},
  transport::smtp::authentication::Credentials,
  Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use super::EmailClientService;
use crate::config::SmtpSettings;
use crate::email::types::{EmailClient, EmailError, EmailUser, SendEmailParams};

pub struct SmtpService {
  transporter: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpService {
  pub fn new(settings: &SmtpSettings) -> Result<Self, EmailError> {
    let builder = if settings.host == "localhost" || settings.host == "mailhog" {
      AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&settings.host)
    } else if settings.secure {
      AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host)?
    } else {
      AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)?
    };

    let builder = builder.port(settings.port);
    let builder = match (&settings.username, &settings.password) {
      (Some(username), Some(password)) => builder.credentials(Credentials::new(username.clone(), password.clone())),
      _ => builder,
    };

    Ok(SmtpService {
      transporter: builder.build(),
    })
  }

  pub fn build_message(params: &SendEmailParams) -> Result<Message, EmailError> {
    let mut builder = Message::builder()
      .from(mailbox(&params.from.to_user())?)
      .subject(&params.subject);

    for recipient in params.to.to_users() {
      builder = builder.to(mailbox(&recipient)?);
    }

    if let Some(reply_to) = &params.reply_to {
      builder = builder.reply_to(mailbox(&reply_to.to_user())?);
    }

    if let Some(send_at) = params.send_at {
      builder = builder.date(SystemTime::from(send_at));
    }

    let message = builder
      .header(ContentType::TEXT_HTML)
      .body(params.html.clone().unwrap_or_default())?;

    Ok(message)
  }
}

fn mailbox(user: &EmailUser) -> Result<Mailbox, EmailError> {
  Ok(Mailbox::new(user.name.clone(), user.email.parse::<Address>()?))
}

#[async_trait]
impl EmailClientService for SmtpService {
  fn client(&self) -> EmailClient {
    EmailClient::Smtp
  }

  async fn send(&self, params: &SendEmailParams) -> Result<(), EmailError> {
    let message = Self::build_message(params)?;
    self.transporter.send(message).await?;
    Ok(())
  }
}
