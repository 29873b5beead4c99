//! HTML bodies for every [`EmailTemplate`], rendered through minijinja with HTML auto-escaping.

use std::sync::LazyLock;

use minijinja::{context, Environment};
use serde::Serialize;

use crate::constants::{APP_LOGO, APP_NAME, COMPANY_ADDRESS};

use super::types::{EmailError, EmailTemplate};

static TEMPLATES: LazyLock<Environment<'static>> = LazyLock::new(|| {
  let mut env = Environment::new();

  env
    .add_template("layout.html", include_str!("../../templates/email/layout.html"))
    .expect("Failed to add layout template");
  env
    .add_template("macros.html", include_str!("../../templates/email/macros.html"))
    .expect("Failed to add macros template");
  env
    .add_template("welcome_email.html", include_str!("../../templates/email/welcome_email.html"))
    .expect("Failed to add welcome_email template");
  env
    .add_template("verify_email.html", include_str!("../../templates/email/verify_email.html"))
    .expect("Failed to add verify_email template");
  env
    .add_template("verify_email_otp.html", include_str!("../../templates/email/verify_email_otp.html"))
    .expect("Failed to add verify_email_otp template");
  env
    .add_template("forgot_password.html", include_str!("../../templates/email/forgot_password.html"))
    .expect("Failed to add forgot_password template");
  env
    .add_template(
      "forgot_password_otp.html",
      include_str!("../../templates/email/forgot_password_otp.html"),
    )
    .expect("Failed to add forgot_password_otp template");
  env
    .add_template("sign_in_otp.html", include_str!("../../templates/email/sign_in_otp.html"))
    .expect("Failed to add sign_in_otp template");
  env
    .add_template("magic_link.html", include_str!("../../templates/email/magic_link.html"))
    .expect("Failed to add magic_link template");

  env
});

pub fn render(template: &EmailTemplate) -> Result<String, EmailError> {
  match template {
    EmailTemplate::WelcomeEmail(props) => render_named("welcome_email.html", props),
    EmailTemplate::VerifyEmail(props) => render_named("verify_email.html", props),
    EmailTemplate::VerifyEmailOtp(props) => render_named("verify_email_otp.html", props),
    EmailTemplate::ForgotPassword(props) => render_named("forgot_password.html", props),
    EmailTemplate::ForgotPasswordOtp(props) => render_named("forgot_password_otp.html", props),
    EmailTemplate::SignInOtp(props) => render_named("sign_in_otp.html", props),
    EmailTemplate::MagicLink(props) => render_named("magic_link.html", props),
  }
}

fn render_named<P: Serialize>(name: &str, props: &P) -> Result<String, EmailError> {
  let template = TEMPLATES.get_template(name)?;
  let html = template.render(context! {
    app_name => APP_NAME,
    app_logo => APP_LOGO,
    company_address => COMPANY_ADDRESS,
    props => props,
  })?;
  Ok(html)
}
