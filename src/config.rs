use anyhow::{Context, Result};
use std::env;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
  Development,
  Production,
  Test,
}

impl Environment {
  pub fn from_name(name: &str) -> Self {
    match name.to_lowercase().as_str() {
      "production" | "prod" => Environment::Production,
      "test" => Environment::Test,
      _ => Environment::Development,
    }
  }

  pub fn is_production(&self) -> bool {
    *self == Environment::Production
  }
}

#[derive(Debug, Clone)]
pub struct SmtpSettings {
  pub host: String,
  pub port: u16,
  pub secure: bool,
  pub username: Option<String>,
  pub password: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
  pub port: u16,
  pub environment: Environment,
  pub database_url: String,
  pub jwt_secret: String,
  pub jwt_expiry_secs: i64,
  pub sendgrid_api_key: String,
  pub brevo_api_key: String,
  pub resend_api_key: String,
  pub smtp: SmtpSettings,
  pub client_url: String,
  pub trusted_origins: Vec<String>,
  pub redis_url: String,
}

impl Config {
  /// Reads the configuration from the process environment.
  ///
  /// Only `DATABASE_URL` is mandatory; everything else falls back to a development default.
  pub fn from_env() -> Result<Self> {
    let environment = Environment::from_name(
      &env::var("APP_ENV")
        .or_else(|_| env::var("NODE_ENV"))
        .unwrap_or_else(|_| "development".to_string()),
    );

    Ok(Config {
      port: env_or("PORT", "6050").parse().context("PORT must be a valid port number")?,
      environment,
      database_url: env::var("DATABASE_URL").context("DATABASE_URL environment variable must be set.")?,
      jwt_secret: env_or("JWT_SECRET", "woohoo"),
      jwt_expiry_secs: env_or("JWT_EXPIRY_SECS", "172800")
        .parse()
        .context("JWT_EXPIRY_SECS must be a number of seconds")?,
      sendgrid_api_key: env_or("SENDGRID_API_KEY", "SG.xxxxxxxxxxxxxxxxx"),
      brevo_api_key: env_or("BREVO_API_KEY", "xxxxxxxxxxxxxxxxxx"),
      resend_api_key: env_or("RESEND_API_KEY", "xxxxxxxxxxxxxxxxxxxxxxxxxxxxxx"),
      smtp: SmtpSettings {
        host: env_or("SMTP_HOST", "smtp.example.com"),
        port: env_or("SMTP_PORT", "587").parse().unwrap_or(587),
        secure: env::var("SMTP_SECURE").map(|v| v == "1").unwrap_or(false),
        username: env::var("SMTP_USER").ok(),
        password: env::var("SMTP_PASSWORD").ok(),
      },
      client_url: env_or("CLIENT_URL", "https://client.example.com"),
      trusted_origins: parse_list(&env::var("TRUSTED_ORIGINS").unwrap_or_default()),
      redis_url: env_or("REDIS_URL", "redis://localhost:6379"),
    })
  }
}

fn env_or(key: &str, default: &str) -> String {
  env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_list(raw: &str) -> Vec<String> {
  raw
    .split(',')
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .map(String::from)
    .collect()
}
