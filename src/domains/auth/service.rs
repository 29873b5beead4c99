use std::{error::Error, sync::Arc};

use async_trait::async_trait;
use validator::Validate;

use super::{
  hooks::before_user_create,
  mailer::AuthMailer,
  model::{AuthSession, MagicLinkPayload, MagicLinkRequest, OtpType},
  storage::{SecondaryStorage, StorageError},
};
use crate::constants::OTP_EXPIRY_SECS;
use crate::domains::user::{
  model::{User, UserUpdate},
  service::{UserService, UserServiceError},
};
use crate::utils::{
  id::{generate_otp, generate_token},
  jwt::TokenService,
};

const TOKEN_LENGTH: usize = 32;
/// Guesses allowed against one issued code, the correct one included.
const MAX_OTP_ATTEMPTS: u64 = 3;

#[derive(Debug)]
pub enum AuthServiceError {
  ValidationError(String),
  InvalidOtp(String),
  OtpExpired(String),
  InvalidToken(String),
  UserNotFound(String),
  Conflict(String),
  InternalServerError(String),
}

impl Error for AuthServiceError {}

impl std::fmt::Display for AuthServiceError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      AuthServiceError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
      AuthServiceError::InvalidOtp(msg) => write!(f, "Invalid OTP: {}", msg),
      AuthServiceError::OtpExpired(msg) => write!(f, "OTP Expired: {}", msg),
      AuthServiceError::InvalidToken(msg) => write!(f, "Invalid Token: {}", msg),
      AuthServiceError::UserNotFound(msg) => write!(f, "User Not Found: {}", msg),
      AuthServiceError::Conflict(msg) => write!(f, "Conflict: {}", msg),
      AuthServiceError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
    }
  }
}

impl From<StorageError> for AuthServiceError {
  fn from(err: StorageError) -> Self {
    AuthServiceError::InternalServerError(err.to_string())
  }
}

impl From<UserServiceError> for AuthServiceError {
  fn from(err: UserServiceError) -> Self {
    match err {
      UserServiceError::ValidationError(msg) => AuthServiceError::ValidationError(msg),
      UserServiceError::UserNotFound(msg) => AuthServiceError::UserNotFound(msg),
      UserServiceError::Conflict(msg) => AuthServiceError::Conflict(msg),
      UserServiceError::InternalServerError(msg) => AuthServiceError::InternalServerError(msg),
    }
  }
}

impl From<jsonwebtoken::errors::Error> for AuthServiceError {
  fn from(err: jsonwebtoken::errors::Error) -> Self {
    AuthServiceError::InternalServerError(format!("JWT encoding failed: {}", err))
  }
}

impl From<serde_json::Error> for AuthServiceError {
  fn from(err: serde_json::Error) -> Self {
    AuthServiceError::InternalServerError(format!("Corrupt stored token payload: {}", err))
  }
}

#[async_trait]
pub trait AuthService: Send + Sync {
  async fn send_verification_otp(&self, email: &str, otp_type: OtpType) -> Result<(), AuthServiceError>;
  async fn verify_email_otp(&self, email: &str, otp: &str) -> Result<AuthSession, AuthServiceError>;
  async fn sign_in_email_otp(&self, email: &str, otp: &str) -> Result<AuthSession, AuthServiceError>;
  async fn sign_in_magic_link(&self, req: MagicLinkRequest) -> Result<(), AuthServiceError>;
  async fn verify_magic_link(&self, token: &str) -> Result<AuthSession, AuthServiceError>;
  async fn send_verification_email(&self, email: &str) -> Result<(), AuthServiceError>;
  async fn verify_email_token(&self, token: &str) -> Result<AuthSession, AuthServiceError>;
  async fn forget_password(&self, email: &str) -> Result<(), AuthServiceError>;
  async fn reset_password(&self, token: &str) -> Result<AuthSession, AuthServiceError>;
  async fn reset_password_email_otp(&self, email: &str, otp: &str) -> Result<AuthSession, AuthServiceError>;
}

pub struct AuthServiceImpl {
  user_service: Arc<dyn UserService>,
  storage: Arc<dyn SecondaryStorage>,
  mailer: AuthMailer,
  tokens: TokenService,
}

fn normalize_email(email: &str) -> String {
  email.trim().to_lowercase()
}

fn otp_key(otp_type: OtpType, email: &str) -> String {
  format!("otp:{}:{}", otp_type.as_str(), email)
}

fn otp_attempts_key(otp_type: OtpType, email: &str) -> String {
  format!("otp:{}:{}:attempts", otp_type.as_str(), email)
}

fn magic_link_key(token: &str) -> String {
  format!("magic-link:{}", token)
}

fn verification_key(token: &str) -> String {
  format!("email-verification:{}", token)
}

fn reset_password_key(token: &str) -> String {
  format!("reset-password:{}", token)
}

impl AuthServiceImpl {
  pub fn new(
    user_service: Arc<dyn UserService>,
    storage: Arc<dyn SecondaryStorage>,
    mailer: AuthMailer,
    tokens: TokenService,
  ) -> Self {
    Self {
      user_service,
      storage,
      mailer,
      tokens,
    }
  }

  /// Checks `otp` against the stored code and consumes the code on success.
  ///
  /// Every guess is counted; once `MAX_OTP_ATTEMPTS` guesses have missed, the code is discarded.
  async fn consume_otp(&self, otp_type: OtpType, email: &str, otp: &str) -> Result<(), AuthServiceError> {
    let key = otp_key(otp_type, email);
    let attempts_key = otp_attempts_key(otp_type, email);
    let expired = || AuthServiceError::OtpExpired("OTP expired or was never issued".to_string());

    let stored = self.storage.get(&key).await?.ok_or_else(expired)?;

    let attempts = self.storage.increment(&attempts_key, OTP_EXPIRY_SECS).await?;
    if attempts > MAX_OTP_ATTEMPTS {
      self.storage.delete(&key).await?;
      return Err(AuthServiceError::OtpExpired("Too many attempts".to_string()));
    }

    if stored != otp.trim() {
      if attempts == MAX_OTP_ATTEMPTS {
        tracing::warn!(otp_type = otp_type.as_str(), "OTP discarded after too many attempts");
        self.storage.delete(&key).await?;
        return Err(AuthServiceError::OtpExpired("Too many attempts".to_string()));
      }
      return Err(AuthServiceError::InvalidOtp("Invalid OTP".to_string()));
    }

    // Concurrent correct guesses race here; only the one that removes the code wins.
    match self.storage.take(&key).await? {
      Some(taken) if taken == stored => {}
      _ => return Err(expired()),
    }
    self.storage.delete(&attempts_key).await?;
    Ok(())
  }

  /// Reads and deletes a one-time token.
  async fn take(&self, key: &str) -> Result<String, AuthServiceError> {
    self
      .storage
      .take(key)
      .await?
      .ok_or_else(|| AuthServiceError::InvalidToken("Token is invalid or has expired".to_string()))
  }

  async fn existing_user(&self, email: &str) -> Result<User, AuthServiceError> {
    self
      .user_service
      .find_by_email(email)
      .await?
      .ok_or_else(|| AuthServiceError::UserNotFound(format!("No account for {}", email)))
  }

  async fn mark_verified(&self, user: User) -> Result<User, AuthServiceError> {
    if user.email_verified {
      return Ok(user);
    }

    let update = UserUpdate {
      email_verified: Some(true),
      ..Default::default()
    };
    Ok(self.user_service.update(&user.id, update).await?)
  }

  fn session(&self, user: User) -> Result<AuthSession, AuthServiceError> {
    let token = self.tokens.issue(&user.id, &user.email)?;
    Ok(AuthSession { token, user })
  }
}

#[async_trait]
impl AuthService for AuthServiceImpl {
  /// Unknown addresses get no email and no error.
  async fn send_verification_otp(&self, email: &str, otp_type: OtpType) -> Result<(), AuthServiceError> {
    let email = normalize_email(email);

    if self.user_service.find_by_email(&email).await?.is_none() {
      tracing::info!(otp_type = otp_type.as_str(), "OTP requested for unknown account");
      return Ok(());
    }

    let otp = generate_otp();
    self
      .storage
      .set(&otp_key(otp_type, &email), &otp, Some(OTP_EXPIRY_SECS))
      .await?;
    self.storage.delete(&otp_attempts_key(otp_type, &email)).await?;

    self.mailer.send_verification_otp(&email, &otp, otp_type).await;
    Ok(())
  }

  async fn verify_email_otp(&self, email: &str, otp: &str) -> Result<AuthSession, AuthServiceError> {
    let email = normalize_email(email);
    self.consume_otp(OtpType::EmailVerification, &email, otp).await?;

    let user = self.existing_user(&email).await?;
    let user = self.mark_verified(user).await?;
    self.session(user)
  }

  async fn sign_in_email_otp(&self, email: &str, otp: &str) -> Result<AuthSession, AuthServiceError> {
    let email = normalize_email(email);
    self.consume_otp(OtpType::SignIn, &email, otp).await?;

    let user = self.existing_user(&email).await?;
    let user = self.mark_verified(user).await?;
    self.session(user)
  }

  async fn sign_in_magic_link(&self, req: MagicLinkRequest) -> Result<(), AuthServiceError> {
    req
      .validate()
      .map_err(|e| AuthServiceError::ValidationError(format!("Validation failed: {}", e)))?;

    let payload = MagicLinkPayload {
      email: normalize_email(&req.email),
      name: req.name,
    };
    let token = generate_token(TOKEN_LENGTH);
    self
      .storage
      .set(
        &magic_link_key(&token),
        &serde_json::to_string(&payload)?,
        Some(OTP_EXPIRY_SECS),
      )
      .await?;

    self.mailer.send_magic_link(&payload.email, &token, req.new_user).await;
    Ok(())
  }

  /// Signs the user in, creating the account on first use.
  async fn verify_magic_link(&self, token: &str) -> Result<AuthSession, AuthServiceError> {
    let raw = self.take(&magic_link_key(token)).await?;
    let payload: MagicLinkPayload = serde_json::from_str(&raw)?;

    let user = match self.user_service.find_by_email(&payload.email).await? {
      Some(user) => self.mark_verified(user).await?,
      None => {
        let data = before_user_create(payload.name.as_deref(), &payload.email);
        self.user_service.create(data).await?
      }
    };

    self.session(user)
  }

  async fn send_verification_email(&self, email: &str) -> Result<(), AuthServiceError> {
    let user = self.existing_user(&normalize_email(email)).await?;

    if user.email_verified {
      tracing::info!(user_id = %user.id, "Email already verified");
      return Ok(());
    }

    let token = generate_token(TOKEN_LENGTH);
    self
      .storage
      .set(&verification_key(&token), &user.email, Some(OTP_EXPIRY_SECS))
      .await?;

    self.mailer.send_verification_email(&user.email, &token).await;
    Ok(())
  }

  async fn verify_email_token(&self, token: &str) -> Result<AuthSession, AuthServiceError> {
    let email = self.take(&verification_key(token)).await?;

    let user = self.existing_user(&email).await?;
    let user = self.mark_verified(user).await?;
    self.session(user)
  }

  async fn forget_password(&self, email: &str) -> Result<(), AuthServiceError> {
    let email = normalize_email(email);

    let Some(user) = self.user_service.find_by_email(&email).await? else {
      tracing::info!("Password reset requested for unknown account");
      return Ok(());
    };

    let token = generate_token(TOKEN_LENGTH);
    self
      .storage
      .set(&reset_password_key(&token), &user.id, Some(OTP_EXPIRY_SECS))
      .await?;

    self.mailer.send_reset_password(&user.email, &token).await;
    Ok(())
  }

  /// Redeems the link from `forget_password`. Accounts are passwordless, so a reset is a recovery sign-in.
  async fn reset_password(&self, token: &str) -> Result<AuthSession, AuthServiceError> {
    let user_id = self.take(&reset_password_key(token)).await?;

    let user = self.user_service.get(&user_id).await?;
    let user = self.mark_verified(user).await?;
    self.session(user)
  }

  async fn reset_password_email_otp(&self, email: &str, otp: &str) -> Result<AuthSession, AuthServiceError> {
    let email = normalize_email(email);
    self.consume_otp(OtpType::ForgetPassword, &email, otp).await?;

    let user = self.existing_user(&email).await?;
    let user = self.mark_verified(user).await?;
    self.session(user)
  }
}
