use std::sync::Arc;

use sqlx::PgPool;

use crate::domains::{
  auth::{
    mailer::AuthMailer,
    model::{AuthSession, MagicLinkRequest, OtpType},
    service::{AuthService, AuthServiceError, AuthServiceImpl},
    storage::SecondaryStorage,
  },
  user::{
    model::{User, UserCreate, UserFilter, UserUpdate},
    repository::SqlxUserRepository,
    service::{UserService, UserServiceError, UserServiceImpl},
  },
};
use crate::email::EmailService;
use crate::utils::{jwt::TokenService, pagination::PaginationResponse};

pub trait AppState: Clone + Send + Sync + 'static {
  fn tokens(&self) -> &TokenService;

  fn create_user(&self, data: UserCreate) -> impl std::future::Future<Output = Result<User, UserServiceError>> + Send;
  fn list_users(
    &self,
    filter: UserFilter,
  ) -> impl std::future::Future<Output = Result<PaginationResponse<User>, UserServiceError>> + Send;
  fn get_user(&self, id: &str) -> impl std::future::Future<Output = Result<User, UserServiceError>> + Send;
  fn update_user(
    &self,
    id: &str,
    data: UserUpdate,
  ) -> impl std::future::Future<Output = Result<User, UserServiceError>> + Send;
  fn remove_user(&self, id: &str) -> impl std::future::Future<Output = Result<(), UserServiceError>> + Send;

  fn send_verification_otp(
    &self,
    email: &str,
    otp_type: OtpType,
  ) -> impl std::future::Future<Output = Result<(), AuthServiceError>> + Send;
  fn verify_email_otp(
    &self,
    email: &str,
    otp: &str,
  ) -> impl std::future::Future<Output = Result<AuthSession, AuthServiceError>> + Send;
  fn sign_in_email_otp(
    &self,
    email: &str,
    otp: &str,
  ) -> impl std::future::Future<Output = Result<AuthSession, AuthServiceError>> + Send;
  fn sign_in_magic_link(
    &self,
    req: MagicLinkRequest,
  ) -> impl std::future::Future<Output = Result<(), AuthServiceError>> + Send;
  fn verify_magic_link(
    &self,
    token: &str,
  ) -> impl std::future::Future<Output = Result<AuthSession, AuthServiceError>> + Send;
  fn send_verification_email(&self, email: &str)
    -> impl std::future::Future<Output = Result<(), AuthServiceError>> + Send;
  fn verify_email_token(
    &self,
    token: &str,
  ) -> impl std::future::Future<Output = Result<AuthSession, AuthServiceError>> + Send;
  fn forget_password(&self, email: &str) -> impl std::future::Future<Output = Result<(), AuthServiceError>> + Send;
  fn reset_password(
    &self,
    token: &str,
  ) -> impl std::future::Future<Output = Result<AuthSession, AuthServiceError>> + Send;
  fn reset_password_email_otp(
    &self,
    email: &str,
    otp: &str,
  ) -> impl std::future::Future<Output = Result<AuthSession, AuthServiceError>> + Send;
}

#[derive(Clone)]
pub struct SharedAppState {
  pub user_service: Arc<UserServiceImpl<SqlxUserRepository>>,
  pub auth_service: Arc<AuthServiceImpl>,
  pub tokens: TokenService,
}

impl SharedAppState {
  pub fn new(
    pool: PgPool,
    email_service: EmailService,
    storage: Arc<dyn SecondaryStorage>,
    tokens: TokenService,
    client_url: &str,
  ) -> Self {
    let user_repository = SqlxUserRepository::new(pool);
    let user_service = Arc::new(UserServiceImpl::new(user_repository));

    let mailer = AuthMailer::new(email_service, client_url);
    let auth_service = Arc::new(AuthServiceImpl::new(
      user_service.clone(),
      storage,
      mailer,
      tokens.clone(),
    ));

    Self {
      user_service,
      auth_service,
      tokens,
    }
  }
}

impl AppState for SharedAppState {
  fn tokens(&self) -> &TokenService {
    &self.tokens
  }

  async fn create_user(&self, data: UserCreate) -> Result<User, UserServiceError> {
    self.user_service.create(data).await
  }

  async fn list_users(&self, filter: UserFilter) -> Result<PaginationResponse<User>, UserServiceError> {
    self.user_service.list(filter).await
  }

  async fn get_user(&self, id: &str) -> Result<User, UserServiceError> {
    self.user_service.get(id).await
  }

  async fn update_user(&self, id: &str, data: UserUpdate) -> Result<User, UserServiceError> {
    self.user_service.update(id, data).await
  }

  async fn remove_user(&self, id: &str) -> Result<(), UserServiceError> {
    self.user_service.remove(id).await
  }

  async fn send_verification_otp(&self, email: &str, otp_type: OtpType) -> Result<(), AuthServiceError> {
    self.auth_service.send_verification_otp(email, otp_type).await
  }

  async fn verify_email_otp(&self, email: &str, otp: &str) -> Result<AuthSession, AuthServiceError> {
    self.auth_service.verify_email_otp(email, otp).await
  }

  async fn sign_in_email_otp(&self, email: &str, otp: &str) -> Result<AuthSession, AuthServiceError> {
    self.auth_service.sign_in_email_otp(email, otp).await
  }

  async fn sign_in_magic_link(&self, req: MagicLinkRequest) -> Result<(), AuthServiceError> {
    self.auth_service.sign_in_magic_link(req).await
  }

  async fn verify_magic_link(&self, token: &str) -> Result<AuthSession, AuthServiceError> {
    self.auth_service.verify_magic_link(token).await
  }

  async fn send_verification_email(&self, email: &str) -> Result<(), AuthServiceError> {
    self.auth_service.send_verification_email(email).await
  }

  async fn verify_email_token(&self, token: &str) -> Result<AuthSession, AuthServiceError> {
    self.auth_service.verify_email_token(token).await
  }

  async fn forget_password(&self, email: &str) -> Result<(), AuthServiceError> {
    self.auth_service.forget_password(email).await
  }

  async fn reset_password(&self, token: &str) -> Result<AuthSession, AuthServiceError> {
    self.auth_service.reset_password(token).await
  }

  async fn reset_password_email_otp(&self, email: &str, otp: &str) -> Result<AuthSession, AuthServiceError> {
    self.auth_service.reset_password_email_otp(email, otp).await
  }
}
