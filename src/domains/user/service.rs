use async_trait::async_trait;
use std::error::Error;
use validator::Validate;

use super::{
  model::{User, UserCreate, UserFilter, UserUpdate},
  repository::UserRepository,
};
use crate::impl_service_error_conversions;
use crate::utils::pagination::{build_page, PaginationResponse};

#[derive(Debug)]
pub enum UserServiceError {
  ValidationError(String),
  UserNotFound(String),
  Conflict(String),
  InternalServerError(String),
}

impl Error for UserServiceError {}

impl std::fmt::Display for UserServiceError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      UserServiceError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
      UserServiceError::UserNotFound(msg) => write!(f, "User Not Found: {}", msg),
      UserServiceError::Conflict(msg) => write!(f, "Conflict: {}", msg),
      UserServiceError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
    }
  }
}

impl_service_error_conversions!(UserServiceError, InternalServerError, Conflict);

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserService: Send + Sync {
  async fn create(&self, data: UserCreate) -> Result<User, UserServiceError>;
  async fn list(&self, filter: UserFilter) -> Result<PaginationResponse<User>, UserServiceError>;
  async fn get(&self, id: &str) -> Result<User, UserServiceError>;
  async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserServiceError>;
  async fn update(&self, id: &str, data: UserUpdate) -> Result<User, UserServiceError>;
  async fn remove(&self, id: &str) -> Result<(), UserServiceError>;
}

pub struct UserServiceImpl<U> {
  user_repository: U,
}

impl<U> UserServiceImpl<U>
where
  U: UserRepository,
{
  pub fn new(user_repository: U) -> Self {
    Self { user_repository }
  }
}

fn not_found(id: &str) -> UserServiceError {
  UserServiceError::UserNotFound(format!("User {} does not exist", id))
}

#[async_trait]
impl<U> UserService for UserServiceImpl<U>
where
  U: UserRepository,
{
  async fn create(&self, data: UserCreate) -> Result<User, UserServiceError> {
    data
      .validate()
      .map_err(|e| UserServiceError::ValidationError(format!("Validation failed: {}", e)))?;

    let user = self.user_repository.create(&data).await?;
    tracing::info!(user_id = %user.id, "Created user");
    Ok(user)
  }

  /// Runs the count query, then the page query, with the same filter.
  async fn list(&self, filter: UserFilter) -> Result<PaginationResponse<User>, UserServiceError> {
    let total = self.user_repository.count(&filter).await?;
    let users = self.user_repository.list(&filter).await?;

    Ok(build_page(total, &filter.pagination(), users))
  }

  async fn get(&self, id: &str) -> Result<User, UserServiceError> {
    self
      .user_repository
      .get(&UserFilter::by_id(id))
      .await?
      .ok_or_else(|| not_found(id))
  }

  async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserServiceError> {
    Ok(self.user_repository.get(&UserFilter::by_email(email)).await?)
  }

  async fn update(&self, id: &str, data: UserUpdate) -> Result<User, UserServiceError> {
    data
      .validate()
      .map_err(|e| UserServiceError::ValidationError(format!("Validation failed: {}", e)))?;

    if data.is_empty() {
      return self.get(id).await;
    }

    self
      .user_repository
      .update(id, &data)
      .await?
      .ok_or_else(|| not_found(id))
  }

  async fn remove(&self, id: &str) -> Result<(), UserServiceError> {
    match self.user_repository.remove(id).await? {
      0 => Err(not_found(id)),
      _ => Ok(()),
    }
  }
}
