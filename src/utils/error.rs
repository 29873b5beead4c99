use axum::{
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use serde_json::json;

#[derive(Debug)]
pub struct AppError {
  pub status_code: StatusCode,
  pub message: String,
}

impl AppError {
  pub fn new(status_code: StatusCode, message: impl Into<String>) -> Self {
    Self {
      status_code,
      message: message.into(),
    }
  }

  pub fn bad_request(message: impl Into<String>) -> Self {
    Self::new(StatusCode::BAD_REQUEST, message)
  }

  pub fn unauthorized(message: impl Into<String>) -> Self {
    Self::new(StatusCode::UNAUTHORIZED, message)
  }

  pub fn not_found(message: impl Into<String>) -> Self {
    Self::new(StatusCode::NOT_FOUND, message)
  }

  pub fn conflict(message: impl Into<String>) -> Self {
    Self::new(StatusCode::CONFLICT, message)
  }

  pub fn internal_server_error(message: impl Into<String>) -> Self {
    Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
  }
}

impl IntoResponse for AppError {
  fn into_response(self) -> Response {
    let body = Json(json!({
      "error": self.message,
      "status_code": self.status_code.as_u16(),
    }));

    (self.status_code, body).into_response()
  }
}

impl From<crate::domains::user::service::UserServiceError> for AppError {
  fn from(error: crate::domains::user::service::UserServiceError) -> Self {
    use crate::domains::user::service::UserServiceError;
    match error {
      UserServiceError::ValidationError(msg) => AppError::bad_request(msg),
      UserServiceError::UserNotFound(msg) => AppError::not_found(msg),
      UserServiceError::Conflict(msg) => AppError::conflict(msg),
      UserServiceError::InternalServerError(msg) => {
        tracing::error!("User service error: {}", msg);
        AppError::internal_server_error("Internal server error occurred")
      }
    }
  }
}

impl From<crate::domains::auth::service::AuthServiceError> for AppError {
  fn from(error: crate::domains::auth::service::AuthServiceError) -> Self {
    use crate::domains::auth::service::AuthServiceError;
    match error {
      AuthServiceError::ValidationError(msg) => AppError::bad_request(msg),
      AuthServiceError::InvalidOtp(msg) => AppError::bad_request(msg),
      AuthServiceError::OtpExpired(msg) => AppError::new(StatusCode::GONE, msg),
      AuthServiceError::InvalidToken(msg) => AppError::bad_request(msg),
      AuthServiceError::UserNotFound(msg) => AppError::not_found(msg),
      AuthServiceError::Conflict(msg) => AppError::conflict(msg),
      AuthServiceError::InternalServerError(msg) => {
        tracing::error!("Auth service error: {}", msg);
        AppError::internal_server_error("Internal server error occurred")
      }
    }
  }
}
