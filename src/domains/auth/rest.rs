use axum::{
  extract::{Json, Query, State},
  response::Json as JsonResponse,
  routing::{get, post},
  Router,
};
use validator::Validate;

use super::model::{
  AuthSession, EmailRequest, MagicLinkRequest, SendOtpRequest, StatusResponse, TokenQuery, VerifyOtpRequest,
};
use crate::{
  state::{AppState, SharedAppState},
  AppError,
};

pub fn auth_routes() -> Router<SharedAppState> {
  Router::new()
    .route("/email-otp/send-verification-otp", post(send_verification_otp_handler))
    .route("/email-otp/verify-email", post(verify_email_otp_handler))
    .route("/sign-in/email-otp", post(sign_in_email_otp_handler))
    .route("/sign-in/magic-link", post(sign_in_magic_link_handler))
    .route("/magic-link/verify", get(verify_magic_link_handler))
    .route("/send-verification-email", post(send_verification_email_handler))
    .route("/verify-email", get(verify_email_token_handler))
    .route("/forget-password", post(forget_password_handler))
    .route("/reset-password", get(reset_password_handler))
    .route("/email-otp/reset-password", post(reset_password_email_otp_handler))
}

fn validate<T: Validate>(payload: &T) -> Result<(), AppError> {
  payload
    .validate()
    .map_err(|e| AppError::bad_request(format!("Validation failed: {}", e)))
}

pub async fn send_verification_otp_handler(
  State(state): State<SharedAppState>,
  Json(payload): Json<SendOtpRequest>,
) -> Result<JsonResponse<StatusResponse>, AppError> {
  validate(&payload)?;

  state.send_verification_otp(&payload.email, payload.otp_type).await?;
  Ok(JsonResponse(StatusResponse::ok()))
}

pub async fn verify_email_otp_handler(
  State(state): State<SharedAppState>,
  Json(payload): Json<VerifyOtpRequest>,
) -> Result<JsonResponse<AuthSession>, AppError> {
  validate(&payload)?;

  state
    .verify_email_otp(&payload.email, &payload.otp)
    .await
    .map(JsonResponse)
    .map_err(Into::into)
}

pub async fn sign_in_email_otp_handler(
  State(state): State<SharedAppState>,
  Json(payload): Json<VerifyOtpRequest>,
) -> Result<JsonResponse<AuthSession>, AppError> {
  validate(&payload)?;

  state
    .sign_in_email_otp(&payload.email, &payload.otp)
    .await
    .map(JsonResponse)
    .map_err(Into::into)
}

pub async fn sign_in_magic_link_handler(
  State(state): State<SharedAppState>,
  Json(payload): Json<MagicLinkRequest>,
) -> Result<JsonResponse<StatusResponse>, AppError> {
  state.sign_in_magic_link(payload).await?;
  Ok(JsonResponse(StatusResponse::ok()))
}

pub async fn verify_magic_link_handler(
  State(state): State<SharedAppState>,
  Query(query): Query<TokenQuery>,
) -> Result<JsonResponse<AuthSession>, AppError> {
  state
    .verify_magic_link(&query.token)
    .await
    .map(JsonResponse)
    .map_err(Into::into)
}

pub async fn send_verification_email_handler(
  State(state): State<SharedAppState>,
  Json(payload): Json<EmailRequest>,
) -> Result<JsonResponse<StatusResponse>, AppError> {
  validate(&payload)?;

  state.send_verification_email(&payload.email).await?;
  Ok(JsonResponse(StatusResponse::ok()))
}

pub async fn verify_email_token_handler(
  State(state): State<SharedAppState>,
  Query(query): Query<TokenQuery>,
) -> Result<JsonResponse<AuthSession>, AppError> {
  state
    .verify_email_token(&query.token)
    .await
    .map(JsonResponse)
    .map_err(Into::into)
}

pub async fn forget_password_handler(
  State(state): State<SharedAppState>,
  Json(payload): Json<EmailRequest>,
) -> Result<JsonResponse<StatusResponse>, AppError> {
  validate(&payload)?;

  state.forget_password(&payload.email).await?;
  Ok(JsonResponse(StatusResponse::ok()))
}

pub async fn reset_password_handler(
  State(state): State<SharedAppState>,
  Query(query): Query<TokenQuery>,
) -> Result<JsonResponse<AuthSession>, AppError> {
  state
    .reset_password(&query.token)
    .await
    .map(JsonResponse)
    .map_err(Into::into)
}

pub async fn reset_password_email_otp_handler(
  State(state): State<SharedAppState>,
  Json(payload): Json<VerifyOtpRequest>,
) -> Result<JsonResponse<AuthSession>, AppError> {
  validate(&payload)?;

  state
    .reset_password_email_otp(&payload.email, &payload.otp)
    .await
    .map(JsonResponse)
    .map_err(Into::into)
}
