use axum::{
  extract::{Json, Path, Query, State},
  http::{HeaderMap, StatusCode},
  response::Json as JsonResponse,
  routing::get,
  Router,
};

use super::model::{User, UserCreate, UserFilter, UserProfileUpdate};
use crate::{
  middleware::auth::auth_middleware,
  state::{AppState, SharedAppState},
  utils::pagination::PaginationResponse,
  AppError,
};

pub fn user_routes() -> Router<SharedAppState> {
  Router::new()
    .route("/users", get(list_users_handler).post(create_user_handler))
    .route(
      "/users/{user_id}",
      get(get_user_handler).patch(update_user_handler).delete(delete_user_handler),
    )
}

pub async fn list_users_handler(
  State(state): State<SharedAppState>,
  headers: HeaderMap,
  Query(filter): Query<UserFilter>,
) -> Result<JsonResponse<PaginationResponse<User>>, AppError> {
  auth_middleware(&headers, state.tokens())?;

  state.list_users(filter).await.map(JsonResponse).map_err(Into::into)
}

pub async fn create_user_handler(
  State(state): State<SharedAppState>,
  headers: HeaderMap,
  Json(payload): Json<UserCreate>,
) -> Result<(StatusCode, JsonResponse<User>), AppError> {
  auth_middleware(&headers, state.tokens())?;

  // Accounts created here still have to verify their address.
  let payload = UserCreate {
    email_verified: None,
    ..payload
  };
  let user = state.create_user(payload).await?;
  Ok((StatusCode::CREATED, JsonResponse(user)))
}

pub async fn get_user_handler(
  State(state): State<SharedAppState>,
  headers: HeaderMap,
  Path(user_id): Path<String>,
) -> Result<JsonResponse<User>, AppError> {
  auth_middleware(&headers, state.tokens())?;

  state.get_user(&user_id).await.map(JsonResponse).map_err(Into::into)
}

pub async fn update_user_handler(
  State(state): State<SharedAppState>,
  headers: HeaderMap,
  Path(user_id): Path<String>,
  Json(payload): Json<UserProfileUpdate>,
) -> Result<JsonResponse<User>, AppError> {
  auth_middleware(&headers, state.tokens())?;

  state
    .update_user(&user_id, payload.into())
    .await
    .map(JsonResponse)
    .map_err(Into::into)
}

pub async fn delete_user_handler(
  State(state): State<SharedAppState>,
  headers: HeaderMap,
  Path(user_id): Path<String>,
) -> Result<StatusCode, AppError> {
  auth_middleware(&headers, state.tokens())?;

  state.remove_user(&user_id).await?;
  Ok(StatusCode::NO_CONTENT)
}
