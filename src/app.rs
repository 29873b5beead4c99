use axum::{
  http::{header, HeaderValue, Method},
  response::Json,
  routing::get,
  Router,
};
use serde_json::{json, Value};
use tower_http::{
  cors::{AllowOrigin, CorsLayer},
  trace::TraceLayer,
};
use tracing::warn;

use crate::{
  domains::{auth::rest::auth_routes, user::rest::user_routes},
  state::SharedAppState,
};

pub fn create_app(state: SharedAppState, trusted_origins: &[String]) -> Router {
  Router::new()
    .route("/", get(welcome_handler))
    .nest("/api/v1", user_routes())
    .nest("/api/auth", auth_routes())
    .layer(cors_layer(trusted_origins))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

/// Credentialed CORS for the configured origins. An empty list allows none.
fn cors_layer(trusted_origins: &[String]) -> CorsLayer {
  let origins: Vec<HeaderValue> = trusted_origins
    .iter()
    .filter_map(|origin| match origin.parse() {
      Ok(value) => Some(value),
      Err(_) => {
        warn!("Ignoring malformed trusted origin: {}", origin);
        None
      }
    })
    .collect();

  CorsLayer::new()
    .allow_origin(AllowOrigin::list(origins))
    .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE, Method::OPTIONS])
    .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
    .allow_credentials(true)
}

pub async fn welcome_handler() -> Json<Value> {
  Json(json!({ "message": "Welcome to RemindMe" }))
}
