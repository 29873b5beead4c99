use std::{
  fmt::{Debug, Write},
  sync::{Arc, Mutex},
};

use axum::{
  body::{Body, Bytes},
  http::{HeaderMap, Request, StatusCode},
  routing::post,
  Json, Router,
};
use serde::Serialize;
use serde_json::{json, Value};
use sqlx::PgPool;
use tower::ServiceExt;
use tracing::{
  field::{Field, Visit},
  Event, Level, Subscriber,
};
use tracing_subscriber::{layer::Context, Layer};

use crate::{
  app::create_app,
  domains::auth::storage::{MemoryStorage, SecondaryStorage},
  email::{
    providers::{EmailClientService, ResendService},
    EmailService, EmailServiceStore,
  },
  state::SharedAppState,
  utils::jwt::TokenService,
};

pub const TEST_JWT_SECRET: &str = "test-secret";

pub fn test_tokens() -> TokenService {
  TokenService::new(TEST_JWT_SECRET, 3600)
}

/// `Authorization` header value accepted by the test app.
pub fn bearer() -> String {
  let token = test_tokens().issue("test-user", "tester@example.com").expect("issue token");
  format!("Bearer {}", token)
}

/// Every provider points at an address nothing listens on, so sends fail fast and are only logged.
async fn offline_email_service() -> EmailService {
  let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
  let base_url = format!("http://{}", listener.local_addr().expect("local addr"));
  drop(listener);

  let provider = || -> Arc<dyn EmailClientService> {
    Arc::new(ResendService::new(reqwest::Client::new(), "re_test").with_base_url(&base_url))
  };
  EmailService::new(EmailServiceStore::new(provider(), provider(), provider(), provider()))
}

pub async fn app_with_storage(pool: PgPool, storage: Arc<dyn SecondaryStorage>) -> Router {
  let state = SharedAppState::new(
    pool,
    offline_email_service().await,
    storage,
    test_tokens(),
    "https://client.example.com",
  );
  create_app(state, &[])
}

pub async fn app_with_pool(pool: PgPool) -> Router {
  app_with_storage(pool, Arc::new(MemoryStorage::new())).await
}

async fn send(app: Router, method: &str, uri: &str, body: Option<Vec<u8>>, auth: Option<&str>) -> (StatusCode, Bytes) {
  let mut request = Request::builder().method(method).uri(uri);
  if let Some(auth) = auth {
    request = request.header("authorization", auth);
  }
  let request = match body {
    Some(body) => request
      .header("content-type", "application/json")
      .body(Body::from(body)),
    None => request.body(Body::empty()),
  }
  .expect("build request");

  let response = app.oneshot(request).await.expect("handle request");
  let status = response.status();
  let body = axum::body::to_bytes(response.into_body(), usize::MAX)
    .await
    .expect("read response body");
  (status, body)
}

pub async fn get(app: Router, uri: &str, auth: Option<&str>) -> (StatusCode, Bytes) {
  send(app, "GET", uri, None, auth).await
}

pub async fn delete(app: Router, uri: &str, auth: Option<&str>) -> (StatusCode, Bytes) {
  send(app, "DELETE", uri, None, auth).await
}

pub async fn post_json<T: Serialize>(app: Router, uri: &str, body: &T, auth: Option<&str>) -> (StatusCode, Bytes) {
  let body = serde_json::to_vec(body).expect("serialize request body");
  send(app, "POST", uri, Some(body), auth).await
}

pub async fn patch_json<T: Serialize>(app: Router, uri: &str, body: &T, auth: Option<&str>) -> (StatusCode, Bytes) {
  let body = serde_json::to_vec(body).expect("serialize request body");
  send(app, "PATCH", uri, Some(body), auth).await
}

#[derive(Debug, Clone)]
pub struct CapturedRequest {
  pub authorization: Option<String>,
  pub api_key: Option<String>,
  pub body: Value,
}

/// A throwaway vendor API that records every POST to one path.
pub struct MockApi {
  pub base_url: String,
  captured: Arc<Mutex<Vec<CapturedRequest>>>,
}

impl MockApi {
  pub fn requests(&self) -> Vec<CapturedRequest> {
    self.captured.lock().expect("captured requests").clone()
  }
}

pub async fn spawn_mock_api(path: &str, status: StatusCode) -> MockApi {
  let captured = Arc::new(Mutex::new(Vec::new()));
  let sink = captured.clone();

  let app = Router::new().route(
    path,
    post(move |headers: HeaderMap, Json(body): Json<Value>| {
      let sink = sink.clone();
      async move {
        let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok()).map(String::from);
        sink.lock().expect("captured requests").push(CapturedRequest {
          authorization: header("authorization"),
          api_key: header("api-key"),
          body,
        });
        (status, Json(json!({"id": "mock-message"})))
      }
    }),
  );

  let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind mock api");
  let addr = listener.local_addr().expect("mock api addr");
  tokio::spawn(async move {
    axum::serve(listener, app).await.expect("serve mock api");
  });

  MockApi {
    base_url: format!("http://{}", addr),
    captured,
  }
}

/// Tracing layer that keeps every event's level and rendered fields.
#[derive(Clone, Default)]
pub struct CapturedLogs {
  events: Arc<Mutex<Vec<(Level, String)>>>,
}

impl CapturedLogs {
  pub fn contains(&self, level: Level, needle: &str) -> bool {
    self
      .events
      .lock()
      .expect("captured logs")
      .iter()
      .any(|(l, line)| *l == level && line.contains(needle))
  }
}

struct LineVisitor(String);

impl Visit for LineVisitor {
  fn record_debug(&mut self, field: &Field, value: &dyn Debug) {
    if !self.0.is_empty() {
      self.0.push(' ');
    }
    if field.name() == "message" {
      let _ = write!(self.0, "{:?}", value);
    } else {
      let _ = write!(self.0, "{}={:?}", field.name(), value);
    }
  }
}

impl<S: Subscriber> Layer<S> for CapturedLogs {
  fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
    let mut visitor = LineVisitor(String::new());
    event.record(&mut visitor);
    self
      .events
      .lock()
      .expect("captured logs")
      .push((*event.metadata().level(), visitor.0));
  }
}
