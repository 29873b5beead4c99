use std::sync::Arc;

use anyhow::Context;
use dotenvy::dotenv;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use remindme_api::app::create_app;
use remindme_api::config::Config;
use remindme_api::db::pool::create_pool;
use remindme_api::domains::auth::storage::{MemoryStorage, RedisStorage, SecondaryStorage};
use remindme_api::email::{EmailService, EmailServiceStore};
use remindme_api::state::SharedAppState;
use remindme_api::utils::jwt::TokenService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  dotenv().ok();

  let config = Config::from_env()?;
  init_tracing(config.environment.is_production());

  let pool = create_pool(&config.database_url)
    .await
    .context("Failed to create database pool")?;

  sqlx::migrate!("./migrations").run(&pool).await?;

  info!("Database migrations applied successfully");

  let storage = init_storage(&config).await?;
  let email_service = EmailService::new(EmailServiceStore::from_config(&config)?);
  let tokens = TokenService::new(&config.jwt_secret, config.jwt_expiry_secs);

  let app_state = SharedAppState::new(pool, email_service, storage, tokens, &config.client_url);
  let app = create_app(app_state, &config.trusted_origins);

  let addr = format!("0.0.0.0:{}", config.port);
  let listener = tokio::net::TcpListener::bind(&addr)
    .await
    .with_context(|| format!("Failed to bind {}", addr))?;

  info!("Server running on http://{}", addr);

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await?;

  Ok(())
}

fn init_tracing(json: bool) {
  let filter = EnvFilter::try_from_env("LOG_LEVEL")
    .or_else(|_| EnvFilter::try_from_default_env())
    .unwrap_or_else(|_| EnvFilter::new("info"));

  let registry = tracing_subscriber::registry().with(filter);
  if json {
    registry.with(fmt::layer().json()).init();
  } else {
    registry.with(fmt::layer()).init();
  }
}

async fn init_storage(config: &Config) -> anyhow::Result<Arc<dyn SecondaryStorage>> {
  match RedisStorage::connect(&config.redis_url).await {
    Ok(redis) => Ok(Arc::new(redis)),
    Err(err) if !config.environment.is_production() => {
      warn!("Redis unavailable ({}), falling back to in-memory storage", err);
      Ok(Arc::new(MemoryStorage::new()))
    }
    Err(err) => Err(err).context("Failed to connect to redis"),
  }
}

async fn shutdown_signal() {
  let ctrl_c = async {
    if let Err(err) = signal::ctrl_c().await {
      warn!("Failed to install Ctrl+C handler: {}", err);
      std::future::pending::<()>().await;
    }
  };

  #[cfg(unix)]
  let terminate = async {
    match signal::unix::signal(signal::unix::SignalKind::terminate()) {
      Ok(mut stream) => {
        stream.recv().await;
      }
      Err(err) => {
        warn!("Failed to install signal handler: {}", err);
        std::future::pending::<()>().await;
      }
    }
  };

  #[cfg(not(unix))]
  let terminate = std::future::pending::<()>();

  tokio::select! {
      _ = ctrl_c => {},
      _ = terminate => {},
  }

  info!("Received termination signal, shutting down gracefully...");
}
