use sqlx::{postgres::PgPoolOptions, PgPool};

pub async fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
  let pool = PgPoolOptions::new()
    .min_connections(3)
    .max_connections(10)
    .connect(database_url)
    .await?;

  tracing::info!("Database pool created");

  Ok(pool)
}
