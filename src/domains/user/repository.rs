use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::model::{User, UserCreate, UserFilter, UserUpdate};
use crate::db::query::{FilterQuery, SortDirection};
use crate::utils::{
  filter::{apply_range, apply_search, non_empty},
  id::generate_id,
  pagination::compute_window,
};

const USERS_TABLE: &str = "users AS u";
const USER_COLUMNS: &str =
  "u.id, u.full_name, u.first_name, u.last_name, u.username, u.email, u.email_verified, u.image, u.created_at, u.updated_at";
const RETURNING_COLUMNS: &str =
  " RETURNING id, full_name, first_name, last_name, username, email, email_verified, image, created_at, updated_at";

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
  async fn create(&self, data: &UserCreate) -> Result<User, sqlx::Error>;
  async fn get(&self, filter: &UserFilter) -> Result<Option<User>, sqlx::Error>;
  async fn list(&self, filter: &UserFilter) -> Result<Vec<User>, sqlx::Error>;
  async fn count(&self, filter: &UserFilter) -> Result<i64, sqlx::Error>;
  async fn update(&self, id: &str, data: &UserUpdate) -> Result<Option<User>, sqlx::Error>;
  async fn remove(&self, id: &str) -> Result<u64, sqlx::Error>;
}

#[derive(Clone)]
pub struct SqlxUserRepository {
  pub pool: PgPool,
}

impl SqlxUserRepository {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

/// Adds the `UserFilter` predicates to `query`, qualifying columns with `alias`.
pub fn apply_user_filters(query: &mut FilterQuery<'_>, filter: &UserFilter, alias: &str) {
  let column = |name: &str| format!("{}.{}", alias, name);

  if let Some(id) = non_empty(filter.id.as_deref()) {
    query.where_eq(&column("id"), id.to_string());
  }

  for (name, value) in [
    ("first_name", &filter.first_name),
    ("last_name", &filter.last_name),
    ("full_name", &filter.full_name),
    ("email", &filter.email),
  ] {
    if let Some(value) = non_empty(value.as_deref()) {
      query.where_lower_eq(&column(name), value);
    }
  }

  if let Some(verified) = filter.email_verified {
    query.where_eq(&column("email_verified"), verified);
  }

  let searchable: Vec<String> = ["first_name", "last_name", "email", "full_name"]
    .into_iter()
    .map(column)
    .collect();
  let searchable: Vec<&str> = searchable.iter().map(String::as_str).collect();
  apply_search(query, filter.search.as_deref(), &searchable);

  apply_range(query, &filter.range(), alias);
}

#[async_trait]
impl UserRepository for SqlxUserRepository {
  async fn create(&self, data: &UserCreate) -> Result<User, sqlx::Error> {
    let sql = format!(
      "INSERT INTO users (id, full_name, first_name, last_name, username, email, image, email_verified) \
       VALUES ($1, $2, $3, $4, $5, $6, $7, $8){}",
      RETURNING_COLUMNS
    );

    sqlx::query_as::<_, User>(&sql)
      .bind(generate_id())
      .bind(&data.full_name)
      .bind(&data.first_name)
      .bind(&data.last_name)
      .bind(&data.username)
      .bind(&data.email)
      .bind(&data.image)
      .bind(data.email_verified.unwrap_or(false))
      .fetch_one(&self.pool)
      .await
  }

  async fn get(&self, filter: &UserFilter) -> Result<Option<User>, sqlx::Error> {
    let mut query = FilterQuery::select(USER_COLUMNS, USERS_TABLE);
    apply_user_filters(&mut query, filter, "u");
    query.limit(1);
    query.fetch_optional(&self.pool).await
  }

  async fn list(&self, filter: &UserFilter) -> Result<Vec<User>, sqlx::Error> {
    let window = compute_window(&filter.pagination());

    let mut query = FilterQuery::select(USER_COLUMNS, USERS_TABLE);
    apply_user_filters(&mut query, filter, "u");
    query
      .order_by("u.created_at", SortDirection::Desc)
      .order_by("u.id", SortDirection::Asc)
      .limit(window.limit())
      .offset(window.offset());

    query.fetch_all(&self.pool).await
  }

  async fn count(&self, filter: &UserFilter) -> Result<i64, sqlx::Error> {
    let mut query = FilterQuery::count(USERS_TABLE);
    apply_user_filters(&mut query, filter, "u");
    query.fetch_count(&self.pool).await
  }

  async fn update(&self, id: &str, data: &UserUpdate) -> Result<Option<User>, sqlx::Error> {
    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE users SET updated_at = NOW()");

    for (column, value) in [
      ("full_name", &data.full_name),
      ("first_name", &data.first_name),
      ("last_name", &data.last_name),
      ("username", &data.username),
      ("email", &data.email),
      ("image", &data.image),
    ] {
      if let Some(value) = value {
        builder.push(", ").push(column).push(" = ").push_bind(value.clone());
      }
    }

    if let Some(verified) = data.email_verified {
      builder.push(", email_verified = ").push_bind(verified);
    }

    builder
      .push(" WHERE id = ")
      .push_bind(id.to_string())
      .push(RETURNING_COLUMNS);

    builder.build_query_as::<User>().fetch_optional(&self.pool).await
  }

  async fn remove(&self, id: &str) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
      .bind(id)
      .execute(&self.pool)
      .await?;

    Ok(result.rows_affected())
  }
}
