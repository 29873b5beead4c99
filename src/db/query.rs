use sqlx::{postgres::PgRow, Encode, FromRow, PgPool, Postgres, QueryBuilder, Type};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
  Asc,
  Desc,
}

impl SortDirection {
  fn as_sql(&self) -> &'static str {
    match self {
      SortDirection::Asc => "ASC",
      SortDirection::Desc => "DESC",
    }
  }
}

/// Thin layer over [`QueryBuilder`] that joins predicates with `WHERE` / `AND` and keeps count of them.
///
/// Column names are pushed verbatim and must come from code, never from request input. Values always go through
/// bind parameters.
pub struct FilterQuery<'args> {
  builder: QueryBuilder<'args, Postgres>,
  predicates: usize,
  ordered: bool,
}

impl<'args> FilterQuery<'args> {
  pub fn select(columns: &str, from: &str) -> Self {
    let mut builder = QueryBuilder::new("SELECT ");
    builder.push(columns).push(" FROM ").push(from);
    Self {
      builder,
      predicates: 0,
      ordered: false,
    }
  }

  pub fn count(from: &str) -> Self {
    Self::select("COUNT(*)", from)
  }

  fn push_conjunction(&mut self) {
    let keyword = if self.predicates == 0 { " WHERE " } else { " AND " };
    self.builder.push(keyword);
    self.predicates += 1;
  }

  pub fn where_eq<T>(&mut self, column: &str, value: T) -> &mut Self
  where
    T: 'args + Encode<'args, Postgres> + Type<Postgres> + Send,
  {
    self.where_cmp(column, "=", value)
  }

  pub fn where_cmp<T>(&mut self, column: &str, operator: &str, value: T) -> &mut Self
  where
    T: 'args + Encode<'args, Postgres> + Type<Postgres> + Send,
  {
    self.push_conjunction();
    self.builder.push(column).push(" ").push(operator).push(" ").push_bind(value);
    self
  }

  pub fn where_lower_eq(&mut self, column: &str, value: &str) -> &mut Self {
    self.push_conjunction();
    self
      .builder
      .push("LOWER(")
      .push(column)
      .push(") = ")
      .push_bind(value.to_lowercase());
    self
  }

  /// Adds one parenthesized predicate: `(LOWER(a) LIKE $n OR LOWER(b) LIKE $m ...)`.
  pub fn where_any_like(&mut self, columns: &[&str], term: &str) -> &mut Self {
    if columns.is_empty() {
      return self;
    }

    let pattern = format!("%{}%", term.to_lowercase());
    self.push_conjunction();
    self.builder.push("(");
    for (i, column) in columns.iter().enumerate() {
      if i > 0 {
        self.builder.push(" OR ");
      }
      self
        .builder
        .push("LOWER(")
        .push(column)
        .push(") LIKE ")
        .push_bind(pattern.clone());
    }
    self.builder.push(")");
    self
  }

  /// Repeated calls add tie-breakers in call order.
  pub fn order_by(&mut self, column: &str, direction: SortDirection) -> &mut Self {
    let keyword = if self.ordered { ", " } else { " ORDER BY " };
    self.builder.push(keyword).push(column).push(" ").push(direction.as_sql());
    self.ordered = true;
    self
  }

  pub fn limit(&mut self, limit: i64) -> &mut Self {
    self.builder.push(" LIMIT ").push_bind(limit);
    self
  }

  pub fn offset(&mut self, offset: i64) -> &mut Self {
    self.builder.push(" OFFSET ").push_bind(offset);
    self
  }

  pub fn predicate_count(&self) -> usize {
    self.predicates
  }

  pub fn sql(&self) -> &str {
    self.builder.sql()
  }

  pub async fn fetch_all<T>(mut self, pool: &PgPool) -> Result<Vec<T>, sqlx::Error>
  where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
  {
    self.builder.build_query_as::<T>().fetch_all(pool).await
  }

  pub async fn fetch_optional<T>(mut self, pool: &PgPool) -> Result<Option<T>, sqlx::Error>
  where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
  {
    self.builder.build_query_as::<T>().fetch_optional(pool).await
  }

  pub async fn fetch_count(mut self, pool: &PgPool) -> Result<i64, sqlx::Error> {
    self.builder.build_query_scalar::<i64>().fetch_one(pool).await
  }
}
