/// Generates `From<sqlx::Error>` for a service error enum.
///
/// Usage:
/// ```ignore
/// impl_service_error_conversions!(AuthServiceError, InternalServerError);
/// impl_service_error_conversions!(UserServiceError, InternalServerError, Conflict);
/// ```
///
/// The three-argument form maps unique-constraint violations to the conflict variant.
#[macro_export]
macro_rules! impl_service_error_conversions {
  ($error_type:ty, $internal_variant:ident) => {
    impl From<sqlx::Error> for $error_type {
      fn from(err: sqlx::Error) -> Self {
        <$error_type>::$internal_variant(format!("Database error: {}", err))
      }
    }
  };

  ($error_type:ty, $internal_variant:ident, $conflict_variant:ident) => {
    impl From<sqlx::Error> for $error_type {
      fn from(err: sqlx::Error) -> Self {
        match err.as_database_error() {
          Some(db_err) if db_err.is_unique_violation() => {
            <$error_type>::$conflict_variant(db_err.constraint().map_or_else(
              || "Resource already exists".to_string(),
              |constraint| format!("Duplicate value violates {}", constraint),
            ))
          }
          _ => <$error_type>::$internal_variant(format!("Database error: {}", err)),
        }
      }
    }
  };
}
