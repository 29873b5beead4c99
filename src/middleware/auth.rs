use axum::http::{header::AUTHORIZATION, HeaderMap};

use crate::utils::error::AppError;
use crate::utils::jwt::{Claims, TokenService};

/// Extracts the token from `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
  let auth_header = headers
    .get(AUTHORIZATION)
    .ok_or_else(|| AppError::unauthorized("Authorization header missing"))?
    .to_str()
    .map_err(|_| AppError::unauthorized("Invalid authorization header"))?;

  auth_header
    .strip_prefix("Bearer ")
    .map(str::trim)
    .filter(|token| !token.is_empty())
    .ok_or_else(|| AppError::unauthorized("Invalid authorization format"))
}

pub fn auth_middleware(headers: &HeaderMap, tokens: &TokenService) -> Result<Claims, AppError> {
  let token = bearer_token(headers)?;
  tokens.verify(token).map_err(|_| AppError::unauthorized("Invalid token"))
}

#[cfg(test)]
mod tests {
  use super::*;
  use axum::http::{HeaderValue, StatusCode};

  fn headers(value: &[u8]) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, HeaderValue::from_bytes(value).unwrap());
    headers
  }

  #[test]
  fn test_missing_header() {
    let err = bearer_token(&HeaderMap::new()).unwrap_err();
    assert_eq!(err.status_code, StatusCode::UNAUTHORIZED);
    assert_eq!(err.message, "Authorization header missing");
  }

  #[test]
  fn test_wrong_scheme() {
    let err = bearer_token(&headers(b"Basic dXNlcjpwYXNz")).unwrap_err();
    assert_eq!(err.message, "Invalid authorization format");

    let err = bearer_token(&headers(b"Bearer   ")).unwrap_err();
    assert_eq!(err.message, "Invalid authorization format");
  }

  #[test]
  fn test_non_ascii_header() {
    let err = bearer_token(&headers(&[0xff, 0xfe])).unwrap_err();
    assert_eq!(err.message, "Invalid authorization header");
  }

  #[test]
  fn test_valid_and_invalid_tokens() {
    let tokens = TokenService::new("secret", 60);
    let token = tokens.issue("abc123", "a@example.com").unwrap();

    let claims = auth_middleware(&headers(format!("Bearer {}", token).as_bytes()), &tokens).unwrap();
    assert_eq!(claims.sub, "abc123");

    let err = auth_middleware(&headers(b"Bearer garbage"), &tokens).unwrap_err();
    assert_eq!(err.message, "Invalid token");
  }
}
