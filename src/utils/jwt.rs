use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
  pub sub: String,
  pub email: String,
  pub iat: usize,
  pub exp: usize,
}

/// HS256 bearer tokens signed with the configured secret.
#[derive(Clone)]
pub struct TokenService {
  secret: String,
  expiry_secs: i64,
}

impl TokenService {
  pub fn new(secret: impl Into<String>, expiry_secs: i64) -> Self {
    Self {
      secret: secret.into(),
      expiry_secs,
    }
  }

  pub fn issue(&self, user_id: &str, email: &str) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let claims = Claims {
      sub: user_id.to_string(),
      email: email.to_string(),
      iat: now.timestamp() as usize,
      exp: (now + Duration::seconds(self.expiry_secs)).timestamp() as usize,
    };

    encode(&Header::default(), &claims, &EncodingKey::from_secret(self.secret.as_bytes()))
  }

  pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
      token,
      &DecodingKey::from_secret(self.secret.as_bytes()),
      &Validation::default(),
    )?;

    Ok(token_data.claims)
  }
}
