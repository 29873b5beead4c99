use crate::domains::user::model::UserCreate;
use crate::utils::id::generate_id;

/// First and second whitespace-separated words of `name`. Further words are dropped.
pub fn split_name(name: &str) -> (Option<String>, Option<String>) {
  let mut parts = name.split_whitespace().map(String::from);
  (parts.next(), parts.next())
}

/// Runs before a user is inserted by a sign-in flow.
pub fn before_user_create(name: Option<&str>, email: &str) -> UserCreate {
  let local_part = email.split('@').next().unwrap_or_default();
  let full_name = name
    .map(str::trim)
    .filter(|n| !n.is_empty())
    .unwrap_or(local_part)
    .to_string();
  let (first_name, last_name) = split_name(&full_name);

  UserCreate {
    username: derive_username(local_part),
    full_name,
    first_name,
    last_name,
    email: email.to_string(),
    image: None,
    email_verified: Some(true),
  }
}

fn derive_username(local_part: &str) -> String {
  let base: String = local_part
    .chars()
    .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '.')
    .collect::<String>()
    .to_lowercase();
  let base = if base.is_empty() { "user".to_string() } else { base };
  let suffix: String = generate_id().chars().take(5).collect();

  format!("{}_{}", base, suffix)
}
