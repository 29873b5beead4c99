use rand::{distributions::Alphanumeric, Rng};

use crate::constants::OTP_LENGTH;

const ID_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
pub const ID_LENGTH: usize = 15;

/// Lowercase alphanumeric primary key.
pub fn generate_id() -> String {
  let mut rng = rand::thread_rng();
  (0..ID_LENGTH)
    .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
    .collect()
}

pub fn generate_otp() -> String {
  let mut rng = rand::thread_rng();
  (0..OTP_LENGTH).map(|_| char::from(b'0' + rng.gen_range(0..10u8))).collect()
}

pub fn generate_token(len: usize) -> String {
  rand::thread_rng()
    .sample_iter(&Alphanumeric)
    .take(len)
    .map(char::from)
    .collect()
}
