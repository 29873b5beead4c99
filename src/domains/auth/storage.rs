use std::{
  collections::HashMap,
  error::Error,
  fmt,
  sync::{Mutex, MutexGuard},
  time::{Duration, Instant},
};

use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands, Client};

#[derive(Debug)]
pub enum StorageError {
  Connection(String),
  Command(String),
}

impl Error for StorageError {}

impl fmt::Display for StorageError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      StorageError::Connection(msg) => write!(f, "Storage connection error: {}", msg),
      StorageError::Command(msg) => write!(f, "Storage command error: {}", msg),
    }
  }
}

impl From<redis::RedisError> for StorageError {
  fn from(err: redis::RedisError) -> Self {
    if err.is_connection_refusal() || err.is_connection_dropped() || err.is_io_error() {
      StorageError::Connection(err.to_string())
    } else {
      StorageError::Command(err.to_string())
    }
  }
}

/// Short-lived key/value store for OTPs and one-time tokens.
#[async_trait]
pub trait SecondaryStorage: Send + Sync {
  async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
  /// `ttl_secs` of `None` keeps the value until it is deleted.
  async fn set(&self, key: &str, value: &str, ttl_secs: Option<u64>) -> Result<(), StorageError>;
  async fn delete(&self, key: &str) -> Result<(), StorageError>;
  /// Reads and removes `key` in one step, so only one caller ever sees the value.
  async fn take(&self, key: &str) -> Result<Option<String>, StorageError>;
  /// Adds one to the counter at `key`, (re)starting its expiry, and returns the new count.
  async fn increment(&self, key: &str, ttl_secs: u64) -> Result<u64, StorageError>;
}

#[derive(Clone)]
pub struct RedisStorage {
  manager: ConnectionManager,
}

impl RedisStorage {
  pub async fn connect(url: &str) -> Result<Self, StorageError> {
    let client = Client::open(url)?;
    let manager = ConnectionManager::new(client).await?;
    tracing::info!("Connected to redis");

    Ok(Self { manager })
  }
}

#[async_trait]
impl SecondaryStorage for RedisStorage {
  async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
    let mut conn = self.manager.clone();
    let value: Option<String> = conn.get(key).await?;
    Ok(value)
  }

  async fn set(&self, key: &str, value: &str, ttl_secs: Option<u64>) -> Result<(), StorageError> {
    let mut conn = self.manager.clone();

    match ttl_secs {
      Some(ttl) => conn.set_ex::<_, _, ()>(key, value, ttl).await?,
      None => conn.set::<_, _, ()>(key, value).await?,
    }

    Ok(())
  }

  async fn delete(&self, key: &str) -> Result<(), StorageError> {
    let mut conn = self.manager.clone();
    conn.del::<_, ()>(key).await?;
    Ok(())
  }

  async fn take(&self, key: &str) -> Result<Option<String>, StorageError> {
    let mut conn = self.manager.clone();
    let value: Option<String> = conn.get_del(key).await?;
    Ok(value)
  }

  async fn increment(&self, key: &str, ttl_secs: u64) -> Result<u64, StorageError> {
    let mut conn = self.manager.clone();
    let (count,): (u64,) = redis::pipe()
      .atomic()
      .incr(key, 1)
      .expire(key, ttl_secs as i64)
      .ignore()
      .query_async(&mut conn)
      .await?;
    Ok(count)
  }
}

type Entries = HashMap<String, (String, Option<Instant>)>;

/// Process-local storage with the same expiry semantics as redis.
#[derive(Default)]
pub struct MemoryStorage {
  entries: Mutex<Entries>,
}

impl MemoryStorage {
  pub fn new() -> Self {
    Self::default()
  }

  fn lock(&self) -> Result<MutexGuard<'_, Entries>, StorageError> {
    self
      .entries
      .lock()
      .map_err(|_| StorageError::Command("memory storage lock poisoned".to_string()))
  }
}

#[async_trait]
impl SecondaryStorage for MemoryStorage {
  async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
    let mut entries = self.lock()?;
    evict_expired(&mut entries, key);

    Ok(entries.get(key).map(|(value, _)| value.clone()))
  }

  async fn set(&self, key: &str, value: &str, ttl_secs: Option<u64>) -> Result<(), StorageError> {
    let deadline = ttl_secs.map(|ttl| Instant::now() + Duration::from_secs(ttl));
    self.lock()?.insert(key.to_string(), (value.to_string(), deadline));
    Ok(())
  }

  async fn delete(&self, key: &str) -> Result<(), StorageError> {
    self.lock()?.remove(key);
    Ok(())
  }

  async fn take(&self, key: &str) -> Result<Option<String>, StorageError> {
    let mut entries = self.lock()?;
    evict_expired(&mut entries, key);

    Ok(entries.remove(key).map(|(value, _)| value))
  }

  async fn increment(&self, key: &str, ttl_secs: u64) -> Result<u64, StorageError> {
    let mut entries = self.lock()?;
    evict_expired(&mut entries, key);

    let count = match entries.get(key) {
      Some((value, _)) => value
        .parse::<u64>()
        .map_err(|_| StorageError::Command(format!("value at {} is not an integer", key)))?,
      None => 0,
    } + 1;

    let deadline = Instant::now() + Duration::from_secs(ttl_secs);
    entries.insert(key.to_string(), (count.to_string(), Some(deadline)));
    Ok(count)
  }
}

fn evict_expired(entries: &mut Entries, key: &str) {
  let expired = matches!(entries.get(key), Some((_, Some(deadline))) if Instant::now() >= *deadline);
  if expired {
    entries.remove(key);
  }
}
