use std::fmt::Display;

use redis::{AsyncCommands, Client};

/// Keys for cached external-API responses.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// Generated movie description, keyed by title and release date.
    Description(String, String),
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::Description(title, release_date) => {
                write!(f, "desc:{}:{}", title.to_lowercase(), release_date)
            }
        }
    }
}

/// Creates a Redis client for caching
pub fn create_redis_client(redis_url: &str) -> anyhow::Result<Client> {
    let client = Client::open(redis_url)?;
    Ok(client)
}

/// Best-effort cache over Redis.
///
/// The cache is an optimization layer in front of the text-generation API:
/// every failure (connection, command, serialization) is logged and treated
/// as a miss so a Redis outage never fails a request.
#[derive(Clone)]
pub struct Cache {
    redis_client: Client,
}

impl Cache {
    pub fn new(redis_client: Client) -> Self {
        Self { redis_client }
    }

    /// Retrieves a cached value, or `None` on miss or any Redis failure.
    pub async fn get<T: serde::de::DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
        let mut conn = match self.redis_client.get_multiplexed_async_connection().await {
            Ok(conn) => conn,
            Err(error) => {
                tracing::warn!(error = %error, "Redis connection failed");
                return None;
            }
        };

        let cached: Option<String> = match conn.get(key.to_string()).await {
            Ok(value) => value,
            Err(error) => {
                tracing::warn!(error = %error, "Redis get failed");
                return None;
            }
        };

        let json = cached?;
        match serde_json::from_str(&json) {
            Ok(value) => Some(value),
            Err(error) => {
                tracing::warn!(error = %error, key = %key, "Cache deserialization failed");
                None
            }
        }
    }

    /// Stores a value with a TTL. Failures are logged and dropped.
    pub async fn put<T: serde::Serialize>(&self, key: &CacheKey, value: &T, ttl: u64) {
        let json = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(error) => {
                tracing::warn!(error = %error, "Cache serialization failed");
                return;
            }
        };

        let mut conn = match self.redis_client.get_multiplexed_async_connection().await {
            Ok(conn) => conn,
            Err(error) => {
                tracing::warn!(error = %error, "Redis connection failed");
                return;
            }
        };

        if let Err(error) = conn.set_ex::<_, _, ()>(key.to_string(), json, ttl).await {
            tracing::warn!(error = %error, "Redis set failed");
        } else {
            tracing::debug!(key = %key, ttl = ttl, "Cached value");
        }
    }
}
