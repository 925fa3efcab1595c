/// Error type for this crate.
///
/// Every error returned from a limiter operation means the request must be
/// treated as denied.
#[derive(Debug, thiserror::Error)]
pub enum RateBastionError {
    /// Reading the bucket state failed for a reason other than "not found".
    #[error("store read error: {0}")]
    StoreRead(#[source] StoreError),

    /// The stored bucket state could not be decoded.
    #[error("bucket state deserialization error: {0}")]
    Deserialization(#[source] serde_json::Error),

    /// The updated bucket state could not be encoded.
    #[error("bucket state serialization error: {0}")]
    Serialization(#[source] serde_json::Error),

    /// Persisting the updated bucket state failed.
    #[error("store write error: {0}")]
    StoreWrite(#[source] StoreError),

    /// Invalid bucket capacity.
    #[error("invalid capacity: {0}")]
    InvalidCapacity(String),

    /// Invalid refill interval.
    #[error("invalid refill interval: {0}")]
    InvalidRefillInterval(String),

    /// Redis error.
    #[cfg(any(feature = "redis-tokio", feature = "redis-smol"))]
    #[error("redis error: {0}")]
    RedisError(#[from] redis::RedisError),

    /// Invalid Redis key.
    #[cfg(any(feature = "redis-tokio", feature = "redis-smol"))]
    #[error("invalid redis key: {0}")]
    InvalidRedisKey(String),

    /// Invalid connection count for a [`RedisClient`](crate::RedisClient).
    #[cfg(any(feature = "redis-tokio", feature = "redis-smol"))]
    #[error("invalid redis client connection count: {0}")]
    InvalidRedisClientConnectionCount(String),
}

/// Error returned by a [`KeyValueStore`](crate::KeyValueStore).
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No value is stored under the requested key.
    #[error("key not found")]
    NotFound,

    /// Backend failure described by a message.
    #[error("store backend error: {0}")]
    Backend(String),

    /// Redis failure.
    #[cfg(any(feature = "redis-tokio", feature = "redis-smol"))]
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),
}

impl StoreError {
    /// Whether this error is the distinguished "not found" kind.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound)
    }
}
