use std::{
    fmt,
    ops::Deref,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use redis::{Client, aio::ConnectionManager};

use crate::RateBastionError;

/// A round-robin pool of [`redis::aio::ConnectionManager`]s.
pub struct RedisClient {
    connection_managers: Arc<Vec<ConnectionManager>>,
    track_index: AtomicUsize,
}

impl RedisClient {
    /// Create a new [`RedisClient`] holding a single connection manager.
    pub async fn default_from_client(client: Client) -> Result<Self, RateBastionError> {
        Self::from_client(client, 1).await
    }

    /// Create a new [`RedisClient`] holding `connection_count` connection managers.
    pub async fn from_client(
        client: Client,
        connection_count: usize,
    ) -> Result<Self, RateBastionError> {
        if connection_count == 0 {
            return Err(RateBastionError::InvalidRedisClientConnectionCount(
                "connection count must be > 0".to_string(),
            ));
        }

        let mut connection_managers = Vec::with_capacity(connection_count);

        for _ in 0..connection_count {
            connection_managers.push(client.get_connection_manager().await?);
        }

        Self::from_connection_managers(connection_managers)
    }

    /// Wrap already established connection managers.
    pub fn from_connection_managers(
        connection_managers: Vec<ConnectionManager>,
    ) -> Result<Self, RateBastionError> {
        if connection_managers.is_empty() {
            return Err(RateBastionError::InvalidRedisClientConnectionCount(
                "connection count must be > 0".to_string(),
            ));
        }

        Ok(Self {
            connection_managers: Arc::new(connection_managers),
            track_index: AtomicUsize::new(0),
        })
    }

    /// Number of pooled connection managers.
    pub fn connection_count(&self) -> usize {
        self.connection_managers.len()
    }

    /// Get a [`redis::aio::ConnectionManager`] from the pool.
    pub(crate) fn get(&self) -> ConnectionManager {
        let index = self.track_index.fetch_add(1, Ordering::Relaxed);
        self.connection_managers[index % self.connection_managers.len()].clone()
    } // end method get
} // end impl RedisClient

impl fmt::Debug for RedisClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisClient")
            .field("connection_count", &self.connection_managers.len())
            .finish_non_exhaustive()
    }
}

impl Clone for RedisClient {
    fn clone(&self) -> Self {
        Self {
            connection_managers: self.connection_managers.clone(),
            track_index: AtomicUsize::new(0),
        }
    }
}

/// A validated newtype for Redis key segments, used as the store prefix.
///
/// This is a string with the following constraints:
/// - Must not be empty
/// - Must not be longer than 255 bytes
/// - Must not contain colons
#[derive(Debug, Clone, PartialEq, PartialOrd, Hash, Eq)]
pub struct RedisKey(Arc<str>);

impl RedisKey {
    /// The default prefix, `rate_bastion`.
    pub fn default_prefix() -> Self {
        Self(Arc::from("rate_bastion"))
    }
}

impl Deref for RedisKey {
    type Target = Arc<str>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl TryFrom<String> for RedisKey {
    type Error = RateBastionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.is_empty() {
            Err(RateBastionError::InvalidRedisKey(
                "Redis key must not be empty".to_string(),
            ))
        } else if value.len() > 255 {
            Err(RateBastionError::InvalidRedisKey(
                "Redis key must not be longer than 255 characters".to_string(),
            ))
        } else if value.contains(':') {
            Err(RateBastionError::InvalidRedisKey(
                "Redis key must not contain colons".to_string(),
            ))
        } else {
            Ok(Self(Arc::from(value)))
        }
    }
}

impl TryFrom<&str> for RedisKey {
    type Error = RateBastionError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::try_from(value.to_string())
    }
}
