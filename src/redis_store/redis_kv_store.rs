use async_trait::async_trait;
use redis::AsyncCommands;

use crate::{KeyValueStore, RedisClient, RedisKey, StoreError};

/// Configuration for [`RedisStore`].
///
/// # Examples
///
/// ```ignore
/// use rate_bastion::{RedisClient, RedisKey, RedisStoreOptions};
///
/// let client = redis::Client::open("redis://127.0.0.1:6379/")?;
///
/// let options = RedisStoreOptions {
///     client: RedisClient::from_client(client, 4).await?,
///     prefix: Some(RedisKey::try_from("myapp")?), // Keys: myapp:<key>:token_bucket
///     entry_ttl_seconds: Some(3600),
/// };
/// ```
#[derive(Clone, Debug)]
pub struct RedisStoreOptions {
    /// Pool of Redis connection managers.
    pub client: RedisClient,

    /// Optional prefix for all Redis keys.
    ///
    /// If `None`, defaults to `"rate_bastion"`.
    pub prefix: Option<RedisKey>,

    /// Expiry applied on every write, in seconds.
    ///
    /// Idle buckets disappear after this long and come back as full buckets.
    /// `None` or `Some(0)` keeps values forever.
    pub entry_ttl_seconds: Option<u64>,
}

/// [`KeyValueStore`] backed by Redis strings.
///
/// A missing key (`GET` returning nil) is reported as [`StoreError::NotFound`];
/// every other failure is [`StoreError::Redis`].
#[derive(Clone, Debug)]
pub struct RedisStore {
    client: RedisClient,
    prefix: RedisKey,
    entry_ttl_seconds: Option<u64>,
}

impl RedisStore {
    /// Create a new store.
    pub fn new(options: RedisStoreOptions) -> Self {
        Self {
            client: options.client,
            prefix: options.prefix.unwrap_or_else(RedisKey::default_prefix),
            entry_ttl_seconds: options.entry_ttl_seconds.filter(|ttl| *ttl > 0),
        }
    }

    /// Full Redis key holding the bucket of `key`.
    pub fn redis_key(&self, key: &str) -> String {
        format!("{}:{}:token_bucket", *self.prefix, key)
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> Result<String, StoreError> {
        let mut connection_manager = self.client.get();

        let value: Option<String> = connection_manager.get(self.redis_key(key)).await?;

        value.ok_or(StoreError::NotFound)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut connection_manager = self.client.get();
        let redis_key = self.redis_key(key);

        match self.entry_ttl_seconds {
            Some(ttl) => {
                let _: () = connection_manager.set_ex(redis_key, value, ttl).await?;
            }
            None => {
                let _: () = connection_manager.set(redis_key, value).await?;
            }
        }

        Ok(())
    }
}
