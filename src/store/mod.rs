//! Key-value storage used to share bucket state between limiter instances.
//!
//! The limiter only needs two operations, `get` and `set`, both keyed and valued
//! by strings. "Nothing stored" must be reported as [`StoreError::NotFound`] so the
//! limiter can tell a new key apart from a failing backend.
//!
//! # Implementations
//!
//! - [`MemoryStore`]: in-process map, for single-process use
//! - [`InstrumentedStore`]: wrapper injecting failures and counting calls, for tests
//! - `RedisStore`: shared Redis backend (features `redis-tokio` / `redis-smol`)

use std::sync::Arc;

use async_trait::async_trait;

use crate::StoreError;

mod memory_store;
pub use memory_store::*;

mod instrumented_store;
pub use instrumented_store::*;

/// Minimal string key-value capability consumed by the limiter.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Fetch the value stored under `key`.
    ///
    /// Returns [`StoreError::NotFound`] if there is none.
    async fn get(&self, key: &str) -> Result<String, StoreError>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

#[async_trait]
impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    async fn get(&self, key: &str) -> Result<String, StoreError> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value).await
    }
}
