use async_trait::async_trait;
use dashmap::DashMap;

use crate::{KeyValueStore, StoreError};

/// In-process [`KeyValueStore`] backed by a [`DashMap`].
///
/// Only keys that were written hold memory; reading a missing key leaves no trace.
/// There is no expiry, so every key ever limited stays until [`remove`](Self::remove)
/// is called. State is not shared across processes.
///
/// # Examples
///
/// ```
/// use rate_bastion::{KeyValueStore, MemoryStore, StoreError};
///
/// # block_on(async {
/// let store = MemoryStore::new();
///
/// assert!(matches!(store.get("user_1").await, Err(StoreError::NotFound)));
/// store.set("user_1", "{}").await.unwrap();
/// assert_eq!(store.get("user_1").await.unwrap(), "{}");
/// # });
/// # fn block_on<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
/// # }
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: DashMap<String, String>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed `key` with `value` directly.
    pub fn insert(&self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Current value of `key`.
    pub fn value(&self, key: &str) -> Option<String> {
        self.values.get(key).map(|value| value.value().clone())
    }

    /// Drop the value of `key`, returning it if there was one.
    pub fn remove(&self, key: &str) -> Option<String> {
        self.values.remove(key).map(|(_, value)| value)
    }

    /// Number of keys holding a value.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no key holds a value.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<String, StoreError> {
        self.value(key).ok_or(StoreError::NotFound)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
