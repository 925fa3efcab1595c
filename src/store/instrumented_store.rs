use async_trait::async_trait;
use dashmap::DashMap;

use crate::{KeyValueStore, MemoryStore, StoreError};

/// Test double wrapping another [`KeyValueStore`].
///
/// Injects failures per key and counts every `get` and `set` it sees, so the
/// limiter's failure paths can be exercised without a mocking framework.
///
/// Counters keep one entry per key ever touched and are never pruned. Use it in
/// tests, not as a production store.
///
/// # Examples
///
/// ```
/// use rate_bastion::{InstrumentedStore, KeyValueStore, MemoryStore, StoreError};
///
/// # block_on(async {
/// let store = InstrumentedStore::new(MemoryStore::new());
/// store.fail_writes_for("user_1", "connection reset");
///
/// assert!(matches!(store.get("user_1").await, Err(StoreError::NotFound)));
/// assert!(matches!(store.set("user_1", "{}").await, Err(StoreError::Backend(_))));
/// assert_eq!(store.write_count("user_1"), 1);
/// # });
/// # fn block_on<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
/// # }
/// ```
#[derive(Debug)]
pub struct InstrumentedStore<S = MemoryStore> {
    inner: S,
    read_faults: DashMap<String, String>,
    write_faults: DashMap<String, String>,
    read_counts: DashMap<String, u64>,
    write_counts: DashMap<String, u64>,
}

impl<S> InstrumentedStore<S> {
    /// Wrap `inner` with no faults and zeroed counters.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            read_faults: DashMap::new(),
            write_faults: DashMap::new(),
            read_counts: DashMap::new(),
            write_counts: DashMap::new(),
        }
    }

    /// The wrapped store, for seeding and inspection that bypasses faults and counters.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Make every subsequent `get` of `key` fail with [`StoreError::Backend`].
    pub fn fail_reads_for(&self, key: impl Into<String>, message: impl Into<String>) {
        self.read_faults.insert(key.into(), message.into());
    }

    /// Make every subsequent `set` of `key` fail with [`StoreError::Backend`].
    pub fn fail_writes_for(&self, key: impl Into<String>, message: impl Into<String>) {
        self.write_faults.insert(key.into(), message.into());
    }

    /// Remove all injected failures.
    pub fn clear_faults(&self) {
        self.read_faults.clear();
        self.write_faults.clear();
    }

    /// Number of `get` calls seen for `key`, failed ones included.
    pub fn read_count(&self, key: &str) -> u64 {
        self.read_counts.get(key).map(|count| *count).unwrap_or(0)
    }

    /// Number of `set` calls seen for `key`, failed ones included.
    pub fn write_count(&self, key: &str) -> u64 {
        self.write_counts.get(key).map(|count| *count).unwrap_or(0)
    }
}

#[async_trait]
impl<S: KeyValueStore> KeyValueStore for InstrumentedStore<S> {
    async fn get(&self, key: &str) -> Result<String, StoreError> {
        *self.read_counts.entry(key.to_string()).or_insert(0) += 1;

        if let Some(message) = self.read_faults.get(key) {
            return Err(StoreError::Backend(message.value().clone()));
        }

        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        *self.write_counts.entry(key.to_string()).or_insert(0) += 1;

        if let Some(message) = self.write_faults.get(key) {
            return Err(StoreError::Backend(message.value().clone()));
        }

        self.inner.set(key, value).await
    }
}
