use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;

use crate::{
    BucketState, Capacity, KeyValueStore, RateBastionError, RateLimitDecision,
    RefillIntervalSeconds, StoreError,
};

/// Configuration for [`TokenBucketRateLimiter`].
///
/// Both values are fixed for the lifetime of the limiter and apply to every key.
///
/// # Examples
///
/// ```
/// use rate_bastion::{Capacity, RefillIntervalSeconds, TokenBucketOptions};
///
/// // 10 requests per key, restored every 60 seconds.
/// let options = TokenBucketOptions {
///     capacity: Capacity::try_from(10).unwrap(),
///     refill_interval_seconds: RefillIntervalSeconds::try_from(60).unwrap(),
/// };
/// ```
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct TokenBucketOptions {
    /// Maximum tokens per bucket. See [`Capacity`].
    pub capacity: Capacity,
    /// Time after which a bucket is restored to full capacity. See [`RefillIntervalSeconds`].
    pub refill_interval_seconds: RefillIntervalSeconds,
}

/// Token bucket admission control with state kept in a shared [`KeyValueStore`].
///
/// # Algorithm
///
/// For every check on `key`:
///
/// 1. **Read:** fetch the stored [`BucketState`]; a missing key is a full bucket
/// 2. **Refill:** if at least one refill interval has passed since the last refill,
///    the bucket jumps back to full capacity (step refill, no partial accrual)
/// 3. **Decision:** allow and take one token if any is left, reject otherwise
/// 4. **Write:** persist the resulting state, whatever the decision
///
/// # Fail-closed
///
/// Any error means "deny":
/// - a store read failure (other than not-found) is returned and nothing is written
/// - a stored value that does not decode is returned as an error, never reset
/// - a store write failure is returned even if a token was available, since the
///   consumption could not be recorded
///
/// # Semantics & Limitations
///
/// **Not atomic per key:**
/// - Read, compute and write are separate store calls
/// - Concurrent checks on the same key can read the same state and both be allowed
/// - Callers that need strict per-key accounting must serialize access externally
///   (e.g. a store with conditional writes)
///
/// **Write on every check:**
/// - Rejected checks still write the bucket back
/// - Under heavy rejection load this amplifies store writes
///
/// **Lazy refill:**
/// - There is no background task; refill is computed only when a key is checked
/// - Expiry of idle keys is left to the store
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use rate_bastion::{
///     Capacity, MemoryStore, RefillIntervalSeconds, TokenBucketOptions, TokenBucketRateLimiter,
/// };
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let limiter = TokenBucketRateLimiter::new(
///     Arc::new(MemoryStore::new()),
///     TokenBucketOptions {
///         capacity: Capacity::try_from(1).unwrap(),
///         refill_interval_seconds: RefillIntervalSeconds::try_from(2).unwrap(),
///     },
/// );
///
/// assert!(limiter.is_request_allowed("user_123").await.unwrap());
/// assert!(!limiter.is_request_allowed("user_123").await.unwrap());
/// # });
/// ```
pub struct TokenBucketRateLimiter<S: KeyValueStore + ?Sized> {
    store: Arc<S>,
    capacity: Capacity,
    refill_interval_seconds: RefillIntervalSeconds,
}

impl<S: KeyValueStore + ?Sized> TokenBucketRateLimiter<S> {
    /// Create a limiter over `store`.
    pub fn new(store: Arc<S>, options: TokenBucketOptions) -> Self {
        Self {
            store,
            capacity: options.capacity,
            refill_interval_seconds: options.refill_interval_seconds,
        }
    } // end constructor

    /// Configured bucket capacity.
    pub fn capacity(&self) -> Capacity {
        self.capacity
    }

    /// Configured refill interval.
    pub fn refill_interval_seconds(&self) -> RefillIntervalSeconds {
        self.refill_interval_seconds
    }

    /// Check admission for `key`, consuming a token if one is available.
    ///
    /// Returns `Ok(true)` if the request is allowed, `Ok(false)` if the bucket is
    /// empty. Any `Err` must be treated as a denial.
    pub async fn is_request_allowed(&self, key: &str) -> Result<bool, RateBastionError> {
        self.decide(key).await.map(|decision| decision.is_allowed())
    }

    /// Check admission for `key` and report remaining tokens or backoff hints.
    ///
    /// Performs the same read, refill, consume and write sequence as
    /// [`is_request_allowed`](Self::is_request_allowed).
    pub async fn decide(&self, key: &str) -> Result<RateLimitDecision, RateBastionError> {
        let now = Utc::now();
        let mut state = match self.read_state(key).await? {
            Some(state) => state,
            None => BucketState::fresh(self.capacity, now),
        };

        let decision = state.admit(self.capacity, self.refill_interval_seconds, now);

        if let Err(err) = self.write_state(key, &state).await {
            tracing::warn!(key, error = ?err, "token_bucket.write.error, denying request");
            return Err(err);
        }

        tracing::debug!(
            key,
            allowed = decision.is_allowed(),
            tokens_in_bucket = state.tokens_in_bucket,
            "token_bucket.decision"
        );

        Ok(decision)
    } // end method decide

    /// Tokens currently available for `key`, without consuming or writing anything.
    pub async fn available_tokens(&self, key: &str) -> Result<u64, RateBastionError> {
        let now = Utc::now();

        let Some(mut state) = self.read_state(key).await? else {
            return Ok(*self.capacity);
        };

        state.refill(self.capacity, self.refill_interval_seconds, now);

        Ok(state.tokens_in_bucket)
    }

    /// Read and decode the bucket for `key`. `Ok(None)` means nothing is stored.
    async fn read_state(&self, key: &str) -> Result<Option<BucketState>, RateBastionError> {
        let raw = match self.store.get(key).await {
            Ok(raw) => raw,
            Err(StoreError::NotFound) => return Ok(None),
            Err(err) => {
                tracing::warn!(key, error = ?err, "token_bucket.read.error, denying request");
                return Err(RateBastionError::StoreRead(err));
            }
        };

        match BucketState::decode(&raw) {
            Ok(state) => Ok(Some(state)),
            Err(err) => {
                tracing::warn!(key, error = ?err, "token_bucket.decode.error, denying request");
                Err(err)
            }
        }
    }

    async fn write_state(&self, key: &str, state: &BucketState) -> Result<(), RateBastionError> {
        let raw = state.encode()?;

        self.store
            .set(key, &raw)
            .await
            .map_err(RateBastionError::StoreWrite)
    }
}
