use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Capacity, RateBastionError, RateLimitDecision, RefillIntervalSeconds};

/// Per-key token bucket, as persisted in the key-value store.
///
/// The stored form is a JSON object with exactly two fields:
///
/// ```json
/// {"TokensInBucket":4,"LastRefillTime":"2024-05-01T12:00:00.123456789Z"}
/// ```
///
/// `LastRefillTime` is RFC 3339. Any offset is accepted on decode and normalized to UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BucketState {
    /// Requests that can still be admitted before the next refill.
    pub tokens_in_bucket: u64,
    /// Wall-clock time of the last refill (or of bucket creation).
    pub last_refill_time: DateTime<Utc>,
}

impl BucketState {
    /// A full bucket that was never refilled. Used when the store has no state for a key.
    pub fn fresh(capacity: Capacity, now: DateTime<Utc>) -> Self {
        Self {
            tokens_in_bucket: *capacity,
            last_refill_time: now,
        }
    }

    /// Decode a stored value.
    pub fn decode(value: &str) -> Result<Self, RateBastionError> {
        serde_json::from_str(value).map_err(RateBastionError::Deserialization)
    }

    /// Encode for storage.
    pub fn encode(&self) -> Result<String, RateBastionError> {
        serde_json::to_string(self).map_err(RateBastionError::Serialization)
    }

    /// Whether at least one full interval has passed since the last refill.
    ///
    /// A `last_refill_time` in the future (clock skew between instances) is never due.
    pub fn is_refill_due(&self, interval: RefillIntervalSeconds, now: DateTime<Utc>) -> bool {
        let elapsed_ms = now
            .signed_duration_since(self.last_refill_time)
            .num_milliseconds();

        u64::try_from(elapsed_ms).is_ok_and(|elapsed_ms| elapsed_ms >= interval.as_millis())
    }

    /// Apply the step refill policy and clamp the token count to `capacity`.
    ///
    /// Returns `true` if the bucket was refilled.
    pub fn refill(
        &mut self,
        capacity: Capacity,
        interval: RefillIntervalSeconds,
        now: DateTime<Utc>,
    ) -> bool {
        // state written under a larger capacity must not exceed ours
        self.tokens_in_bucket = self.tokens_in_bucket.min(*capacity);

        if !self.is_refill_due(interval, now) {
            return false;
        }

        self.tokens_in_bucket = *capacity;
        self.last_refill_time = now;
        true
    }

    /// Take one token if any is left.
    pub fn try_consume(&mut self) -> bool {
        match self.tokens_in_bucket.checked_sub(1) {
            Some(remaining) => {
                self.tokens_in_bucket = remaining;
                true
            }
            None => false,
        }
    }

    /// Milliseconds until the bucket is due for a refill; `0` if it already is.
    ///
    /// Counted from `last_refill_time`, so a refill time in the future (clock skew
    /// between writers) yields a wait longer than `interval`: the skew plus one
    /// full interval.
    pub fn retry_after_ms(&self, interval: RefillIntervalSeconds, now: DateTime<Utc>) -> u64 {
        let elapsed_ms = now
            .signed_duration_since(self.last_refill_time)
            .num_milliseconds();
        let interval_ms = i64::try_from(interval.as_millis()).unwrap_or(i64::MAX);

        u64::try_from(interval_ms.saturating_sub(elapsed_ms)).unwrap_or(0)
    }

    /// Refill if due, then try to consume one token.
    ///
    /// This is the whole state transition of a single admission check; the caller
    /// persists `self` afterwards whatever the decision.
    pub fn admit(
        &mut self,
        capacity: Capacity,
        interval: RefillIntervalSeconds,
        now: DateTime<Utc>,
    ) -> RateLimitDecision {
        self.refill(capacity, interval, now);

        if self.try_consume() {
            RateLimitDecision::Allowed {
                remaining: self.tokens_in_bucket,
            }
        } else {
            RateLimitDecision::Rejected {
                refill_interval_seconds: *interval,
                retry_after_ms: self.retry_after_ms(interval, now),
                remaining_after_waiting: *capacity,
            }
        }
    }
}
