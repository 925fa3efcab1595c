use std::ops::Deref;

use serde::Deserialize;

use crate::RateBastionError;

/// Maximum number of tokens a bucket can hold.
///
/// Every fresh or refilled bucket starts at this value. Must be at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(try_from = "u64")]
pub struct Capacity(u64);

impl Deref for Capacity {
    type Target = u64;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl TryFrom<u64> for Capacity {
    type Error = RateBastionError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        if value == 0 {
            Err(RateBastionError::InvalidCapacity(
                "Capacity must be at least 1".to_string(),
            ))
        } else {
            Ok(Self(value))
        }
    }
}

/// Time, in seconds, after which an existing bucket is restored to full capacity.
///
/// Refill is a single step: once this much time has passed since the last refill
/// the bucket jumps back to [`Capacity`]. There is no proportional accrual in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(try_from = "u64")]
pub struct RefillIntervalSeconds(u64);

impl RefillIntervalSeconds {
    /// The interval in milliseconds, saturating at `u64::MAX`.
    pub fn as_millis(&self) -> u64 {
        self.0.saturating_mul(1000)
    }
}

impl Deref for RefillIntervalSeconds {
    type Target = u64;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl TryFrom<u64> for RefillIntervalSeconds {
    type Error = RateBastionError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        if value == 0 {
            Err(RateBastionError::InvalidRefillInterval(
                "Refill interval must be at least 1 second".to_string(),
            ))
        } else {
            Ok(Self(value))
        }
    }
}

/// Outcome of an admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    /// The request is allowed and one token was consumed.
    Allowed {
        /// Tokens left in the bucket after this request.
        remaining: u64,
    },
    /// The request is rejected; the bucket is empty.
    ///
    /// Includes best-effort hints for callers that want to communicate backoff.
    Rejected {
        /// Refill interval used for the decision.
        refill_interval_seconds: u64,
        /// Milliseconds until the bucket is due for its next refill.
        ///
        /// Exceeds the interval when the stored refill time is ahead of this clock.
        retry_after_ms: u64,
        /// Tokens available once the refill happens.
        remaining_after_waiting: u64,
    },
}

impl RateLimitDecision {
    /// Whether the request was admitted.
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitDecision::Allowed { .. })
    }
}
