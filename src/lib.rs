#![doc = include_str!("../README.md")]
#![deny(missing_docs)]
#![forbid(unsafe_code)]

mod token_bucket_rate_limiter;
pub use token_bucket_rate_limiter::*;

mod bucket_state;
pub use bucket_state::*;

mod store;
pub use store::*;

#[cfg(any(feature = "redis-tokio", feature = "redis-smol"))]
mod redis_store;
#[cfg(any(feature = "redis-tokio", feature = "redis-smol"))]
pub use redis_store::*;

mod error;
pub use error::*;

mod common;
pub use common::{Capacity, RateLimitDecision, RefillIntervalSeconds};

#[cfg(test)]
mod tests;
