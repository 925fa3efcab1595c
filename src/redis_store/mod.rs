//! Redis-backed [`KeyValueStore`](crate::KeyValueStore).
//!
//! Lets every process that points at the same Redis instance (and prefix) share
//! bucket state for a key.
//!
//! # Requirements
//!
//! - **Runtime:** Tokio or Smol (via `redis-tokio` or `redis-smol` features)
//!
//! # Data model
//!
//! One string value per limited key, stored at `<prefix>:<key>:token_bucket`.
//! The value is the JSON form of [`BucketState`](crate::BucketState).

mod common;
pub use common::*;

mod redis_kv_store;
pub use redis_kv_store::*;
