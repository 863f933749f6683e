//! Namespaced atomic counters with expiry
//!
//! The only shared mutable progress state of a run lives here. Application code
//! never read-modify-writes a counter; it increments, or writes once with
//! `only_if_absent`.

mod lock;
mod memory;
mod redis;

pub use lock::{NamedLock, claim_window};
pub use memory::MemoryCounterStore;
pub use self::redis::RedisCounterStore;

use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Atomic integer counter store
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Add `delta` and refresh the expiry, returning the new value.
    /// A missing or expired key counts from zero.
    async fn increment(&self, key: &str, delta: i64, ttl: Duration) -> Result<i64>;

    /// Set `key` to `value`. With `only_if_absent` the write happens only
    /// when no live value exists; the return value says whether it happened.
    async fn write(&self, key: &str, value: i64, ttl: Duration, only_if_absent: bool)
    -> Result<bool>;

    async fn read(&self, key: &str) -> Result<Option<i64>>;

    async fn delete(&self, key: &str) -> Result<()>;

    /// Delete `key` only while it still holds `value`; true if it was deleted
    async fn delete_if_equal(&self, key: &str, value: i64) -> Result<bool>;
}
