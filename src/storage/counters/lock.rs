//! Locks and throttle windows built on write-unless-exists

use super::CounterStore;
use crate::utils::error::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use uuid::Uuid;

/// A short-lived named lock.
///
/// Acquisition is a single `write(.., only_if_absent = true)` of a random
/// token; the TTL bounds how long a crashed holder can block others. Release
/// deletes the key only while it still holds this holder's token, so a holder
/// that outlived its TTL cannot drop the next holder's lock.
#[must_use = "a held lock must be released"]
pub struct NamedLock {
    store: Arc<dyn CounterStore>,
    key: String,
    token: i64,
}

impl NamedLock {
    /// Try to take the lock; `None` means someone else holds it
    pub async fn try_acquire(
        store: Arc<dyn CounterStore>,
        key: impl Into<String>,
        ttl: Duration,
    ) -> Result<Option<Self>> {
        let key = key.into();
        let token = new_token();
        if store.write(&key, token, ttl, true).await? {
            debug!("Acquired lock {}", key);
            Ok(Some(Self { store, key, token }))
        } else {
            debug!("Lock {} is held elsewhere", key);
            Ok(None)
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub async fn release(self) -> Result<()> {
        if self.store.delete_if_equal(&self.key, self.token).await? {
            debug!("Released lock {}", self.key);
        } else {
            warn!("Lock {} expired before release", self.key);
        }
        Ok(())
    }
}

/// Nonzero positive token, unique per acquisition in practice
fn new_token() -> i64 {
    let (high, _) = Uuid::new_v4().as_u64_pair();
    ((high >> 1) as i64).max(1)
}

/// Claim a throttle window. True at most once per `window` per key; the key is
/// left to expire rather than released.
pub async fn claim_window(store: &dyn CounterStore, key: &str, window: Duration) -> Result<bool> {
    store.write(key, 1, window, true).await
}
