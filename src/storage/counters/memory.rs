//! In-process counter store

use super::CounterStore;
use crate::utils::error::Result;
use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy)]
struct Slot {
    value: i64,
    expires_at: Instant,
}

impl Slot {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at > now
    }
}

/// Counter store backed by a sharded map.
///
/// Every operation holds the key's shard lock for its whole duration, which
/// gives the same per-key atomicity Redis gives.
#[derive(Debug, Default)]
pub struct MemoryCounterStore {
    slots: DashMap<String, Slot>,
}

impl MemoryCounterStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CounterStore for MemoryCounterStore {
    async fn increment(&self, key: &str, delta: i64, ttl: Duration) -> Result<i64> {
        let now = Instant::now();
        let mut slot = self.slots.entry(key.to_string()).or_insert(Slot {
            value: 0,
            expires_at: now,
        });
        if !slot.is_live(now) {
            slot.value = 0;
        }
        slot.value += delta;
        slot.expires_at = now + ttl;
        Ok(slot.value)
    }

    async fn write(
        &self,
        key: &str,
        value: i64,
        ttl: Duration,
        only_if_absent: bool,
    ) -> Result<bool> {
        let now = Instant::now();
        let fresh = Slot {
            value,
            expires_at: now + ttl,
        };
        match self.slots.entry(key.to_string()) {
            Entry::Occupied(mut occupied) => {
                if only_if_absent && occupied.get().is_live(now) {
                    return Ok(false);
                }
                occupied.insert(fresh);
                Ok(true)
            }
            Entry::Vacant(vacant) => {
                vacant.insert(fresh);
                Ok(true)
            }
        }
    }

    async fn read(&self, key: &str) -> Result<Option<i64>> {
        let now = Instant::now();
        let live = self
            .slots
            .get(key)
            .filter(|slot| slot.is_live(now))
            .map(|slot| slot.value);
        if live.is_none() {
            self.slots.remove_if(key, |_, slot| !slot.is_live(now));
        }
        Ok(live)
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.slots.remove(key);
        Ok(())
    }

    async fn delete_if_equal(&self, key: &str, value: i64) -> Result<bool> {
        let now = Instant::now();
        Ok(self
            .slots
            .remove_if(key, |_, slot| slot.is_live(now) && slot.value == value)
            .is_some())
    }
}
