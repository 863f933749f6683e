//! Live progress broadcast channel

mod local;
mod redis;

pub use local::LocalBroadcaster;
pub use self::redis::RedisBroadcaster;

use crate::core::models::ProgressPayload;
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of run event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Progress,
    Final,
}

/// Message published to a run's channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunEvent {
    pub id: Uuid,
    pub kind: EventKind,
    pub timestamp: DateTime<Utc>,
    pub payload: ProgressPayload,
}

impl RunEvent {
    pub fn new(kind: EventKind, payload: ProgressPayload) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            timestamp: Utc::now(),
            payload,
        }
    }

    pub fn progress(payload: ProgressPayload) -> Self {
        Self::new(EventKind::Progress, payload)
    }

    pub fn final_event(payload: ProgressPayload) -> Self {
        Self::new(EventKind::Final, payload)
    }
}

/// Fire-and-forget publisher
#[async_trait]
pub trait Broadcaster: Send + Sync {
    async fn publish(&self, channel: &str, event: &RunEvent) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_wire_format() {
        let event = RunEvent::final_event(ProgressPayload::from_counts(9, 4, 4, 0, 1, 1));
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["kind"], "final");
        assert_eq!(json["payload"]["run_id"], 9);
        assert_eq!(json["payload"]["percent"], 100.0);
        assert!(json["timestamp"].is_string());
    }
}
