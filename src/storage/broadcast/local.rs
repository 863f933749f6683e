//! In-process broadcaster

use super::{Broadcaster, RunEvent};
use crate::utils::error::Result;
use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::debug;

/// Broadcaster fanning out to in-process subscribers.
///
/// Events carry their channel name so one sender serves every run.
#[derive(Debug, Clone)]
pub struct LocalBroadcaster {
    sender: broadcast::Sender<(String, RunEvent)>,
}

impl LocalBroadcaster {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<(String, RunEvent)> {
        self.sender.subscribe()
    }
}

impl Default for LocalBroadcaster {
    fn default() -> Self {
        Self::new(1024)
    }
}

#[async_trait]
impl Broadcaster for LocalBroadcaster {
    async fn publish(&self, channel: &str, event: &RunEvent) -> Result<()> {
        // no subscribers is not an error
        if self.sender.send((channel.to_string(), event.clone())).is_err() {
            debug!("No subscribers on {}", channel);
        }
        Ok(())
    }
}
