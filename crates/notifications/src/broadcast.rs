//! In-process fan-out over a tokio broadcast channel.

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::{NotificationPublisher, OrderStatusChanged, Result};

/// Publisher that fans notifications out to every live subscriber.
///
/// Sending never waits on receivers. Slow subscribers lag and lose the
/// oldest events once the channel capacity is exceeded.
#[derive(Debug, Clone)]
pub struct BroadcastPublisher {
    sender: broadcast::Sender<OrderStatusChanged>,
}

impl BroadcastPublisher {
    /// Creates a publisher whose channel buffers `capacity` events.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Registers a new subscriber.
    pub fn subscribe(&self) -> broadcast::Receiver<OrderStatusChanged> {
        self.sender.subscribe()
    }

    /// Returns the number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

#[async_trait]
impl NotificationPublisher for BroadcastPublisher {
    async fn publish(&self, event: &OrderStatusChanged) -> Result<()> {
        match self.sender.send(event.clone()) {
            Ok(receivers) => {
                tracing::debug!(order_id = %event.order_id, receivers, "notification broadcast");
            }
            Err(_) => {
                // Nobody listening is not a failure
                tracing::debug!(order_id = %event.order_id, "notification dropped, no subscribers");
            }
        }
        Ok(())
    }
}
