//! Publisher trait.

use std::sync::Arc;

use async_trait::async_trait;

use crate::{OrderStatusChanged, Result};

/// Trait for broadcasting order status notifications.
#[async_trait]
pub trait NotificationPublisher: Send + Sync {
    /// Publishes one notification.
    async fn publish(&self, event: &OrderStatusChanged) -> Result<()>;
}

#[async_trait]
impl<T: NotificationPublisher + ?Sized> NotificationPublisher for Arc<T> {
    async fn publish(&self, event: &OrderStatusChanged) -> Result<()> {
        (**self).publish(event).await
    }
}
