//! In-memory publisher for tests.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use crate::{NotificationPublisher, OrderStatusChanged, PublishError, Result};

#[derive(Debug, Default)]
struct InMemoryPublisherState {
    published: Vec<OrderStatusChanged>,
    fail_on_publish: bool,
    delay: Option<Duration>,
}

/// Publisher that records every notification it is given.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPublisher {
    state: Arc<Mutex<InMemoryPublisherState>>,
}

impl InMemoryPublisher {
    /// Creates a new in-memory publisher.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, InMemoryPublisherState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Configures the publisher to fail every publish call.
    pub fn set_fail_on_publish(&self, fail: bool) {
        self.lock().fail_on_publish = fail;
    }

    /// Makes every publish call sleep before completing.
    pub fn set_delay(&self, delay: Option<Duration>) {
        self.lock().delay = delay;
    }

    /// Returns a copy of everything published so far.
    pub fn published(&self) -> Vec<OrderStatusChanged> {
        self.lock().published.clone()
    }

    /// Returns the number of notifications published.
    pub fn published_count(&self) -> usize {
        self.lock().published.len()
    }
}

#[async_trait]
impl NotificationPublisher for InMemoryPublisher {
    async fn publish(&self, event: &OrderStatusChanged) -> Result<()> {
        let delay = self.lock().delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.lock();
        if state.fail_on_publish {
            return Err(PublishError::Channel("publisher offline".to_string()));
        }
        state.published.push(event.clone());
        Ok(())
    }
}
